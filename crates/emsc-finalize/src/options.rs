use emsc_passes::{PassConfig, SegmentAddressMap};
use serde::{Deserialize, Serialize};

/// Caller-supplied inputs of a pipeline run. Every field has a default, so
/// `{}` is a valid JSON options object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizeOptions {
    /// Extra static memory reserved by the linker; passed through to the
    /// metadata line.
    pub static_bump: u32,
    /// Functions to run at instantiation, in order.
    pub initializers: Vec<String>,
    /// Add and export the memory-growth function.
    pub grow_memory: bool,
    /// Export each generated dynCall thunk under its own name.
    pub export_dyncalls: bool,
    /// Lower the finished module to a validated `.wasm` binary.
    pub emit_binary: bool,
    /// Address → segment map; built from the module's segments when absent.
    pub segment_map: Option<SegmentAddressMap>,
    pub config: PassConfig,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            static_bump: 0,
            initializers: Vec::new(),
            grow_memory: true,
            export_dyncalls: true,
            emit_binary: false,
            segment_map: None,
            config: PassConfig::default(),
        }
    }
}

impl FinalizeOptions {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(FinalizeOptions::from_json("{}").unwrap(), FinalizeOptions::default());
    }

    #[test]
    fn segment_map_from_json() {
        let opts = FinalizeOptions::from_json(
            r#"{"static_bump": 16, "segment_map": {"1024": 0, "2048": 1}, "config": {"env_module": "x"}}"#,
        )
        .unwrap();
        assert_eq!(opts.static_bump, 16);
        let map = opts.segment_map.expect("map parsed");
        assert_eq!(map.get(1024), Some(0));
        assert_eq!(map.get(2048), Some(1));
        assert_eq!(opts.config.env_module, "x");
        assert_eq!(opts.config.asm_const_marker, "emscripten_asm_const");
        assert!(opts.grow_memory);
    }
}
