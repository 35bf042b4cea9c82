//! emsc finalize pipeline.
//!
//! ```text
//! Module → memory growth → dynCall thunks (+ exports) → asm-const rewrite
//!        → metadata line → (optional) .wasm
//! ```
//!
//! The module is changed in place. [`finalize_json`] offers the same pipeline
//! over JSON for tooling that does not link Rust.

mod error;
mod options;

pub use error::{FinalizeError, FinalizeResult};
pub use options::FinalizeOptions;

use emsc_ir::{Export, ExportKind, Module};
use emsc_passes::{
    generate_emscripten_metadata, generate_memory_growth_function, make_dyn_call_thunks,
    SegmentAddressMap,
};
use serde::{Deserialize, Serialize};

/// Everything the pipeline produces besides the mutated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutput {
    /// The metadata line, trailing newline included.
    pub metadata: String,
    /// Names of the generated dynCall thunks, in creation order.
    pub dyncalls: Vec<String>,
    /// The lowered module, when `emit_binary` was requested.
    pub wasm: Option<Vec<u8>>,
}

/// Run the finalize passes over `module` in their conventional order.
pub fn finalize(module: &mut Module, options: &FinalizeOptions) -> FinalizeResult<FinalizeOutput> {
    let config = &options.config;

    if options.grow_memory {
        generate_memory_growth_function(module, config)?;
    }

    let table = module.table.clone();
    let dyncalls = make_dyn_call_thunks(module, &table, config)?;
    if options.export_dyncalls {
        for name in &dyncalls {
            module
                .add_export(Export {
                    name: name.clone(),
                    value: name.clone(),
                    kind: ExportKind::Function,
                })
                .map_err(emsc_passes::PassError::from)?;
        }
    }

    let segments = match &options.segment_map {
        Some(map) => map.clone(),
        None => SegmentAddressMap::from_module(module),
    };
    let mut metadata = Vec::new();
    generate_emscripten_metadata(
        &mut metadata,
        module,
        &segments,
        options.static_bump,
        &options.initializers,
        config,
    )?;
    let metadata = String::from_utf8_lossy(&metadata).into_owned();

    let wasm = if options.emit_binary {
        Some(emsc_codegen::encode(module)?)
    } else {
        None
    };

    log::info!(
        "finalized module: {} dynCall thunks, {} imports, {} functions",
        dyncalls.len(),
        module.imports.len(),
        module.functions.len()
    );

    Ok(FinalizeOutput {
        metadata,
        dyncalls,
        wasm,
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// JSON surface
// ══════════════════════════════════════════════════════════════════════════════

/// Serializable outcome of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub success: bool,
    /// The rewritten module (absent on failure).
    pub module: Option<Module>,
    pub metadata: Option<String>,
    #[serde(default)]
    pub dyncalls: Vec<String>,
    pub wasm: Option<Vec<u8>>,
    pub error: Option<String>,
    /// Whether the failure was caused by a malformed input module.
    #[serde(default)]
    pub malformed_input: bool,
}

impl FinalizeOutcome {
    fn failure(err: &FinalizeError) -> Self {
        let malformed_input = matches!(err, FinalizeError::Pass(e) if e.is_malformed_input());
        Self {
            success: false,
            module: None,
            metadata: None,
            dyncalls: Vec::new(),
            wasm: None,
            error: Some(err.to_string()),
            malformed_input,
        }
    }
}

/// Run the pipeline and fold success or failure into a [`FinalizeOutcome`].
pub fn finalize_to_result(mut module: Module, options: &FinalizeOptions) -> FinalizeOutcome {
    match finalize(&mut module, options) {
        Ok(out) => FinalizeOutcome {
            success: true,
            module: Some(module),
            metadata: Some(out.metadata),
            dyncalls: out.dyncalls,
            wasm: out.wasm,
            error: None,
            malformed_input: false,
        },
        Err(err) => FinalizeOutcome::failure(&err),
    }
}

/// JSON in, JSON out: `module_json` is a serialized [`Module`], `options_json`
/// a (possibly partial) [`FinalizeOptions`]. Returns a serialized
/// [`FinalizeOutcome`].
pub fn finalize_json(module_json: &str, options_json: &str) -> String {
    let outcome = parse_inputs(module_json, options_json)
        .map(|(module, options)| finalize_to_result(module, &options))
        .unwrap_or_else(|err| FinalizeOutcome::failure(&err));
    serde_json::to_string(&outcome).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"module":null,"metadata":null,"dyncalls":[],"wasm":null,"error":"serialization error: {}","malformed_input":false}}"#,
            e
        )
    })
}

fn parse_inputs(module_json: &str, options_json: &str) -> FinalizeResult<(Module, FinalizeOptions)> {
    let module = Module::from_json(module_json)?;
    let options = FinalizeOptions::from_json(options_json)?;
    Ok((module, options))
}
