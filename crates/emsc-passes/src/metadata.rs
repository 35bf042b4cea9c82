//! The metadata record read by the build tooling.
//!
//! One line, written once, after all asm-const calls are rewritten:
//!
//! ```text
//! ;; METADATA: { "asmConsts": {"0": ["<code>", ["<sig>","<sig>"]],"1": [...]},"staticBump": 1024, "initializers": ["a", "b"] }
//! ```
//!
//! The punctuation (including the missing and present spaces) is consumed
//! byte-for-byte and must stay as is.

use std::fmt::Write as _;
use std::io::Write;

use emsc_ir::Module;

use crate::asm_const::{AsmConstWalker, CodeRegistry, SegmentAddressMap};
use crate::config::PassConfig;
use crate::error::PassResult;

/// Rewrite the module's asm-const calls and write the metadata record to
/// `out`.
///
/// The record is fully rendered before anything is written; on error nothing
/// reaches `out`.
pub fn generate_emscripten_metadata<W: Write>(
    out: &mut W,
    module: &mut Module,
    segments: &SegmentAddressMap,
    static_bump: u32,
    initializers: &[String],
    config: &PassConfig,
) -> PassResult<()> {
    let record = emscripten_metadata(module, segments, static_bump, initializers, config)?;
    out.write_all(record.as_bytes())?;
    Ok(())
}

/// Like [`generate_emscripten_metadata`], returning the record (including its
/// trailing newline) instead of writing it.
pub fn emscripten_metadata(
    module: &mut Module,
    segments: &SegmentAddressMap,
    static_bump: u32,
    initializers: &[String],
    config: &PassConfig,
) -> PassResult<String> {
    let registry = AsmConstWalker::new(config, segments).run(module)?;
    Ok(render_metadata(&registry, static_bump, initializers, config))
}

/// Render the record for an already collected registry.
pub fn render_metadata(
    registry: &CodeRegistry,
    static_bump: u32,
    initializers: &[String],
    config: &PassConfig,
) -> String {
    let mut o = String::new();
    o.push_str(&config.metadata_prefix);
    o.push_str("{ ");

    o.push_str("\"asmConsts\": {");
    for (i, entry) in registry.entries().iter().enumerate() {
        if i > 0 {
            o.push(',');
        }
        let _ = write!(o, "\"{}\": [\"{}\", ", entry.id, entry.code);
        print_list(&mut o, &entry.sigs, ",");
        o.push(']');
    }
    o.push('}');
    o.push(',');
    let _ = write!(o, "\"staticBump\": {static_bump}, ");

    o.push_str("\"initializers\": ");
    print_list(&mut o, initializers, ", ");

    o.push_str(" }\n");
    o
}

/// `["a","b"]` with the given separator. Items are written verbatim.
fn print_list(o: &mut String, items: &[String], sep: &str) {
    o.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            o.push_str(sep);
        }
        o.push('"');
        o.push_str(item);
        o.push('"');
    }
    o.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record() {
        let record = render_metadata(&CodeRegistry::new(), 0, &[], &PassConfig::default());
        assert_eq!(
            record,
            ";; METADATA: { \"asmConsts\": {},\"staticBump\": 0, \"initializers\": [] }\n"
        );
    }

    #[test]
    fn full_record_punctuation() {
        let mut reg = CodeRegistry::new();
        reg.record_sig("a()", "v");
        reg.record_sig("a()", "vi");
        reg.record_sig("b()", "d");
        let inits = vec!["__GLOBAL__I_a".to_string(), "__GLOBAL__I_b".to_string()];
        let record = render_metadata(&reg, 5242880, &inits, &PassConfig::default());
        assert_eq!(
            record,
            concat!(
                ";; METADATA: { \"asmConsts\": {",
                "\"0\": [\"a()\", [\"v\",\"vi\"]],",
                "\"1\": [\"b()\", [\"d\"]]",
                "},\"staticBump\": 5242880, ",
                "\"initializers\": [\"__GLOBAL__I_a\", \"__GLOBAL__I_b\"] }\n"
            )
        );
    }
}
