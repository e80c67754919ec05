pub mod ast;
pub mod config;
pub mod emit;
pub mod index;
pub mod loader;
pub mod measure;
pub mod resolve;
pub mod writer;

use wasm_bindgen::prelude::*;

use config::{ConfigError, GeneratorConfig};
use emit::{CppEmitter, EmitError, GeneratedOutput};
use loader::{SchemaError, SourceFormat, load_schema};
use writer::WriteError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Generation error: {0}")]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parse schema source and emit every unit in memory.
pub fn generate(
    source: &str,
    format: Option<SourceFormat>,
    config: GeneratorConfig,
) -> Result<GeneratedOutput, Error> {
    let format = format.unwrap_or_else(|| SourceFormat::detect(source));
    let schema = load_schema(source, format)?;
    Ok(CppEmitter::new(config).assemble(&schema)?)
}

fn parse_format(format: Option<String>) -> Result<Option<SourceFormat>, String> {
    format
        .as_deref()
        .map(|f| SourceFormat::from_str(f).ok_or_else(|| format!("Unknown format: {f}")))
        .transpose()
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Generate the combined C++ unit from schema source.
#[wasm_bindgen(js_name = "generateCombined")]
pub fn generate_combined(source: &str, format: Option<String>) -> Result<String, String> {
    let output = generate(source, parse_format(format)?, GeneratorConfig::default())
        .map_err(|e| e.to_string())?;
    Ok(output.combined.contents)
}

/// Generate every unit, as an object mapping relative path to contents.
#[wasm_bindgen(js_name = "generateHeaders")]
pub fn generate_headers(source: &str, format: Option<String>) -> Result<js_sys::Object, String> {
    let output = generate(source, parse_format(format)?, GeneratorConfig::default())
        .map_err(|e| e.to_string())?;

    let files = js_sys::Object::new();
    for file in output.files() {
        let path = file.path.to_string_lossy().replace('\\', "/");
        js_sys::Reflect::set(&files, &JsValue::from_str(&path), &JsValue::from_str(&file.contents))
            .map_err(|_| format!("Failed to set {path}"))?;
    }
    Ok(files)
}
