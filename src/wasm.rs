//! WASM bindings for texmml
//!
//! This module provides JavaScript-accessible functions for parsing TeX
//! math into MathML.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::{ParserOptions, TexInput};

/// Parse options (exposed to WASM)
#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WasmOptions {
    /// Packages to load; the default set when empty
    #[serde(default)]
    pub packages: Vec<String>,
    /// Indent the MathML output
    #[serde(default)]
    pub pretty: bool,
    /// Options passed on to the parser
    #[serde(default)]
    pub parser: ParserOptions,
}

/// Parse result with metadata
#[derive(Serialize, Deserialize)]
pub struct WasmResult {
    /// The MathML output, or an merror rendering on failure
    pub output: String,
    pub success: bool,
    /// Error identifier (`UndefinedControlSequence` ...)
    pub error_id: Option<String>,
    pub error: Option<String>,
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert TeX math to MathML with options
///
/// # Arguments
/// * `input` - TeX math code (without $ delimiters)
/// * `options` - A `WasmOptions` object; may be undefined
///
/// # Returns
/// A `WasmResult` object
#[wasm_bindgen(js_name = "texToMathml")]
pub fn tex_to_mathml_wasm(input: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options: WasmOptions = if options.is_undefined() || options.is_null() {
        WasmOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))?
    };

    let names: Vec<&str> = options.packages.iter().map(String::as_str).collect();
    let session = TexInput::builder()
        .packages(&names)
        .options(options.parser)
        .build()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let result = match session.render(input) {
        Ok(tree) => WasmResult {
            output: if options.pretty {
                tree.to_mathml_pretty()
            } else {
                tree.to_mathml()
            },
            success: true,
            error_id: None,
            error: None,
        },
        Err(err) => WasmResult {
            output: session.parse_or_recover(input).to_mathml(),
            success: false,
            error_id: Some(err.id().to_string()),
            error: Some(err.message()),
        },
    };
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse TeX math and return the node tree as a JavaScript object
#[wasm_bindgen(js_name = "texToTree")]
pub fn tex_to_tree(input: &str, display: bool) -> Result<JsValue, JsValue> {
    let session = TexInput::with_options(ParserOptions::new().with_display(display));
    let tree = session
        .parse(input)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&tree.to_json()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// List the available package names
#[wasm_bindgen(js_name = "availablePackages")]
pub fn available_packages() -> Vec<String> {
    crate::PACKAGES.iter().map(|(name, _)| name.to_string()).collect()
}
