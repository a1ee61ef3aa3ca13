#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
use pyo3::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod ast;
pub mod error;
pub mod escape;
pub mod html;
pub mod inline;
pub mod parser;
pub mod rules;
pub mod title_page;
pub mod types;

pub use error::ParseError;
pub use types::{DualSide, ParseOptions, ParseOutput, ScriptHtml, Token};

use std::panic::{self, AssertUnwindSafe};

#[derive(Default)]
pub struct Fountain {
    options: ParseOptions,
}

impl Fountain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Lexes and renders a whole script. A panic anywhere in the pipeline is reported as
    /// [`ParseError::Internal`]; no partial output is returned.
    pub fn parse(&self, script: &str) -> Result<ParseOutput, ParseError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run(script))).map_err(ParseError::from_panic)
    }

    fn run(&self, script: &str) -> ParseOutput {
        let (title_page, script_tokens) = parser::tokenize(script);

        let title = title_page
            .iter()
            .find(|token| token.kind() == "title")
            .and_then(Token::text)
            .filter(|text| !text.is_empty())
            .map(html::plain_text)
            .unwrap_or_default();

        let html = ScriptHtml {
            title_page: html::render(&title_page),
            script: html::render(&script_tokens),
        };

        let tokens = if self.options.keep_tokens {
            title_page.into_iter().chain(script_tokens).collect()
        } else {
            Vec::new()
        };

        ParseOutput {
            title,
            html,
            tokens,
        }
    }
}

/// Parses `script`, keeping the token list when `keep_tokens` is set.
pub fn parse(script: &str, keep_tokens: bool) -> Result<ParseOutput, ParseError> {
    Fountain::with_options(ParseOptions { keep_tokens }).parse(script)
}

/// Parses a dynamically typed script, such as a field of a JSON request. Only strings are
/// accepted; the error names the type that was received instead.
pub fn parse_value(
    script: &serde_json::Value,
    keep_tokens: bool,
) -> Result<ParseOutput, ParseError> {
    use serde_json::Value;

    let received = match script {
        Value::String(text) => return parse(text, keep_tokens),
        Value::Null => return Err(ParseError::MissingInput),
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Err(ParseError::invalid_input(received))
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
fn to_py_err(err: ParseError) -> PyErr {
    match err {
        ParseError::Internal { .. } => {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(err.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyTypeError, _>(err.to_string()),
    }
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pyfunction]
#[pyo3(name = "parse", signature = (script, get_tokens = false))]
fn parse_py(script: Option<&Bound<'_, PyAny>>, get_tokens: bool) -> PyResult<String> {
    let text = match script {
        Some(obj) if !obj.is_none() => match obj.extract::<String>() {
            Ok(text) => text,
            Err(_) => {
                let received = obj
                    .get_type()
                    .name()
                    .map(|name| name.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(to_py_err(ParseError::invalid_input(received)));
            }
        },
        _ => return Err(to_py_err(ParseError::MissingInput)),
    };

    let output = parse(&text, get_tokens).map_err(to_py_err)?;

    serde_json::to_string_pretty(&output)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn parse_wasm(script: JsValue, get_tokens: bool) -> Result<String, JsValue> {
    if script.is_null() || script.is_undefined() {
        return Err(JsValue::from_str(&ParseError::MissingInput.to_string()));
    }
    let Some(text) = script.as_string() else {
        let received = script.js_typeof().as_string().unwrap_or_default();
        return Err(JsValue::from_str(
            &ParseError::invalid_input(received).to_string(),
        ));
    };

    let output = parse(&text, get_tokens).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string_pretty(&output).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pymodule]
fn fountain_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_py, m)?)?;
    Ok(())
}
