use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::util::js_error_message;

/// Everything that can go wrong in the behavior layer.
///
/// Values travel through reducer actions and shared fetch futures, so the type
/// only holds owned strings and stays `Clone`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PortfolioError {
    #[error("required element `{0}` is missing from the page")]
    MissingElement(String),
    #[error("failed to fetch content for `{ident}`: {message}")]
    Fetch { ident: String, message: String },
    #[error("failed to load stylesheet `{href}`: {message}")]
    Stylesheet { href: String, message: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for PortfolioError {
    fn from(value: JsValue) -> Self {
        PortfolioError::Js(js_error_message(&value))
    }
}

impl From<serde_json::Error> for PortfolioError {
    fn from(err: serde_json::Error) -> Self {
        PortfolioError::Config(err.to_string())
    }
}
