//! Error type shared by every browser-facing module.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("no global `window` available")]
    NoWindow,
    #[error("no `document` on window")]
    NoDocument,
    #[error("element `{0}` is not a {1}")]
    WrongElement(String, &'static str),
    #[error("2d rendering context unavailable")]
    NoContext,
    #[error("unknown language `{0}`")]
    UnknownLanguage(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        SiteError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
