use std::fmt;
use wasm_bindgen::{JsCast, JsValue};

/// Failures reported by (or while talking to) the browser host
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// The entry is already present (reading list).
    Duplicate(String),
    /// The host rejected the call: tab gone, permission denied, injection refused.
    Rejected(String),
    /// A host value did not have the expected shape.
    Decode(String),
    /// A browser object (window, document, parent frame) is missing in this context.
    Unavailable(String),
}

impl HostError {
    /// Classify a host rejection message
    pub fn from_message(message: &str) -> HostError {
        if message.contains("duplicate") {
            HostError::Duplicate(message.to_string())
        } else {
            HostError::Rejected(message.to_string())
        }
    }

    /// Classify a rejected promise value (an `Error`, a string, or anything else)
    pub fn from_js(value: JsValue) -> HostError {
        if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            return HostError::from_message(&String::from(error.message()));
        }
        match value.as_string() {
            Some(message) => HostError::from_message(&message),
            None => HostError::Rejected(format!("{:?}", value)),
        }
    }

    pub fn decode(error: serde_wasm_bindgen::Error) -> HostError {
        HostError::Decode(error.to_string())
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, HostError::Duplicate(_))
    }

    /// The host no longer knows the tab (closed since the last render pass)
    pub fn is_missing_tab(&self) -> bool {
        matches!(self, HostError::Rejected(msg) if msg.starts_with("No tab with id"))
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Duplicate(msg) => write!(f, "Already present: {}", msg),
            HostError::Rejected(msg) => write!(f, "Host rejected call: {}", msg),
            HostError::Decode(msg) => write!(f, "Unexpected host value: {}", msg),
            HostError::Unavailable(what) => write!(f, "Not available in this context: {}", what),
        }
    }
}

impl std::error::Error for HostError {}

impl From<HostError> for JsValue {
    fn from(error: HostError) -> JsValue {
        JsValue::from_str(&error.to_string())
    }
}
