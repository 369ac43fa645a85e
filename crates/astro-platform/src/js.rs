//! Small helpers around `JsValue` errors.

use wasm_bindgen::JsValue;

/// Best-effort human-readable text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Ok(message) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(s) = message.as_string() {
            return s;
        }
    }
    format!("{:?}", value)
}

/// `window.btoa(user:pass)` formatted as a basic-auth header value.
pub(crate) fn basic_auth(username: &str, password: &str) -> Option<String> {
    let window = web_sys::window()?;
    let encoded = window.btoa(&format!("{}:{}", username, password)).ok()?;
    Some(format!("Basic {}", encoded))
}
