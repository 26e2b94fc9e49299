/// UI surfaces: the tab list panel, the options page and the in-page overlay
use crate::errors::HostError;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

pub mod components;
pub mod options;
pub mod overlay;
pub mod panel;

/// Run `task` once after `delay_ms`
pub fn schedule<F>(delay_ms: i32, task: F) -> Result<i32, HostError>
where
    F: FnOnce() + 'static,
{
    let window = web_sys::window().ok_or_else(|| HostError::Unavailable("window".to_string()))?;
    let callback = Closure::once_into_js(task);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
        .map_err(HostError::from_js)
}

/// Milliseconds since the epoch, as the host reports `lastAccessed`
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
