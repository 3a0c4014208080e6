//! Runtime environment detection and page-published defaults.

use std::env;

use serde_json::Value;

/// Returns the JSON value published under `key`, read from the environment variable of that
/// name first and from the global object second.
pub fn defaults_value(key: &str) -> Option<Value> {
    defaults_from_env(key).or_else(|| defaults_from_global(key))
}

fn defaults_from_env(key: &str) -> Option<Value> {
    let raw = env::var(key).ok()?;
    serde_json::from_str::<Value>(&raw).ok()
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
fn defaults_from_global(key: &str) -> Option<Value> {
    use wasm_bindgen::JsValue;

    let global = js_sys::global();
    let value = js_sys::Reflect::get(&global, &JsValue::from_str(key)).ok()?;
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let serialized = js_sys::JSON::stringify(&value).ok()?.as_string()?;
    serde_json::from_str(&serialized).ok()
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
fn defaults_from_global(_key: &str) -> Option<Value> {
    None
}

/// Returns `true` when the code runs on a page with a `window` and a `document`.
pub fn is_browser() -> bool {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        web_sys::window().and_then(|window| window.document()).is_some()
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        false
    }
}
