//! Test doubles for the page the bridge runs in.

pub mod dom;
pub mod tracker;

pub use dom::{FakeElement, FakeScriptHost};
pub use tracker::RecordingTracker;

use std::sync::{LazyLock, Mutex};

use serde_json::Value;

use crate::tracker::payload::Properties;

/// Unwraps a `json!` object literal into a property map.
pub fn props(value: Value) -> Properties {
    value.as_object().cloned().unwrap_or_default()
}

/// Serializes tests that install the process-wide user log handler.
pub static LOG_HANDLER_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
