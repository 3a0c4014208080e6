//! Seams between the bridge and the page it runs in.
//!
//! [`ScriptHost`] covers the document (script injection, current location) and
//! [`GlobalTracker`] covers the object the remote script installs. Browser builds with the
//! `wasm-web` feature use the `web-sys` implementations from [`crate::platform::browser`];
//! every other build gets the unsupported variants below, which turn the bridge into a no-op.

use std::sync::Arc;

use crate::tracker::error::TrackerResult;
use crate::tracker::payload::{IdentifyCall, TrackCall};

/// The `<script>` element the bridge asks the host to append to `<head>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
    pub defer: bool,
    pub attributes: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLocation {
    /// Path and query string of the current document.
    pub url: String,
    pub referrer: Option<String>,
}

pub type OnLoad = Box<dyn FnOnce() + Send + 'static>;

pub trait ScriptHost: Send + Sync {
    /// Whether a browser document is reachable at all.
    fn is_available(&self) -> bool;

    fn script_exists(&self, id: &str) -> bool;

    /// Appends the script to the document head; `on_load` runs once the browser has executed it.
    fn inject_script(&self, script: ScriptTag, on_load: OnLoad) -> TrackerResult<()>;

    fn location(&self) -> Option<PageLocation>;
}

pub trait GlobalTracker: Send + Sync {
    fn is_installed(&self) -> bool;

    fn track(&self, call: TrackCall) -> TrackerResult<()>;

    fn identify(&self, call: IdentifyCall) -> TrackerResult<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedScriptHost;

impl ScriptHost for UnsupportedScriptHost {
    fn is_available(&self) -> bool {
        false
    }

    fn script_exists(&self, _id: &str) -> bool {
        false
    }

    fn inject_script(&self, _script: ScriptTag, _on_load: OnLoad) -> TrackerResult<()> {
        Ok(())
    }

    fn location(&self) -> Option<PageLocation> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedGlobalTracker;

impl GlobalTracker for UnsupportedGlobalTracker {
    fn is_installed(&self) -> bool {
        false
    }

    fn track(&self, _call: TrackCall) -> TrackerResult<()> {
        Ok(())
    }

    fn identify(&self, _call: IdentifyCall) -> TrackerResult<()> {
        Ok(())
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub fn default_script_host() -> Arc<dyn ScriptHost> {
    if crate::platform::environment::is_browser() {
        Arc::new(crate::platform::browser::WebScriptHost)
    } else {
        Arc::new(UnsupportedScriptHost)
    }
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
pub fn default_script_host() -> Arc<dyn ScriptHost> {
    Arc::new(UnsupportedScriptHost)
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub fn default_global_tracker() -> Arc<dyn GlobalTracker> {
    Arc::new(crate::platform::browser::WebGlobalTracker)
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
pub fn default_global_tracker() -> Arc<dyn GlobalTracker> {
    Arc::new(UnsupportedGlobalTracker)
}
