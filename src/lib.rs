//! Browser bridge for the Entrolytics tracking script.
//!
//! [`tracker::EntrolyticsBridge`] injects the script, forwards `track`/`identify` calls to the
//! global object it installs (waiting for it when needed) and offers click bindings and a
//! page-view watcher for UI frameworks. Enable the `wasm-web` feature when targeting
//! `wasm32-unknown-unknown`; other builds get an inert bridge.

pub mod logger;
pub mod platform;
pub mod tracker;
pub mod util;

#[cfg(test)]
pub mod test_support;
