#![doc = include_str!("README.md")]
pub mod actions;
pub mod api;
mod bridge;
mod config;
pub mod constants;
pub mod error;
pub mod host;
mod page_view;
pub mod payload;

pub use actions::{
    ClickContext, ClickListener, ClickTarget, ListenerRegistration, TrackClick, TrackClickParams,
    TrackOutbound,
};
pub use bridge::EntrolyticsBridge;
pub(crate) use bridge::LOGGER;
pub use config::{config_from_defaults, BeforeSend, CallShape, EntrolyticsConfig, PageViewMode};
pub use error::{TrackerError, TrackerErrorCode, TrackerResult};
pub use host::{
    GlobalTracker, OnLoad, PageLocation, ScriptHost, ScriptTag, UnsupportedGlobalTracker,
    UnsupportedScriptHost,
};
pub use page_view::{NavigationSource, PageViewWatcher};
pub use payload::{EventPayload, IdentifyCall, Properties, TrackCall};
