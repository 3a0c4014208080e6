//! Free functions over one bridge per page, for hosts that do not want to carry an
//! [`EntrolyticsBridge`] around.

use std::sync::LazyLock;

use crate::tracker::actions::{
    ClickTarget, TrackClick, TrackClickParams, TrackOutbound,
};
use crate::tracker::bridge::EntrolyticsBridge;
use crate::tracker::config::EntrolyticsConfig;
use crate::tracker::error::TrackerResult;
use crate::tracker::page_view::{NavigationSource, PageViewWatcher};
use crate::tracker::payload::Properties;
use crate::util::Store;

static SHARED_BRIDGE: LazyLock<EntrolyticsBridge> = LazyLock::new(EntrolyticsBridge::new);

/// The bridge used by every function in this module.
pub fn shared_bridge() -> EntrolyticsBridge {
    SHARED_BRIDGE.clone()
}

pub fn init_entrolytics(config: EntrolyticsConfig) -> TrackerResult<()> {
    SHARED_BRIDGE.initialize(config)
}

pub fn is_loaded() -> Store<bool> {
    SHARED_BRIDGE.loaded()
}

pub fn is_ready() -> Store<bool> {
    SHARED_BRIDGE.ready()
}

pub fn track_event(name: impl Into<String>, data: Properties) {
    SHARED_BRIDGE.track_event(name, data);
}

pub fn track_revenue(
    name: impl Into<String>,
    amount: f64,
    currency: Option<&str>,
    extra_data: Properties,
) {
    SHARED_BRIDGE.track_revenue(name, amount, currency, extra_data);
}

pub fn track_outbound_link(url: impl Into<String>, data: Properties) {
    SHARED_BRIDGE.track_outbound_link(url, data);
}

pub fn track_page_view(url: Option<String>, referrer: Option<String>) {
    SHARED_BRIDGE.track_page_view(url, referrer);
}

pub fn identify(data: Properties) {
    SHARED_BRIDGE.identify(data);
}

pub fn identify_user(id: impl Into<String>, traits: Properties) {
    SHARED_BRIDGE.identify_user(id, traits);
}

pub fn set_tag(tag: impl Into<String>) {
    SHARED_BRIDGE.set_tag(tag);
}

pub fn track_click<T>(target: &T, params: TrackClickParams) -> TrackerResult<TrackClick>
where
    T: ClickTarget + ?Sized,
{
    TrackClick::attach(target, &SHARED_BRIDGE, params)
}

pub fn track_outbound<T>(target: &T, data: Properties) -> TrackerResult<TrackOutbound>
where
    T: ClickTarget + ?Sized,
{
    TrackOutbound::attach(target, &SHARED_BRIDGE, data)
}

/// Starts page-view tracking; call from the mount hook and keep the watcher for the view's
/// lifetime.
pub fn observe_page_view<S>(source: &S) -> PageViewWatcher
where
    S: NavigationSource + ?Sized,
{
    PageViewWatcher::attach(&SHARED_BRIDGE, source)
}
