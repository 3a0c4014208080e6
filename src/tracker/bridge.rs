use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use serde_json::Value;

use crate::logger::Logger;
use crate::platform::runtime::{spawn_detached, wait_until};
use crate::tracker::config::{BeforeSend, CallShape, EntrolyticsConfig, PageViewMode};
use crate::tracker::constants::{
    DEFAULT_CURRENCY, LOGGER_NAME, OUTBOUND_LINK_EVENT, PAGE_VIEW_EVENT, SCRIPT_ELEMENT_ID,
    TRACKER_POLL_INTERVAL,
};
use crate::tracker::error::TrackerResult;
use crate::tracker::host::{
    default_global_tracker, default_script_host, GlobalTracker, OnLoad, ScriptHost,
};
use crate::tracker::payload::{EventPayload, IdentifyCall, Properties, TrackCall};
use crate::util::Store;

pub(crate) static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new(LOGGER_NAME));

/// Handle on the tracking script for one page. Clones share state.
#[derive(Clone)]
pub struct EntrolyticsBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    host: Arc<dyn ScriptHost>,
    tracker: Arc<dyn GlobalTracker>,
    initialized: AtomicBool,
    config: Mutex<Option<EntrolyticsConfig>>,
    tag: Mutex<Option<String>>,
    loaded: Store<bool>,
    ready: Store<bool>,
}

/// The parts of the configuration every send needs.
struct SendSettings {
    call_shape: CallShape,
    page_view_mode: PageViewMode,
    before_send: Option<BeforeSend>,
}

impl fmt::Debug for EntrolyticsBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrolyticsBridge")
            .field("initialized", &self.is_initialized())
            .field("loaded", &self.is_loaded())
            .field("ready", &self.is_ready())
            .field("tag", &self.current_tag())
            .finish()
    }
}

impl Default for EntrolyticsBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EntrolyticsBridge {
    /// Creates a bridge bound to the current page, or an inert one outside the browser.
    pub fn new() -> Self {
        Self::with_platform(default_script_host(), default_global_tracker())
    }

    pub fn with_platform(host: Arc<dyn ScriptHost>, tracker: Arc<dyn GlobalTracker>) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                host,
                tracker,
                initialized: AtomicBool::new(false),
                config: Mutex::new(None),
                tag: Mutex::new(None),
                loaded: Store::new(false),
                ready: Store::new(false),
            }),
        }
    }

    /// Injects the tracking script described by `config`.
    ///
    /// Only the first successful call has an effect. Outside a browser the call does nothing.
    /// Completion is observable through [`loaded`](Self::loaded) and [`ready`](Self::ready).
    pub fn initialize(&self, config: EntrolyticsConfig) -> TrackerResult<()> {
        if !self.inner.host.is_available() {
            LOGGER.debug("No browser environment; skipping initialization");
            return Ok(());
        }
        if self.is_initialized() {
            return Ok(());
        }

        let script = config.script_tag()?;
        if self
            .inner
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        *self.inner.tag.lock().unwrap() = config.tag.clone().filter(|tag| !tag.is_empty());
        *self.inner.config.lock().unwrap() = Some(config);

        if self.inner.host.script_exists(SCRIPT_ELEMENT_ID) {
            LOGGER.debug("Tracking script already present");
            self.mark_loaded();
            return Ok(());
        }

        let loaded = self.inner.loaded.clone();
        let ready = self.inner.ready.clone();
        let on_load: OnLoad = Box::new(move || {
            loaded.set(true);
            ready.set(true);
        });

        LOGGER.debug(format!("Injecting tracking script from {}", script.src));
        if let Err(err) = self.inner.host.inject_script(script, on_load) {
            LOGGER.warn(format!("Failed to inject tracking script: {err}"));
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    /// The configuration accepted by [`initialize`](Self::initialize), if any.
    pub fn config(&self) -> Option<EntrolyticsConfig> {
        self.inner.config.lock().unwrap().clone()
    }

    /// Becomes `true` once the script tag is present and loaded.
    pub fn loaded(&self) -> Store<bool> {
        self.inner.loaded.clone()
    }

    /// Becomes `true` once the tracker can take calls.
    pub fn ready(&self) -> Store<bool> {
        self.inner.ready.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.get()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.get()
    }

    /// Resolves once the global tracker object exists. Returns `false` straight away when there
    /// is no browser environment to wait on.
    pub async fn tracker_ready(&self) -> bool {
        if !self.inner.host.is_available() {
            return false;
        }
        let tracker = Arc::clone(&self.inner.tracker);
        wait_until(TRACKER_POLL_INTERVAL, || tracker.is_installed()).await;
        true
    }

    pub fn set_tag(&self, tag: impl Into<String>) {
        let tag = tag.into();
        *self.inner.tag.lock().unwrap() = if tag.is_empty() { None } else { Some(tag) };
    }

    pub fn clear_tag(&self) {
        self.inner.tag.lock().unwrap().take();
    }

    pub fn current_tag(&self) -> Option<String> {
        self.inner.tag.lock().unwrap().clone()
    }

    pub fn track_event(&self, name: impl Into<String>, data: Properties) {
        self.send(EventPayload::event(name, data));
    }

    pub fn track_revenue(
        &self,
        name: impl Into<String>,
        amount: f64,
        currency: Option<&str>,
        extra_data: Properties,
    ) {
        let mut data = extra_data;
        data.insert("revenue".into(), Value::from(amount));
        data.insert(
            "currency".into(),
            Value::String(currency.unwrap_or(DEFAULT_CURRENCY).to_string()),
        );
        self.track_event(name, data);
    }

    pub fn track_outbound_link(&self, url: impl Into<String>, data: Properties) {
        let mut data = data;
        data.insert("url".into(), Value::String(url.into()));
        self.track_event(OUTBOUND_LINK_EVENT, data);
    }

    /// Records a page view for `url`/`referrer`, or for the current location when neither is
    /// given.
    pub fn track_page_view(&self, url: Option<String>, referrer: Option<String>) {
        let (url, referrer) = if url.is_some() || referrer.is_some() {
            (url, referrer)
        } else {
            match self.inner.host.location() {
                Some(location) => (Some(location.url), location.referrer),
                None => (None, None),
            }
        };

        let name = match self.settings().page_view_mode {
            PageViewMode::NamedEvent => Some(PAGE_VIEW_EVENT.to_string()),
            PageViewMode::TrackerDefault => None,
        };
        self.send(EventPayload::page_view(name, url, referrer));
    }

    pub fn identify(&self, data: Properties) {
        self.forward_identify(IdentifyCall::Traits(data));
    }

    pub fn identify_user(&self, id: impl Into<String>, traits: Properties) {
        let call = IdentifyCall::user(id, traits, self.settings().call_shape);
        self.forward_identify(call);
    }

    fn mark_loaded(&self) {
        self.inner.loaded.set(true);
        self.inner.ready.set(true);
    }

    fn settings(&self) -> SendSettings {
        match self.inner.config.lock().unwrap().as_ref() {
            Some(config) => SendSettings {
                call_shape: config.call_shape,
                page_view_mode: config.page_view_mode,
                before_send: config.before_send.clone(),
            },
            None => SendSettings {
                call_shape: CallShape::default(),
                page_view_mode: PageViewMode::default(),
                before_send: None,
            },
        }
    }

    fn send(&self, payload: EventPayload) {
        if !self.inner.host.is_available() {
            return;
        }

        let settings = self.settings();
        let mut payload = match settings.before_send {
            Some(transform) => match transform(payload) {
                Some(payload) => payload,
                None => {
                    LOGGER.debug("before_send cancelled the event");
                    return;
                }
            },
            None => payload,
        };
        if let Some(tag) = self.current_tag() {
            payload.tag = Some(tag);
        }

        let call = payload.into_call(settings.call_shape);
        self.forward_track(call);
    }

    fn forward_track(&self, call: TrackCall) {
        self.dispatch("track", move |tracker| tracker.track(call));
    }

    fn forward_identify(&self, call: IdentifyCall) {
        if !self.inner.host.is_available() {
            return;
        }
        self.dispatch("identify", move |tracker| tracker.identify(call));
    }

    /// Forwards now when the tracker exists, otherwise once a poll finds it.
    fn dispatch<F>(&self, entry_point: &'static str, forward: F)
    where
        F: FnOnce(&dyn GlobalTracker) -> TrackerResult<()> + Send + 'static,
    {
        let tracker = Arc::clone(&self.inner.tracker);
        if tracker.is_installed() {
            report(entry_point, forward(tracker.as_ref()));
            return;
        }

        LOGGER.debug(format!("Tracker not installed yet; deferring {entry_point}()"));
        spawn_detached(async move {
            wait_until(TRACKER_POLL_INTERVAL, || tracker.is_installed()).await;
            report(entry_point, forward(tracker.as_ref()));
        });
    }
}

fn report(entry_point: &str, result: TrackerResult<()>) {
    if let Err(err) = result {
        LOGGER.warn(format!("{entry_point}() failed: {err}"));
    }
}
