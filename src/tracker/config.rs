use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::platform::environment;
use crate::tracker::constants::{
    DEFAULTS_KEY, DEFAULT_HOST, EDGE_SCRIPT_PATH, SCRIPT_ELEMENT_ID, SCRIPT_PATH,
};
use crate::tracker::error::{invalid_config, TrackerResult};
use crate::tracker::host::ScriptTag;
use crate::tracker::payload::EventPayload;

/// Transform applied to every outgoing track payload. Returning `None` cancels the send.
pub type BeforeSend = Arc<dyn Fn(EventPayload) -> Option<EventPayload> + Send + Sync + 'static>;

/// How calls are laid out when handed to the global tracker object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallShape {
    /// `track(name, data)` and `identify(id, traits)`.
    #[default]
    Positional,
    /// `track({ name, data, .. })` and `identify({ id, ..traits })`.
    Object,
}

/// What `track_page_view` sends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageViewMode {
    /// An explicit `pageview` event.
    #[default]
    NamedEvent,
    /// An event-less call, leaving the tracker to record its default page view.
    TrackerDefault,
}

/// Options supplied once when the bridge is initialized.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntrolyticsConfig {
    pub website_id: String,
    pub host: Option<String>,
    pub auto_track: bool,
    pub do_not_track: bool,
    pub domains: Vec<String>,
    pub use_edge_runtime: bool,
    pub tag: Option<String>,
    pub exclude_search: bool,
    pub exclude_hash: bool,
    pub call_shape: CallShape,
    pub page_view_mode: PageViewMode,
    #[serde(skip)]
    pub before_send: Option<BeforeSend>,
}

impl Default for EntrolyticsConfig {
    fn default() -> Self {
        Self {
            website_id: String::new(),
            host: None,
            auto_track: true,
            do_not_track: false,
            domains: Vec::new(),
            use_edge_runtime: false,
            tag: None,
            exclude_search: false,
            exclude_hash: false,
            call_shape: CallShape::default(),
            page_view_mode: PageViewMode::default(),
            before_send: None,
        }
    }
}

impl fmt::Debug for EntrolyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrolyticsConfig")
            .field("website_id", &self.website_id)
            .field("host", &self.host)
            .field("auto_track", &self.auto_track)
            .field("do_not_track", &self.do_not_track)
            .field("domains", &self.domains)
            .field("use_edge_runtime", &self.use_edge_runtime)
            .field("tag", &self.tag)
            .field("exclude_search", &self.exclude_search)
            .field("exclude_hash", &self.exclude_hash)
            .field("call_shape", &self.call_shape)
            .field("page_view_mode", &self.page_view_mode)
            .field("before_send", &self.before_send.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl EntrolyticsConfig {
    pub fn new(website_id: impl Into<String>) -> Self {
        Self {
            website_id: website_id.into(),
            ..Default::default()
        }
    }

    /// Parses a JSON object using the camelCase keys accepted by the tracking script.
    pub fn from_json(raw: &str) -> TrackerResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| invalid_config(format!("invalid Entrolytics configuration: {err}")))
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_auto_track(mut self, enabled: bool) -> Self {
        self.auto_track = enabled;
        self
    }

    pub fn with_do_not_track(mut self, enabled: bool) -> Self {
        self.do_not_track = enabled;
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_edge_runtime(mut self, enabled: bool) -> Self {
        self.use_edge_runtime = enabled;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_exclude_search(mut self, enabled: bool) -> Self {
        self.exclude_search = enabled;
        self
    }

    pub fn with_exclude_hash(mut self, enabled: bool) -> Self {
        self.exclude_hash = enabled;
        self
    }

    pub fn with_call_shape(mut self, shape: CallShape) -> Self {
        self.call_shape = shape;
        self
    }

    pub fn with_page_view_mode(mut self, mode: PageViewMode) -> Self {
        self.page_view_mode = mode;
        self
    }

    pub fn with_before_send<F>(mut self, transform: F) -> Self
    where
        F: Fn(EventPayload) -> Option<EventPayload> + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(transform));
        self
    }

    pub(crate) fn validate(&self) -> TrackerResult<()> {
        if self.website_id.trim().is_empty() {
            return Err(invalid_config("Entrolytics requires a non-empty website id"));
        }
        Ok(())
    }

    /// Resolves `{host}{path}` for the tracking script. The host falls back to the public
    /// collector and loses any trailing slash.
    pub fn script_src(&self) -> TrackerResult<String> {
        let host = self
            .host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .trim_end_matches('/');
        Url::parse(host).map_err(|err| invalid_config(format!("invalid host `{host}`: {err}")))?;

        let path = if self.use_edge_runtime {
            EDGE_SCRIPT_PATH
        } else {
            SCRIPT_PATH
        };
        Ok(format!("{host}{path}"))
    }

    /// Builds the `<script>` description. Data attributes beyond the website id are only emitted
    /// when their option differs from the tracker's default.
    pub fn script_tag(&self) -> TrackerResult<ScriptTag> {
        self.validate()?;
        let mut attributes = vec![("data-website-id".to_string(), self.website_id.clone())];

        if !self.auto_track {
            attributes.push(("data-auto-track".into(), "false".into()));
        }
        if self.do_not_track {
            attributes.push(("data-do-not-track".into(), "true".into()));
        }
        if !self.domains.is_empty() {
            attributes.push(("data-domains".into(), self.domains.join(",")));
        }
        if let Some(tag) = self.tag.as_ref().filter(|tag| !tag.is_empty()) {
            attributes.push(("data-tag".into(), tag.clone()));
        }
        if self.exclude_search {
            attributes.push(("data-exclude-search".into(), "true".into()));
        }
        if self.exclude_hash {
            attributes.push(("data-exclude-hash".into(), "true".into()));
        }

        Ok(ScriptTag {
            id: SCRIPT_ELEMENT_ID.to_string(),
            src: self.script_src()?,
            defer: true,
            attributes,
        })
    }
}

/// Loads a configuration published by the host page, either through the
/// `__ENTROLYTICS_CONFIG__` environment variable or the global of the same name.
pub fn config_from_defaults() -> Option<EntrolyticsConfig> {
    let value = environment::defaults_value(DEFAULTS_KEY)?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}
