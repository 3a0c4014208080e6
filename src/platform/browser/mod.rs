//! `web-sys` implementations of the tracker seams.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::tracker::actions::{ClickContext, ClickListener, ClickTarget, ListenerRegistration};
use crate::tracker::constants::GLOBAL_TRACKER_NAME;
use crate::tracker::error::{dom_error, internal_error, TrackerResult};
use crate::tracker::host::{GlobalTracker, OnLoad, PageLocation, ScriptHost, ScriptTag};
use crate::tracker::payload::{IdentifyCall, Properties, TrackCall};
use crate::tracker::LOGGER;

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

/// Talks to `window.document`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebScriptHost;

impl ScriptHost for WebScriptHost {
    fn is_available(&self) -> bool {
        document().is_some()
    }

    fn script_exists(&self, id: &str) -> bool {
        document()
            .and_then(|document| document.get_element_by_id(id))
            .is_some()
    }

    fn inject_script(&self, script: ScriptTag, on_load: OnLoad) -> TrackerResult<()> {
        let document = document().ok_or_else(|| dom_error("Document not available"))?;
        let element = document
            .create_element("script")
            .map_err(|err| dom_error(format!("Failed to create script: {err:?}")))?
            .dyn_into::<web_sys::HtmlScriptElement>()
            .map_err(|_| dom_error("Script element has wrong type"))?;

        element.set_id(&script.id);
        element.set_src(&script.src);
        element.set_defer(script.defer);
        for (name, value) in &script.attributes {
            element
                .set_attribute(name, value)
                .map_err(|err| dom_error(format!("Failed to set `{name}`: {err:?}")))?;
        }

        let onload = Closure::once_into_js(move || on_load());
        element.set_onload(Some(onload.unchecked_ref()));

        if let Some(head) = document.head() {
            head.append_child(&element)
                .map_err(|err| dom_error(format!("Failed to append script to <head>: {err:?}")))?;
        } else if let Some(body) = document.body() {
            body.append_child(&element)
                .map_err(|err| dom_error(format!("Failed to append script to <body>: {err:?}")))?;
        } else {
            return Err(dom_error("No <head> or <body> element found"));
        }
        Ok(())
    }

    fn location(&self) -> Option<PageLocation> {
        let window = web_sys::window()?;
        let location = window.location();
        let url = format!(
            "{}{}",
            location.pathname().ok()?,
            location.search().unwrap_or_default()
        );
        let referrer = window
            .document()
            .map(|document| document.referrer())
            .filter(|referrer| !referrer.is_empty());
        Some(PageLocation { url, referrer })
    }
}

/// Resolves `window.entrolytics` on every call, so it picks the object up as soon as the
/// script installs it.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebGlobalTracker;

impl WebGlobalTracker {
    fn object() -> Option<js_sys::Object> {
        let global = js_sys::global();
        let value = js_sys::Reflect::get(&global, &JsValue::from_str(GLOBAL_TRACKER_NAME)).ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        Some(value.unchecked_into())
    }

    fn entry_point(tracker: &js_sys::Object, name: &str) -> TrackerResult<js_sys::Function> {
        js_sys::Reflect::get(tracker, &JsValue::from_str(name))
            .map_err(|err| internal_error(format!("Failed to access {name}(): {err:?}")))?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| internal_error(format!("{name}() is not a function")))
    }
}

fn to_js(properties: &Properties) -> TrackerResult<JsValue> {
    let serialized = serde_json::to_string(properties)
        .map_err(|err| internal_error(format!("Failed to serialize payload: {err}")))?;
    js_sys::JSON::parse(&serialized)
        .map_err(|err| internal_error(format!("Failed to convert payload: {err:?}")))
}

impl GlobalTracker for WebGlobalTracker {
    fn is_installed(&self) -> bool {
        Self::object().is_some()
    }

    fn track(&self, call: TrackCall) -> TrackerResult<()> {
        let tracker = Self::object().ok_or_else(|| internal_error("Tracker is not installed"))?;
        let track = Self::entry_point(&tracker, "track")?;
        let result = match call {
            TrackCall::Pageview => track.call0(&tracker),
            TrackCall::Properties(object) => track.call1(&tracker, &to_js(&object)?),
            TrackCall::Event { name, data } => {
                track.call2(&tracker, &JsValue::from_str(&name), &to_js(&data)?)
            }
        };
        result
            .map(|_| ())
            .map_err(|err| internal_error(format!("track() threw: {err:?}")))
    }

    fn identify(&self, call: IdentifyCall) -> TrackerResult<()> {
        let tracker = Self::object().ok_or_else(|| internal_error("Tracker is not installed"))?;
        let identify = Self::entry_point(&tracker, "identify")?;
        let result = match call {
            IdentifyCall::Traits(traits) => identify.call1(&tracker, &to_js(&traits)?),
            IdentifyCall::User { id, traits } => {
                identify.call2(&tracker, &JsValue::from_str(&id), &to_js(&traits)?)
            }
        };
        result
            .map(|_| ())
            .map_err(|err| internal_error(format!("identify() threw: {err:?}")))
    }
}

/// A DOM element that click bindings can listen on.
#[derive(Clone, Debug)]
pub struct ElementTarget {
    element: web_sys::Element,
}

impl ElementTarget {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    fn resolved_href(element: &web_sys::Element) -> Option<String> {
        element
            .closest("a")
            .ok()
            .flatten()
            .and_then(|anchor| anchor.dyn_into::<web_sys::HtmlAnchorElement>().ok())
            .map(|anchor| anchor.href())
            .filter(|href| !href.is_empty())
    }
}

impl From<web_sys::Element> for ElementTarget {
    fn from(element: web_sys::Element) -> Self {
        Self::new(element)
    }
}

impl ClickTarget for ElementTarget {
    fn add_click_listener(&self, listener: ClickListener) -> TrackerResult<ListenerRegistration> {
        let element = self.element.clone();
        let clicked = self.element.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let context = ClickContext {
                href: ElementTarget::resolved_href(&clicked),
            };
            listener(&context);
        }) as Box<dyn FnMut(web_sys::Event)>);

        element
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(|err| dom_error(format!("Failed to add click listener: {err:?}")))?;

        Ok(ListenerRegistration::new(move || {
            if let Err(err) = element
                .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            {
                LOGGER.debug(format!("Failed to remove click listener: {err:?}"));
            }
            drop(closure);
        }))
    }
}
