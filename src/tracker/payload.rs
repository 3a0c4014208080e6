//! Payload shaping at the boundary with the global tracker object.
//!
//! The bridge works with a single [`EventPayload`] and only decides at the last moment whether the
//! tracker receives it as `track(name, data)`, `track({ .. })` or a bare `track()`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tracker::config::CallShape;
use crate::tracker::constants::USER_ID_KEY;

pub type Properties = Map<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl EventPayload {
    pub fn event(name: impl Into<String>, data: Properties) -> Self {
        Self {
            name: Some(name.into()),
            data,
            ..Default::default()
        }
    }

    pub fn page_view(name: Option<String>, url: Option<String>, referrer: Option<String>) -> Self {
        Self {
            name,
            url,
            referrer,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.data.is_empty()
            && self.url.is_none()
            && self.referrer.is_none()
            && self.tag.is_none()
    }

    pub fn into_call(self, shape: CallShape) -> TrackCall {
        if self.is_empty() {
            return TrackCall::Pageview;
        }

        match (self.name.clone(), shape) {
            (Some(name), CallShape::Positional) => {
                let EventPayload {
                    mut data,
                    url,
                    referrer,
                    tag,
                    ..
                } = self;
                insert_string(&mut data, "url", url);
                insert_string(&mut data, "referrer", referrer);
                insert_string(&mut data, "tag", tag);
                TrackCall::Event { name, data }
            }
            _ => TrackCall::Properties(self.into_object()),
        }
    }

    fn into_object(self) -> Properties {
        let mut object = Properties::new();
        insert_string(&mut object, "name", self.name);
        if !self.data.is_empty() {
            object.insert("data".into(), Value::Object(self.data));
        }
        insert_string(&mut object, "url", self.url);
        insert_string(&mut object, "referrer", self.referrer);
        insert_string(&mut object, "tag", self.tag);
        object
    }
}

fn insert_string(target: &mut Properties, key: &str, value: Option<String>) {
    if let Some(value) = value {
        target.insert(key.to_string(), Value::String(value));
    }
}

/// A call on the tracker's `track` entry point.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackCall {
    /// `track()`; the tracker records a page view for the current location.
    Pageview,
    /// `track(object)`.
    Properties(Properties),
    /// `track(name, data)`.
    Event { name: String, data: Properties },
}

impl TrackCall {
    pub fn event_name(&self) -> Option<&str> {
        match self {
            TrackCall::Pageview => None,
            TrackCall::Properties(object) => object.get("name").and_then(Value::as_str),
            TrackCall::Event { name, .. } => Some(name),
        }
    }

    /// The event data, wherever the call shape put it.
    pub fn data(&self) -> Option<&Properties> {
        match self {
            TrackCall::Pageview => None,
            TrackCall::Properties(object) => match object.get("data") {
                Some(Value::Object(data)) => Some(data),
                _ => Some(object),
            },
            TrackCall::Event { data, .. } => Some(data),
        }
    }
}

/// A call on the tracker's `identify` entry point.
#[derive(Clone, Debug, PartialEq)]
pub enum IdentifyCall {
    /// `identify(traits)`.
    Traits(Properties),
    /// `identify(id, traits)`.
    User { id: String, traits: Properties },
}

impl IdentifyCall {
    pub fn user(id: impl Into<String>, mut traits: Properties, shape: CallShape) -> Self {
        let id = id.into();
        match shape {
            CallShape::Positional => IdentifyCall::User { id, traits },
            CallShape::Object => {
                traits.insert(USER_ID_KEY.to_string(), Value::String(id));
                IdentifyCall::Traits(traits)
            }
        }
    }
}
