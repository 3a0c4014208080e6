//! Per-element click bindings with attach / update / destroy hooks, the shape UI frameworks use
//! for declarative DOM actions.
//!
//! ```ignore
//! let target = ElementTarget::new(button);
//! let binding = TrackClick::attach(&target, &bridge, TrackClickParams::new("cta-click", data))?;
//! binding.update(TrackClickParams::new("cta-click", other_data));
//! binding.destroy();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::tracker::bridge::EntrolyticsBridge;
use crate::tracker::error::TrackerResult;
use crate::tracker::payload::Properties;

/// What the target knows about a click when it happens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClickContext {
    /// Resolved destination of the enclosing anchor, if any.
    pub href: Option<String>,
}

pub type ClickListener = Rc<dyn Fn(&ClickContext)>;

pub trait ClickTarget {
    fn add_click_listener(&self, listener: ClickListener) -> TrackerResult<ListenerRegistration>;
}

/// Keeps a listener attached; removing it happens at most once, on [`remove`](Self::remove) or
/// drop.
pub struct ListenerRegistration {
    remove: Option<Box<dyn FnOnce()>>,
}

impl ListenerRegistration {
    pub fn new<F>(remove: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    pub fn remove(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("attached", &self.remove.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackClickParams {
    pub event: String,
    pub data: Properties,
}

impl TrackClickParams {
    pub fn new(event: impl Into<String>, data: Properties) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Sends `track_event` with the bound parameters on every click.
pub struct TrackClick {
    params: Rc<RefCell<TrackClickParams>>,
    registration: ListenerRegistration,
}

impl TrackClick {
    pub fn attach<T>(
        target: &T,
        bridge: &EntrolyticsBridge,
        params: TrackClickParams,
    ) -> TrackerResult<Self>
    where
        T: ClickTarget + ?Sized,
    {
        let params = Rc::new(RefCell::new(params));
        let bound = Rc::clone(&params);
        let bridge = bridge.clone();
        let registration = target.add_click_listener(Rc::new(move |_: &ClickContext| {
            let TrackClickParams { event, data } = bound.borrow().clone();
            bridge.track_event(event, data);
        }))?;

        Ok(Self {
            params,
            registration,
        })
    }

    /// Swaps the parameters used by later clicks; the listener stays in place.
    pub fn update(&self, params: TrackClickParams) {
        *self.params.borrow_mut() = params;
    }

    pub fn params(&self) -> TrackClickParams {
        self.params.borrow().clone()
    }

    pub fn destroy(self) {
        self.registration.remove();
    }
}

/// Sends `track_outbound_link` for the clicked anchor's destination.
pub struct TrackOutbound {
    data: Rc<RefCell<Properties>>,
    registration: ListenerRegistration,
}

impl TrackOutbound {
    pub fn attach<T>(target: &T, bridge: &EntrolyticsBridge, data: Properties) -> TrackerResult<Self>
    where
        T: ClickTarget + ?Sized,
    {
        let data = Rc::new(RefCell::new(data));
        let bound = Rc::clone(&data);
        let bridge = bridge.clone();
        let registration = target.add_click_listener(Rc::new(move |context: &ClickContext| {
            // Destination is read at click time; the anchor may have changed since attach.
            if let Some(href) = &context.href {
                let data = bound.borrow().clone();
                bridge.track_outbound_link(href.clone(), data);
            }
        }))?;

        Ok(Self { data, registration })
    }

    pub fn update(&self, data: Properties) {
        *self.data.borrow_mut() = data;
    }

    pub fn destroy(self) {
        self.registration.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{props, FakeElement, FakeScriptHost, RecordingTracker};
    use crate::tracker::payload::TrackCall;
    use serde_json::json;

    fn bridge() -> (EntrolyticsBridge, std::sync::Arc<RecordingTracker>) {
        let tracker = RecordingTracker::installed();
        let bridge = EntrolyticsBridge::with_platform(FakeScriptHost::new(), tracker.clone());
        (bridge, tracker)
    }

    #[test]
    fn click_forwards_bound_event() {
        let (bridge, tracker) = bridge();
        let element = FakeElement::new();
        let _binding = TrackClick::attach(
            &element,
            &bridge,
            TrackClickParams::new("cta-click", props(json!({"position": "hero"}))),
        )
        .unwrap();

        element.click();

        assert_eq!(
            tracker.tracks(),
            vec![TrackCall::Event {
                name: "cta-click".into(),
                data: props(json!({"position": "hero"})),
            }]
        );
    }

    #[test]
    fn update_replaces_params_without_rebinding() {
        let (bridge, tracker) = bridge();
        let element = FakeElement::new();
        let binding = TrackClick::attach(
            &element,
            &bridge,
            TrackClickParams::new("first", Properties::new()),
        )
        .unwrap();

        binding.update(TrackClickParams::new("second", Properties::new()));
        element.click();

        assert_eq!(element.listener_count(), 1);
        assert_eq!(element.registrations(), 1);
        assert_eq!(binding.params().event, "second");
        assert_eq!(tracker.tracks()[0].event_name(), Some("second"));
    }

    #[test]
    fn destroy_removes_listener() {
        let (bridge, tracker) = bridge();
        let element = FakeElement::new();
        let binding = TrackClick::attach(
            &element,
            &bridge,
            TrackClickParams::new("cta-click", Properties::new()),
        )
        .unwrap();

        binding.destroy();
        element.click();

        assert_eq!(element.listener_count(), 0);
        assert!(tracker.tracks().is_empty());
    }

    #[test]
    fn dropping_binding_removes_listener() {
        let (bridge, _tracker) = bridge();
        let element = FakeElement::new();
        {
            let _binding = TrackClick::attach(
                &element,
                &bridge,
                TrackClickParams::new("cta-click", Properties::new()),
            )
            .unwrap();
            assert_eq!(element.listener_count(), 1);
        }
        assert_eq!(element.listener_count(), 0);
    }

    #[test]
    fn outbound_binding_reads_destination_at_click_time() {
        let (bridge, tracker) = bridge();
        let element = FakeElement::new();
        let binding =
            TrackOutbound::attach(&element, &bridge, props(json!({"section": "docs"}))).unwrap();

        element.click();
        element.set_href(Some("https://partner.example.com/"));
        element.click();
        binding.update(Properties::new());
        element.set_href(Some("https://other.example.com/"));
        element.click();
        binding.destroy();
        element.click();

        assert_eq!(
            tracker.tracks(),
            vec![
                TrackCall::Event {
                    name: "outbound-link-click".into(),
                    data: props(json!({
                        "section": "docs",
                        "url": "https://partner.example.com/"
                    })),
                },
                TrackCall::Event {
                    name: "outbound-link-click".into(),
                    data: props(json!({"url": "https://other.example.com/"})),
                },
            ]
        );
    }
}
