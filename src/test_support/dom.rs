use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::tracker::actions::{ClickContext, ClickListener, ClickTarget, ListenerRegistration};
use crate::tracker::error::TrackerResult;
use crate::tracker::host::{OnLoad, PageLocation, ScriptHost, ScriptTag};

/// In-memory document: records injected scripts and holds their onload callbacks until the
/// test fires them.
#[derive(Default)]
pub struct FakeScriptHost {
    unavailable: AtomicBool,
    existing: Mutex<HashSet<String>>,
    injected: Mutex<Vec<ScriptTag>>,
    pending_onload: Mutex<Vec<OnLoad>>,
    location: Mutex<Option<PageLocation>>,
}

impl FakeScriptHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A host with no browser environment behind it.
    pub fn unavailable() -> Arc<Self> {
        let host = Self::default();
        host.unavailable.store(true, Ordering::SeqCst);
        Arc::new(host)
    }

    pub fn add_existing_script(&self, id: &str) {
        self.existing.lock().unwrap().insert(id.to_string());
    }

    pub fn injected(&self) -> Vec<ScriptTag> {
        self.injected.lock().unwrap().clone()
    }

    pub fn set_location(&self, location: Option<PageLocation>) {
        *self.location.lock().unwrap() = location;
    }

    /// Runs the onload callbacks of every script injected so far.
    pub fn fire_onload(&self) {
        let callbacks: Vec<OnLoad> = self.pending_onload.lock().unwrap().drain(..).collect();
        for callback in callbacks {
            callback();
        }
    }
}

impl ScriptHost for FakeScriptHost {
    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn script_exists(&self, id: &str) -> bool {
        self.existing.lock().unwrap().contains(id)
            || self.injected.lock().unwrap().iter().any(|tag| tag.id == id)
    }

    fn inject_script(&self, script: ScriptTag, on_load: OnLoad) -> TrackerResult<()> {
        self.injected.lock().unwrap().push(script);
        self.pending_onload.lock().unwrap().push(on_load);
        Ok(())
    }

    fn location(&self) -> Option<PageLocation> {
        self.location.lock().unwrap().clone()
    }
}

/// Element that dispatches synthetic clicks to its listeners.
#[derive(Default)]
pub struct FakeElement {
    listeners: Rc<RefCell<Vec<(u64, ClickListener)>>>,
    href: RefCell<Option<String>>,
    next_id: Cell<u64>,
    registrations: Cell<usize>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_href(&self, href: Option<&str>) {
        *self.href.borrow_mut() = href.map(str::to_string);
    }

    pub fn click(&self) {
        let context = ClickContext {
            href: self.href.borrow().clone(),
        };
        let listeners: Vec<ClickListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&context);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Total number of `add_click_listener` calls ever made.
    pub fn registrations(&self) -> usize {
        self.registrations.get()
    }
}

impl ClickTarget for FakeElement {
    fn add_click_listener(&self, listener: ClickListener) -> TrackerResult<ListenerRegistration> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.registrations.set(self.registrations.get() + 1);
        self.listeners.borrow_mut().push((id, listener));

        let listeners = Rc::clone(&self.listeners);
        Ok(ListenerRegistration::new(move || {
            listeners.borrow_mut().retain(|(existing, _)| *existing != id);
        }))
    }
}
