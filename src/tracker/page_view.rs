use std::sync::{Arc, Mutex};

use url::Url;

use crate::tracker::bridge::EntrolyticsBridge;
use crate::util::{Observer, Store, Unsubscribe};

/// Anything that publishes the page URL as navigation happens, e.g. a router store.
pub trait NavigationSource {
    fn subscribe(&self, observer: Observer<Url>) -> Unsubscribe;
}

impl NavigationSource for Store<Url> {
    fn subscribe(&self, observer: Observer<Url>) -> Unsubscribe {
        Store::subscribe(self, observer)
    }
}

/// Sends a page view whenever the observed path changes.
///
/// Attach it when the owning view is mounted. The first emission only primes the watcher,
/// because the script records the landing page itself.
pub struct PageViewWatcher {
    unsubscribe: Option<Unsubscribe>,
}

impl PageViewWatcher {
    pub fn attach<S>(bridge: &EntrolyticsBridge, source: &S) -> Self
    where
        S: NavigationSource + ?Sized,
    {
        let last_path: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let bridge = bridge.clone();

        let observer = Observer::new(move |url: &Url| {
            let path = url.path().to_string();
            let first = {
                let mut last = last_path.lock().unwrap();
                if last.as_deref() == Some(path.as_str()) {
                    return;
                }
                let first = last.is_none();
                *last = Some(path.clone());
                first
            };
            if !first {
                bridge.track_page_view(Some(path), None);
            }
        });

        Self {
            unsubscribe: Some(source.subscribe(observer)),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.unsubscribe.is_some()
    }

    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for PageViewWatcher {
    fn drop(&mut self) {
        self.release();
    }
}
