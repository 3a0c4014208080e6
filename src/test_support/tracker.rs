use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::tracker::error::{internal_error, TrackerResult};
use crate::tracker::host::GlobalTracker;
use crate::tracker::payload::{IdentifyCall, TrackCall};

/// Stand-in for `window.entrolytics` that remembers every call it receives.
#[derive(Default)]
pub struct RecordingTracker {
    installed: AtomicBool,
    failing: AtomicBool,
    tracks: Mutex<Vec<TrackCall>>,
    identifies: Mutex<Vec<IdentifyCall>>,
}

impl RecordingTracker {
    pub fn installed() -> Arc<Self> {
        let tracker = Self::default();
        tracker.installed.store(true, Ordering::SeqCst);
        Arc::new(tracker)
    }

    /// A tracker whose script has not run yet.
    pub fn pending() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn install(&self) {
        self.installed.store(true, Ordering::SeqCst);
    }

    pub fn fail_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn tracks(&self) -> Vec<TrackCall> {
        self.tracks.lock().unwrap().clone()
    }

    pub fn identifies(&self) -> Vec<IdentifyCall> {
        self.identifies.lock().unwrap().clone()
    }

    fn check(&self) -> TrackerResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(internal_error("tracker rejected the call"));
        }
        Ok(())
    }
}

impl GlobalTracker for RecordingTracker {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn track(&self, call: TrackCall) -> TrackerResult<()> {
        self.check()?;
        self.tracks.lock().unwrap().push(call);
        Ok(())
    }

    fn identify(&self, call: IdentifyCall) -> TrackerResult<()> {
        self.check()?;
        self.identifies.lock().unwrap().push(call);
        Ok(())
    }
}
