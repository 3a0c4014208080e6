use std::sync::Arc;

pub type NextFn<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Callback receiving every value a source emits.
pub struct Observer<T> {
    next: NextFn<T>,
}

impl<T> Observer<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            next: Arc::new(callback),
        }
    }

    pub fn next(&self, value: &T) {
        (self.next)(value);
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            next: Arc::clone(&self.next),
        }
    }
}

/// Detaches an observer from its source. Running it more than once is impossible by construction.
pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;
