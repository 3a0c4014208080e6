use std::future::Future;
use std::time::Duration;

/// Runs a future in the background without handing out a join handle.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Runs a future in the background without handing out a join handle.
///
/// Uses the ambient tokio runtime when there is one, otherwise a lazily built current-thread
/// runtime driven by its own thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    use std::sync::LazyLock;
    use tokio::runtime::{Builder, Handle};

    static BACKGROUND_RUNTIME: LazyLock<Handle> = LazyLock::new(|| {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build background tokio runtime");
        let handle = runtime.handle().clone();
        std::thread::Builder::new()
            .name("entrolytics-runtime".into())
            .spawn(move || runtime.block_on(std::future::pending::<()>()))
            .expect("failed to start background tokio runtime thread");
        handle
    });

    if let Ok(handle) = Handle::try_current() {
        handle.spawn(future);
    } else {
        let _ = BACKGROUND_RUNTIME.spawn(future);
    }
}

pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    sleep_impl(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep_impl(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_impl(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Re-checks `condition` every `interval` until it holds. There is no attempt limit.
pub async fn wait_until<F>(interval: Duration, mut condition: F)
where
    F: FnMut() -> bool,
{
    while !condition() {
        sleep(interval).await;
    }
}
