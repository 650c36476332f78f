//! Notifications from background tasks to the UI.

/// Receives notifications that new data is ready and the UI should be redrawn.
///
/// Called from tokio worker threads.
pub trait Messenger: Send + Sync {
    /// Asks the UI to redraw as soon as possible.
    fn request_redraw(&self);
}

impl<F> Messenger for F
where
    F: Fn() + Send + Sync,
{
    fn request_redraw(&self) {
        self()
    }
}

/// Messenger that does nothing. Used when the UI polls for updates on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn closures_are_messengers() {
        let counter = Arc::new(AtomicUsize::new(0));
        let messenger: Arc<dyn Messenger> = {
            let counter = counter.clone();
            Arc::new(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
        };

        messenger.request_redraw();
        messenger.request_redraw();
        DummyMessenger.request_redraw();

        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
