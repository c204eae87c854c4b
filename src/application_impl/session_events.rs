use parking_lot::Mutex;
use std::sync::Arc;

type SessionLostHandler = Arc<dyn Fn() + Send + Sync>;

/// Single-slot observer for session loss. The last registered handler wins.
#[derive(Default)]
pub struct SessionEvents {
    handler: Mutex<Option<SessionLostHandler>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.handler.lock() = Some(Arc::new(handler));
    }

    pub fn clear_handler(&self) {
        self.handler.lock().take();
    }

    pub fn notify(&self) {
        // The handler may register a replacement, so it runs outside the lock.
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => {
                tracing::info!("session lost; notifying application");
                handler();
            }
            None => tracing::debug!("session lost; no handler registered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_without_handler_is_noop() {
        let events = SessionEvents::new();
        events.notify();
    }

    #[test]
    fn test_last_registration_wins() {
        let events = SessionEvents::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = first.clone();
        events.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = second.clone();
        events.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        events.notify();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        events.clear_handler();
        events.notify();
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_reregister() {
        let events = Arc::new(SessionEvents::new());
        let inner = events.clone();
        events.register(move || inner.register(|| {}));
        events.notify();
        events.notify();
    }
}
