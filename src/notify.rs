use crate::range::TextRange;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

pub type ChangeHandler = Arc<dyn Fn(TextRange) + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fans out "the errors in this range may have changed" to subscribers.
///
/// Handlers run on the publishing thread, outside the subscriber lock, so a
/// handler may subscribe or unsubscribe without deadlocking. They should stay
/// cheap, e.g. schedule a repaint.
#[derive(Default)]
pub struct ChangeNotifier {
    handlers: RwLock<Vec<(SubscriptionId, ChangeHandler)>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(TextRange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn publish(&self, range: TextRange) {
        let handlers: Vec<ChangeHandler> = self.handlers.read().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(range))).is_err() {
                warn!(start = range.start(), len = range.len(), "change handler panicked");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            notifier.subscribe(move |range| seen.lock().push((tag, range.start())));
        }

        notifier.publish(TextRange::new(4, 2, 0));
        let mut seen = seen.lock().clone();
        seen.sort();
        assert_eq!(seen, vec![("a", 4), ("b", 4)]);
    }

    #[test]
    fn test_unsubscribe() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let id = notifier.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(TextRange::new(0, 1, 0));
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.publish(TextRange::new(0, 1, 0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_fan_out() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicU64::new(0));
        notifier.subscribe(|_| panic!("handler failure"));
        let counter = Arc::clone(&hits);
        notifier.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(TextRange::new(0, 1, 0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
