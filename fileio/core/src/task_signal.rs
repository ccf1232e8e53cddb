//! Cooperative cancellation for batch operations.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::FileIoResult;

pub trait TaskSignalListener: Send + Sync {
    /// Invoked with the path being processed when cancellation is observed.
    fn on_cancel(&self, path: &str);
}

/// A cancellation flag shared between a caller and a running batch.
///
/// Cancelling never interrupts a primitive that is already executing; batch
/// loops poll [`TaskSignal::check_cancel`] before scheduling each entry.
#[derive(Default)]
pub struct TaskSignal {
    canceled: AtomicBool,
    listener: Mutex<Option<Arc<dyn TaskSignalListener>>>,
}

impl TaskSignal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancel(&self) -> FileIoResult<()> {
        self.canceled.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    pub fn set_listener(&self, listener: Arc<dyn TaskSignalListener>) {
        *self.listener.lock() = Some(listener);
    }

    /// Returns `true` when cancelled, notifying the listener with `path`.
    pub fn check_cancel(&self, path: &str) -> bool {
        if !self.is_canceled() {
            return false;
        }
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener.on_cancel(path);
        }
        true
    }
}

impl fmt::Debug for TaskSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSignal")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl TaskSignalListener for Recorder {
        fn on_cancel(&self, path: &str) {
            self.0.lock().push(path.to_string());
        }
    }

    #[test]
    fn listener_sees_cancelled_path() {
        let signal = TaskSignal::new();
        let recorder = Arc::new(Recorder::default());
        signal.set_listener(recorder.clone());

        assert!(!signal.check_cancel("/a"));
        signal.cancel().unwrap();
        assert!(signal.is_canceled());
        assert!(signal.check_cancel("/b"));
        assert_eq!(*recorder.0.lock(), vec!["/b".to_string()]);
    }
}
