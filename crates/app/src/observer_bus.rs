//! In-process observer bus with synchronous, ordered delivery.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use smarthome_domain::update::DeviceUpdate;

use crate::ports::DeviceObserver;

/// Registry of [`DeviceObserver`]s.
///
/// Delivery happens on the calling thread, in subscription order. A failing
/// or panicking observer is logged and skipped; the rest still receive the
/// update. Subscribing while a notification is in flight is safe: the
/// notification works on a snapshot of the subscriber list.
#[derive(Default)]
pub struct ObserverBus {
    observers: RwLock<Vec<Arc<dyn DeviceObserver>>>,
}

impl ObserverBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer. The same observer may be subscribed twice.
    pub fn subscribe(&self, observer: Arc<dyn DeviceObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
        tracing::debug!("added device observer");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `update` to every observer. Returns how many handled it
    /// successfully.
    pub fn notify(&self, update: &DeviceUpdate) -> usize {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut delivered = 0;
        for (index, observer) in observers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_update(update))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => tracing::warn!(
                    %err,
                    observer = index,
                    device_id = %update.device_id,
                    "observer failed to handle device update"
                ),
                Err(_) => tracing::warn!(
                    observer = index,
                    device_id = %update.device_id,
                    "observer panicked while handling device update"
                ),
            }
        }
        delivered
    }
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBus")
            .field("observers", &self.len())
            .finish()
    }
}
