//! Listeners notified after each reconciliation pass.

use super::reconciler::SyncReport;
use crate::error::ChoreSyncError;

/// Handle returned by [`ObserverRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Listener = Box<dyn Fn(&SyncReport)>;

/// Bounded set of listeners, invoked in registration order.
pub struct ObserverRegistry {
    capacity: usize,
    next_id: u64,
    listeners: Vec<(ObserverId, Listener)>,
}

impl ObserverRegistry {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreSyncError::TooManyObservers`] when the registry is full.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&SyncReport) + 'static,
    ) -> Result<ObserverId, ChoreSyncError> {
        if self.listeners.len() >= self.capacity {
            return Err(ChoreSyncError::TooManyObservers(self.capacity));
        }
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn publish(&self, report: &SyncReport) {
        for (_, listener) in &self.listeners {
            listener(report);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("capacity", &self.capacity)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_publish_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new(4);

        for name in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            registry
                .subscribe(move |report| calls.borrow_mut().push((name, report.synced)))
                .unwrap();
        }

        let report = SyncReport {
            synced: 3,
            ..SyncReport::default()
        };
        registry.publish(&report);

        assert_eq!(
            *calls.borrow(),
            vec![("first", 3), ("second", 3), ("third", 3)]
        );
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut registry = ObserverRegistry::new(1);
        registry.subscribe(|_| {}).unwrap();

        let err = registry.subscribe(|_| {}).unwrap_err();
        assert!(matches!(err, ChoreSyncError::TooManyObservers(1)));
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut registry = ObserverRegistry::new(2);

        let counter = Rc::clone(&hits);
        let id = registry.subscribe(move |_| *counter.borrow_mut() += 1).unwrap();
        registry.subscribe(|_| {}).unwrap();

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert_eq!(registry.len(), 1);

        registry.publish(&SyncReport::default());
        assert_eq!(*hits.borrow(), 0);

        // Freed slot can be reused.
        registry.subscribe(|_| {}).unwrap();
        assert_eq!(registry.len(), 2);
    }
}
