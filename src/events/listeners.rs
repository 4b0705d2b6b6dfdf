//! Map-changed listener registry.
//!
//! Delivery takes a snapshot of the registered callbacks and releases the lock
//! before calling any of them, so a callback may add or remove listeners (its
//! own included) without deadlocking. Such changes apply from the next
//! notification on.

use crate::events::MapChange;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type MapChangedCallback = Arc<dyn Fn(MapChange) + Send + Sync>;

/// Shared, cloneable set of map-changed listeners
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Arc<Mutex<Vec<(ListenerId, MapChangedCallback)>>>,
    next_id: Arc<AtomicU64>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(MapChange) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(callback)));
        }
        id
    }

    /// Returns whether the listener was registered
    pub fn remove(&self, id: ListenerId) -> bool {
        match self.listeners.lock() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|(existing, _)| *existing != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.clear();
        }
    }

    fn snapshot(&self) -> Vec<MapChangedCallback> {
        match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Calls every listener registered at the time of the call; returns how many ran
    pub fn notify(&self, change: MapChange) -> usize {
        let callbacks = self.snapshot();
        for callback in &callbacks {
            callback(change);
        }
        callbacks.len()
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_add_remove() {
        let set = ListenerSet::new();
        let a = set.add(|_| {});
        let b = set.add(|_| {});
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_notify_reaches_every_listener() {
        let set = ListenerSet::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            set.add(move |change| {
                assert_eq!(change, MapChange::DidFinishLoadingStyle);
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(set.notify(MapChange::DidFinishLoadingStyle), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_listener_removes_itself_during_delivery() {
        let set = ListenerSet::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let registry = set.clone();
        let slot = Arc::clone(&own_id);
        let counter = Arc::clone(&hits);
        let id = set.add(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *slot.lock().unwrap() {
                registry.remove(id);
            }
            // registering from inside delivery must not deadlock either
            registry.add(|_| {});
        });
        *own_id.lock().unwrap() = Some(id);

        set.notify(MapChange::RegionDidChange);
        set.notify(MapChange::RegionDidChange);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // only the listener registered during the first delivery remains
        assert_eq!(set.len(), 1);
    }
}
