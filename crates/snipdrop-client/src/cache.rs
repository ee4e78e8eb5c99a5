//! Authoritative in-memory snippet store.
//!
//! Mutations hold the map lock only for the structural update. Listeners are
//! notified after the lock is released, so a listener may read the cache
//! (typically to rebuild the view) without deadlocking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use snipdrop_core::Snippet;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// What a cache mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheChange {
    Put(String),
    PutAll(usize),
    Removed(String),
    Cleared,
    /// Contents swapped for a fresh snapshot of the given size.
    Replaced(usize),
}

pub type Listener = Arc<dyn Fn(&CacheChange) + Send + Sync>;

/// Handle returned by [`SnippetCache::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

#[derive(Default)]
pub struct SnippetCache {
    entries: Mutex<HashMap<String, Snippet>>,
    listeners: DashMap<SubscriptionToken, Listener>,
}

impl SnippetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Snippet>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener invoked after every notifying mutation.
    pub fn subscribe(&self, listener: Listener) -> SubscriptionToken {
        let token = SubscriptionToken(Uuid::new_v4());
        self.listeners.insert(token, listener);
        token
    }

    /// Subscribe through a channel, so a single consumer (the view layer)
    /// receives changes on its own task instead of the mutating one.
    pub fn subscribe_channel(&self) -> (SubscriptionToken, mpsc::UnboundedReceiver<CacheChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = self.subscribe(Arc::new(move |change: &CacheChange| {
            let _ = tx.send(change.clone());
        }));
        (token, rx)
    }

    /// Returns whether the token was registered.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.listeners.remove(&token).is_some()
    }

    fn notify(&self, change: CacheChange) {
        let listeners: Vec<Listener> = self
            .listeners
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        debug!("Cache changed ({:?}), notifying {} listeners", change, listeners.len());
        for listener in listeners {
            listener(&change);
        }
    }

    /// Insert or replace a snippet by id.
    pub fn put(&self, snippet: Snippet) {
        let id = snippet.id.clone();
        self.entries().insert(id.clone(), snippet);
        self.notify(CacheChange::Put(id));
    }

    /// Insert or replace many snippets, notifying once.
    pub fn put_all(&self, pairs: impl IntoIterator<Item = (String, Snippet)>) {
        let count = {
            let mut entries = self.entries();
            let mut count = 0;
            for (id, snippet) in pairs {
                entries.insert(id, snippet);
                count += 1;
            }
            count
        };
        self.notify(CacheChange::PutAll(count));
    }

    /// Delete a snippet if present. Listeners are notified either way.
    pub fn remove(&self, id: &str) -> Option<Snippet> {
        let removed = self.entries().remove(id);
        self.notify(CacheChange::Removed(id.to_string()));
        removed
    }

    /// Empty the cache, notifying only if `notify` is set.
    ///
    /// Pass `false` when a `put_all` follows immediately, to avoid rendering an
    /// empty state in between.
    pub fn clear(&self, notify: bool) {
        self.entries().clear();
        if notify {
            self.notify(CacheChange::Cleared);
        }
    }

    /// Swap the whole contents for `snippets` under a single lock, notifying once.
    ///
    /// Equivalent to `clear(false)` followed by `put_all`, without a window in
    /// which readers observe an empty cache.
    pub fn replace_all(&self, snippets: impl IntoIterator<Item = Snippet>) {
        let count = {
            let mut entries = self.entries();
            entries.clear();
            entries.extend(snippets.into_iter().map(|s| (s.id.clone(), s)));
            entries.len()
        };
        self.notify(CacheChange::Replaced(count));
    }

    pub fn get(&self, id: &str) -> Option<Snippet> {
        self.entries().get(id).cloned()
    }

    /// Snapshot of all entries, in no particular order.
    pub fn values(&self) -> Vec<Snippet> {
        self.entries().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::code;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(cache: &SnippetCache) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        cache.subscribe(Arc::new(move |_: &CacheChange| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        count
    }

    #[test]
    fn test_put_get_remove() {
        let cache = SnippetCache::new();
        assert!(cache.get("a").is_none());

        cache.put(code("a", "rs", 1));
        cache.put(code("b", "py", 2));
        assert_eq!(cache.len(), 2);

        // Upsert replaces
        let mut updated = code("a", "ts", 3);
        updated.name = Some("renamed".to_string());
        cache.put(updated.clone());
        assert_eq!(cache.get("a"), Some(updated));
        assert_eq!(cache.len(), 2);

        assert!(cache.remove("a").is_some());
        assert!(cache.get("a").is_none());
        assert!(cache.values().iter().all(|s| s.id != "a"));

        // Removing a missing id is not an error
        assert!(cache.remove("missing").is_none());

        // Put after remove brings it back
        cache.put(code("a", "rs", 4));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn test_every_mutation_notifies() {
        let cache = SnippetCache::new();
        let count = counting(&cache);

        cache.put(code("a", "rs", 1));
        cache.put_all(vec![
            ("b".to_string(), code("b", "rs", 2)),
            ("c".to_string(), code("c", "rs", 3)),
        ]);
        cache.remove("a");
        cache.clear(true);

        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_then_put_all_notifies_once() {
        let cache = SnippetCache::new();
        cache.put(code("old", "rs", 1));
        let count = counting(&cache);

        cache.clear(false);
        cache.put_all(vec![
            ("a".to_string(), code("a", "rs", 1)),
            ("b".to_string(), code("b", "py", 2)),
        ]);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(cache.get("old").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replace_all() {
        let cache = SnippetCache::new();
        cache.put(code("old", "rs", 1));
        let count = counting(&cache);

        cache.replace_all(vec![code("a", "rs", 1), code("b", "py", 2)]);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(cache.get("old").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_listener_can_read_cache() {
        let cache = Arc::new(SnippetCache::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let c = cache.clone();
        let s = seen.clone();
        cache.subscribe(Arc::new(move |_: &CacheChange| {
            // Would deadlock if notified while the map lock is held
            s.store(c.values().len(), Ordering::SeqCst);
        }));

        cache.put(code("a", "rs", 1));
        cache.put(code("b", "rs", 1));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let cache = SnippetCache::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let token = cache.subscribe(Arc::new(move |_: &CacheChange| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        cache.put(code("a", "rs", 1));
        assert!(cache.unsubscribe(token));
        assert!(!cache.unsubscribe(token));
        cache.put(code("b", "rs", 1));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribe_channel() {
        let cache = SnippetCache::new();
        let (_token, mut rx) = cache.subscribe_channel();

        cache.put(code("a", "rs", 1));
        cache.remove("a");

        assert_eq!(rx.recv().await, Some(CacheChange::Put("a".to_string())));
        assert_eq!(rx.recv().await, Some(CacheChange::Removed("a".to_string())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts() {
        let cache = Arc::new(SnippetCache::new());
        let count = counting(&cache);

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.put(code(&format!("s{}", i), "rs", i));
                })
            })
            .collect();
        futures::future::join_all(handles).await;

        assert_eq!(cache.len(), 50);
        assert_eq!(count.load(Ordering::SeqCst), 50);
    }
}
