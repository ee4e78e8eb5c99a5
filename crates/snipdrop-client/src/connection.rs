//! Process-wide identity with the snippet service.
//!
//! The context is established lazily on the first `connect` and replaced only
//! by a forced reconnect. Concurrent callers are serialized, so repeated
//! non-forced calls reach the service at most once.

use std::sync::Arc;

use snipdrop_core::{ConnectionContext, SnippetService, SyncError, TrackedApplication};
use tokio::sync::Mutex;
use tracing::{info, instrument};

pub struct ConnectionManager {
    service: Arc<dyn SnippetService>,
    context: Mutex<Option<ConnectionContext>>,
}

impl ConnectionManager {
    pub fn new(service: Arc<dyn SnippetService>) -> Self {
        Self {
            service,
            context: Mutex::new(None),
        }
    }

    /// Return the established context, connecting first if there is none or
    /// `force` is set.
    ///
    /// On failure nothing is stored (a previous context survives a failed
    /// forced reconnect) and the error is returned to the caller.
    #[instrument(skip(self), level = "debug")]
    pub async fn connect(&self, force: bool) -> Result<ConnectionContext, SyncError> {
        let mut guard = self.context.lock().await;

        if let (Some(context), false) = (guard.as_ref(), force) {
            return Ok(context.clone());
        }

        let context = self.service.connect(TrackedApplication::local()).await?;
        info!(
            "Connected to snippet service (application {:?}, platform {:?})",
            context.application.id, context.application.platform
        );

        *guard = Some(context.clone());
        Ok(context)
    }

    /// The current context, if one has been established.
    pub async fn context(&self) -> Option<ConnectionContext> {
        self.context.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeService;
    use std::sync::atomic::Ordering;

    fn manager() -> (ConnectionManager, Arc<FakeService>) {
        let service = Arc::new(FakeService::default());
        (ConnectionManager::new(service.clone()), service)
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let (manager, service) = manager();
        assert!(manager.context().await.is_none());

        let first = manager.connect(false).await.unwrap();
        let second = manager.connect(false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.connects.load(Ordering::SeqCst), 1);
        assert_eq!(manager.context().await, Some(first));
    }

    #[tokio::test]
    async fn test_force_replaces_context() {
        let (manager, service) = manager();

        let first = manager.connect(false).await.unwrap();
        let forced = manager.connect(true).await.unwrap();

        assert_ne!(first, forced);
        assert_eq!(service.connects.load(Ordering::SeqCst), 2);
        assert_eq!(manager.context().await, Some(forced));
    }

    #[tokio::test]
    async fn test_identity_descriptor() {
        let (manager, _service) = manager();
        let context = manager.connect(false).await.unwrap();
        assert_eq!(context.application.version, "unknown");
        assert_eq!(context.application.platform, snipdrop_core::Platform::current());
    }

    #[tokio::test]
    async fn test_failure_propagates_and_stores_nothing() {
        let (manager, service) = manager();
        service.fail_connect.store(true, Ordering::SeqCst);

        let result = manager.connect(false).await;
        assert!(matches!(result, Err(SyncError::Connection(_))));
        assert!(manager.context().await.is_none());

        // Next call retries
        service.fail_connect.store(false, Ordering::SeqCst);
        assert!(manager.connect(false).await.is_ok());
        assert_eq!(service.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_force_keeps_previous_context() {
        let (manager, service) = manager();
        let first = manager.connect(false).await.unwrap();

        service.fail_connect.store(true, Ordering::SeqCst);
        assert!(manager.connect(true).await.is_err());
        assert_eq!(manager.context().await, Some(first));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_connects_reach_service_once() {
        let (manager, service) = manager();
        let manager = Arc::new(manager);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = manager.clone();
                tokio::spawn(async move { m.connect(false).await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(service.connects.load(Ordering::SeqCst), 1);
    }
}
