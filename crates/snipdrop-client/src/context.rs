//! Constructed-once services shared by every component.

use std::sync::Arc;

use snipdrop_core::{SnapshotOptions, SnippetService, SyncError};
use tracing::info;

use crate::cache::SnippetCache;
use crate::connection::ConnectionManager;
use crate::runner::{TaskHandle, TaskRunner};
use crate::view::{build_groups, SnippetGroups};

/// Connection, cache and runner bound to one snippet service.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SyncContext {
    service: Arc<dyn SnippetService>,
    connection: Arc<ConnectionManager>,
    cache: Arc<SnippetCache>,
    runner: TaskRunner,
}

impl SyncContext {
    pub fn new(service: Arc<dyn SnippetService>, runner: TaskRunner) -> Self {
        Self {
            connection: Arc::new(ConnectionManager::new(service.clone())),
            cache: Arc::new(SnippetCache::new()),
            service,
            runner,
        }
    }

    /// Context whose tasks run on the caller's tokio runtime.
    pub fn current(service: Arc<dyn SnippetService>) -> Result<Self, SyncError> {
        Ok(Self::new(service, TaskRunner::current()?))
    }

    pub fn service(&self) -> &Arc<dyn SnippetService> {
        &self.service
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    pub fn cache(&self) -> &Arc<SnippetCache> {
        &self.cache
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Fetch a fresh snapshot and swap it into the cache.
    ///
    /// The cache keeps its previous contents until the snapshot arrives, and
    /// is left untouched if the fetch fails. Resolves to the snapshot size.
    pub fn refresh(&self) -> TaskHandle<usize> {
        let service = self.service.clone();
        let connection = self.connection.clone();
        let cache = self.cache.clone();

        self.runner.run("refresh", async move {
            connection.connect(false).await?;
            let snippets = service.snapshot(SnapshotOptions::refresh()).await?;
            let count = snippets.len();
            cache.replace_all(snippets);
            info!("Refreshed {} snippets", count);
            Ok(count)
        })
    }

    /// Current category view of the cache.
    pub fn groups(&self) -> SnippetGroups {
        build_groups(&self.cache)
    }
}
