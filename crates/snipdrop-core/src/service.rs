use async_trait::async_trait;

use crate::error::SyncError;
use crate::model::{Category, ConnectionContext, Seed, Snippet, TrackedApplication};

/// Which snippet families a snapshot includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Include transferable content (text and byte payloads).
    pub transferables: bool,
    /// Include service-suggested snippets.
    pub suggested: bool,
    /// Include pseudo snippets.
    pub pseudo: bool,
}

impl SnapshotOptions {
    /// Options used to refresh the local cache.
    pub fn refresh() -> Self {
        Self {
            transferables: true,
            suggested: false,
            pseudo: false,
        }
    }
}

/// Remote snippet service abstraction.
///
/// Implementations must be usable from concurrently running tasks.
#[async_trait]
pub trait SnippetService: Send + Sync {
    /// Establish an identity with the service.
    async fn connect(&self, identity: TrackedApplication) -> Result<ConnectionContext, SyncError>;

    /// Fetch every snippet currently held by the service.
    async fn snapshot(&self, options: SnapshotOptions) -> Result<Vec<Snippet>, SyncError>;

    /// Create a new snippet from a seed.
    ///
    /// # Arguments
    /// * `context` - Established connection the snippet is attributed to
    /// * `seed` - Content and provenance of the new snippet
    async fn create_snippet(
        &self,
        context: &ConnectionContext,
        seed: &Seed,
    ) -> Result<Snippet, SyncError>;

    /// Change the specific classification of a snippet.
    ///
    /// # Returns
    /// The updated snippet as stored by the service.
    async fn reclassify(&self, snippet_id: &str, category: &Category) -> Result<Snippet, SyncError>;
}
