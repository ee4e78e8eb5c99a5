//! In-memory snippet service and fixtures for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use snipdrop_core::{
    Category, Classification, ConnectionContext, Format, GenericClassification, Seed, Snippet,
    SnapshotOptions, SnippetService, SyncError, TrackedApplication,
};

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

pub(crate) fn snippet(id: &str, generic: GenericClassification, specific: &str, updated: i64) -> Snippet {
    Snippet {
        id: id.to_string(),
        name: Some(format!("{}.{}", id, specific)),
        original: Some(Format {
            id: format!("{}-original", id),
            classification: Classification::new(generic, specific),
            raw_text: Some(format!("content of {}", id)),
            raw_bytes: None,
            ocr_format_id: None,
        }),
        preview: None,
        formats: Vec::new(),
        updated: at(updated),
    }
}

pub(crate) fn code(id: &str, specific: &str, updated: i64) -> Snippet {
    snippet(id, GenericClassification::Code, specific, updated)
}

#[derive(Default)]
pub(crate) struct FakeService {
    pub snippets: Mutex<Vec<Snippet>>,
    pub seeds: Mutex<Vec<Seed>>,
    pub connects: AtomicUsize,
    pub fail_connect: AtomicBool,
    pub fail_remote: AtomicBool,
}

impl FakeService {
    pub fn with_snippets(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets: Mutex::new(snippets),
            ..Default::default()
        }
    }

    fn check_remote(&self) -> Result<(), SyncError> {
        if self.fail_remote.load(Ordering::SeqCst) {
            return Err(SyncError::Remote("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SnippetService for FakeService {
    async fn connect(&self, identity: TrackedApplication) -> Result<ConnectionContext, SyncError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(SyncError::Connection("connection refused".to_string()));
        }
        Ok(ConnectionContext {
            application: TrackedApplication {
                id: Some(format!("app-{}", self.connects.load(Ordering::SeqCst))),
                ..identity
            },
        })
    }

    async fn snapshot(&self, _options: SnapshotOptions) -> Result<Vec<Snippet>, SyncError> {
        self.check_remote()?;
        Ok(self.snippets.lock().unwrap().clone())
    }

    async fn create_snippet(
        &self,
        _context: &ConnectionContext,
        seed: &Seed,
    ) -> Result<Snippet, SyncError> {
        self.check_remote()?;
        let mut seeds = self.seeds.lock().unwrap();
        seeds.push(seed.clone());

        let classification = seed
            .classification()
            .unwrap_or_else(|| Classification::new(GenericClassification::Text, "txt"));
        let id = format!("created-{}", seeds.len());
        let snippet = Snippet {
            id: id.clone(),
            name: seed.name.clone(),
            original: Some(Format {
                id: format!("{}-original", id),
                classification,
                raw_text: Some(seed.text.clone()),
                raw_bytes: None,
                ocr_format_id: None,
            }),
            preview: None,
            formats: Vec::new(),
            updated: Utc::now(),
        };
        self.snippets.lock().unwrap().push(snippet.clone());
        Ok(snippet)
    }

    async fn reclassify(&self, snippet_id: &str, category: &Category) -> Result<Snippet, SyncError> {
        self.check_remote()?;
        let mut snippets = self.snippets.lock().unwrap();
        let snippet = snippets
            .iter_mut()
            .find(|s| s.id == snippet_id)
            .ok_or_else(|| SyncError::NotFound(snippet_id.to_string()))?;

        if let Some(original) = snippet.original.as_mut() {
            original.classification.specific = category.as_str().to_string();
        }
        snippet.updated = Utc::now();
        Ok(snippet.clone())
    }
}
