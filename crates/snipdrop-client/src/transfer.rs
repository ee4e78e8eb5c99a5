//! Drag-and-drop transfer between the editor and the category view.
//!
//! A gesture moves through `Idle -> Armed -> Evaluating -> Committing -> Idle`.
//! Evaluation (`can_import`) has no effect beyond the phase; committing
//! schedules a remote create or reclassify and returns without waiting for it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use snipdrop_core::{classification_of, display_text, Category, EditorHost, Snippet, SnippetService};
use tracing::{debug, info};

use crate::cache::SnippetCache;
use crate::connection::ConnectionManager;
use crate::context::SyncContext;
use crate::runner::{TaskHandle, TaskRunner};
use crate::seed::build_seed;
use crate::view::{DropLocation, NodePath, TreeNode};

/// Text drops without inner whitespace shorter than this are treated as accidental.
const MIN_SINGLE_WORD_LEN: usize = 16;
/// Text drops must be shorter than this many characters.
const MAX_TEXT_LEN: usize = 1_000_000;

/// Why a drop was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("text is blank")]
    BlankText,
    #[error("single word shorter than 16 characters")]
    SingleWord,
    #[error("no active editor or file")]
    NoActiveEditor,
    #[error("text is not present in the active editor")]
    NotFromEditor,
    #[error("text is 1000000 characters or longer")]
    TooLong,
    #[error("drop target has no category")]
    NoTargetCategory,
    #[error("snippet is already in the target category")]
    SameCategory,
    #[error("drop onto the dragged node")]
    OntoSelection,
    #[error("drop onto the dragged node's own group")]
    OntoSourceGroup,
    #[error("drop onto a sibling of the dragged node")]
    OntoSibling,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Snippet not found: {0}")]
    SnippetNotFound(String),

    #[error("No active editor")]
    NoActiveEditor,

    #[error("Drop target has no category")]
    MissingCategory,

    #[error("Drop rejected: {0}")]
    Rejected(RejectReason),
}

/// What the drop does to the dragged source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Leave the source intact (text dragged out of the editor).
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDecision {
    Accept(DropAction),
    Reject(RejectReason),
}

impl ImportDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ImportDecision::Accept(_))
    }
}

/// Content offered by, or dropped onto, the category view.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    Snippet(Snippet),
    Text(String),
}

/// Alternative representations of a dragged snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferBundle {
    pub snippet: Snippet,
    /// Absent when the snippet has no displayable text.
    pub text: Option<String>,
}

impl TransferBundle {
    /// Offered representations, richest first.
    pub fn flavors(&self) -> Vec<DragPayload> {
        let mut flavors = vec![DragPayload::Snippet(self.snippet.clone())];
        if let Some(text) = &self.text {
            flavors.push(DragPayload::Text(text.clone()));
        }
        flavors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    Armed,
    Evaluating,
    Committing,
}

#[derive(Debug)]
struct Gesture {
    phase: TransferPhase,
    /// Node the current drag started from.
    source: Option<NodePath>,
}

pub struct TransferCoordinator {
    service: Arc<dyn SnippetService>,
    connection: Arc<ConnectionManager>,
    cache: Arc<SnippetCache>,
    runner: TaskRunner,
    editor: Arc<dyn EditorHost>,
    gesture: Mutex<Gesture>,
}

impl TransferCoordinator {
    pub fn new(sync: &SyncContext, editor: Arc<dyn EditorHost>) -> Self {
        Self {
            service: sync.service().clone(),
            connection: sync.connection().clone(),
            cache: sync.cache().clone(),
            runner: sync.runner().clone(),
            editor,
            gesture: Mutex::new(Gesture {
                phase: TransferPhase::Idle,
                source: None,
            }),
        }
    }

    fn gesture(&self) -> MutexGuard<'_, Gesture> {
        self.gesture.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> TransferPhase {
        self.gesture().phase
    }

    /// Bundle the snippet with the given id for a drag out of the view.
    pub fn export(&self, snippet_id: &str) -> Result<TransferBundle, TransferError> {
        let snippet = self
            .cache
            .get(snippet_id)
            .ok_or_else(|| TransferError::SnippetNotFound(snippet_id.to_string()))?;

        let text = match display_text(&snippet) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("Exporting {} without text: {}", snippet_id, e);
                None
            }
        };

        Ok(TransferBundle { snippet, text })
    }

    /// Start dragging `source`. Only snippet nodes can be dragged.
    pub fn begin_drag(&self, source: NodePath) -> Option<TransferBundle> {
        let TreeNode::Snippet(descriptor) = source.last()? else {
            return None;
        };
        let bundle = self.export(&descriptor.id).ok()?;

        let mut gesture = self.gesture();
        gesture.phase = TransferPhase::Armed;
        gesture.source = Some(source);
        Some(bundle)
    }

    /// Abandon the current gesture.
    pub fn cancel_drag(&self) {
        let mut gesture = self.gesture();
        gesture.phase = TransferPhase::Idle;
        gesture.source = None;
    }

    /// Decide whether `payload` may be dropped on `target`.
    pub fn can_import(&self, payload: &DragPayload, target: &DropLocation) -> ImportDecision {
        let source = {
            let mut gesture = self.gesture();
            if gesture.phase != TransferPhase::Committing {
                gesture.phase = TransferPhase::Evaluating;
            }
            gesture.source.clone()
        };

        let verdict = match payload {
            DragPayload::Text(text) => self.check_text(text).map(|()| DropAction::Copy),
            DragPayload::Snippet(snippet) => {
                check_snippet(snippet, source.as_ref(), target).map(|()| DropAction::Move)
            }
        };

        match verdict {
            Ok(action) => ImportDecision::Accept(action),
            Err(reason) => ImportDecision::Reject(reason),
        }
    }

    fn check_text(&self, text: &str) -> Result<(), RejectReason> {
        if text.trim().is_empty() {
            return Err(RejectReason::BlankText);
        }
        if !text.trim().contains(char::is_whitespace) && text.chars().count() < MIN_SINGLE_WORD_LEN {
            return Err(RejectReason::SingleWord);
        }

        let document = match (self.editor.document_text(), self.editor.current_file()) {
            (Some(document), Some(_)) => document,
            _ => return Err(RejectReason::NoActiveEditor),
        };
        if !document.contains(text) {
            return Err(RejectReason::NotFromEditor);
        }
        if text.chars().count() >= MAX_TEXT_LEN {
            return Err(RejectReason::TooLong);
        }
        Ok(())
    }

    /// Validate and commit a drop. The gesture returns to `Idle` whatever the outcome.
    pub fn import(
        &self,
        payload: DragPayload,
        target: &DropLocation,
    ) -> Result<TaskHandle<Snippet>, TransferError> {
        let decision = self.can_import(&payload, target);
        self.gesture().phase = TransferPhase::Committing;

        let result = match decision {
            ImportDecision::Reject(reason) => Err(TransferError::Rejected(reason)),
            ImportDecision::Accept(_) => match payload {
                DragPayload::Snippet(snippet) => target
                    .target_category()
                    .cloned()
                    .ok_or(TransferError::MissingCategory)
                    .map(|category| self.import_asset(&snippet.id, category)),
                DragPayload::Text(text) => {
                    self.import_text(&text, target.target_category().cloned())
                }
            },
        };

        self.cancel_drag();
        result
    }

    /// Reclassify a snippet and store the service's answer in the cache.
    pub fn import_asset(&self, snippet_id: &str, category: Category) -> TaskHandle<Snippet> {
        info!("Reclassifying snippet {} as {}", snippet_id, category);

        let service = self.service.clone();
        let cache = self.cache.clone();
        let snippet_id = snippet_id.to_string();

        self.runner.run("reclassify", async move {
            let snippet = service.reclassify(&snippet_id, &category).await?;
            cache.put(snippet.clone());
            Ok(snippet)
        })
    }

    /// Create a snippet from editor text and store it in the cache.
    ///
    /// Seed derivation happens immediately; connecting and creating run in
    /// the background.
    pub fn import_text(
        &self,
        text: &str,
        category: Option<Category>,
    ) -> Result<TaskHandle<Snippet>, TransferError> {
        let seed = build_seed(self.editor.as_ref(), text, category)?;
        info!("Creating snippet: {}", seed.description);

        let service = self.service.clone();
        let connection = self.connection.clone();
        let cache = self.cache.clone();

        Ok(self.runner.run("create_snippet", async move {
            let context = connection.connect(false).await?;
            let snippet = service.create_snippet(&context, &seed).await?;
            cache.put(snippet.clone());
            Ok(snippet)
        }))
    }
}

fn check_snippet(
    snippet: &Snippet,
    source: Option<&NodePath>,
    target: &DropLocation,
) -> Result<(), RejectReason> {
    if let (Some(source), Some(destination)) = (source, target.path()) {
        if source == destination {
            return Err(RejectReason::OntoSelection);
        }
        if source.parent().as_ref() == Some(destination) {
            return Err(RejectReason::OntoSourceGroup);
        }
        if source.parent() == destination.parent() {
            return Err(RejectReason::OntoSibling);
        }
    }

    let target_category = target
        .target_category()
        .ok_or(RejectReason::NoTargetCategory)?;

    let source_category = source
        .and_then(NodePath::effective_category)
        .cloned()
        .or_else(|| {
            classification_of(snippet).map(|c| Category::new(c.specific.as_str()).normalized())
        });
    if source_category.as_ref() == Some(target_category) {
        return Err(RejectReason::SameCategory);
    }
    Ok(())
}
