//! Client-side snippet sync engine.
//!
//! Keeps a local cache consistent with the remote snippet service, runs remote
//! operations without blocking the caller, and validates drag-and-drop
//! transfers between the editor and the category view.

pub mod cache;
pub mod config;
pub mod connection;
pub mod context;
pub mod file_editor;
pub mod http;
pub mod runner;
pub mod seed;
pub mod transfer;
pub mod view;

#[cfg(test)]
mod testing;

pub use cache::{CacheChange, Listener, SnippetCache, SubscriptionToken};
pub use connection::ConnectionManager;
pub use context::SyncContext;
pub use file_editor::FileEditor;
pub use http::HttpSnippetService;
pub use runner::{TaskHandle, TaskRunner};
pub use seed::build_seed;
pub use transfer::{
    DragPayload, DropAction, ImportDecision, RejectReason, TransferBundle, TransferCoordinator,
    TransferError, TransferPhase,
};
pub use view::{build_groups, CategoryGroup, DropLocation, NodePath, SnippetGroups, TreeNode};
