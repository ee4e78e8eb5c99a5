//! Core traits and types for the snipdrop snippet sync client.
//!
//! This crate defines the abstractions shared by every consumer of the snippet service:
//! - `Snippet`, `Format`, `Classification`, `Category`: the cached data model
//! - `SnippetService`: connect, snapshot, create and reclassify operations on the remote service
//! - `EditorHost`: the host editor's selection and file identity
//! - `display_text`: displayable text resolution with OCR fallback

mod editor;
mod error;
mod model;
mod resolve;
mod service;

pub use editor::{EditorHost, EditorSelection, FileInfo};
pub use error::SyncError;
pub use model::{
    ApplicationName, Category, Classification, ConnectionContext, Format, GenericClassification,
    LineRange, Platform, Seed, Snippet, SnippetDescriptor, TrackedApplication, KNOWN_SPECIFICS,
};
pub use resolve::{classification_of, display_text, preview_classification_of, ResolveError};
pub use service::{SnapshotOptions, SnippetService};
