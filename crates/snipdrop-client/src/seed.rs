//! Derivation of creation requests from editor state.

use snipdrop_core::{Category, EditorHost, LineRange, Seed};

use crate::transfer::TransferError;

const UNKNOWN_PROJECT: &str = "Unknown";

/// Build a [`Seed`] for `text` taken from the active editor.
///
/// `extension` forces the classification tag; without it the tag is inferred
/// from the file extension, and may be absent.
pub fn build_seed(
    editor: &dyn EditorHost,
    text: &str,
    extension: Option<Category>,
) -> Result<Seed, TransferError> {
    let file = editor.current_file().ok_or(TransferError::NoActiveEditor)?;
    let project = editor
        .project_name()
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

    let line_range = editor
        .current_selection()
        .map(|selection| selection.lines)
        .unwrap_or_else(|| LineRange::whole_document(text));

    let description = format!(
        "Snippet from {}, from file {}, in {}",
        line_range.describe(),
        file.name,
        project
    );

    let extension = extension.or_else(|| {
        file.extension
            .as_deref()
            .and_then(Category::from_extension)
    });

    Ok(Seed {
        text: text.to_string(),
        name: Some(file.name),
        description,
        extension,
        file_path: Some(file.path),
        line_range,
    })
}
