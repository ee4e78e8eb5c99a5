//! Displayable text and classification of a snippet.
//!
//! Text is taken from the original representation, then the preview, then
//! the OCR result of an image analysis.

use crate::model::{Classification, Format, Snippet};

/// No displayable text could be produced for a snippet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Neither representation carries text and no format holds OCR output.
    #[error("No OCR or text format found for snippet {snippet_id}")]
    OcrFormatNotFound { snippet_id: String },

    /// Every source, OCR included, resolved to blank text.
    #[error("Snippet {snippet_id} has no displayable text")]
    Blank { snippet_id: String },
}

/// Classification recorded on the original representation.
pub fn classification_of(snippet: &Snippet) -> Option<&Classification> {
    snippet.original.as_ref().map(|f| &f.classification)
}

/// Classification recorded on the preview representation.
pub fn preview_classification_of(snippet: &Snippet) -> Option<&Classification> {
    snippet.preview.as_ref().map(|f| &f.classification)
}

/// First non-blank of: original text, preview text, OCR-extracted text.
pub fn display_text(snippet: &Snippet) -> Result<String, ResolveError> {
    let direct = [snippet.original.as_ref(), snippet.preview.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(|format| format.raw_text.as_deref())
        .find(|text| !text.trim().is_empty());

    if let Some(text) = direct {
        return Ok(text.to_string());
    }

    let ocr = ocr_text(snippet)?;
    if ocr.trim().is_empty() {
        return Err(ResolveError::Blank {
            snippet_id: snippet.id.clone(),
        });
    }
    Ok(ocr)
}

/// Decode the OCR format's payload as a sequence of code points.
///
/// Invalid code points decode to U+FFFD.
fn ocr_text(snippet: &Snippet) -> Result<String, ResolveError> {
    let format = ocr_format(snippet).ok_or_else(|| ResolveError::OcrFormatNotFound {
        snippet_id: snippet.id.clone(),
    })?;

    Ok(format
        .raw_bytes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|cp| char::from_u32(*cp).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// The format linked by the original's image analysis, else the first
/// code or text format.
fn ocr_format(snippet: &Snippet) -> Option<&Format> {
    let linked = snippet
        .original
        .as_ref()
        .and_then(|original| original.ocr_format_id.as_deref())
        .and_then(|id| snippet.formats.iter().find(|format| format.id == id));

    linked.or_else(|| {
        snippet
            .formats
            .iter()
            .find(|format| format.classification.generic.is_textual())
    })
}
