use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Specific classification tags the service understands.
///
/// Extension inference only yields a tag from this table; anything else
/// infers nothing.
pub const KNOWN_SPECIFICS: &[&str] = &[
    "bat", "c", "clj", "coffee", "cpp", "cs", "css", "dart", "el", "elm", "erl", "ex", "go", "groovy",
    "h", "hs", "html", "java", "js", "json", "jsx", "kt", "lua", "m", "md", "ml", "php", "pl", "ps1",
    "py", "r", "rb", "rs", "scala", "sh", "sql", "swift", "tex", "text", "toml", "ts", "tsx", "txt",
    "vb", "xml", "yaml", "yml",
];

/// Coarse content type of a snippet or one of its formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenericClassification {
    Code,
    Text,
    Image,
    #[serde(other)]
    Other,
}

impl GenericClassification {
    /// Whether snippets of this kind are shown in the category view.
    pub fn is_listable(self) -> bool {
        matches!(self, Self::Code | Self::Text | Self::Image)
    }

    /// Whether a format of this kind carries decodable text.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Code | Self::Text)
    }
}

/// A `(generic, specific)` classification pair as recorded by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub generic: GenericClassification,
    /// Fine-grained tag, usually a file extension or language id.
    pub specific: String,
}

impl Classification {
    pub fn new(generic: GenericClassification, specific: impl Into<String>) -> Self {
        Self {
            generic,
            specific: specific.into(),
        }
    }
}

/// Grouping key of the category view, wrapping a specific classification tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Folds `"text"` into `"txt"` so plain text lands in a single bucket.
    ///
    /// The merge is one-directional; every other tag is returned unchanged.
    pub fn normalized(&self) -> Category {
        if self.0 == "text" {
            Category::new("txt")
        } else {
            self.clone()
        }
    }

    /// Whether this tag classifies content as plain text rather than code.
    pub fn is_plain_text(&self) -> bool {
        matches!(self.0.as_str(), "text" | "txt")
    }

    /// Safe lookup of a file extension against [`KNOWN_SPECIFICS`].
    pub fn from_extension(ext: &str) -> Option<Category> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        KNOWN_SPECIFICS
            .iter()
            .find(|known| **known == ext)
            .map(|known| Category::new(*known))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One independently identified content blob of a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub id: String,
    pub classification: Classification,
    /// Raw text of a string fragment, if this format carries one.
    #[serde(default)]
    pub raw_text: Option<String>,
    /// Raw file payload, one code point per element.
    #[serde(default)]
    pub raw_bytes: Option<Vec<u32>>,
    /// Id of the format holding the OCR result of an image analysis.
    #[serde(default)]
    pub ocr_format_id: Option<String>,
}

/// A captured piece of content with classification metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// The original representation as captured.
    #[serde(default)]
    pub original: Option<Format>,
    /// The fallback preview representation.
    #[serde(default)]
    pub preview: Option<Format>,
    #[serde(default)]
    pub formats: Vec<Format>,
    pub updated: DateTime<Utc>,
}

/// Lightweight `{id, name}` view of a snippet, used by the category view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnippetDescriptor {
    pub id: String,
    pub name: Option<String>,
}

impl SnippetDescriptor {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl From<&Snippet> for SnippetDescriptor {
    fn from(snippet: &Snippet) -> Self {
        Self {
            id: snippet.id.clone(),
            name: snippet.name.clone(),
        }
    }
}

/// Inclusive, zero-based line range of a fragment within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering every line of `text` once trailing whitespace is trimmed.
    ///
    /// An empty document still spans one line.
    pub fn whole_document(text: &str) -> Self {
        let lines = text.trim_end().lines().count().max(1);
        Self::new(0, lines - 1)
    }

    /// Human-readable, one-based form: `line N` or `lines N-M`.
    pub fn describe(&self) -> String {
        let (start, end) = (self.start + 1, self.end + 1);
        if start == end {
            format!("line {}", start)
        } else {
            format!("lines {}-{}", start, end)
        }
    }
}

/// A transient request to create a new snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub text: String,
    pub name: Option<String>,
    pub description: String,
    pub extension: Option<Category>,
    pub file_path: Option<String>,
    pub line_range: LineRange,
}

impl Seed {
    /// Classification the new snippet is created with.
    ///
    /// Plain-text tags classify as `Text`, any other tag as `Code`, and no tag
    /// omits the classification entirely.
    pub fn classification(&self) -> Option<Classification> {
        self.extension.as_ref().map(|ext| {
            let generic = if ext.is_plain_text() {
                GenericClassification::Text
            } else {
                GenericClassification::Code
            };
            Classification::new(generic, ext.as_str())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationName {
    Unknown,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
    #[serde(other)]
    Unknown,
}

impl Platform {
    /// Platform of the running host.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Unknown
        }
    }
}

/// Identity descriptor sent to, and echoed back by, the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedApplication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: ApplicationName,
    pub version: String,
    pub platform: Platform,
}

impl TrackedApplication {
    /// The descriptor this client identifies itself with.
    pub fn local() -> Self {
        Self {
            id: None,
            name: ApplicationName::Unknown,
            version: "unknown".to_string(),
            platform: Platform::current(),
        }
    }
}

/// Established identity with the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionContext {
    pub application: TrackedApplication,
}
