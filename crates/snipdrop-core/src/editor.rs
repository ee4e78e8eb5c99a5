use crate::model::LineRange;

/// Identity of the file open in the active editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File name including its extension
    pub name: String,
    /// Presentable path or URL
    pub path: String,
    /// Extension without the leading dot, if any
    pub extension: Option<String>,
}

impl FileInfo {
    /// Build from a path, deriving name and extension from its last segment.
    pub fn from_path(path: &str) -> Self {
        let name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path)
            .to_string();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .filter(|ext| !ext.is_empty());
        Self {
            name,
            path: path.to_string(),
            extension,
        }
    }
}

/// Selected text and the lines it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSelection {
    pub text: String,
    pub lines: LineRange,
}

/// Read-only view of the host editor.
///
/// Every method answers for the currently active editor; `None` means there is
/// no active editor (or, for `selection`, nothing is selected).
pub trait EditorHost: Send + Sync {
    /// Full text of the active document.
    fn document_text(&self) -> Option<String>;

    /// Explicit selection in the active editor.
    fn selection(&self) -> Option<EditorSelection>;

    fn current_file(&self) -> Option<FileInfo>;

    /// Name of the project the active file belongs to.
    fn project_name(&self) -> Option<String> {
        None
    }

    /// Current selection, defaulting to the whole document when nothing is selected.
    fn current_selection(&self) -> Option<EditorSelection> {
        if let Some(selection) = self.selection() {
            return Some(selection);
        }
        let text = self.document_text()?;
        let lines = LineRange::whole_document(&text);
        Some(EditorSelection { text, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_info_from_path() {
        let info = FileInfo::from_path("/home/dev/project/src/main.rs");
        assert_eq!(info.name, "main.rs");
        assert_eq!(info.extension.as_deref(), Some("rs"));

        let info = FileInfo::from_path("C:\\work\\Makefile");
        assert_eq!(info.name, "Makefile");
        assert!(info.extension.is_none());

        let info = FileInfo::from_path("notes.");
        assert!(info.extension.is_none());
    }

    struct Doc(&'static str);

    impl EditorHost for Doc {
        fn document_text(&self) -> Option<String> {
            Some(self.0.to_string())
        }

        fn selection(&self) -> Option<EditorSelection> {
            None
        }

        fn current_file(&self) -> Option<FileInfo> {
            None
        }
    }

    #[test]
    fn test_current_selection_defaults_to_document() {
        let selection = Doc("foo\nbar\n").current_selection().unwrap();
        assert_eq!(selection.text, "foo\nbar\n");
        assert_eq!(selection.lines, LineRange::new(0, 1));
    }
}
