use std::io;
use std::path::{Path, PathBuf};

use snipdrop_core::{EditorHost, EditorSelection, FileInfo, LineRange};

/// An [`EditorHost`] over a file on disk, with an optional line selection.
///
/// Used by the command-line client in place of an interactive editor.
#[derive(Debug, Clone)]
pub struct FileEditor {
    path: PathBuf,
    text: String,
    selection: Option<LineRange>,
    project: Option<String>,
}

impl FileEditor {
    /// Load `path`. The selection is clamped to the document's lines.
    pub fn open(
        path: impl AsRef<Path>,
        selection: Option<LineRange>,
        project: Option<String>,
    ) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path)?;
        let last = LineRange::whole_document(&text).end;
        let selection = selection.map(|range| {
            let end = range.end.min(last);
            LineRange::new(range.start.min(end), end)
        });

        Ok(Self {
            path,
            text,
            selection,
            project,
        })
    }

    /// The selected text, or the whole document without a selection.
    pub fn fragment(&self) -> String {
        match self.selection() {
            Some(selection) => selection.text,
            None => self.text.clone(),
        }
    }
}

impl EditorHost for FileEditor {
    fn document_text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn selection(&self) -> Option<EditorSelection> {
        let range = self.selection?;

        // Byte span of the selected lines, so CRLF documents stay verbatim
        let mut offset = 0;
        let mut start = None;
        for (index, line) in self.text.split_inclusive('\n').enumerate() {
            if index == range.start {
                start = Some(offset);
            }
            offset += line.len();
            if index == range.end {
                break;
            }
        }

        let selected = &self.text[start?..offset];
        let text = selected
            .strip_suffix('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .unwrap_or(selected);
        Some(EditorSelection {
            text: text.to_string(),
            lines: range,
        })
    }

    fn current_file(&self) -> Option<FileInfo> {
        Some(FileInfo::from_path(&self.path.to_string_lossy()))
    }

    fn project_name(&self) -> Option<String> {
        self.project.clone()
    }
}
