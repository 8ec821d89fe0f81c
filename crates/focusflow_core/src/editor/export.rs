//! Plain-text export of a note body.
//!
//! # Invariants
//! - File name is `<title>.txt`, or `Untitled Note.txt` for an empty title.
//! - Exported text carries no markup; non-breaking spaces become spaces.

use crate::model::note::UNTITLED_NOTE_TITLE;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const EXPORT_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextExport {
    pub file_name: String,
    pub mime_type: &'static str,
    pub text: String,
}

impl TextExport {
    /// Builds the export for a note title and its rendered body text.
    pub fn for_note(title: &str, rendered_text: &str) -> Self {
        let stem = if title.is_empty() {
            UNTITLED_NOTE_TITLE
        } else {
            title
        };
        Self {
            file_name: format!("{stem}.txt"),
            mime_type: EXPORT_MIME_TYPE,
            text: rendered_text.replace('\u{a0}', " "),
        }
    }

    /// Writes the file into `dir` and returns its path.
    ///
    /// Path separators in the title are replaced so the file always lands
    /// directly inside `dir`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = dir.as_ref().join(safe_file_name(&self.file_name));
        fs::write(&path, &self.text)?;
        info!(
            "event=note_export module=editor status=ok bytes={}",
            self.text.len()
        );
        Ok(path)
    }
}

fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::TextExport;

    #[test]
    fn empty_title_falls_back() {
        let export = TextExport::for_note("", "body");
        assert_eq!(export.file_name, "Untitled Note.txt");
        assert_eq!(export.mime_type, "text/plain");
    }

    #[test]
    fn write_replaces_separators_in_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let export = TextExport::for_note("a/b\\c", "x\u{a0}y");
        let path = export.write_to_dir(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "a_b_c.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x y");
    }
}
