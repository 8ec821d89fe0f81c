//! Formatting command vocabulary.
//!
//! Names follow the `execCommand` strings hosts already send
//! (`bold`, `insertUnorderedList`, `insertHTML`, ...).

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    InsertUnorderedList,
    InsertOrderedList,
    Outdent,
    Undo,
    Redo,
    InsertHtml(String),
}

impl Command {
    /// Parses a command name; `insertHTML` requires `value`.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Self> {
        let command = match name {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "insertUnorderedList" => Self::InsertUnorderedList,
            "insertOrderedList" => Self::InsertOrderedList,
            "outdent" => Self::Outdent,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "insertHTML" => Self::InsertHtml(value?.to_string()),
            _ => return None,
        };
        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::InsertUnorderedList => "insertUnorderedList",
            Self::InsertOrderedList => "insertOrderedList",
            Self::Outdent => "outdent",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::InsertHtml(_) => "insertHTML",
        }
    }

    /// Inline wrapper tags for formatting commands; first entry is created.
    pub(crate) fn inline_tags(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Bold => Some(&["b", "strong"]),
            Self::Italic => Some(&["i", "em"]),
            Self::Underline => Some(&["u"]),
            _ => None,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
