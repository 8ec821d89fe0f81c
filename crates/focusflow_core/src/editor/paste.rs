//! Clipboard items and image data-URL encoding.
//!
//! # Invariants
//! - Only items whose MIME type mentions `image` are treated as images.
//! - An item without readable bytes never yields markup.

use crate::editor::html::escape_attr;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One typed clipboard entry as the host read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime_type: String,
    /// `None` when the host could not read the payload.
    pub data: Option<Vec<u8>>,
}

impl ClipboardItem {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: Some(data),
        }
    }

    pub fn unreadable(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteError {
    /// The clipboard entry had no readable bytes.
    EmptyPayload { mime_type: String },
    NotAnImage { mime_type: String },
    /// The surface was borrowed elsewhere when the decode completed.
    SurfaceBusy,
}

impl Display for PasteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPayload { mime_type } => {
                write!(f, "clipboard item `{mime_type}` has no readable data")
            }
            Self::NotAnImage { mime_type } => {
                write!(f, "clipboard item `{mime_type}` is not an image")
            }
            Self::SurfaceBusy => write!(f, "editor surface is busy"),
        }
    }
}

impl Error for PasteError {}

/// Encodes an image item as a base64 `data:` URL.
pub fn image_data_url(item: &ClipboardItem) -> Result<String, PasteError> {
    if !item.is_image() {
        return Err(PasteError::NotAnImage {
            mime_type: item.mime_type.clone(),
        });
    }
    let bytes = item
        .data
        .as_deref()
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| PasteError::EmptyPayload {
            mime_type: item.mime_type.clone(),
        })?;
    Ok(format!("data:{};base64,{}", item.mime_type, STANDARD.encode(bytes)))
}

pub fn image_html(data_url: &str) -> String {
    format!("<img src=\"{}\">", escape_attr(data_url))
}
