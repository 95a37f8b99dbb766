//! Format detection for convertible inputs.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The format of an input file, chosen by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Word-processing package (Office Open XML).
    Docx,
    /// Presentation package (Office Open XML).
    Pptx,
    /// Raster image, converted through OCR.
    Image,
    /// Comma-separated values, rendered as a Markdown table.
    Csv,
    /// JSON, pretty-printed into a fenced block.
    Json,
    /// Generic XML, wrapped in a fenced block.
    Xml,
    /// Plain text or Markdown, passed through unchanged.
    Text,
}

/// Extension table. Every supported extension appears exactly once.
const EXTENSIONS: &[(&str, DocumentFormat)] = &[
    ("docx", DocumentFormat::Docx),
    ("pptx", DocumentFormat::Pptx),
    ("png", DocumentFormat::Image),
    ("jpg", DocumentFormat::Image),
    ("jpeg", DocumentFormat::Image),
    ("csv", DocumentFormat::Csv),
    ("json", DocumentFormat::Json),
    ("xml", DocumentFormat::Xml),
    ("txt", DocumentFormat::Text),
    ("md", DocumentFormat::Text),
];

impl DocumentFormat {
    /// Detect format from file extension (without the leading dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, format)| *format)
    }

    /// Detect format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// All supported extensions, in table order.
    pub fn supported_extensions() -> Vec<&'static str> {
        EXTENSIONS.iter().map(|(ext, _)| *ext).collect()
    }
}
