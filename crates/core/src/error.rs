//! Error types for document to Markdown conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The input file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The file extension is not one we know how to convert.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input exceeds the configured size ceiling.
    #[error("File too large: {size} bytes (limit {limit} bytes / {} MB)", megabytes(.limit))]
    FileTooLarge { size: u64, limit: u64 },

    /// The file is not a valid ZIP package.
    #[error("Not a valid OOXML package '{name}': {message}")]
    NotAnArchive { name: String, message: String },

    /// A required part is absent from the package.
    #[error("Required part '{part}' not found in {package}")]
    MissingPart { package: String, part: String },

    /// The presentation has no `ppt/slides/slideN.xml` parts.
    #[error("No slides found in {0}")]
    NoSlidesFound(String),

    /// A part's XML could not be tokenized.
    #[error("Malformed XML in '{part}'{}: {message}", at_element(.element))]
    MalformedXml {
        part: String,
        element: Option<String>,
        message: String,
    },

    /// OCR was requested but no engine is installed.
    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    /// The OCR engine ran but failed.
    #[error("OCR error: {0}")]
    OcrError(String),
}

fn megabytes(bytes: &u64) -> u64 {
    *bytes >> 20
}

fn at_element(element: &Option<String>) -> String {
    element
        .as_ref()
        .map(|e| format!(" at <{}>", e))
        .unwrap_or_default()
}

impl Error {
    /// Build a [`Error::MalformedXml`] for `part`, naming the innermost open element if any.
    pub fn malformed(part: &str, element: Option<&str>, message: impl std::fmt::Display) -> Self {
        Error::MalformedXml {
            part: part.to_string(),
            element: element.map(str::to_string),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_part_and_element() {
        let err = Error::malformed("word/document.xml", Some("p"), "unexpected end");
        let msg = err.to_string();
        assert!(msg.contains("word/document.xml"));
        assert!(msg.contains("<p>"));
        assert!(msg.contains("unexpected end"));
    }

    #[test]
    fn test_file_too_large_reports_megabytes() {
        let err = Error::FileTooLarge {
            size: 3 << 20,
            limit: 2 << 20,
        };
        assert!(err.to_string().contains("2 MB"));
    }
}
