//! OCR integration.
//!
//! Text recognition is delegated to an external engine behind the
//! [`OcrEngine`] trait. The default implementation shells out to the
//! `tesseract` binary; its availability is probed once and cached, so the
//! probe is cheap to repeat from concurrent conversions.

use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// An external text-recognition engine.
pub trait OcrEngine: Send + Sync {
    /// Whether the engine can be invoked at all.
    fn is_available(&self) -> bool;

    /// Recognize text in raw image bytes.
    ///
    /// `extension` (for example `png` or `.jpg`) tells the engine the image
    /// format. An unavailable engine returns empty text rather than an error;
    /// callers that need a hard failure check [`OcrEngine::is_available`]
    /// first.
    fn recognize(&self, data: &[u8], extension: &str) -> Result<String>;
}

/// Tesseract invoked as a subprocess: `tesseract <image> stdout`.
#[derive(Debug)]
pub struct TesseractOcr {
    binary: String,
    resolved: OnceLock<Option<PathBuf>>,
}

impl TesseractOcr {
    /// Engine using `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary("tesseract")
    }

    /// Engine using a specific binary name or path.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            resolved: OnceLock::new(),
        }
    }

    /// Process-wide engine with a shared availability probe.
    pub fn shared() -> &'static TesseractOcr {
        static SHARED: OnceLock<TesseractOcr> = OnceLock::new();
        SHARED.get_or_init(TesseractOcr::new)
    }

    /// Resolved executable path, probed on first use.
    pub fn binary_path(&self) -> Option<&Path> {
        self.resolved
            .get_or_init(|| match which::which(&self.binary) {
                Ok(path) => {
                    log::debug!("Found OCR engine at {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    log::debug!("OCR engine '{}' not available: {}", self.binary, e);
                    None
                }
            })
            .as_deref()
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractOcr {
    fn is_available(&self) -> bool {
        self.binary_path().is_some()
    }

    fn recognize(&self, data: &[u8], extension: &str) -> Result<String> {
        let Some(binary) = self.binary_path() else {
            return Ok(String::new());
        };

        let extension = extension.trim_start_matches('.');
        let suffix = if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension)
        };

        let mut file = tempfile::Builder::new()
            .prefix("officemd-ocr-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| Error::OcrError(format!("Failed to create temp file: {}", e)))?;
        file.write_all(data)
            .map_err(|e| Error::OcrError(format!("Failed to write temp file: {}", e)))?;
        // Close our handle so the engine can open the file on every platform;
        // the path still removes the file when dropped.
        let image_path = file.into_temp_path();

        let output = Command::new(binary)
            .arg(image_path.as_os_str())
            .arg("stdout")
            .output()
            .map_err(|e| Error::OcrError(format!("Failed to run {}: {}", binary.display(), e)))?;

        if !output.status.success() {
            return Err(Error::OcrError(format!(
                "{} exited with {}: {}",
                binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Engine that is never available, for callers that opt out of OCR.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOcr;

impl OcrEngine for DisabledOcr {
    fn is_available(&self) -> bool {
        false
    }

    fn recognize(&self, _data: &[u8], _extension: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// OCR an image file directly.
///
/// Unlike OCR of images embedded in a package, this fails with
/// [`Error::OcrUnavailable`] when the engine is missing, since recognized
/// text is the only possible output.
pub fn recognize_file(path: &Path, engine: &dyn OcrEngine) -> Result<String> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !engine.is_available() {
        return Err(Error::OcrUnavailable(format!(
            "tesseract is not installed or not on PATH; cannot OCR {}",
            file_name
        )));
    }

    let data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::IoError(e),
    })?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    engine.recognize(&data, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine that reports the format hint it was given.
    struct EchoOcr;

    impl OcrEngine for EchoOcr {
        fn is_available(&self) -> bool {
            true
        }

        fn recognize(&self, data: &[u8], extension: &str) -> Result<String> {
            Ok(format!("{} bytes as {}", data.len(), extension))
        }
    }

    fn missing_engine() -> TesseractOcr {
        TesseractOcr::with_binary("officemd-test-no-such-ocr-binary")
    }

    #[test]
    fn test_availability_check_does_not_panic() {
        let _ = TesseractOcr::shared().is_available();
    }

    #[test]
    fn test_missing_engine_returns_empty_text() {
        let engine = missing_engine();
        assert!(!engine.is_available());
        assert_eq!(engine.recognize(b"fakepng", "png").unwrap(), "");
    }

    #[test]
    fn test_recognize_file_requires_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, b"fakepng").unwrap();

        let err = recognize_file(&path, &missing_engine()).unwrap_err();
        assert!(matches!(err, Error::OcrUnavailable(_)));
        assert!(err.to_string().contains("tesseract"));

        let err = recognize_file(&path, &DisabledOcr).unwrap_err();
        assert!(matches!(err, Error::OcrUnavailable(_)));
    }

    #[test]
    fn test_recognize_file_passes_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpeg");
        std::fs::write(&path, b"12345").unwrap();

        assert_eq!(recognize_file(&path, &EchoOcr).unwrap(), "5 bytes as jpeg");
    }

    #[test]
    fn test_recognize_file_not_found() {
        let result = recognize_file(Path::new("/no/such/image.png"), &EchoOcr);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_tesseract_output_is_trimmed() {
        let engine = TesseractOcr::shared();
        if !engine.is_available() {
            return;
        }
        // Not an image; tesseract may fail, but must not panic, and any
        // returned text is already trimmed.
        if let Ok(text) = engine.recognize(b"notarealpng", ".png") {
            assert_eq!(text.trim(), text);
        }
    }
}
