//! Core types, package access, Markdown table rendering, and OCR
//! integration for OOXML to Markdown conversion.

pub mod archive;
pub mod config;
pub mod error;
pub mod markup;
pub mod ocr;
pub mod table;
pub mod types;

pub use archive::Package;
pub use config::Config;
pub use error::{Error, Result};
pub use ocr::{DisabledOcr, OcrEngine, TesseractOcr};
pub use table::render_markdown_table;
pub use types::DocumentFormat;
