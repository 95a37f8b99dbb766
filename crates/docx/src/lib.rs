//! DOCX (Office Open XML) converter producing Markdown.
//!
//! Reads `word/document.xml` from the package and renders headings, lists,
//! inline emphasis, and tables.

pub mod parser;

pub use parser::DocxParser;
