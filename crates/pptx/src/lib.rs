//! PPTX (Office Open XML) converter producing Markdown.
//!
//! Slides are read in numeric order from `ppt/slides/slideN.xml`. Titles,
//! bulleted text bodies, and tables are rendered per slide, and text
//! recognized in embedded pictures is appended when an OCR engine is
//! available.

pub mod images;
pub mod parser;

pub use parser::PptxParser;
