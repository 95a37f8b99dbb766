//! DOCX to Markdown state machine.
//!
//! The main document part is streamed token by token. Paragraph, run and
//! table accumulators are mutated in place and each is flushed to Markdown
//! when its own closing tag is seen.

use officemd_core::markup::{attr_value, format_run, walk, ElementStack, MarkupHandler};
use officemd_core::{render_markdown_table, Package, Result};
use quick_xml::events::BytesStart;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

/// Path of the main document part inside a DOCX package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph style tokens rendered as Markdown headings.
///
/// Styles deeper than level 6 have no Markdown equivalent and fall through to
/// plain paragraphs.
const HEADING_PREFIXES: &[(&str, &str)] = &[
    ("Heading1", "#"),
    ("Heading2", "##"),
    ("Heading3", "###"),
    ("Heading4", "####"),
    ("Heading5", "#####"),
    ("Heading6", "######"),
];

/// Converter for DOCX (Office Open XML word-processing) packages.
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self
    }

    /// Convert a DOCX file on disk to Markdown.
    pub fn convert_path(&self, path: &Path) -> Result<String> {
        let mut package = Package::open(path)?;
        self.convert(&mut package)
    }

    /// Convert an opened package to Markdown.
    pub fn convert<R: Read + Seek>(&self, package: &mut Package<R>) -> Result<String> {
        let entry = package.open_entry(DOCUMENT_PART)?;
        let markdown = self.parse_document(BufReader::new(entry), DOCUMENT_PART)?;
        log::debug!(
            "Converted {} to {} bytes of Markdown",
            package.name(),
            markdown.len()
        );
        Ok(markdown)
    }

    /// Parse the main document part's XML into Markdown.
    pub fn parse_document<R: BufRead>(&self, input: R, part: &str) -> Result<String> {
        let mut state = DocumentState::default();
        walk(input, part, &mut state)?;
        Ok(state.out)
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct ParagraphState {
    open: bool,
    style: Option<String>,
    is_list: bool,
    level: usize,
    text: String,
}

#[derive(Debug, Default)]
struct RunState {
    open: bool,
    bold: bool,
    italic: bool,
    text: String,
}

#[derive(Debug, Default)]
struct TableState {
    open: bool,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell_open: bool,
    cell_text: String,
}

/// Accumulator for one pass over `word/document.xml`.
#[derive(Debug, Default)]
struct DocumentState {
    out: String,
    paragraph: ParagraphState,
    run: RunState,
    table: TableState,
}

impl MarkupHandler for DocumentState {
    fn start(&mut self, element: &BytesStart<'_>, name: &str, stack: &ElementStack) {
        match name {
            "tbl" => {
                self.table.open = true;
                self.table.rows.clear();
            }
            "tr" => self.table.row.clear(),
            "tc" => {
                self.table.cell_open = true;
                self.table.cell_text.clear();
            }
            "p" => {
                self.paragraph = ParagraphState {
                    open: true,
                    ..ParagraphState::default()
                };
            }
            "pStyle" if self.paragraph.open && stack.contains("pPr") => {
                self.paragraph.style = attr_value(element, "val");
            }
            "numPr" if self.paragraph.open => self.paragraph.is_list = true,
            "ilvl" if self.paragraph.open && stack.contains("numPr") => {
                self.paragraph.level = parse_level(attr_value(element, "val").as_deref());
            }
            "r" if self.paragraph.open => {
                self.run = RunState {
                    open: true,
                    ..RunState::default()
                };
            }
            "b" if self.run.open && stack.contains("rPr") => {
                self.run.bold = toggle_value(element);
            }
            "i" if self.run.open && stack.contains("rPr") => {
                self.run.italic = toggle_value(element);
            }
            "br" if self.run.open => self.run.text.push('\n'),
            _ => {}
        }
    }

    fn end(&mut self, name: &str, _stack: &ElementStack) {
        match name {
            "r" if self.run.open => {
                // Inside a cell the character data already went to the cell.
                if !self.table.cell_open {
                    let text = format_run(&self.run.text, self.run.bold, self.run.italic);
                    self.paragraph.text.push_str(&text);
                }
                self.run.open = false;
            }
            "p" if self.paragraph.open => {
                let text = self.paragraph.text.trim();
                if !text.is_empty() && !self.table.cell_open {
                    let rendered = render_paragraph(
                        text,
                        self.paragraph.style.as_deref(),
                        self.paragraph.is_list,
                        self.paragraph.level,
                    );
                    self.out.push_str(&rendered);
                }
                self.paragraph.open = false;
            }
            "tc" if self.table.open => {
                let cell = self.table.cell_text.trim().to_string();
                self.table.row.push(cell);
                self.table.cell_open = false;
                self.table.cell_text.clear();
            }
            "tr" if self.table.open => {
                let row = std::mem::take(&mut self.table.row);
                self.table.rows.push(row);
            }
            "tbl" if self.table.open => {
                self.out.push_str(&render_markdown_table(&self.table.rows));
                self.out.push('\n');
                self.table.open = false;
                self.table.rows.clear();
            }
            "body" => self.paragraph.open = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.table.cell_open {
            self.table.cell_text.push_str(text);
        } else if self.run.open {
            self.run.text.push_str(text);
        }
    }
}

/// Render one non-empty paragraph.
fn render_paragraph(text: &str, style: Option<&str>, is_list: bool, level: usize) -> String {
    if let Some(prefix) = style.and_then(heading_prefix) {
        return format!("{} {}\n\n", prefix, text);
    }
    if is_list {
        return format!("{}- {}\n", "  ".repeat(level), text);
    }
    format!("{}\n\n", text)
}

fn heading_prefix(style: &str) -> Option<&'static str> {
    HEADING_PREFIXES
        .iter()
        .find(|(name, _)| *name == style)
        .map(|(_, prefix)| *prefix)
}

/// Bold/italic toggles are on unless `val` explicitly switches them off.
fn toggle_value(element: &BytesStart<'_>) -> bool {
    !matches!(
        attr_value(element, "val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

/// List depth from an `ilvl` value; anything unparseable is depth zero.
fn parse_level(value: Option<&str>) -> usize {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
