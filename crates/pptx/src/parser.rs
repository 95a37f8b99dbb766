//! PPTX file parser implementation.

use crate::images::ocr_slide_images;
use officemd_core::markup::{attr_value, format_run, walk, ElementStack, MarkupHandler};
use officemd_core::{render_markdown_table, Error, OcrEngine, Package, Result};
use quick_xml::events::BytesStart;
use regex::Regex;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use std::sync::LazyLock;

/// Slide parts, capturing the slide number.
static SLIDE_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());

/// Horizontal rule placed between non-empty slides.
pub const SLIDE_SEPARATOR: &str = "\n\n---\n\n";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Convert a PPTX file on disk to Markdown.
    pub fn convert_path(&self, path: &Path, ocr: &dyn OcrEngine) -> Result<String> {
        let mut package = Package::open(path)?;
        self.convert(&mut package, ocr)
    }

    /// Convert an opened package to Markdown.
    ///
    /// Pictures are OCR'd only when `ocr` reports itself available.
    pub fn convert<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        ocr: &dyn OcrEngine,
    ) -> Result<String> {
        let slides = slide_parts(package);
        if slides.is_empty() {
            return Err(Error::NoSlidesFound(package.name().to_string()));
        }

        let ocr_enabled = ocr.is_available();
        let mut rendered = Vec::new();

        for (_, part) in &slides {
            let slide = {
                let entry = package.open_entry(part)?;
                parse_slide(BufReader::new(entry), part)?
            };
            let mut text = slide.render();

            if ocr_enabled {
                let recognized = ocr_slide_images(package, part, &slide.images, ocr);
                if !recognized.is_empty() {
                    if text.is_empty() {
                        text = recognized;
                    } else {
                        text.push_str("\n\n");
                        text.push_str(&recognized);
                    }
                }
            }

            // Only the emptiness check trims; list indentation must survive.
            if !text.trim().is_empty() {
                rendered.push(text);
            }
        }

        log::debug!(
            "Converted {}: {} of {} slides with content",
            package.name(),
            rendered.len(),
            slides.len()
        );

        if rendered.is_empty() {
            return Ok(String::new());
        }
        let mut markdown = rendered.join(SLIDE_SEPARATOR);
        markdown.push('\n');
        Ok(markdown)
    }

    /// Render a single slide part's XML to Markdown, without OCR.
    pub fn render_slide<R: BufRead>(&self, input: R, part: &str) -> Result<String> {
        Ok(parse_slide(input, part)?.render())
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide parts in numeric order, with their slide numbers.
fn slide_parts<R: Read + Seek>(package: &Package<R>) -> Vec<(usize, String)> {
    let mut slides: Vec<(usize, String)> = package
        .find_entries(|name| SLIDE_PART_REGEX.is_match(name))
        .into_iter()
        .filter_map(|name| Some((extract_slide_number(&name)?, name)))
        .collect();
    slides.sort_by_key(|(number, _)| *number);
    slides
}

/// Extract the slide number from a part name like "ppt/slides/slide3.xml".
///
/// A number too large to represent orders as slide 0 rather than being
/// dropped.
fn extract_slide_number(part: &str) -> Option<usize> {
    let captures = SLIDE_PART_REGEX.captures(part)?;
    match captures[1].parse() {
        Ok(number) => Some(number),
        Err(e) => {
            log::debug!("Slide number in {} out of range ({}); ordering it first", part, e);
            Some(0)
        }
    }
}

fn parse_slide<R: BufRead>(input: R, part: &str) -> Result<SlideState> {
    let mut state = SlideState::default();
    walk(input, part, &mut state)?;
    Ok(state)
}

#[derive(Debug, Default)]
struct ParagraphState {
    open: bool,
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

/// Accumulator for one slide part.
#[derive(Debug, Default)]
struct SlideState {
    in_shape: bool,
    is_title: bool,
    in_text_body: bool,
    paragraph: ParagraphState,
    run: RunState,
    table: TableState,
    titles: Vec<String>,
    body: Vec<String>,
    /// Distinct picture relationship ids, first seen first.
    images: Vec<String>,
}

impl SlideState {
    /// Titles as level-2 headings, then body blocks.
    fn render(&self) -> String {
        let mut out = String::new();
        for title in &self.titles {
            out.push_str("## ");
            out.push_str(title);
            out.push_str("\n\n");
        }
        for block in &self.body {
            out.push_str(block);
            out.push_str("\n\n");
        }
        out.trim_end_matches('\n').to_string()
    }

    fn end_paragraph(&mut self) {
        if !self.table.cell_open {
            let text = self.paragraph.text.trim();
            if !text.is_empty() {
                let line = render_line(text, self.paragraph.level);
                if self.is_title {
                    self.titles.push(line);
                } else if self.in_text_body {
                    self.body.push(line);
                }
            }
        }
        self.paragraph.open = false;
        self.paragraph.text.clear();
    }
}

impl MarkupHandler for SlideState {
    fn start(&mut self, element: &BytesStart<'_>, name: &str, stack: &ElementStack) {
        match name {
            "sp" => {
                self.in_shape = true;
                self.is_title = false;
            }
            "ph" if self.in_shape && stack.contains("nvPr") => {
                if let Some("title" | "ctrTitle") = attr_value(element, "type").as_deref() {
                    self.is_title = true;
                }
            }
            "txBody" if self.in_shape => self.in_text_body = true,
            "tbl" => {
                self.table.open = true;
                self.table.rows.clear();
            }
            "tr" => self.table.row.clear(),
            "tc" if self.table.open => {
                self.table.cell_open = true;
                self.table.cell_text.clear();
            }
            "p" if self.in_text_body || self.table.cell_open => {
                self.paragraph = ParagraphState {
                    open: true,
                    ..ParagraphState::default()
                };
            }
            "pPr" if self.paragraph.open => {
                if let Some(level) = attr_value(element, "lvl").and_then(|v| v.parse::<usize>().ok()) {
                    if level > 0 {
                        self.paragraph.level = level;
                    }
                }
            }
            "r" if self.paragraph.open => {
                self.run = RunState {
                    open: true,
                    ..RunState::default()
                };
            }
            "rPr" if self.run.open => {
                if is_on(attr_value(element, "b").as_deref()) {
                    self.run.bold = true;
                }
                if is_on(attr_value(element, "i").as_deref()) {
                    self.run.italic = true;
                }
            }
            "br" if self.paragraph.open => self.paragraph.text.push('\n'),
            "blip" => {
                if let Some(id) = attr_value(element, "embed") {
                    if !id.is_empty() && !self.images.contains(&id) {
                        self.images.push(id);
                    }
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str, _stack: &ElementStack) {
        match name {
            "r" if self.run.open => {
                let text = format_run(&self.run.text, self.run.bold, self.run.italic);
                if self.table.cell_open {
                    self.table.cell_text.push_str(&text);
                } else {
                    self.paragraph.text.push_str(&text);
                }
                self.run.open = false;
            }
            "p" if self.paragraph.open => self.end_paragraph(),
            "tc" if self.table.open => {
                let cell = self.table.cell_text.trim().to_string();
                self.table.row.push(cell);
                self.table.cell_open = false;
            }
            "tr" if self.table.open => {
                let row = std::mem::take(&mut self.table.row);
                self.table.rows.push(row);
            }
            "tbl" if self.table.open => {
                let table = render_markdown_table(&self.table.rows);
                let table = table.trim_end_matches('\n');
                if !table.is_empty() {
                    self.body.push(table.to_string());
                }
                self.table.open = false;
                self.table.rows.clear();
            }
            "txBody" => {
                self.in_text_body = false;
                self.paragraph.open = false;
            }
            "sp" => {
                self.in_shape = false;
                self.is_title = false;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        // Runs win over cells so emphasis survives inside tables.
        if self.run.open {
            self.run.text.push_str(text);
        } else if self.table.cell_open {
            self.table.cell_text.push_str(text);
        }
    }
}

/// Paragraph text with bullet indentation for outline levels above zero.
fn render_line(text: &str, level: usize) -> String {
    if level > 0 {
        format!("{}- {}", "  ".repeat(level - 1), text)
    } else {
        text.to_string()
    }
}

fn is_on(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}
