//! Resolution and OCR of pictures embedded in slides.
//!
//! A slide references a picture through the `r:embed` id of an `a:blip`.
//! The id is looked up in the slide's relationship part, and the target is
//! resolved against the slide's directory to find the media entry.

use officemd_core::markup::{attr_value, walk, ElementStack, MarkupHandler};
use officemd_core::{OcrEngine, Package, Result};
use quick_xml::events::BytesStart;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

/// Relationship part of a part: `dir/name` maps to `dir/_rels/name.rels`,
/// so `ppt/slides/slide{N}.xml` has `ppt/slides/_rels/slide{N}.xml.rels`.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Parse a relationship part into an `Id` to `Target` map.
///
/// Relationships missing either attribute are ignored.
pub fn parse_relationships<R: BufRead>(input: R, part: &str) -> Result<HashMap<String, String>> {
    let mut relationships = Relationships::default();
    walk(input, part, &mut relationships)?;
    Ok(relationships.targets)
}

#[derive(Debug, Default)]
struct Relationships {
    targets: HashMap<String, String>,
}

impl MarkupHandler for Relationships {
    fn start(&mut self, element: &BytesStart<'_>, name: &str, _stack: &ElementStack) {
        if name != "Relationship" {
            return;
        }
        if let (Some(id), Some(target)) = (attr_value(element, "Id"), attr_value(element, "Target")) {
            if !id.is_empty() && !target.is_empty() {
                self.targets.insert(id, target);
            }
        }
    }

    fn end(&mut self, _name: &str, _stack: &ElementStack) {}

    fn text(&mut self, _text: &str) {}
}

/// Resolve a relationship target to a package entry path.
///
/// Relative targets are taken from the directory owning the `_rels` folder;
/// a leading `/` starts from the package root.
pub fn resolve_target(rels_path: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !target.starts_with('/') {
        let owner_dir = parent(parent(rels_path));
        segments.extend(owner_dir.split('/').filter(|s| !s.is_empty()));
    }

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// OCR the pictures of one slide, in discovery order.
///
/// Never fails: an unreadable relationship part, unresolved ids, missing or
/// corrupt media, and engine errors all degrade to less (or no) text.
pub fn ocr_slide_images<R: Read + Seek>(
    package: &mut Package<R>,
    slide_part: &str,
    image_ids: &[String],
    engine: &dyn OcrEngine,
) -> String {
    if image_ids.is_empty() {
        return String::new();
    }

    match recognize_slide_images(package, slide_part, image_ids, engine) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("Skipping OCR of {}: {}", slide_part, e);
            String::new()
        }
    }
}

fn recognize_slide_images<R: Read + Seek>(
    package: &mut Package<R>,
    slide_part: &str,
    image_ids: &[String],
    engine: &dyn OcrEngine,
) -> Result<String> {
    let rels_part = rels_path(slide_part);
    let targets = if package.contains(&rels_part) {
        let entry = package.open_entry(&rels_part)?;
        parse_relationships(BufReader::new(entry), &rels_part)?
    } else {
        HashMap::new()
    };

    let mut recognized = Vec::new();
    for id in image_ids {
        let Some(target) = targets.get(id) else {
            log::debug!("{}: no relationship for image {}", slide_part, id);
            continue;
        };
        let image_path = resolve_target(&rels_part, target);

        let data = match package.read_entry(&image_path) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("{}: cannot read {}: {}", slide_part, image_path, e);
                continue;
            }
        };

        let extension = Path::new(&image_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match engine.recognize(&data, extension) {
            Ok(text) if !text.is_empty() => recognized.push(text),
            Ok(_) => {}
            Err(e) => log::debug!("{}: OCR of {} failed: {}", slide_part, image_path, e),
        }
    }

    Ok(recognized.join("\n\n"))
}
