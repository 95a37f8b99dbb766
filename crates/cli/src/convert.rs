//! Format dispatch and the pass-through converters.

use officemd_core::ocr::recognize_file;
use officemd_core::{render_markdown_table, Config, DocumentFormat, Error, OcrEngine, Result};
use officemd_docx::DocxParser;
use officemd_pptx::PptxParser;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;

/// Convert one file to Markdown, choosing the pipeline by extension.
///
/// Unknown extensions are rejected before the file is touched, and the size
/// ceiling is checked from metadata before the file is opened.
pub fn convert_file(path: &Path, config: &Config, ocr: &dyn OcrEngine) -> Result<String> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

    let metadata = std::fs::metadata(path).map_err(|e| not_found_or_io(path, e))?;
    config.check_size(metadata.len())?;

    log::debug!("Converting {} as {:?}", path.display(), format);

    match format {
        DocumentFormat::Docx => DocxParser::new().convert_path(path),
        DocumentFormat::Pptx => PptxParser::new().convert_path(path, ocr),
        DocumentFormat::Image => recognize_file(path, ocr),
        DocumentFormat::Csv => read_text(path).map(|text| csv_table(&text)),
        DocumentFormat::Json => read_text(path).map(|text| json_block(&text)),
        DocumentFormat::Xml => read_text(path).map(|text| fenced("xml", &text)),
        DocumentFormat::Text => read_text(path),
    }
}

fn read_text(path: &Path) -> Result<String> {
    let data = std::fs::read(path).map_err(|e| not_found_or_io(path, e))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn not_found_or_io(path: &Path, e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::IoError(e),
    }
}

/// Wrap content in a fenced code block tagged with `language`.
fn fenced(language: &str, content: &str) -> String {
    format!("```{}\n{}\n```", language, content)
}

/// Render CSV as a Markdown table, first record as header.
///
/// Records with differing field counts or invalid UTF-8 cannot be tabulated
/// and are fenced as-is. Input without records renders as nothing.
fn csv_table(raw: &str) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(raw.as_bytes());
    let rows: csv::Result<Vec<Vec<String>>> = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect();

    match rows {
        Ok(rows) => render_markdown_table(&rows),
        Err(e) => {
            log::debug!("Keeping unparseable CSV verbatim: {}", e);
            fenced("csv", raw)
        }
    }
}

/// Pretty-print JSON into a fenced block; invalid JSON is fenced as-is.
fn json_block(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|value| serde_json::to_string_pretty(&value))
    {
        Ok(pretty) => fenced("json", &pretty),
        Err(e) => {
            log::debug!("Keeping invalid JSON verbatim: {}", e);
            fenced("json", raw)
        }
    }
}

/// What this build can convert and how it is configured.
#[derive(Debug, Serialize)]
pub struct Info {
    pub version: &'static str,
    pub formats: Vec<&'static str>,
    pub config: Config,
    pub ocr_available: bool,
}

impl Info {
    pub fn collect(config: &Config, ocr: &dyn OcrEngine) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            formats: DocumentFormat::supported_extensions(),
            config: *config,
            ocr_available: ocr.is_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use officemd_core::DisabledOcr;
    use std::io::{Cursor, Write};
    use std::path::PathBuf;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    fn zip_file(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, data) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    fn convert(path: &Path) -> Result<String> {
        convert_file(path, &Config::default(), &DisabledOcr)
    }

    #[test]
    fn test_text_and_markdown_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let txt = write(dir.path(), "notes.txt", b"plain\ntext\n");
        let md = write(dir.path(), "README.MD", b"# Title\n");
        assert_eq!(convert(&txt).unwrap(), "plain\ntext\n");
        assert_eq!(convert(&md).unwrap(), "# Title\n");
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "data.json", br#"{"b":1,"a":[true,null]}"#);
        assert_eq!(
            convert(&path).unwrap(),
            "```json\n{\n  \"a\": [\n    true,\n    null\n  ],\n  \"b\": 1\n}\n```"
        );
    }

    #[test]
    fn test_invalid_json_is_fenced_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.json", b"{not json");
        assert_eq!(convert(&path).unwrap(), "```json\n{not json\n```");
    }

    #[test]
    fn test_csv_is_rendered_as_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "people.csv", b"name,note\nAda,\"x, y|z\"\n");
        assert_eq!(
            convert(&path).unwrap(),
            "| name | note    |\n| ---- | ------- |\n| Ada  | x, y\\|z |\n"
        );
    }

    #[test]
    fn test_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", b"");
        assert_eq!(convert(&path).unwrap(), "");
    }

    #[test]
    fn test_ragged_csv_is_fenced_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "ragged.csv", b"a,b\n1\n");
        assert_eq!(convert(&path).unwrap(), "```csv\na,b\n1\n\n```");
    }

    #[test]
    fn test_xml_is_fenced() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "feed.xml", b"<a><b/></a>");
        assert_eq!(convert(&path).unwrap(), "```xml\n<a><b/></a>\n```");
    }

    #[test]
    fn test_docx_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let document = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:body></w:document>"#;
        let path = write(
            dir.path(),
            "letter.docx",
            &zip_file(&[("word/document.xml", document)]),
        );
        assert_eq!(convert(&path).unwrap(), "Hi\n\n");
    }

    #[test]
    fn test_pptx_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let slide = r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Slide text</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;
        let path = write(
            dir.path(),
            "deck.PPTX",
            &zip_file(&[("ppt/slides/slide1.xml", slide)]),
        );
        assert_eq!(convert(&path).unwrap(), "Slide text\n");
    }

    #[test]
    fn test_unsupported_format_before_read() {
        let result = convert(Path::new("/no/such/sheet.xlsx"));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));

        let result = convert(Path::new("/no/such/README"));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = convert(Path::new("/no/such/file.docx"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_size_gate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "big.txt", b"0123456789");
        let config = Config::default().with_max_file_size_bytes(9);
        assert!(matches!(
            convert_file(&path, &config, &DisabledOcr),
            Err(Error::FileTooLarge { size: 10, limit: 9 })
        ));

        let config = Config::default().with_max_file_size_bytes(10);
        assert!(convert_file(&path, &config, &DisabledOcr).is_ok());
    }

    #[test]
    fn test_image_without_ocr_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "scan.png", b"fakepng");
        assert!(matches!(convert(&path), Err(Error::OcrUnavailable(_))));
    }

    #[test]
    fn test_info() {
        let info = Info::collect(&Config::default(), &DisabledOcr);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["ocr_available"], false);
        assert_eq!(json["config"]["max_file_size_bytes"], 50 * 1024 * 1024);
        assert!(info.formats.contains(&"docx"));
        assert!(info.formats.contains(&"pptx"));
        assert!(info.formats.contains(&"csv"));
    }
}
