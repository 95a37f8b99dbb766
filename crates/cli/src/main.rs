//! CLI tool for converting Office documents to Markdown.

mod convert;

use anyhow::{Context, Result};
use clap::Parser;
use convert::{convert_file, Info};
use officemd_core::{Config, DisabledOcr, OcrEngine, TesseractOcr};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Convert DOCX, PPTX, images, and text formats to Markdown.
#[derive(Parser, Debug)]
#[command(name = "officemd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) (.docx, .pptx, .png, .jpg, .json, .xml, .txt, .md)
    #[arg(required_unless_present = "info")]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Maximum input size in bytes (overrides OFFICEMD_MAX_FILE_BYTES)
    #[arg(long, value_name = "BYTES")]
    max_file_bytes: Option<u64>,

    /// Skip OCR of images, including pictures embedded in slides
    #[arg(long)]
    no_ocr: bool,

    /// Print supported formats and configuration as JSON, then exit
    #[arg(long)]
    info: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = build_config(&args);
    let ocr: &dyn OcrEngine = if args.no_ocr {
        &DisabledOcr
    } else {
        TesseractOcr::shared()
    };

    if args.info {
        let info = Info::collect(&config, ocr);
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let mut failed = 0;
    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        if let Err(e) = process_file(input_path, &args, &config, ocr) {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} input(s) failed", failed, args.input.len());
    }

    Ok(())
}

fn build_config(args: &Args) -> Config {
    let config = Config::from_env();
    match args.max_file_bytes {
        Some(bytes) => config.with_max_file_size_bytes(bytes),
        None => config,
    }
}

/// Convert a single file and deliver its Markdown.
fn process_file(input_path: &Path, args: &Args, config: &Config, ocr: &dyn OcrEngine) -> Result<()> {
    let markdown = convert_file(input_path, config, ocr)
        .with_context(|| format!("Failed to convert {}", input_path.display()))?;

    if args.verbose {
        eprintln!("  Produced {} bytes of Markdown", markdown.len());
    }

    if args.print {
        print!("{}", markdown);
    } else {
        let output_path = get_output_path(input_path, args.output.as_ref())?;
        write_output(&output_path, &markdown)?;
        if args.verbose {
            eprintln!("Written to: {}", output_path.display());
        }
    }

    Ok(())
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.md", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        },
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["officemd", "-p", "--no-ocr", "a.docx", "b.pptx"]).unwrap();
        assert!(args.print);
        assert!(args.no_ocr);
        assert_eq!(args.input.len(), 2);

        let args = Args::try_parse_from(["officemd", "--info"]).unwrap();
        assert!(args.info);
        assert!(args.input.is_empty());

        assert!(Args::try_parse_from(["officemd"]).is_err());
    }

    #[test]
    fn test_max_file_bytes_overrides_config() {
        let args = Args::try_parse_from(["officemd", "--max-file-bytes", "1024", "a.txt"]).unwrap();
        assert_eq!(build_config(&args).max_file_size_bytes, 1024);
    }

    #[test]
    fn test_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");

        let path = get_output_path(Path::new("/docs/report.docx"), Some(&out_dir)).unwrap();
        assert_eq!(path, out_dir.join("report.md"));
        assert!(out_dir.is_dir());

        let path = get_output_path(Path::new("/docs/deck.pptx"), None).unwrap();
        assert_eq!(path, PathBuf::from("/docs/deck.md"));
    }

    #[test]
    fn test_process_file_writes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "hello\n").unwrap();

        let args = Args::try_parse_from(["officemd", "--no-ocr", input.to_str().unwrap()]).unwrap();
        process_file(&input, &args, &Config::default(), &DisabledOcr).unwrap();

        let written = std::fs::read_to_string(dir.path().join("notes.md")).unwrap();
        assert_eq!(written, "hello\n");
    }

    #[test]
    fn test_process_file_reports_context() {
        let args = Args::try_parse_from(["officemd", "missing.docx"]).unwrap();
        let err = process_file(Path::new("missing.docx"), &args, &Config::default(), &DisabledOcr)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to convert missing.docx"));
    }
}
