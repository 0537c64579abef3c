//! press – command-line markup → PDF converter.
//!
//! Usage:
//!   press <config.json> [-o output.pdf] [--layout layout.json] [--font face.ttf]
//!   press --demo [-o output.pdf]
//!
//! The output path defaults to the config's `outputFile`, then to the config
//! path with a `.pdf` extension.

use std::{env, fs, path::Path, path::PathBuf, process};

use column_press::config::DocumentConfig;
use column_press::fonts::FontManager;
use column_press::pipeline::{generate_pdf_with_fonts, PipelineConfig};
use column_press::templates::demo_config;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut font_path: Option<PathBuf> = None;
    let mut demo = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--output" | "-o" => match iter.next() {
                Some(v) => output_path = Some(PathBuf::from(v)),
                None => fail_usage(&args[0], "--output needs a path"),
            },
            "--layout" => match iter.next() {
                Some(v) => layout_path = Some(PathBuf::from(v)),
                None => fail_usage(&args[0], "--layout needs a path"),
            },
            "--font" => match iter.next() {
                Some(v) => font_path = Some(PathBuf::from(v)),
                None => fail_usage(&args[0], "--font needs a path"),
            },
            "--demo" => demo = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                fail_usage(&args[0], &format!("Unknown flag: {other}"));
            }
            path => {
                if config_path.is_some() {
                    fail_usage(&args[0], &format!("Unexpected argument: {path}"));
                }
                config_path = Some(PathBuf::from(path));
            }
        }
    }

    let doc = match (&config_path, demo) {
        (_, true) => demo_config(),
        (Some(path), false) => match DocumentConfig::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("Error reading '{}': {e}", path.display());
                process::exit(1);
            }
        },
        (None, false) => fail_usage(&args[0], "Error: no config file specified."),
    };

    let output = output_path.unwrap_or_else(|| default_output(&doc, config_path.as_deref()));

    let fonts = match &font_path {
        Some(path) => match FontManager::from_file(path) {
            Ok(fonts) => fonts,
            Err(e) => {
                eprintln!("Error loading font: {e}");
                process::exit(1);
            }
        },
        None => FontManager::default(),
    };

    let config = PipelineConfig::default();
    let (bytes, layout) = match generate_pdf_with_fonts(&doc, &config, &fonts) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    };

    write_file(&output, &bytes);
    if let Some(path) = layout_path {
        write_file(&path, layout.to_json().as_bytes());
    }

    let pages = layout.pages.len();
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        output.display(),
        bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn default_output(doc: &DocumentConfig, config_path: Option<&Path>) -> PathBuf {
    if !doc.output_file.is_empty() {
        return PathBuf::from(&doc.output_file);
    }
    match config_path {
        Some(path) => path.with_extension("pdf"),
        None => PathBuf::from("press-output.pdf"),
    }
}

/// Write `bytes`, creating the parent directory if necessary. Exits on error.
fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(path, bytes) {
        eprintln!("Error writing '{}': {e}", path.display());
        process::exit(1);
    }
}

fn fail_usage(prog: &str, message: &str) -> ! {
    eprintln!("{message}");
    print_usage(prog);
    process::exit(1);
}

fn print_usage(prog: &str) {
    eprintln!("press – markup to two-column PDF converter (column-press)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <config.json> [-o output.pdf] [--layout layout.json] [--font face.ttf]");
    eprintln!("  {prog} --demo [-o output.pdf]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <config.json>  Document config (title, website, body, footer, ...)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --output, -o   Output path (default: outputFile, else config stem with .pdf)");
    eprintln!("  --layout       Also write the computed layout as JSON");
    eprintln!("  --font         Measure line breaks with this TTF/OTF instead of the heuristic");
    eprintln!("  --demo         Render a built-in sample document");
    eprintln!("  --help         Print this message");
}
