//! CLI binary for doc2md.
//!
//! A thin shim over the library crate: discovers input files, maps CLI flags
//! to `ConversionConfig`, converts each file in turn, and prints a summary.
//! Per-file errors are reported and the batch continues; the exit code is 0
//! iff at least one file converted successfully.

use anyhow::{Context, Result};
use clap::Parser;
use doc2md::{ConversionConfig, ConversionObserver, Converter, Engines};
use doc2md::engine::{DocxEngine, PdfiumEngine, TesseractOcr};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a per-file progress bar for OCR page progress, with
/// warnings printed above the bar so they are not overwritten.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("OCR");
        Arc::new(Self { bar })
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
        self.bar.set_length(0);
        self.bar.set_position(0);
    }
}

impl ConversionObserver for CliObserver {
    fn on_progress(&self, current: usize, total: usize) {
        if self.bar.length().unwrap_or(0) != total as u64 {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(current as u64);
    }

    fn on_warning(&self, message: &str) {
        self.bar.println(format!("  {} {message}", cyan("⚠")));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a single file (output lands next to it in markdown/)
  doc2md document.pdf

  # Convert several files and a directory
  doc2md report.docx scans/ -o out/

  # Recurse into directories, force OCR, limit pages
  doc2md archive/ -r --force-ocr --max-pages 10

  # Re-convert even when output already exists
  doc2md document.pdf --overwrite

SUPPORTED INPUTS:
  .pdf    direct text extraction, or OCR when no text layer is present
  .docx   container parsing, with embedded-image OCR fallback
  .doc    legacy binary format — detected and rejected with guidance

SETUP:
  OCR requires the Tesseract libraries and language data (eng by default):
    apt install libtesseract-dev libleptonica-dev tesseract-ocr-eng
  PDF handling requires a pdfium shared library next to the binary or on
  the system library path.
"#;

/// Convert PDF and DOCX files to Markdown with OCR fallback.
#[derive(Parser, Debug)]
#[command(
    name = "doc2md",
    version,
    about = "Convert PDF and DOCX files to Markdown with OCR fallback",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file(s) or directory(ies).
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory for Markdown files (default: markdown/ next to each input).
    #[arg(short, long, env = "DOC2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum number of pages to OCR per document.
    #[arg(short, long, env = "DOC2MD_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Force OCR for PDFs even if text can be extracted directly.
    #[arg(long, env = "DOC2MD_FORCE_OCR")]
    force_ocr: bool,

    /// Recursively process directories.
    #[arg(short, long)]
    recursive: bool,

    /// Overwrite existing output files (default: skip existing).
    #[arg(long)]
    overwrite: bool,

    /// Rasterisation scale factor for OCR (1 ≈ 72 DPI).
    #[arg(long, env = "DOC2MD_SCALE", default_value_t = 2)]
    scale: u32,

    /// Tesseract language code(s), e.g. eng or eng+fra.
    #[arg(long, env = "DOC2MD_LANG", default_value = "eng")]
    lang: String,

    /// Output a JSON batch report instead of human-readable summary.
    #[arg(long)]
    json: bool,

    /// Disable the OCR progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct FileReport {
    input: PathBuf,
    status: &'static str,
    output: Option<PathBuf>,
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchReport {
    converted: usize,
    skipped: usize,
    failed: usize,
    elapsed_ms: u64,
    files: Vec<FileReport>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Discover input files ─────────────────────────────────────────────
    let files = find_input_files(&cli.input, cli.recursive);
    if files.is_empty() {
        eprintln!("{}", red("No supported input files found (.pdf, .docx, .doc)"));
        std::process::exit(1);
    }
    if !cli.quiet && !cli.json {
        eprintln!("Found {} file(s) to process", files.len());
    }

    // ── Build config and converter ───────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let observer = show_progress.then(CliObserver::new);

    let mut builder = ConversionConfig::builder()
        .force_ocr(cli.force_ocr)
        .skip_existing(!cli.overwrite)
        .ocr_render_scale(cli.scale);
    if let Some(dir) = &cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(n) = cli.max_pages {
        builder = builder.max_pages(n);
    }
    if let Some(ref obs) = observer {
        builder = builder.observer(Arc::clone(obs) as Arc<dyn ConversionObserver>);
    }
    let config = builder.build().context("Invalid configuration")?;

    let document = PdfiumEngine::new().context("Failed to initialise PDF engine")?;
    let converter = Converter::with_engines(Engines {
        document: Arc::new(document),
        ocr: Arc::new(TesseractOcr::new(&cli.lang)),
        container: Arc::new(DocxEngine::new()),
    });

    // ── Process files ────────────────────────────────────────────────────
    let start = Instant::now();
    let total = files.len();
    let mut reports: Vec<FileReport> = Vec::with_capacity(total);

    for (i, file) in files.iter().enumerate() {
        if !cli.quiet && !cli.json {
            eprintln!(
                "\n[{}/{}] {}",
                i + 1,
                total,
                bold(&file.display().to_string())
            );
        }

        let report = match converter.convert(file, &config) {
            Ok(outcome) => {
                use doc2md::ConversionOutcome::*;
                match outcome {
                    Written(path) => {
                        if !cli.quiet && !cli.json {
                            eprintln!("  {} {}", green("✓"), dim(&path.display().to_string()));
                        }
                        FileReport {
                            input: file.clone(),
                            status: "converted",
                            output: Some(path),
                            error: None,
                        }
                    }
                    SkippedExisting(path) => {
                        if !cli.quiet && !cli.json {
                            eprintln!(
                                "  {} output exists, skipped {}",
                                cyan("→"),
                                dim(&path.display().to_string())
                            );
                        }
                        FileReport {
                            input: file.clone(),
                            status: "skipped",
                            output: Some(path),
                            error: None,
                        }
                    }
                    NoContent => {
                        if !cli.quiet && !cli.json {
                            eprintln!("  {} no text extracted, nothing written", cyan("→"));
                        }
                        FileReport {
                            input: file.clone(),
                            status: "empty",
                            output: None,
                            error: None,
                        }
                    }
                }
            }
            Err(e) => {
                if !cli.json {
                    eprintln!("  {} {e}", red("✗"));
                }
                FileReport {
                    input: file.clone(),
                    status: "failed",
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        };
        if let Some(ref obs) = observer {
            obs.clear();
        }
        reports.push(report);
    }

    // ── Summary ──────────────────────────────────────────────────────────
    let elapsed = start.elapsed();
    let converted = reports.iter().filter(|r| r.status == "converted").count();
    let skipped = reports
        .iter()
        .filter(|r| r.status == "skipped" || r.status == "empty")
        .count();
    let failed = reports.iter().filter(|r| r.status == "failed").count();

    if cli.json {
        let report = BatchReport {
            converted,
            skipped,
            failed,
            elapsed_ms: elapsed.as_millis() as u64,
            files: reports,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!();
        eprintln!(
            "{} {} converted, {} skipped, {} failed  {}",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&converted.to_string()),
            skipped,
            if failed == 0 {
                failed.to_string()
            } else {
                red(&failed.to_string())
            },
            dim(&format!("({:.2}s)", elapsed.as_secs_f64())),
        );
    }

    if batch_exit_code(converted) != 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// 0 iff at least one file converted. Skipped and empty results alone do
/// not count as success, so a fully-skipped batch is distinguishable in
/// scripts from one that did work.
fn batch_exit_code(converted: usize) -> i32 {
    if converted > 0 {
        0
    } else {
        1
    }
}

/// Expand the input arguments into a sorted, deduplicated list of files
/// with supported extensions.
fn find_input_files(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            for entry in walkdir::WalkDir::new(input)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_supported(entry.path()) {
                    found.insert(entry.path().to_path_buf());
                }
            }
        } else if input.is_file() && is_supported(input) {
            found.insert(input.clone());
        } else if input.is_file() {
            eprintln!(
                "{}",
                dim(&format!("ignoring unsupported file: {}", input.display()))
            );
        } else {
            eprintln!("{}", red(&format!("not found: {}", input.display())));
        }
    }

    found.into_iter().collect()
}

fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("pdf" | "docx" | "doc")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    /// dir/{a.docx, b.pdf, notes.txt, sub/deep.pdf}
    fn populated_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.docx"));
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("notes.txt"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("deep.pdf"));
        dir
    }

    #[test]
    fn exit_code_requires_at_least_one_conversion() {
        assert_eq!(batch_exit_code(0), 1);
        assert_eq!(batch_exit_code(1), 0);
        assert_eq!(batch_exit_code(7), 0);
    }

    #[test]
    fn discovery_filters_unsupported_extensions() {
        let dir = populated_dir();
        let files = find_input_files(&[dir.path().to_path_buf()], false);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.docx", "b.pdf"]);
    }

    #[test]
    fn discovery_is_shallow_without_recursion() {
        let dir = populated_dir();
        let files = find_input_files(&[dir.path().to_path_buf()], false);
        assert!(files.iter().all(|p| p.parent() == Some(dir.path())));
    }

    #[test]
    fn discovery_recurses_when_asked() {
        let dir = populated_dir();
        let files = find_input_files(&[dir.path().to_path_buf()], true);
        assert_eq!(files.len(), 3);
        assert_eq!(files.last().unwrap(), &dir.path().join("sub").join("deep.pdf"));
    }

    #[test]
    fn discovery_deduplicates_explicit_and_walked_inputs() {
        let dir = populated_dir();
        let explicit = dir.path().join("b.pdf");
        let files = find_input_files(&[explicit.clone(), dir.path().to_path_buf()], false);
        assert_eq!(files.iter().filter(|p| **p == explicit).count(), 1);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn discovery_output_is_sorted() {
        let dir = populated_dir();
        let files = find_input_files(&[dir.path().to_path_buf()], true);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn explicit_unsupported_file_is_ignored() {
        let dir = populated_dir();
        let files = find_input_files(&[dir.path().join("notes.txt")], false);
        assert!(files.is_empty());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
