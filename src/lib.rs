//! # doc2md
//!
//! Convert PDF and DOCX documents to Markdown, with automatic OCR fallback
//! for scanned files.
//!
//! ## Why this crate?
//!
//! Batches of real-world documents mix digital PDFs (cheap to convert via
//! their text layer), scanned PDFs (need OCR), and word-processor files.
//! The interesting part is not any single extractor but the policy that
//! picks one per file and detects when a chosen strategy produced nothing
//! usable — without ever silently writing empty output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Select    extension + text-layer probe → Direct | OCR | Container
//!  ├─ 2. Extract   text layer (pdfium) / per-page OCR (tesseract)
//!  │               / DOCX → rich text → Markdown
//!  ├─ 3. Fallback  empty container output → OCR its embedded images
//!  └─ 4. Persist   atomic write, skip-existing policy, never empty files
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2md::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .output_dir("out/")
//!         .max_pages(20)
//!         .build()?;
//!     match convert("document.pdf", &config)? {
//!         outcome if outcome.was_written() => {
//!             println!("wrote {}", outcome.output_path().unwrap().display())
//!         }
//!         _ => println!("skipped"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2md` binary (clap + anyhow + walkdir + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Strategy selection
//!
//! | Input | `force_ocr` | Text layer on page 1 | Strategy |
//! |-------|-------------|----------------------|----------|
//! | .pdf  | false       | yes                  | Direct |
//! | .pdf  | false       | no                   | OCR |
//! | .pdf  | true        | (ignored)            | OCR |
//! | .docx / .doc | (ignored) | (n/a)           | Container |
//! | other | —           | —                    | error |
//!
//! Container documents get OCR only as a second pass, when the first
//! extraction yields no text and the file embeds images.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod extract;
pub mod markdown;
pub mod observer;
pub mod select;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, output_path_for, ConversionOutcome, Converter};
pub use error::ConvertError;
pub use extract::Engines;
pub use observer::{ConversionObserver, NoopObserver, Observer};
pub use select::Strategy;
