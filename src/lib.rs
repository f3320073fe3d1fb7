//! # mdbatch Library
//!
//! Walks a directory tree and converts matching source files into Markdown,
//! either as one combined document or as one document per file.
//!
//! - Every file is wrapped in a code fence long enough that nothing inside
//!   can close it early, annotated with a language tag
//! - `.gitignore` patterns at the input root can exclude files, with either
//!   real gitignore rules or a simpler glob approximation
//! - A folder tree of the converted files can be prepended
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mdbatch::{Config, run_batch};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::new("src", "docs/combined.md");
//!     config.use_gitignore = true;
//!
//!     let report = run_batch(config).await?;
//!     println!("{} files converted", report.converted);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod converter;
pub mod fence;
pub mod filewalker;
pub mod ignorefile;
pub mod tree;
pub mod utils;
pub mod writer;

pub use cli::Config;
pub use converter::{Conversion, ConversionError, Converter, TextConverter};
pub use fence::safe_fence;
pub use filewalker::collect_files;
pub use ignorefile::{IgnoreEngine, IgnoreMatcher, load_ignore_spec};
pub use utils::{language_hint, tsx_flavor};
pub use writer::MarkdownWriter;

use anyhow::{Context, Result, bail};
use log::{error, info};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use utils::{display_path, dotted_extension};

/// Where the batch writes its Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// One document holding a section per file.
    Combined(PathBuf),
    /// A directory of `<file name>.md` documents.
    Separate(PathBuf),
}

impl OutputMode {
    /// Combined when not forced apart and the output names a `.md` file.
    pub fn from_output(output_path: &Path, separate: bool) -> Self {
        let names_document = output_path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase().ends_with(".md"))
            .unwrap_or(false);

        if !separate && names_document {
            OutputMode::Combined(output_path.to_path_buf())
        } else {
            OutputMode::Separate(output_path.to_path_buf())
        }
    }
}

/// Per-run tallies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub converted: usize,
    /// Files excluded by the ignore matcher.
    pub skipped: usize,
    /// Files the converter rejected.
    pub failed: usize,
}

/// Converts the configured directory with the built-in [`TextConverter`].
pub async fn run_batch(config: Config) -> Result<BatchReport> {
    run_batch_with(config, &TextConverter).await
}

/// Converts the configured directory with a caller-supplied converter.
///
/// Per-file failures are logged and counted; only errors creating or writing
/// the output abort the run.
pub async fn run_batch_with(config: Config, converter: &dyn Converter) -> Result<BatchReport> {
    if !config.input_dir.is_dir() {
        bail!("Input path is not a directory: {}", config.input_dir.display());
    }

    let ignore_spec = if config.use_gitignore {
        load_ignore_spec(&config.input_dir, config.ignore_engine)
    } else {
        None
    };

    let mut batch = Batch {
        config: &config,
        converter,
        ignore_spec: ignore_spec.as_deref(),
        report: BatchReport::default(),
    };

    let mode = OutputMode::from_output(&config.output_path, config.separate);
    match &mode {
        OutputMode::Combined(path) => batch.write_combined(&mode, path).await?,
        OutputMode::Separate(dir) => batch.write_separate(&mode, dir).await?,
    }

    let report = batch.report;
    info!(
        "Done: {} converted, {} skipped, {} failed",
        report.converted, report.skipped, report.failed
    );
    Ok(report)
}

struct Batch<'a> {
    config: &'a Config,
    converter: &'a dyn Converter,
    ignore_spec: Option<&'a dyn IgnoreMatcher>,
    report: BatchReport,
}

impl Batch<'_> {
    async fn write_combined(&mut self, mode: &OutputMode, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create output dir: {}", parent.display()))?;
        }

        let file = File::create(output_path)
            .await
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
        let mut md_writer = MarkdownWriter::new(file);

        let input_dir = &self.config.input_dir;
        let files = collect_files(input_dir, &self.config.extensions, Some(mode))?;

        if self.config.include_tree {
            md_writer
                .write_preamble(&tree::folder_tree(input_dir, &self.config.extensions))
                .await?;
        }

        let output_name = display_name(output_path);
        for path in files {
            let Some((rel_path, conversion)) = self.prepare(&path) else {
                continue;
            };

            md_writer
                .write_entry(&rel_path, &path, &dotted_extension(&path), &conversion.markdown)
                .await?;

            self.report.converted += 1;
            info!("✓ Converted {} → {}", display_name(&path), output_name);
        }

        md_writer.flush().await
    }

    async fn write_separate(&mut self, mode: &OutputMode, output_dir: &Path) -> Result<()> {
        fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

        let input_dir = &self.config.input_dir;
        let files = collect_files(input_dir, &self.config.extensions, Some(mode))?;

        if self.config.include_tree {
            let tree_file = output_dir.join(filewalker::TREE_FILE);
            writer::write_document(
                &tree_file,
                &tree::folder_tree(input_dir, &self.config.extensions),
            )
            .await?;
            info!("✓ Wrote folder tree to {}", display_name(&tree_file));
        }

        for path in files {
            let Some((_, conversion)) = self.prepare(&path) else {
                continue;
            };

            let output_file = output_dir.join(format!("{}.md", display_name(&path)));
            let body = writer::render_code_block(
                &path,
                &dotted_extension(&path),
                &conversion.markdown,
            );
            writer::write_document(&output_file, &body).await?;

            self.report.converted += 1;
            info!(
                "✓ Converted {} → {}",
                display_name(&path),
                display_name(&output_file)
            );
        }

        Ok(())
    }

    /// Applies the ignore matcher and the converter to one file.
    ///
    /// Returns `None` when the file is skipped or fails to convert.
    fn prepare(&mut self, path: &Path) -> Option<(String, Conversion)> {
        let rel_path = display_path(path, &self.config.input_dir);

        if let Some(spec) = self.ignore_spec {
            if spec.matches(&rel_path) {
                info!("- Skipped (gitignore) {rel_path}");
                self.report.skipped += 1;
                return None;
            }
        }

        match self.converter.convert(path) {
            Ok(conversion) => Some((rel_path, conversion)),
            Err(err) => {
                error!("✗ Error converting {}: {err}", path.display());
                self.report.failed += 1;
                None
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
