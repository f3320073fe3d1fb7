//! Per-file conversion into Markdown text.
//!
//! The orchestrator only sees the [`Converter`] trait, so a richer document
//! converter can be plugged in without touching the batch logic. Every
//! [`ConversionError`] is recoverable: the file is reported and skipped.

use content_inspector::{ContentType, inspect};
use log::debug;
use memmap2::MmapOptions;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str;
use thiserror::Error;

/// Bytes inspected when deciding whether a file is binary.
const SNIFF_LEN: usize = 8192;

/// Markdown produced for a single source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub markdown: String,
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} looks like a binary file")]
    Binary { path: PathBuf },

    #[error("cannot convert {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },
}

/// Turns one file into Markdown text.
pub trait Converter {
    fn convert(&self, path: &Path) -> Result<Conversion, ConversionError>;
}

/// Passes text files through unchanged.
///
/// Invalid UTF-8 is decoded with replacement characters instead of failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn convert(&self, path: &Path) -> Result<Conversion, ConversionError> {
        let io_err = |source| ConversionError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        if file.metadata().map_err(io_err)?.len() == 0 {
            debug!("Empty file: {}", path.display());
            return Ok(Conversion {
                markdown: String::new(),
            });
        }

        let mmap = unsafe { MmapOptions::new().map(&file).map_err(io_err)? };

        let sample_size = std::cmp::min(SNIFF_LEN, mmap.len());
        if inspect(&mmap[..sample_size]) == ContentType::BINARY {
            return Err(ConversionError::Binary {
                path: path.to_path_buf(),
            });
        }

        let markdown = match str::from_utf8(&mmap) {
            Ok(text) => text.to_owned(),
            Err(_) => {
                debug!(
                    "Invalid UTF-8 in {}, decoding with replacement",
                    path.display()
                );
                String::from_utf8_lossy(&mmap).into_owned()
            }
        };

        Ok(Conversion { markdown })
    }
}
