use crate::fence::{is_prefenced, wrap_code_block};
use crate::utils::language_hint;
use anyhow::{Context, Result};
use log::debug;
use std::borrow::Cow;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Fences converted text for `path`, unless the converter already did.
pub fn render_code_block<'a>(path: &Path, extension: &str, content: &'a str) -> Cow<'a, str> {
    if is_prefenced(content) {
        debug!("{} is already fenced, writing as is", path.display());
        Cow::Borrowed(content)
    } else {
        Cow::Owned(wrap_code_block(content, language_hint(path, extension)))
    }
}

/// Streams the combined document, one section per file.
pub struct MarkdownWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Writes the folder tree followed by a horizontal rule.
    pub async fn write_preamble(&mut self, tree: &str) -> Result<()> {
        self.writer
            .write_all(format!("{tree}\n---\n\n").as_bytes())
            .await
            .context("Failed to write folder tree")
    }

    /// Writes one `## rel_path` section for `source`.
    ///
    /// Plain content is fenced and followed by a blank line; content the
    /// converter already fenced is written verbatim.
    pub async fn write_entry(
        &mut self,
        rel_path: &str,
        source: &Path,
        extension: &str,
        content: &str,
    ) -> Result<()> {
        debug!("Writing section: {rel_path}");

        self.writer
            .write_all(format!("\n\n## {rel_path}\n\n").as_bytes())
            .await
            .with_context(|| format!("Failed to write heading for {rel_path}"))?;

        let body = match render_code_block(source, extension, content) {
            Cow::Borrowed(raw) => Cow::Borrowed(raw),
            Cow::Owned(mut block) => {
                block.push('\n');
                Cow::Owned(block)
            }
        };

        self.writer
            .write_all(body.as_bytes())
            .await
            .with_context(|| format!("Failed to write content for {rel_path}"))
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.context("Failed to flush output")
    }

    /// Flushes and hands back the underlying writer.
    #[cfg(test)]
    pub async fn into_inner(mut self) -> Result<W> {
        self.flush().await?;
        Ok(self.writer.into_inner())
    }
}

/// Writes a standalone per-file document.
pub async fn write_document(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
