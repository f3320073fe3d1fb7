//! Folder structure preamble.
//!
//! Scans the input root into a [`DirNode`] tree and renders it with box
//! drawing characters, listing only files the batch would pick up.

use crate::utils::dotted_extension;
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Directories never shown in the tree, on top of hidden ones.
const SKIPPED_DIRS: &[&str] = &["node_modules", "__pycache__", "venv"];

const MAX_DEPTH: usize = 20;

/// One directory in the rendered tree.
#[derive(Debug, Default)]
pub struct DirNode {
    /// Matching file names directly in this directory, sorted.
    files: Vec<String>,
    /// Subdirectories by name.
    children: BTreeMap<String, DirNode>,
}

impl DirNode {
    /// Scans `dir` recursively. Unreadable directories come back empty.
    pub fn scan(dir: &Path, extensions: &HashSet<String>) -> Self {
        Self::scan_at(dir, extensions, 0)
    }

    fn scan_at(dir: &Path, extensions: &HashSet<String>, depth: usize) -> Self {
        let mut node = DirNode::default();
        if depth > MAX_DEPTH {
            return node;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Cannot list {}: {err}", dir.display());
                return node;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if path.is_dir() {
                if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                    continue;
                }
                let child = Self::scan_at(&path, extensions, depth + 1);
                node.children.insert(name, child);
            } else if path.is_file() && extensions.contains(&dotted_extension(&path)) {
                node.files.push(name);
            }
        }

        node.files.sort();
        node
    }

    /// Tree lines below the root, files before subdirectories.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(&mut lines, "");
        lines
    }

    fn render_into(&self, lines: &mut Vec<String>, prefix: &str) {
        let total = self.files.len() + self.children.len();

        for (i, file) in self.files.iter().enumerate() {
            let branch = if i + 1 == total { "└── " } else { "├── " };
            lines.push(format!("{prefix}{branch}{file}"));
        }

        for (i, (name, child)) in self.children.iter().enumerate() {
            let is_last = self.files.len() + i + 1 == total;
            let branch = if is_last { "└── " } else { "├── " };
            lines.push(format!("{prefix}{branch}{name}/"));

            let extension = if is_last { "    " } else { "│   " };
            child.render_into(lines, &format!("{prefix}{extension}"));
        }
    }
}

/// Name shown on the tree's first line.
pub fn root_label(root: &Path) -> String {
    if let Some(name) = root.file_name() {
        return name.to_string_lossy().into_owned();
    }
    // `.` and `..` have no file name of their own.
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

/// Renders the tree of `root` as a standalone Markdown block.
pub fn folder_tree(root: &Path, extensions: &HashSet<String>) -> String {
    let lines = DirNode::scan(root, extensions).render_lines();
    let body = format!("{}/\n{}", root_label(root), lines.join("\n"));
    let fence = crate::fence::safe_fence(&body);
    format!("# Folder Structure\n\n{fence}\n{body}\n{fence}\n")
}
