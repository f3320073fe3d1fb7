//! Exclusion patterns loaded from the input root's `.gitignore`.
//!
//! Two matching strategies sit behind [`IgnoreMatcher`]. Which one is used is
//! decided once, by the [`IgnoreEngine`] handed to [`load_ignore_spec`]:
//!
//! - [`IgnoreEngine::Gitignore`] compiles the file with the `ignore` crate and
//!   follows real gitignore rules (anchoring, `**`, negation, `dir/`).
//! - [`IgnoreEngine::Glob`] is a shell-glob approximation. Each pattern is
//!   tried against the whole relative path and against the base name. Only
//!   `*`, `?` and `[...]` are special, like `fnmatch`: braces and backslashes
//!   are literal. It has no negation, directory-only patterns or anchoring.
//!
//! Loading never fails the run: a missing, unreadable or malformed file just
//! disables matching.

use globset::{GlobBuilder, GlobMatcher};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Name of the pattern file looked up in the input root.
pub const IGNORE_FILE: &str = ".gitignore";

/// Answers whether a root-relative path is excluded.
pub trait IgnoreMatcher {
    /// `rel_path` is relative to the input root and uses `/` separators.
    fn matches(&self, rel_path: &str) -> bool;
}

/// Which matching strategy to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnoreEngine {
    #[default]
    Gitignore,
    Glob,
}

impl IgnoreEngine {
    pub fn as_str(self) -> &'static str {
        match self {
            IgnoreEngine::Gitignore => "gitignore",
            IgnoreEngine::Glob => "glob",
        }
    }
}

impl fmt::Display for IgnoreEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IgnoreEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gitignore" => Ok(IgnoreEngine::Gitignore),
            "glob" => Ok(IgnoreEngine::Glob),
            other => Err(format!("unknown ignore engine: {other}")),
        }
    }
}

/// Full gitignore semantics backed by the `ignore` crate.
pub struct GitignoreMatcher {
    gitignore: Gitignore,
}

impl GitignoreMatcher {
    pub fn from_lines(root: &Path, text: &str) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(root);
        for line in text.lines() {
            builder.add_line(None, line)?;
        }
        Ok(Self {
            gitignore: builder.build()?,
        })
    }
}

impl IgnoreMatcher for GitignoreMatcher {
    fn matches(&self, rel_path: &str) -> bool {
        let path = Path::new(rel_path);
        // The parent walk only accepts paths below the root.
        if path.has_root() {
            return self.gitignore.matched(path, false).is_ignore();
        }
        self.gitignore
            .matched_path_or_any_parents(path, false)
            .is_ignore()
    }
}

/// Approximate matching with plain shell globs.
pub struct GlobPatternMatcher {
    patterns: Vec<GlobMatcher>,
}

impl GlobPatternMatcher {
    /// Builds from raw file text, dropping blanks, comments and patterns
    /// that do not compile.
    pub fn from_lines(text: &str) -> Self {
        let patterns = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let pattern = line.trim_start_matches('/');
                let glob = GlobBuilder::new(&escape_braces(pattern))
                    .literal_separator(false)
                    .backslash_escape(false)
                    .build();
                match glob {
                    Ok(glob) => {
                        debug!("Adding ignore pattern: {pattern}");
                        Some(glob.compile_matcher())
                    }
                    Err(err) => {
                        warn!("Skipping ignore pattern {line:?}: {err}");
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.patterns.len()
    }
}

/// Makes `{` and `}` literal outside character classes, as in `fnmatch`.
fn escape_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    // Class members seen so far, `None` outside a class.
    let mut members: Option<usize> = None;
    let mut negated = false;

    for c in pattern.chars() {
        match (c, members) {
            ('[', None) => {
                members = Some(0);
                negated = false;
            }
            ('!', Some(0)) if !negated => negated = true,
            // A leading `]` is a member, not the close.
            (']', Some(n)) if n > 0 => members = None,
            (_, Some(n)) => members = Some(n + 1),
            ('{' | '}', None) => {
                out.push('[');
                out.push(c);
                out.push(']');
                continue;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}

impl IgnoreMatcher for GlobPatternMatcher {
    fn matches(&self, rel_path: &str) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        self.patterns
            .iter()
            .any(|glob| glob.is_match(rel_path) || glob.is_match(name))
    }
}

/// Loads `<root>/.gitignore` with the requested engine.
///
/// Returns `None` (nothing is excluded) when the file is absent, unreadable
/// or cannot be compiled.
pub fn load_ignore_spec(root: &Path, engine: IgnoreEngine) -> Option<Box<dyn IgnoreMatcher>> {
    let path = root.join(IGNORE_FILE);
    if !path.exists() {
        debug!("No {} in {}, nothing will be skipped", IGNORE_FILE, root.display());
        return None;
    }

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            warn!("Could not read {}: {err}; ignore filtering disabled", path.display());
            return None;
        }
    };

    debug!("Loading {} with the {engine} engine", path.display());
    match engine {
        IgnoreEngine::Gitignore => match GitignoreMatcher::from_lines(root, &text) {
            Ok(matcher) => Some(Box::new(matcher)),
            Err(err) => {
                warn!("Invalid {}: {err}; ignore filtering disabled", path.display());
                None
            }
        },
        IgnoreEngine::Glob => Some(Box::new(GlobPatternMatcher::from_lines(&text))),
    }
}
