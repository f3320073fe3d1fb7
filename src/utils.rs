use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path};

static JSX_ELEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\s*[A-Za-z]").unwrap());
static JSX_RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"return\s*\(\s*<").unwrap());

/// Maps a file extension (with or without the leading dot) to a fence language tag.
pub fn get_language_tag(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_lowercase().as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "java" => "java",
        "c" => "c",
        "h" => "c",
        "cpp" => "cpp",
        "go" => "go",
        "html" => "html",
        "css" => "css",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        _ => "",
    }
}

/// Picks the fence language for a file.
///
/// `.tsx` files are read to decide between `tsx` and `typescript`; an
/// unreadable file counts as having no markup. Every other extension goes
/// through the static table.
pub fn language_hint(path: &Path, extension: &str) -> &'static str {
    if extension.trim_start_matches('.').eq_ignore_ascii_case("tsx") {
        let text = fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        return tsx_flavor(&text);
    }
    get_language_tag(extension)
}

/// `tsx` when the source contains JSX markup, `typescript` otherwise.
pub fn tsx_flavor(text: &str) -> &'static str {
    if JSX_ELEMENT.is_match(text) || text.contains("<>") || JSX_RETURN.is_match(text) {
        "tsx"
    } else {
        "typescript"
    }
}

/// Extension of `path` including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Renders a path with forward slashes regardless of platform.
pub fn to_posix(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

/// Path of `path` relative to `root` in posix form, or the full path when
/// `path` does not live under `root`.
pub fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => to_posix(rel),
        Err(_) => to_posix(path),
    }
}
