use crate::OutputMode;
use crate::utils::dotted_extension;
use anyhow::{Result, bail};
use ignore::WalkBuilder;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the folder tree document written in per-file mode.
pub const TREE_FILE: &str = ".tree.md";

/// Collects every file under `input_root` whose extension is in `extensions`.
///
/// Each directory yields all of its own matching files, in listing order,
/// before any of its subdirectories are entered; subdirectories are then
/// visited depth first in listing order. Hidden files are included and no
/// ignore files are consulted, exclusion is the orchestrator's job.
///
/// When `output` is given, only the documents that run writes are left out:
/// the combined file itself, or `.tree.md` and `<name>.md` files directly in
/// the per-file output directory.
pub fn collect_files(
    input_root: &Path,
    extensions: &HashSet<String>,
    output: Option<&OutputMode>,
) -> Result<Vec<PathBuf>> {
    if !input_root.is_dir() {
        bail!("Input path is not a directory: {}", input_root.display());
    }

    let produced = Produced::resolve(input_root, output);
    let mut files = Vec::new();
    walk_dir(input_root, extensions, &produced, &mut files);
    Ok(files)
}

fn walk_dir(
    dir: &Path,
    extensions: &HashSet<String>,
    produced: &Produced,
    files: &mut Vec<PathBuf>,
) {
    let mut builder = WalkBuilder::new(dir);
    builder.standard_filters(false).max_depth(Some(1));

    let mut subdirs = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                let path = entry.path();

                if entry.file_type().is_some_and(|t| t.is_dir()) {
                    subdirs.push(entry.into_path());
                } else if path.is_file()
                    && has_wanted_extension(path, extensions)
                    && !produced.contains(path, extensions)
                {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("Error walking path: {err}");
            }
        }
    }

    for subdir in subdirs {
        walk_dir(&subdir, extensions, produced, files);
    }
}

/// Extensions are compared exactly, leading dot included.
fn has_wanted_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    let ext = dotted_extension(path);
    !ext.is_empty() && extensions.contains(&ext)
}

/// Canonical locations of what the current run writes.
enum Produced {
    Nothing,
    Document(PathBuf),
    PerFile(PathBuf),
}

impl Produced {
    fn resolve(input_root: &Path, output: Option<&OutputMode>) -> Self {
        match output {
            Some(OutputMode::Combined(path)) => match path.canonicalize() {
                Ok(path) => Produced::Document(path),
                Err(_) => Produced::Nothing,
            },
            Some(OutputMode::Separate(dir)) => {
                let (Ok(dir), Ok(root)) = (dir.canonicalize(), input_root.canonicalize()) else {
                    return Produced::Nothing;
                };
                // Outputs land among the sources themselves; nothing can be told apart.
                if root.starts_with(&dir) {
                    debug!("Output dir {} contains the input root", dir.display());
                    return Produced::Nothing;
                }
                Produced::PerFile(dir)
            }
            None => Produced::Nothing,
        }
    }

    fn contains(&self, path: &Path, extensions: &HashSet<String>) -> bool {
        let Ok(path) = path.canonicalize() else {
            return false;
        };

        match self {
            Produced::Nothing => false,
            Produced::Document(document) => path == *document,
            Produced::PerFile(dir) => {
                if path.parent() != Some(dir.as_path()) {
                    return false;
                }
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                name == TREE_FILE
                    || name
                        .strip_suffix(".md")
                        .is_some_and(|source| has_wanted_extension(Path::new(source), extensions))
            }
        }
    }
}

/// Normalizes user-supplied extensions to a dot-prefixed set.
///
/// Case is kept as given; matching is case-sensitive.
pub fn normalize_extensions<I, S>(extensions: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| {
            let ext = ext.as_ref().trim();
            if ext.starts_with('.') {
                ext.to_string()
            } else {
                format!(".{ext}")
            }
        })
        .filter(|ext| ext.len() > 1)
        .collect()
}
