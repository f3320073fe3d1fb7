use crate::filewalker::normalize_extensions;
use crate::ignorefile::IgnoreEngine;
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::collections::HashSet;
use std::path::PathBuf;

/// Output location used when `-o` is not given.
pub const DEFAULT_OUTPUT: &str = "output/combined.md";

/// Extensions converted when `-e` is not given.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".py", ".js", ".jsx", ".ts", ".tsx", ".json"];

pub struct Config {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub separate: bool,
    /// Lowercase, dot-prefixed extensions to convert.
    pub extensions: HashSet<String>,
    pub use_gitignore: bool,
    pub ignore_engine: IgnoreEngine,
    pub include_tree: bool,
    pub verbosity: u8,
    pub quiet: bool,
}

impl Config {
    /// Defaults for converting `input_dir` into `output_path`.
    pub fn new(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            separate: false,
            extensions: normalize_extensions(DEFAULT_EXTENSIONS),
            use_gitignore: false,
            ignore_engine: IgnoreEngine::default(),
            include_tree: true,
            verbosity: 0,
            quiet: false,
        }
    }
}

pub fn build_command() -> Command {
    Command::new("mdbatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch convert source files to Markdown (single combined file by default)")
        .arg(
            Arg::new("input_dir")
                .value_name("INPUT_DIR")
                .help("Input directory to scan")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Output file (if it ends with .md) or output directory (per-file output)")
                .default_value(DEFAULT_OUTPUT)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("separate")
                .long("separate")
                .help("Write one .md file per input file instead of a single combined file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("gitignore")
                .long("gitignore")
                .help("Respect INPUT_DIR/.gitignore and skip matching files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore_engine")
                .long("ignore-engine")
                .value_name("ENGINE")
                .help("How .gitignore patterns are matched")
                .value_parser(["gitignore", "glob"])
                .default_value("gitignore"),
        )
        .arg(
            Arg::new("ext")
                .short('e')
                .long("ext")
                .value_name("EXT")
                .help("File extensions to include (e.g. .py .js ts tsx)")
                .num_args(1..)
                .action(ArgAction::Append)
                .default_values(DEFAULT_EXTENSIONS),
        )
        .arg(
            Arg::new("no_tree")
                .long("no-tree")
                .help("Skip the folder structure output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more detail (repeat for trace output)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

pub fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let input_dir = matches
        .get_one::<PathBuf>("input_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let output_path = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let extensions = matches
        .get_many::<String>("ext")
        .map(normalize_extensions)
        .unwrap_or_else(|| normalize_extensions(DEFAULT_EXTENSIONS));

    let ignore_engine = matches
        .get_one::<String>("ignore_engine")
        .map(|s| s.parse::<IgnoreEngine>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    Ok(Config {
        input_dir,
        output_path,
        separate: matches.get_flag("separate"),
        extensions,
        use_gitignore: matches.get_flag("gitignore"),
        ignore_engine,
        include_tree: !matches.get_flag("no_tree"),
        verbosity: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
    })
}

pub fn parse_args() -> Result<Config> {
    config_from_matches(&build_command().get_matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let matches = build_command()
            .try_get_matches_from(std::iter::once("mdbatch").chain(args.iter().copied()))
            .unwrap();
        config_from_matches(&matches).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.input_dir, PathBuf::from("."));
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT));
        assert!(!config.separate);
        assert!(!config.use_gitignore);
        assert!(config.include_tree);
        assert_eq!(config.ignore_engine, IgnoreEngine::Gitignore);
        assert_eq!(config.extensions, normalize_extensions(DEFAULT_EXTENSIONS));
    }

    #[test]
    fn test_extensions_get_leading_dot() {
        let config = parse(&["src", "-e", "py", ".TS", "--ext", "rs"]);
        assert_eq!(config.input_dir, PathBuf::from("src"));
        let mut exts: Vec<_> = config.extensions.into_iter().collect();
        exts.sort();
        assert_eq!(exts, vec![".TS", ".py", ".rs"]);
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "proj",
            "-o",
            "out",
            "--separate",
            "--gitignore",
            "--ignore-engine",
            "glob",
            "--no-tree",
            "-vv",
        ]);
        assert_eq!(config.output_path, PathBuf::from("out"));
        assert!(config.separate);
        assert!(config.use_gitignore);
        assert_eq!(config.ignore_engine, IgnoreEngine::Glob);
        assert!(!config.include_tree);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn test_rejects_unknown_engine() {
        let result =
            build_command().try_get_matches_from(["mdbatch", "--ignore-engine", "pathspec"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = build_command().try_get_matches_from(["mdbatch", "-q", "-v"]);
        assert!(result.is_err());
    }
}
