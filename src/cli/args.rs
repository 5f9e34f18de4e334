//! @dose
//! purpose: This module defines the command-line interface of generate-docs using the clap
//!     derive macros: the two positional paths, candidate selection, failure policies and
//!     logging flags.
//!
//! when-editing:
//!     - !INPUT_DIR and OUTPUT are required positionals; anything else is an option
//!     - !Options left unset must not override compdoc.toml (use Option / empty Vec / false)
//!     - Logging flags live in LoggingArgs and are consumed by main.rs only
//!
//! invariants:
//!     - Missing or extra positionals make clap exit with a usage error (non-zero)
//!     - PathBuf is used for all file/directory path arguments
//!
//! gotchas:
//!     - --ext and --exclude are repeatable; --ext replaces the config list, --exclude extends it
//!     - --verbose and --quiet conflict; --log-level wins over both, COMPDOC_LOG_LEVEL loses to all

use clap::{Args, Parser};
use std::env;
use std::path::PathBuf;

/// Environment variable consulted when no logging flag is given
pub const LOG_LEVEL_ENV: &str = "COMPDOC_LOG_LEVEL";

#[derive(Parser, Debug)]
#[command(name = "generate-docs")]
#[command(
    author,
    version,
    about = "Extract React component documentation into a JSON file"
)]
pub struct Cli {
    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Directory containing component source files
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// JSON file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Candidate file extension (can be repeated, default: jsx)
    #[arg(short, long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Exclude files matching glob pattern (can be repeated)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Walk subdirectories of INPUT_DIR
    #[arg(short, long)]
    pub recursive: bool,

    /// Annotation manifest (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    pub annotations: Option<PathBuf>,

    /// Omit files for which neither source produced documentation
    #[arg(long)]
    pub drop_failed: bool,

    /// Write an empty array instead of failing when no candidate file exists
    #[arg(long)]
    pub allow_empty: bool,

    /// Config file (defaults to compdoc.toml in INPUT_DIR)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct LoggingArgs {
    /// Verbose output (debug logging)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl LoggingArgs {
    /// Effective log level: --log-level, then -v / -q, then COMPDOC_LOG_LEVEL, then info
    pub fn level(&self) -> String {
        if let Some(level) = &self.log_level {
            level.clone()
        } else if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "error".to_string()
        } else {
            env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positionals() {
        let cli = Cli::try_parse_from(["generate-docs", "src/components", "docs.json"]).unwrap();
        let args = cli.generate;
        assert_eq!(args.input_dir, PathBuf::from("src/components"));
        assert_eq!(args.output, PathBuf::from("docs.json"));
        assert!(args.extensions.is_empty());
        assert!(args.exclude.is_empty());
        assert!(!args.recursive);
        assert!(!args.drop_failed);
        assert!(!args.allow_empty);
        assert!(args.annotations.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "generate-docs",
            "-e",
            "jsx",
            "--ext",
            "tsx",
            "--exclude",
            "*.test.jsx",
            "-r",
            "--annotations",
            "annotations.toml",
            "--drop-failed",
            "--allow-empty",
            "-c",
            "docs.toml",
            "src",
            "out.json",
        ])
        .unwrap();
        let args = cli.generate;
        assert_eq!(args.extensions, vec!["jsx", "tsx"]);
        assert_eq!(args.exclude, vec!["*.test.jsx"]);
        assert!(args.recursive);
        assert!(args.drop_failed);
        assert!(args.allow_empty);
        assert_eq!(args.annotations, Some(PathBuf::from("annotations.toml")));
        assert_eq!(args.config, Some(PathBuf::from("docs.toml")));
    }

    #[test]
    fn test_logging_flags() {
        let cli = Cli::try_parse_from(["generate-docs", "-v", "src", "out.json"]).unwrap();
        assert!(cli.logging.verbose);

        let cli = Cli::try_parse_from(["generate-docs", "src", "out.json", "--quiet"]).unwrap();
        assert!(cli.logging.quiet);

        assert!(Cli::try_parse_from(["generate-docs", "-v", "-q", "src", "out.json"]).is_err());
    }

    #[test]
    fn test_log_level_precedence() {
        let logging = LoggingArgs {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(logging.level(), "debug");

        let logging = LoggingArgs {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(logging.level(), "error");

        let logging = LoggingArgs {
            verbose: true,
            log_level: Some("trace".to_string()),
            ..Default::default()
        };
        assert_eq!(logging.level(), "trace");
    }

    #[test]
    fn test_error_cases() {
        assert!(Cli::try_parse_from(["generate-docs"]).is_err());
        assert!(Cli::try_parse_from(["generate-docs", "src"]).is_err());
        assert!(Cli::try_parse_from(["generate-docs", "src", "out.json", "extra"]).is_err());
        assert!(Cli::try_parse_from(["generate-docs", "--unknown", "src", "out.json"]).is_err());
    }

    #[test]
    fn test_help_output() {
        let mut cmd = Cli::command();
        let help = format!("{}", cmd.render_help());
        assert!(help.contains("INPUT_DIR"));
        assert!(help.contains("OUTPUT"));
        assert!(help.contains("--annotations"));
    }
}
