//! @dose
//! purpose: Configuration file parsing for compdoc.toml. Holds the candidate suffix set,
//!     exclusion patterns, traversal mode, failure policies and the annotation manifest path.
//!
//! when-editing:
//!     - !Config is loaded once at startup and merged with CLI flags before generating
//!     - !CLI flags win over config values; list flags replace (ext) or extend (exclude)
//!     - New fields need a serde default so older config files keep loading
//!
//! invariants:
//!     - Config::load returns the default config if compdoc.toml doesn't exist
//!     - An unreadable or invalid file logs a warning and yields the default config
//!     - Extensions are stored without the leading dot
//!
//! gotchas:
//!     - `annotations` is relative to the directory holding the config file, not the CWD
//!     - The implicit config lives in the input directory, so it is never a candidate (.toml)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the config file looked up in the input directory
pub const CONFIG_FILE_NAME: &str = "compdoc.toml";

/// Main configuration structure matching compdoc.toml
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Candidate file suffixes
    pub extensions: Vec<String>,

    /// Exclusion globs matched against relative file names
    pub exclude: Vec<String>,

    /// Walk subdirectories of the input directory
    pub recursive: bool,

    /// Omit files for which both sources failed
    pub drop_failed: bool,

    /// Write an empty array instead of failing when no candidate exists
    pub allow_empty: bool,

    /// Annotation manifest (TOML or JSON)
    pub annotations: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["jsx".to_string()],
            exclude: Vec::new(),
            recursive: false,
            drop_failed: false,
            allow_empty: false,
            annotations: None,
        }
    }
}

impl Config {
    /// Load configuration from compdoc.toml in the given directory
    pub fn load(dir: &Path) -> Self {
        Self::load_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from an explicit file
    pub fn load_file(config_path: &Path) -> Self {
        if !config_path.exists() {
            return Self::default();
        }

        let mut config: Self = match fs::read_to_string(config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %config_path.display(), "Failed to parse config: {}", e);
                    return Self::default();
                }
            },
            Err(e) => {
                warn!(path = %config_path.display(), "Failed to read config: {}", e);
                return Self::default();
            }
        };

        config.extensions = normalize_extensions(&config.extensions);
        config.annotations = config
            .annotations
            .take()
            .map(|annotations| match config_path.parent() {
                Some(base) if annotations.is_relative() => base.join(annotations),
                _ => annotations,
            });
        config
    }
}

/// Strip leading dots and drop empty entries, keeping first-seen order
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for ext in extensions {
        let ext = ext.trim().trim_start_matches('.');
        if !ext.is_empty() && !normalized.iter().any(|e| e == ext) {
            normalized.push(ext.to_string());
        }
    }
    normalized
}
