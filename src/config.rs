//! Configuration file support for doc4md
//!
//! Config files are loaded in order (later overrides earlier):
//! 1. `~/.config/doc4md/config.toml` (user defaults)
//! 2. `.doc4md.toml` in the working directory (project overrides)
//!
//! CLI flags override all config file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration options loaded from config files
///
/// # Example
///
/// ```toml
/// # ~/.config/doc4md/config.toml or .doc4md.toml
/// output = "docs"             # Default output folder
/// skip_languages = ["fr"]     # Language codes never converted
/// quiet = false               # Suppress progress output
/// verbose = false             # Enable verbose logging
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output folder (overridden by -o)
    pub output: Option<PathBuf>,
    /// Language codes excluded from conversion (overridden by --skip-lang)
    pub skip_languages: Option<Vec<String>>,
    /// Enable quiet mode by default
    pub quiet: Option<bool>,
    /// Enable verbose mode by default
    pub verbose: Option<bool>,
}

impl Config {
    /// Load configuration from user and project config files
    pub fn load(project_root: &Path) -> Self {
        let user_config = dirs::config_dir()
            .map(|d| d.join("doc4md/config.toml"))
            .and_then(|p| Self::load_file(&p))
            .unwrap_or_default();

        let project_config =
            Self::load_file(&project_root.join(".doc4md.toml")).unwrap_or_default();

        // Project overrides user
        let merged = user_config.override_with(project_config);
        tracing::debug!(
            output = ?merged.output,
            skip_languages = ?merged.skip_languages,
            quiet = ?merged.quiet,
            verbose = ?merged.verbose,
            "Effective config after merge"
        );
        merged
    }

    /// Load configuration from a specific file
    fn load_file(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                return None;
            }
        };

        match toml::from_str::<Self>(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Layer another config on top (other overrides self where present)
    fn override_with(self, other: Self) -> Self {
        Config {
            output: other.output.or(self.output),
            skip_languages: other.skip_languages.or(self.skip_languages),
            quiet: other.quiet.or(self.quiet),
            verbose: other.verbose.or(self.verbose),
        }
    }

    // ===== Accessors with defaults =====

    /// Default output folder name
    pub const DEFAULT_OUTPUT: &'static str = "docs";

    /// Get output folder with default fallback
    pub fn output_or_default(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_OUTPUT))
    }

    /// Get skipped languages with default fallback (`["fr"]`)
    pub fn skip_languages_or_default(&self) -> Vec<String> {
        self.skip_languages
            .clone()
            .unwrap_or_else(|| vec!["fr".to_string()])
    }

    /// Get quiet mode with default fallback (false)
    pub fn quiet_or_default(&self) -> bool {
        self.quiet.unwrap_or(false)
    }

    /// Get verbose mode with default fallback (false)
    pub fn verbose_or_default(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}
