//! Command identity derived from corpus filename conventions.
//!
//! Source pages are named `COMMAND-NAME.301-NNNNNNN.xx.html` where the
//! hyphenated first segment is the command name and the third dot-separated
//! segment is a two-letter language tag. A stem with fewer segments does
//! not follow the convention and is used whole. Everything here is a pure
//! projection of the path string; nothing is cached or persisted.

use std::path::Path;

/// Identity of one command page, derived from its file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandIdentity {
    /// Filename stem before any language suffix, hyphens restored to spaces.
    raw_name: String,
    /// Two-letter language tag from the filename, `"en"` when absent.
    pub language: String,
}

impl CommandIdentity {
    /// Derive an identity from a path. Never fails: a stem that does not
    /// follow the naming convention is used whole, with language `"en"`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let stem = path
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let segments: Vec<&str> = stem.split('.').collect();
        if segments.len() > 2 {
            Self {
                raw_name: segments[0].replace('-', " "),
                language: segments[2].to_string(),
            }
        } else {
            Self {
                raw_name: stem.to_string(),
                language: "en".to_string(),
            }
        }
    }

    /// Stable lowercase identifier: whitespace runs become single hyphens.
    pub fn slug_id(&self) -> String {
        self.raw_name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }

    /// `slug_id` quoted when it collides with a reserved YAML literal.
    pub fn header_id(&self) -> String {
        let id = self.slug_id();
        match id.as_str() {
            "false" | "true" | "null" => format!("\"{id}\""),
            _ => id,
        }
    }

    /// True for the legacy C-style declaration commands (`C TEXT`, ...).
    /// Their code samples already use the modern declaration form.
    pub fn is_c_command(&self) -> bool {
        self.raw_name.starts_with("C ")
    }

    /// Display name. C-style commands use underscores instead of spaces so
    /// the name survives the reference-comment wire format.
    pub fn display_name(&self) -> String {
        if self.is_c_command() {
            self.raw_name.split_whitespace().collect::<Vec<_>>().join("_")
        } else {
            self.raw_name.clone()
        }
    }

    /// `display_name` quoted when it collides with a reserved YAML literal.
    pub fn header_title(&self) -> String {
        let name = self.display_name();
        match name.as_str() {
            "False" | "True" | "Null" => format!("\"{name}\""),
            _ => name,
        }
    }
}

impl std::fmt::Display for CommandIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.raw_name, self.language)
    }
}
