//! Command property annotation for already-published Markdown trees.
//!
//! Source pages carry a numeric command id and a row of property icons
//! (thread safety, modified system variables, server restrictions). This
//! module scrapes those from the HTML corpus, then appends a localized
//! properties table to each published Markdown page, replacing the stale
//! advisory note some pages carry after their parameter block.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::classify;
use crate::identity::CommandIdentity;

static COMMAND_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Number\s?:\s*(\d+)").expect("hardcoded number regex"));

/// Stale advisory note directly after a parameter block: an italic line the
/// published pages no longer want.
static STALE_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Params-->[\S\s]*?<!--\s*END REF\s*-->)(\s*\*.*?\*\s)")
        .expect("hardcoded stale-note regex")
});

/// Commands renamed between the legacy corpus and the published docs; maps
/// legacy slug to published slug.
const RENAMED_COMMANDS: &[(&str, &str)] = &[
    ("get-action-info", "action-info"),
    ("get-activity-snapshot", "activity-snapshot"),
    ("get-application-info", "application-info"),
    ("get-backup-information", "backup-info"),
    ("get-call-chain", "call-chain"),
    ("get-database-measures", "database-measures"),
    ("get-last-field-number", "last-field-number"),
    ("get-last-query-path", "last-query-path"),
    ("get-last-query-plan", "last-query-plan"),
    ("get-last-table-number", "last-table-number"),
    ("get-license-info", "license-info"),
    ("get-license-usage", "license-usage"),
    ("get-localized-document-path", "localized-document-path"),
    ("get-localized-string", "localized-string"),
    ("get-locked-records-info", "locked-records-info"),
    ("get-memory-statistics", "memory-statistics"),
    ("get-monitored-activity", "monitored-activity"),
    ("get-mouse", "mouse-position"),
    ("get-restore-information", "restore-info"),
    ("get-system-info", "system-info"),
    ("get-table-fragmentation", "table-fragmentation"),
    ("session-storage-by-id", "session-storage"),
];

/// Localized strings for one language of the properties table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub command_number: String,
    pub thread_safe: String,
    pub modifies_variables: String,
    pub changes_current_record: String,
    pub changes_current_selection: String,
    pub forbidden_on_server: String,
    pub comma: String,
    pub properties: String,
}

/// Properties scraped from one reference-language page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandProperties {
    pub command_id: u32,
    pub preemptive: bool,
    pub modify_ok: bool,
    pub modify_document: bool,
    pub modify_locked_set: bool,
    pub modify_user_set: bool,
    pub modify_error: bool,
    pub modify_record: bool,
    pub modify_selection: bool,
    pub remote: bool,
    pub not_for_server: bool,
}

impl CommandProperties {
    /// Scrape the properties from raw page text. `None` when the page has
    /// no command number, which marks a page without a properties row.
    pub fn from_page(content: &str) -> Option<Self> {
        let command_id = COMMAND_NUMBER_RE
            .captures(content)
            .and_then(|cap| cap[1].parse().ok())
            .unwrap_or(0);
        if command_id == 0 {
            return None;
        }
        Some(Self {
            command_id,
            preemptive: content.contains("image/prop/preemption.xx.png"),
            modify_ok: content.contains("image/prop/ok.xx.png"),
            modify_document: content.contains("image/prop/document.xx.png"),
            modify_locked_set: content.contains("image/prop/lockedset.xx.png"),
            modify_user_set: content.contains("image/prop/userset.xx.png"),
            modify_error: content.contains("image/prop/error.xx.png"),
            modify_record: content.contains("image/prop/currentrecord.xx.png"),
            modify_selection: content.contains("image/prop/currentsel.xx.png"),
            remote: content.contains("image/prop/remotedifferent.xx.png"),
            not_for_server: content.contains("image/prop/notcs.xx.png"),
        })
    }

    /// Render the localized two-column properties table.
    pub fn render(&self, translation: &Translation) -> String {
        let mut out = String::from("|  |  |\n| --- | --- |\n");
        out.push_str(&format!(
            "| {} | {} |\n",
            translation.command_number, self.command_id
        ));
        let check = if self.preemptive { "&check;" } else { "&cross;" };
        out.push_str(&format!("| {} | {} |\n", translation.thread_safe, check));

        let mut variables = Vec::new();
        if self.modify_ok {
            variables.push("OK");
        }
        if self.modify_document {
            variables.push("Document");
        }
        if self.modify_error {
            variables.push("error");
        }
        if !variables.is_empty() {
            out.push_str(&format!(
                "| {} | {} |\n",
                translation.modifies_variables,
                variables.join(&translation.comma)
            ));
        }
        if self.modify_record {
            out.push_str(&format!("| {} ||\n", translation.changes_current_record));
        }
        if self.modify_selection {
            out.push_str(&format!("| {} ||\n", translation.changes_current_selection));
        }
        if self.not_for_server {
            out.push_str(&format!("| {} ||\n", translation.forbidden_on_server));
        }
        out
    }
}

/// Published slug for a legacy slug, applying the rename table.
pub fn published_slug(slug: &str) -> &str {
    RENAMED_COMMANDS
        .iter()
        .find(|(old, _)| *old == slug)
        .map_or(slug, |(_, new)| *new)
}

/// Load the per-language translation strings from a JSON file keyed by
/// language code.
pub fn load_translations(path: &Path) -> Result<HashMap<String, Translation>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading translations {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing translations {}", path.display()))
}

/// Scrape properties for every reference-language, non-deprecated command
/// page at the corpus root, keyed by published slug.
pub fn collect(html_root: &Path) -> Result<BTreeMap<String, CommandProperties>> {
    let mut properties = BTreeMap::new();
    for entry in WalkDir::new(html_root).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !classify::is_candidate_by_path(entry.path()) {
            continue;
        }
        let identity = CommandIdentity::from_path(entry.path());
        if identity.language != "en" || classify::is_deprecated(entry.path()) {
            continue;
        }
        let bytes = fs::read(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        if !classify::is_candidate_by_content(&bytes, entry.path()) {
            continue;
        }
        let content = String::from_utf8_lossy(&bytes);
        if let Some(props) = CommandProperties::from_page(&content) {
            properties.insert(published_slug(&identity.slug_id()).to_string(), props);
        }
    }
    Ok(properties)
}

/// Drop the stale advisory note after the parameter block, when present.
pub fn strip_stale_note(content: &str) -> String {
    STALE_NOTE_RE.replace(content, "$1").into_owned()
}

/// Walk a published Markdown tree, strip stale notes, and append the
/// localized properties table to every page with known properties. Returns
/// the number of pages annotated.
pub fn annotate_tree(
    docs_root: &Path,
    properties: &BTreeMap<String, CommandProperties>,
    translations: &HashMap<String, Translation>,
) -> Result<usize> {
    let mut annotated = 0;
    for entry in WalkDir::new(docs_root) {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|ext| ext.to_str()) != Some("md")
        {
            continue;
        }
        let language = page_language(entry.path());
        let slug = CommandIdentity::from_path(entry.path()).slug_id();

        let content = fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        let mut content = strip_stale_note(&content);

        if let Some(props) = properties.get(published_slug(&slug)) {
            let Some(translation) = translations.get(&language) else {
                tracing::warn!(%language, "no translation strings for language");
                continue;
            };
            content.push_str(&format!(
                "\n\n#### {}\n\n{}\n\n",
                translation.properties,
                props.render(translation)
            ));
            annotated += 1;
        }
        fs::write(entry.path(), content)
            .with_context(|| format!("writing {}", entry.path().display()))?;
    }
    Ok(annotated)
}

/// Language of a published page: the path component after `i18n`, `en`
/// otherwise.
fn page_language(path: &Path) -> String {
    let mut components = path.components().map(|c| c.as_os_str().to_string_lossy());
    while let Some(component) = components.next() {
        if component == "i18n" {
            if let Some(lang) = components.next() {
                return lang.chars().take(2).collect();
            }
        }
    }
    "en".to_string()
}
