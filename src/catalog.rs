//! Corpus-level aggregates: the alphabetical command index and the
//! per-theme sidebar JSON. Both are built from reference-language pages
//! only; the corpus driver collects the inputs and writes the rendered
//! output next to the per-language trees.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

/// One index line: display name plus the output-relative page path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub dest: String,
}

/// Sidebar category for one documentation theme.
#[derive(Debug, Serialize)]
struct ThemeCategory<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    label: &'a str,
    items: &'a [String],
}

/// Render the alphabetical index document.
///
/// A letter-jump line first, then one anchored section per initial letter.
/// Commands starting with `4` share the `4D` bucket. Entries must already
/// be sorted by name.
pub fn render_alphabetical_index(entries: &[IndexEntry]) -> String {
    let mut out = String::from("---\nid: command-index\ntitle: Index\n---\n\n");
    if entries.is_empty() {
        return out;
    }

    let mut previous = None;
    for entry in entries {
        let letter = bucket_letter(&entry.name);
        if previous != Some(letter.clone()) {
            out.push_str(&format!("[{letter}](#{letter}) - "));
        }
        previous = Some(letter);
    }
    out.truncate(out.len() - 3);
    out.push_str("\n\n");

    let mut previous = None;
    for entry in entries {
        let letter = bucket_letter(&entry.name);
        if previous != Some(letter.clone()) {
            out.push_str(&format!("\n<a id=\"{letter}\"><b>{letter}</b></a>\n\n"));
        }
        out.push_str(&format!("[`{}`]({})<br/>\n", entry.name, entry.dest));
        previous = Some(letter);
    }
    out
}

/// Index bucket for a command name: its uppercased initial, except the
/// digit `4` which buckets as `4D`.
fn bucket_letter(name: &str) -> String {
    let initial = name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    if initial == "4" {
        "4D".to_string()
    } else {
        initial
    }
}

/// Serialize the theme map (`{language}/{theme}` keys, page-path values)
/// into the sidebar categories JSON. Keys are already sorted by the map;
/// item lists are sorted here.
pub fn themes_to_json(themes: &BTreeMap<String, Vec<String>>) -> Result<String> {
    // BTreeMap iteration gives the sorted key order for free.
    let sorted: Vec<(&String, Vec<String>)> = themes
        .iter()
        .map(|(key, items)| {
            let mut items = items.clone();
            items.sort();
            (key, items)
        })
        .collect();

    let categories: Vec<ThemeCategory<'_>> = sorted
        .iter()
        .map(|(key, items)| ThemeCategory {
            kind: "category",
            label: key.split('/').nth(1).unwrap_or(key.as_str()),
            items,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&categories)?)
}
