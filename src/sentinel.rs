//! Sentinel tokens smuggled through the Markdown translator.
//!
//! The translator collapses line breaks inside table rows and mangles
//! nested tables and lists inside tables. Structures it cannot round-trip
//! are flattened to text tokens before translation and restored to literal
//! HTML tags afterwards. The token↔tag pairs live in one table so the
//! escape/unescape halves cannot drift apart.
//!
//! The translator escapes underscores in text, so every token may come back
//! as either `__TOKEN__` or `\_\_TOKEN\_\_`; [`restore`] handles both.

use kuchiki::NodeRef;

use crate::dom;

/// Marks the first description sub-element so the summary extractor can find
/// the opening sentence after translation.
pub const DESC: &str = "__DESC__";

/// Paired open/close tokens and the literal tags they restore to.
/// `__SPACE__` is self-paired: a `<br/>` has no closing half.
const TOKEN_TAGS: &[(&str, &str)] = &[
    ("__SPACE__", "<br/>"),
    ("__TABLE__", "<table>"),
    ("__ETABLE__", "</table>"),
    ("__THEAD__", "<thead>"),
    ("__ETHEAD__", "</thead>"),
    ("__TBODY__", "<tbody>"),
    ("__ETBODY__", "</tbody>"),
    ("__TR__", "<tr>"),
    ("__ETR__", "</tr>"),
    ("__TD__", "<td>"),
    ("__ETD__", "</td>"),
    ("__UL__", "<ul>"),
    ("__EUL__", "</ul>"),
    ("__LI__", "<li>"),
    ("__ELI__", "</li>"),
];

/// The translator's escaped spelling of a token.
fn escaped(token: &str) -> String {
    token.replace('_', "\\_")
}

/// Code blocks smuggled past the translator whole.
///
/// The translator drops the language class from `<pre><code>` and escapes
/// the code text, so code samples never go through it at all: each block is
/// cut out of the tree behind a numbered token and spliced back in as a
/// finished fence after translation.
#[derive(Debug, Default)]
pub struct CodeStash {
    fences: Vec<String>,
}

impl CodeStash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `node` with the next numbered token and record the fence
    /// that will stand in for it.
    pub fn stash(&mut self, node: &NodeRef, language: &str, code: &str) {
        let token = format!("__CODE{}__", self.fences.len());
        self.fences.push(format!(
            "\n```{language}\n{}\n```\n",
            code.trim_matches('\n')
        ));
        dom::replace_with_text(node, &token);
    }

    /// Substitute every token, in both spellings, with its stored fence.
    pub fn restore(&self, markdown: &str) -> String {
        let mut out = markdown.to_string();
        for (i, fence) in self.fences.iter().enumerate() {
            let token = format!("__CODE{i}__");
            out = out.replace(&escaped(&token), fence);
            out = out.replace(&token, fence);
        }
        out
    }
}

/// Replace `<br>` elements inside table rows with the line-break token, so
/// multi-line cells survive translation.
pub fn protect_row_breaks(region: &NodeRef) {
    for br in dom::select(region, "tr br") {
        dom::replace_with_text(br.as_node(), "__SPACE__");
    }
}

/// Flatten table-within-table structures to token-bracketed runs.
/// Inner structural elements are tokenized first, then the nested table
/// itself, matching restore order.
pub fn protect_nested_tables(region: &NodeRef) {
    for table in dom::select(region, "table table") {
        for tag in ["thead", "tbody", "tr", "td"] {
            for el in dom::select(table.as_node(), tag) {
                let (open, close) = token_pair(tag);
                dom::unwrap_with_tokens(el.as_node(), open, close);
            }
        }
        dom::unwrap_with_tokens(table.as_node(), "__TABLE__", "__ETABLE__");
    }
}

/// Flatten lists nested inside tables, which the translator drops.
pub fn protect_table_lists(region: &NodeRef) {
    for list in dom::select(region, "table ul") {
        for li in dom::select(list.as_node(), "li") {
            dom::unwrap_with_tokens(li.as_node(), "__LI__", "__ELI__");
        }
        dom::unwrap_with_tokens(list.as_node(), "__UL__", "__EUL__");
    }
}

fn token_pair(tag: &str) -> (&'static str, &'static str) {
    match tag {
        "thead" => ("__THEAD__", "__ETHEAD__"),
        "tbody" => ("__TBODY__", "__ETBODY__"),
        "tr" => ("__TR__", "__ETR__"),
        "td" => ("__TD__", "__ETD__"),
        "ul" => ("__UL__", "__EUL__"),
        "li" => ("__LI__", "__ELI__"),
        _ => unreachable!("unpaired tag {tag}"),
    }
}

/// Restore every sentinel token in translated Markdown to its literal tag,
/// in both the raw and the translator-escaped spelling.
pub fn restore(markdown: &str) -> String {
    let mut out = markdown.to_string();
    for (token, tag) in TOKEN_TAGS {
        out = out.replace(&escaped(token), tag);
        out = out.replace(token, tag);
    }
    out
}

/// Wrap the page's opening sentence in a Summary reference block.
///
/// Finds the description sentinel, skips any whitespace after it, and takes
/// the run up to the first sentence terminator (`.` or the full-width `。`)
/// on that line that is not immediately followed by a literal `md` — so a
/// leading `file.md` mention does not end the summary early. When no
/// terminated sentence follows, the sentinel is stripped and the text left
/// untouched.
pub fn extract_summary(markdown: &str, command_name: &str) -> String {
    for token in [escaped(DESC), DESC.to_string()] {
        if let Some(out) = wrap_summary(markdown, &token, command_name) {
            return out;
        }
    }
    // Unconsumed sentinel: strip the first occurrence in either spelling.
    for token in [escaped(DESC), DESC.to_string()] {
        if markdown.contains(&token) {
            return markdown.replacen(&token, "", 1);
        }
    }
    markdown.to_string()
}

fn wrap_summary(markdown: &str, token: &str, command_name: &str) -> Option<String> {
    let start = markdown.find(token)?;
    let after = &markdown[start + token.len()..];

    let trimmed = after.trim_start();

    // The sentence stays on the first non-blank line after the sentinel.
    let mut end = None;
    for (i, ch) in trimmed.char_indices() {
        if ch == '\n' {
            break;
        }
        if (ch == '.' || ch == '。') && !trimmed[i + ch.len_utf8()..].starts_with("md") {
            end = Some(i + ch.len_utf8());
            break;
        }
    }
    let end = end?;
    let sentence = &trimmed[..end];

    let mut out = String::with_capacity(markdown.len() + 64);
    out.push_str(&markdown[..start]);
    out.push_str("<!--REF #_command_.");
    out.push_str(command_name);
    out.push_str(".Summary-->");
    out.push_str(sentence);
    out.push_str("<!-- END REF-->");
    out.push_str(&trimmed[end..]);
    Some(out)
}
