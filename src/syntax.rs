//! Syntax-table extraction and annotation.
//!
//! Every command page carries one syntax table: the callable's syntax
//! string plus parameter rows. The syntax string gets inline Markdown
//! annotation (command name bolded, bare parameter identifiers
//! italicized); parameter rows become one pipe-delimited table wrapped in
//! reference-comment markers.
//!
//! Both annotation passes are hand-rolled forward scans. The shapes they
//! match were originally expressed with lookaround regexes, which made the
//! boundaries easy to get subtly wrong; the scanners make them explicit.

use kuchiki::NodeRef;

use crate::dom;

/// Punctuation that may precede a bare parameter identifier.
const ITALIC_OPENERS: &[char] = &[';', '(', ')', '{', '}'];
/// Punctuation that may follow one.
const ITALIC_CLOSERS: &[char] = &[';', ')', '{', '}'];

/// Extracted syntax section: the annotated syntax string and the parameter
/// rows (cell texts, directional icons already substituted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxSection {
    pub syntax: String,
    pub rows: Vec<Vec<String>>,
}

/// Locate and extract the page's syntax table. `None` when the page has no
/// syntax table element at all.
pub fn extract(document: &NodeRef) -> Option<SyntaxSection> {
    let table = dom::select_first(document, ".tSynt_table")?;

    let raw = dom::select_first(table.as_node(), ".tSynt_td_cc")
        .map(|cell| cell.text_contents().trim().to_string())
        .unwrap_or_default();
    let syntax = annotate(&raw);

    let mut rows = Vec::new();
    // The first three rows are table chrome (title, syntax, column heads);
    // data rows start at the fourth.
    for tr in dom::select(table.as_node(), "tr").iter().skip(3) {
        let mut cells: Vec<String> = Vec::new();
        let mut valid = false;
        for child in tr.as_node().children() {
            if child.as_element().is_none() {
                continue;
            }
            let text = child.text_contents().trim().to_string();
            if text.is_empty() {
                // A textless cell may still carry a directional icon.
                if let Some(img) = dom::select_first(&child, "img") {
                    if let Some(src) = dom::attr(&img, "src") {
                        valid = true;
                        if src.ends_with("in_out1.png") {
                            cells.push("→".to_string());
                        } else if src.ends_with("in_out0.png") {
                            cells.push("←".to_string());
                        } else if src.ends_with("in_out2.png") {
                            cells.push("↔".to_string());
                        }
                    }
                }
                continue;
            }
            valid = true;
            let text = text
                .replace('|', "&#124;")
                .replace("\r\n", "<br/>")
                .replace(['\r', '\n'], "<br/>");
            cells.push(text);
        }
        if valid {
            rows.push(cells);
        }
    }

    Some(SyntaxSection { syntax, rows })
}

/// Render the syntax and parameter reference blocks. Empty when no
/// parameter rows were extracted — a syntax string without rows is table
/// chrome, not a documented callable.
pub fn render(section: &SyntaxSection, command_name: &str) -> String {
    if section.rows.is_empty() {
        return String::new();
    }
    let mut rows = section.rows.clone();
    // The source table's header spans one fewer column than the data rows;
    // an empty third column realigns it.
    let at = rows[0].len().min(2);
    rows[0].insert(at, String::new());

    format!(
        "<!--REF #_command_.{name}.Syntax-->{syntax}<!-- END REF-->\n\
         <!--REF #_command_.{name}.Params-->\n{table}\n<!-- END REF-->\n",
        name = command_name,
        syntax = section.syntax,
        table = markdown_table(&rows),
    )
}

/// Annotate a raw syntax string: bold the leading command-name run, then
/// italicize bare identifiers adjacent to structural punctuation.
pub fn annotate(raw: &str) -> String {
    italicize_bare_identifiers(&bold_leading_run(raw))
}

/// Bold the leading run of word characters and spaces, when it is followed
/// by an argument list, a result arrow, an optional-group brace, or nothing.
fn bold_leading_run(s: &str) -> String {
    let mut end = 0;
    for (i, ch) in s.char_indices() {
        if ch.is_alphanumeric() || ch == '_' || ch.is_whitespace() {
            end = i + ch.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return s.to_string();
    }
    let (run, rest) = s.split_at(end);
    if !(rest.is_empty() || rest.starts_with(['(', '-', '{'])) {
        return s.to_string();
    }
    let name = run.trim_end();
    if name.is_empty() {
        return s.to_string();
    }
    let spacing = &run[name.len()..];
    format!("**{name}**{spacing}{rest}")
}

/// Italicize maximal alphanumeric runs whose nearest non-space neighbours
/// are structural punctuation on both sides.
fn italicize_bare_identifiers(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_alphanumeric() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_alphanumeric() {
            i += 1;
        }
        let prev = chars[..start].iter().rev().find(|c| !c.is_whitespace());
        let next = chars[i..].iter().find(|c| !c.is_whitespace());
        let adjacent = prev.is_some_and(|c| ITALIC_OPENERS.contains(c))
            && next.is_some_and(|c| ITALIC_CLOSERS.contains(c));
        if adjacent {
            out.push('*');
            out.extend(&chars[start..i]);
            out.push('*');
        } else {
            out.extend(&chars[start..i]);
        }
    }
    out
}

/// Render rows as a pipe-delimited Markdown table; the first row is the
/// header.
fn markdown_table(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let headers = &rows[0];
    out.push_str("| ");
    out.push_str(&headers.join(" | "));
    out.push_str(" |\n| ");
    out.push_str(&vec!["---"; headers.len()].join(" | "));
    out.push_str(" |\n");
    for row in &rows[1..] {
        out.push_str("| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |\n");
    }
    out
}
