//! Legacy 4D syntax normalization inside fenced code blocks.
//!
//! Old corpus samples declare variables through `C_*` macros and mark
//! comments with a leading backtick. Both forms are rewritten to the modern
//! syntax (`var x : Type`, `//`). Each pass is a single forward scan over
//! the text with one rebuild — replaced text is never rescanned, so the
//! passes are idempotent on already-modern code.

use std::sync::LazyLock;

use regex::Regex;

use crate::identity::CommandIdentity;

/// Fenced 4D code blocks in translated Markdown.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(```4d\s)(.*?)(\s```)").expect("hardcoded fence regex")
});

/// Call-shaped legacy declaration macros, one per line of code.
static DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(C_\w*)\((.*)\)").expect("hardcoded declaration regex"));

/// Modern type name for a legacy declaration macro.
///
/// `C_STRING` has no `var` equivalent and maps to `None` alongside
/// unrecognized macros; callers report those and leave the site unchanged.
fn modern_type(macro_name: &str) -> Option<&'static str> {
    Some(match macro_name {
        "C_OBJECT" => "Object",
        "C_LONGINT" => "Integer",
        "C_REAL" => "Real",
        "C_VARIANT" => "Variant",
        "C_TEXT" => "Text",
        "C_BOOLEAN" => "Boolean",
        "C_POINTER" => "Pointer",
        "C_PICTURE" => "Picture",
        "C_BLOB" => "Blob",
        "C_DATE" => "Date",
        "C_TIME" => "Time",
        "C_COLLECTION" => "Collection",
        _ => return None,
    })
}

/// Rewrite `MACRO(args)` declarations to `var args : Type`.
///
/// Unconvertible macros are logged with the referring command and copied
/// through verbatim.
pub fn convert_declarations(code: &str, referrer: &CommandIdentity) -> String {
    let mut out = String::with_capacity(code.len());
    let mut last = 0;
    for caps in DECL_RE.captures_iter(code) {
        let whole = caps.get(0).expect("group 0 always present");
        out.push_str(&code[last..whole.start()]);
        match modern_type(&caps[1]) {
            Some(ty) => {
                out.push_str("var ");
                out.push_str(&caps[2]);
                out.push_str(" : ");
                out.push_str(ty);
            }
            None => {
                tracing::error!(
                    command = %referrer,
                    macro_name = &caps[1],
                    "cannot convert legacy declaration"
                );
                out.push_str(whole.as_str());
            }
        }
        last = whole.end();
    }
    out.push_str(&code[last..]);
    out
}

/// Rewrite line-initial backtick comment markers to `//`, preserving the
/// rest of each line verbatim. Line count is unchanged.
pub fn convert_comments(code: &str) -> String {
    code.split('\n')
        .map(|line| {
            let indent_len = line.len() - line.trim_start().len();
            let (indent, rest) = line.split_at(indent_len);
            match rest.strip_prefix('`') {
                Some(comment) => format!("{indent}//{comment}"),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run both legacy passes over every ```4d fence in a Markdown document.
///
/// C-style commands keep their declarations — their samples already use the
/// modern form — but still get comment conversion.
pub fn normalize_fenced_blocks(markdown: &str, referrer: &CommandIdentity) -> String {
    FENCE_RE
        .replace_all(markdown, |caps: &regex::Captures<'_>| {
            let mut code = caps[2].to_string();
            if !referrer.is_c_command() {
                code = convert_declarations(&code, referrer);
            }
            code = convert_comments(&code);
            format!("{}{}{}", &caps[1], code, &caps[3])
        })
        .into_owned()
}
