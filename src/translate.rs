//! HTML fragment to Markdown conversion using `fast_html2md`.

/// Translate an HTML fragment into Markdown.
///
/// Uses `fast_html2md::rewrite_html` for the heavy lifting. Emphasis comes
/// out asterisk-delimited, which is the style the published corpus uses.
/// An empty or whitespace-only fragment translates to an empty string.
pub fn fragment_to_markdown(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }
    html2md::rewrite_html(fragment, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fragment() {
        assert_eq!(fragment_to_markdown(""), "");
        assert_eq!(fragment_to_markdown("   \n "), "");
    }

    #[test]
    fn test_asterisk_emphasis() {
        let md = fragment_to_markdown("<p>an <em>emphasized</em> word</p>");
        assert!(md.contains("*emphasized*"), "got: {md}");
    }

    #[test]
    fn test_links_survive() {
        let md = fragment_to_markdown(r#"<p><a href="abort.md">ABORT</a></p>"#);
        assert!(md.contains("[ABORT](abort.md)"), "got: {md}");
    }
}
