//! Common test fixtures and helpers
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::TestCorpus;
//! ```

use std::path::Path;
use tempfile::TempDir;

/// A temporary HTML corpus with automatic cleanup
pub struct TestCorpus {
    dir: TempDir,
}

impl TestCorpus {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a page file at the corpus root
    pub fn write_page(&self, file_name: &str, html: &str) {
        std::fs::write(self.root().join(file_name), html).expect("Failed to write page");
    }

    /// Write an image file under a corpus-relative path
    pub fn write_asset(&self, rel_path: &str, bytes: &[u8]) {
        let path = self.root().join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create asset dir");
        }
        std::fs::write(path, bytes).expect("Failed to write asset");
    }
}

/// Options for a synthetic command page
pub struct PageSpec<'a> {
    /// Product-family marker string, e.g. `100-6957482`
    pub family_marker: &'a str,
    /// Breadcrumb theme label
    pub theme: &'a str,
    /// Raw syntax string for the syntax table
    pub syntax: &'a str,
    /// Extra `<tr>` parameter rows after the column-heading row
    pub param_rows: &'a str,
    /// Description region HTML
    pub description: &'a str,
    /// See-also list HTML; empty for none
    pub see_also: &'a str,
}

impl Default for PageSpec<'_> {
    fn default() -> Self {
        Self {
            family_marker: "100-6957482",
            theme: "User Interface",
            syntax: "BEEP",
            param_rows: "",
            description: r#"<p class="rte4d">Does something. More text.</p>"#,
            see_also: "",
        }
    }
}

/// Render a command page the way the legacy generator laid them out: theme
/// breadcrumbs, family marker, syntax table (three chrome rows, then the
/// column headings, then parameters), description region, see-also block.
pub fn command_page(spec: &PageSpec<'_>) -> String {
    let see_also = if spec.see_also.is_empty() {
        String::new()
    } else {
        format!(
            r#"<h4 id="SeeAlso_title">See also</h4><p>{}</p>"#,
            spec.see_also
        )
    };
    format!(
        r#"<html><head><title>page</title></head><body>
<div class="ppB">4D Documentation</div><div class="ppB">{theme}</div>
<!-- {family} --><img src="pict/ak_700.png"/>
<table class="tSynt_table">
<tr><td class="tSynt_td_t">title</td></tr>
<tr><td class="tSynt_td_cc">{syntax}</td></tr>
<tr><td>&nbsp;</td></tr>
<tr><td>Parameter</td><td>Type</td><td>Description</td></tr>
{rows}
</table>
<div class="command_paragraph">{description}</div>
{see_also}
</body></html>"#,
        theme = spec.theme,
        family = spec.family_marker,
        syntax = spec.syntax,
        rows = spec.param_rows,
        description = spec.description,
    )
}

/// Minimal page that classifies as a convertible command: family marker
/// plus the has-parameters icon.
pub fn minimal_command_page() -> String {
    command_page(&PageSpec::default())
}
