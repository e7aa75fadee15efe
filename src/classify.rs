//! Page classification: which HTML files are convertible command pages.
//!
//! Classification is two-staged. The path predicate is a cheap substring
//! test that gates the corpus walk; the content predicate scans the raw
//! bytes for product-family and parameter-table markers and weeds out
//! overview pages that reuse the command filename convention. No HTML
//! parsing happens at this stage.

use std::path::Path;
use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use crate::identity::CommandIdentity;

/// Substring marking a command page filename (`NAME.301-NNNNNNN[.xx].html`).
const COMMAND_PAGE_MARKER: &str = "301-";

/// Filename-stem prefix of deprecated pages.
const DEPRECATED_PREFIX: &str = "o-";

/// Byte markers checked by the content predicate, in [`MARKERS`] order.
const MARKER_LANGUAGE: usize = 0; // language-reference product family
const MARKER_WRITE_PRO: usize = 1; // write-pro product family
const MARKER_HAS_PARAMS: usize = 2; // parameter-table icon
const MARKER_NO_PARAMS: usize = 3; // empty-parameter-table icon

static MARKERS: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new(["100-6957482", "100-6993921", "ak_700.png", "ak_610.png"])
        .expect("hardcoded marker patterns")
});

/// Destination subtree for a converted page.
///
/// The base product and the WritePro variant publish into different
/// directories, which changes every output-relative path a page emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGroup {
    Base,
    WritePro,
}

impl OutputGroup {
    /// Directory under `{language}/` that receives the Markdown file.
    pub fn command_type(self) -> &'static str {
        match self {
            OutputGroup::Base => "commands-legacy",
            OutputGroup::WritePro => "WritePro/commands-legacy",
        }
    }

    /// Asset subdirectory under `{language}/assets/en/`.
    pub fn asset_folder(self) -> &'static str {
        match self {
            OutputGroup::Base => "commands",
            OutputGroup::WritePro => "WritePro/commands",
        }
    }

    /// Page-relative prefix of the asset directory.
    pub fn asset_folder_location(self) -> &'static str {
        match self {
            OutputGroup::Base => "../assets/en/",
            OutputGroup::WritePro => "../../assets/en/",
        }
    }

    /// Front-matter slug prefix.
    pub fn slug_prefix(self) -> &'static str {
        match self {
            OutputGroup::Base => "commands",
            OutputGroup::WritePro => "WritePro/commands",
        }
    }

    /// Relative href prefix for a link from a page in `self` to a page in
    /// `target`, crossing group subtrees with `..` segments where needed.
    pub fn href_prefix_to(self, target: OutputGroup) -> &'static str {
        match (self, target) {
            (OutputGroup::Base, OutputGroup::WritePro) => "../WritePro/commands-legacy/",
            (OutputGroup::WritePro, OutputGroup::Base) => "../../commands-legacy/",
            _ => "",
        }
    }
}

/// Per-file classification verdict.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationResult {
    /// Filename follows the command-page convention.
    pub is_command_page: bool,
    /// Byte content marks a genuine language-reference entry (not an
    /// overview page reusing the filename convention).
    pub is_language_track: bool,
    pub group: OutputGroup,
}

/// Cheap path-only pre-filter: does the filename follow the command-page
/// naming convention?
pub fn is_candidate_by_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .to_str()
        .is_some_and(|p| p.contains(COMMAND_PAGE_MARKER))
}

/// Content-sensitive predicate. Requires [`is_candidate_by_path`]; then the
/// bytes must carry a product-family marker and the has-parameters icon, and
/// must not carry the empty-parameters icon.
pub fn is_candidate_by_content(bytes: &[u8], path: impl AsRef<Path>) -> bool {
    if !is_candidate_by_path(&path) {
        return false;
    }
    let found = scan_markers(bytes);
    (found[MARKER_LANGUAGE] || found[MARKER_WRITE_PRO])
        && found[MARKER_HAS_PARAMS]
        && !found[MARKER_NO_PARAMS]
}

/// Filename stem starts (case-insensitively) with the deprecation prefix.
pub fn is_deprecated(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.to_lowercase().starts_with(DEPRECATED_PREFIX))
}

/// Classify a candidate file from its path and raw bytes.
///
/// Computed fresh on every call; only negative link-resolution outcomes are
/// ever cached, and that happens in the link rewriter, keyed on the link
/// string rather than on content.
pub fn classify(path: impl AsRef<Path>, bytes: &[u8]) -> ClassificationResult {
    let path = path.as_ref();
    let is_command_page = is_candidate_by_path(path);
    let is_language_track = is_candidate_by_content(bytes, path);
    let found = scan_markers(bytes);
    let identity = CommandIdentity::from_path(path);
    // WritePro pages carry the write-pro family marker and a wp-prefixed slug.
    let group = if found[MARKER_WRITE_PRO] && identity.slug_id().starts_with("wp") {
        OutputGroup::WritePro
    } else {
        OutputGroup::Base
    };
    ClassificationResult {
        is_command_page,
        is_language_track,
        group,
    }
}

/// One pass over the bytes, reporting which of [`MARKERS`] occur.
fn scan_markers(bytes: &[u8]) -> [bool; 4] {
    let mut found = [false; 4];
    for m in MARKERS.find_iter(bytes) {
        found[m.pattern().as_usize()] = true;
        if found.iter().all(|&f| f) {
            break;
        }
    }
    found
}
