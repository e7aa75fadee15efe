//! Hyperlink rewriting and the negative link cache.
//!
//! Every `.html` link inside a description or see-also region is resolved
//! against the corpus on disk. Links to genuine, non-deprecated command
//! pages are rewritten to the target's output path; everything else is
//! demoted to emphasized plain text. Resolution never fails a page: every
//! failure mode degrades to the demotion path and is logged.
//!
//! Unconvertible targets go into a run-wide negative cache keyed on the raw
//! link string, so a broken target referenced from many pages is probed
//! once. The cache is owned by the corpus driver and passed by reference;
//! it only ever grows during a run.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use kuchiki::NodeRef;
use thiserror::Error;

use crate::classify::{self, OutputGroup};
use crate::dom;
use crate::identity::CommandIdentity;

/// Why a link target was rejected. Rejections are data — logged, cached,
/// never propagated as errors.
#[derive(Debug, Error)]
pub enum LinkRejection {
    #[error("target is not a command page")]
    NotACommand,
    #[error("target is outside the reference language track")]
    WrongTrack,
    #[error("target is deprecated")]
    Deprecated,
    #[error("target could not be read: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// Run-wide set of link strings already found unconvertible.
///
/// Append-only-on-miss, read-only-on-hit, so concurrent page workers share
/// it without coordination beyond the mutex. Never persisted across runs.
#[derive(Debug, Default)]
pub struct NegativeLinkCache {
    inner: Mutex<HashSet<String>>,
}

impl NegativeLinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.lock().contains(link)
    }

    pub fn insert(&self, link: &str) {
        self.lock().insert(link.to_string());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned set of negative verdicts is still usable.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rewrites anchors inside one region of one page.
pub struct LinkRewriter<'a> {
    root_folder: &'a Path,
    cache: &'a NegativeLinkCache,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(root_folder: &'a Path, cache: &'a NegativeLinkCache) -> Self {
        Self { root_folder, cache }
    }

    /// Rewrite every convertible anchor under `region`; demote the rest.
    ///
    /// `current_group` decides the `..` prefix needed to reach targets in
    /// the other output group; `referrer` only feeds the log.
    pub fn rewrite_region(
        &self,
        region: &NodeRef,
        current_group: OutputGroup,
        referrer: &CommandIdentity,
    ) {
        for anchor in dom::select(region, "a") {
            let Some(href) = dom::attr(&anchor, "href") else {
                continue;
            };
            // Inline code references carry hrefs into the legacy syntax
            // viewer; they are not page links.
            let is_code_ref = dom::attr(&anchor, "class")
                .is_some_and(|class| class.starts_with("code4d"));
            if !href.contains(".html") || is_code_ref {
                continue;
            }

            if self.cache.contains(&href) {
                tracing::error!(link = %href, command = %referrer, "cannot convert link");
                dom::replace_with_em(anchor.as_node(), &anchor.text_contents());
                continue;
            }

            match self.resolve_target(&href) {
                Ok((target, group)) => {
                    let dest = format!(
                        "{}{}.md",
                        current_group.href_prefix_to(group),
                        target.slug_id()
                    );
                    dom::set_attr(&anchor, "href", &dest);
                }
                Err(reason) => {
                    self.cache.insert(&href);
                    tracing::error!(
                        link = %href,
                        command = %referrer,
                        reason = %reason,
                        "cannot convert link"
                    );
                    dom::replace_with_em(anchor.as_node(), &anchor.text_contents());
                }
            }
        }
    }

    /// Probe a link target on disk and classify it.
    fn resolve_target(&self, href: &str) -> Result<(CommandIdentity, OutputGroup), LinkRejection> {
        let location = self.locate(href);
        if !classify::is_candidate_by_path(&location) {
            return Err(LinkRejection::NotACommand);
        }
        let bytes = fs::read(&location)?;
        if !classify::is_candidate_by_content(&bytes, &location) {
            return Err(LinkRejection::WrongTrack);
        }
        if classify::is_deprecated(&location) {
            return Err(LinkRejection::Deprecated);
        }
        let classification = classify::classify(&location, &bytes);
        Ok((CommandIdentity::from_path(&location), classification.group))
    }

    /// Absolute-style hrefs resolve against the working directory's parent
    /// convention; everything else against the corpus root.
    fn locate(&self, href: &str) -> PathBuf {
        if let Some(rooted) = href.strip_prefix('/') {
            Path::new(".").join(rooted)
        } else {
            self.root_folder.join(href)
        }
    }
}
