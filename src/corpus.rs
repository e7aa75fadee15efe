//! Corpus driver: enumerate candidate pages, convert them in parallel, and
//! write the per-language trees plus the corpus aggregates.
//!
//! Page conversion is embarrassingly parallel and runs on the rayon pool;
//! everything ordered (output writes, index and theme accumulation) happens
//! in one sequential pass over the results. A page that fails to convert is
//! logged and counted, never fatal to the run.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::catalog::{self, IndexEntry};
use crate::classify::{self, OutputGroup};
use crate::identity::CommandIdentity;
use crate::links::NegativeLinkCache;
use crate::page::{PageAssembler, PageDocument};

/// Reference language: feeds the index, the theme map, and asset layout.
const REFERENCE_LANGUAGE: &str = "en";

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub html_root: PathBuf,
    pub output_dir: PathBuf,
    /// Language codes excluded from conversion entirely.
    pub skip_languages: Vec<String>,
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn new(html_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            html_root: html_root.into(),
            output_dir: output_dir.into(),
            skip_languages: vec!["fr".to_string()],
            dry_run: false,
        }
    }
}

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub themes: usize,
}

enum PageResult {
    Converted(Box<PageOutcome>),
    Skipped,
    Failed,
}

struct PageOutcome {
    identity: CommandIdentity,
    group: OutputGroup,
    theme: Option<String>,
    markdown: String,
}

pub struct CorpusConverter {
    opts: ConvertOptions,
    cache: NegativeLinkCache,
}

impl CorpusConverter {
    /// Validate the option pair. Refuses to write the output tree over the
    /// source corpus.
    pub fn new(opts: ConvertOptions) -> Result<Self> {
        if !opts.html_root.is_dir() {
            bail!("source folder {} does not exist", opts.html_root.display());
        }
        if !opts.dry_run {
            fs::create_dir_all(&opts.output_dir).with_context(|| {
                format!("creating output folder {}", opts.output_dir.display())
            })?;
            let source = dunce::canonicalize(&opts.html_root)?;
            let output = dunce::canonicalize(&opts.output_dir)?;
            if source == output {
                bail!("output folder must differ from the source folder");
            }
        }
        Ok(Self {
            opts,
            cache: NegativeLinkCache::new(),
        })
    }

    /// Enumerate the unique conversion tasks, in path order.
    ///
    /// The walk is flat: command pages live at the corpus root. Pages in a
    /// skipped language and later duplicates of an already-planned
    /// `{language}/{slug}.md` output are dropped here so the task list maps
    /// one-to-one onto output files.
    pub fn plan(&self) -> Result<Vec<PathBuf>> {
        let mut candidates: Vec<PathBuf> = WalkDir::new(&self.opts.html_root)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| classify::is_candidate_by_path(path))
            .collect();
        candidates.sort();

        let mut seen: HashSet<String> = HashSet::new();
        let mut tasks = Vec::with_capacity(candidates.len());
        for path in candidates {
            let identity = CommandIdentity::from_path(&path);
            if self.opts.skip_languages.contains(&identity.language) {
                continue;
            }
            let output_name = format!("{}/{}.md", identity.language, identity.slug_id());
            if seen.insert(output_name) {
                tasks.push(path);
            }
        }
        Ok(tasks)
    }

    /// Convert every planned page and write the outputs and aggregates.
    ///
    /// `progress` is invoked once per finished task, from worker threads.
    pub fn run(&self, tasks: &[PathBuf], progress: impl Fn() + Sync) -> Result<RunSummary> {
        let results: Vec<PageResult> = tasks
            .par_iter()
            .map(|path| {
                let result = self.convert_one(path);
                progress();
                result
            })
            .collect();

        let mut summary = RunSummary::default();
        let mut index: Vec<IndexEntry> = Vec::new();
        let mut themes: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for result in results {
            let outcome = match result {
                PageResult::Converted(outcome) => outcome,
                PageResult::Skipped => {
                    summary.skipped += 1;
                    continue;
                }
                PageResult::Failed => {
                    summary.failed += 1;
                    continue;
                }
            };
            summary.converted += 1;

            let command_type = outcome.group.command_type();
            let slug = outcome.identity.slug_id();
            if !self.opts.dry_run {
                let dest_dir = self
                    .opts
                    .output_dir
                    .join(&outcome.identity.language)
                    .join(command_type);
                fs::create_dir_all(&dest_dir)
                    .with_context(|| format!("creating {}", dest_dir.display()))?;
                let dest = dest_dir.join(format!("{slug}.md"));
                fs::write(&dest, &outcome.markdown)
                    .with_context(|| format!("writing {}", dest.display()))?;
            }

            if outcome.identity.language == REFERENCE_LANGUAGE {
                index.push(IndexEntry {
                    name: outcome.identity.display_name(),
                    dest: format!("../{command_type}/{slug}.md"),
                });
                if let Some(theme) = &outcome.theme {
                    themes
                        .entry(format!("{}/{}", outcome.identity.language, theme))
                        .or_default()
                        .push(format!("{command_type}/{slug}"));
                }
            }
        }
        summary.themes = themes.len();

        index.sort_by(|a, b| a.name.cmp(&b.name));
        if !self.opts.dry_run {
            let index_path = self.opts.output_dir.join("command-index.md");
            fs::write(&index_path, catalog::render_alphabetical_index(&index))
                .with_context(|| format!("writing {}", index_path.display()))?;
            let themes_path = self.opts.output_dir.join("themes.json");
            fs::write(&themes_path, catalog::themes_to_json(&themes)?)
                .with_context(|| format!("writing {}", themes_path.display()))?;
        }
        Ok(summary)
    }

    /// Read, gate, and assemble one page.
    fn convert_one(&self, path: &Path) -> PageResult {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(file = %path.display(), %err, "cannot read page");
                return PageResult::Failed;
            }
        };
        if !classify::is_candidate_by_content(&bytes, path) || classify::is_deprecated(path) {
            return PageResult::Skipped;
        }
        let page = PageDocument::load(path, &bytes);
        let assembler = PageAssembler::new(
            &self.opts.html_root,
            &self.opts.output_dir,
            &self.cache,
            self.opts.dry_run,
        );
        match assembler.assemble(&page) {
            Ok(markdown) => {
                tracing::info!(command = %page.identity, "converted");
                PageResult::Converted(Box::new(PageOutcome {
                    theme: page.theme(),
                    group: page.classification.group,
                    identity: page.identity,
                    markdown,
                }))
            }
            Err(err) => {
                tracing::error!(command = %page.identity, %err, "conversion failed");
                PageResult::Failed
            }
        }
    }

    /// Convert one page to Markdown without touching the corpus walk. Used
    /// by the single-page export path.
    pub fn convert_file(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let page = PageDocument::load(path, &bytes);
        let assembler = PageAssembler::new(
            &self.opts.html_root,
            &self.opts.output_dir,
            &self.cache,
            self.opts.dry_run,
        );
        assembler.assemble(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_page(theme: &str, body: &str) -> String {
        format!(
            r#"<html><body>
                 <div class="ppB">Home</div><div class="ppB">{theme}</div>
                 100-6957482 <img src="ak_700.png"/>
                 <div class="command_paragraph">{body}</div>
               </body></html>"#
        )
    }

    fn converter(root: &Path, out: &Path) -> CorpusConverter {
        CorpusConverter::new(ConvertOptions::new(root, out)).unwrap()
    }

    #[test]
    fn test_plan_skips_languages_and_duplicates() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for name in [
            "BEEP.301-1.en.html",
            "BEEP.301-2.en.html",
            "BEEP.301-1.fr.html",
            "BEEP.301-1.ja.html",
            "readme.txt",
        ] {
            std::fs::write(root.path().join(name), "x").unwrap();
        }
        let tasks = converter(root.path(), out.path()).plan().unwrap();
        let names: Vec<String> = tasks
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // One en BEEP (first in path order), one ja; fr and the duplicate
        // are dropped.
        assert_eq!(names, vec!["BEEP.301-1.en.html", "BEEP.301-1.ja.html"]);
    }

    #[test]
    fn test_refuses_output_over_source() {
        let root = tempfile::tempdir().unwrap();
        assert!(CorpusConverter::new(ConvertOptions::new(root.path(), root.path())).is_err());
    }

    #[test]
    fn test_run_writes_pages_and_aggregates() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join("BEEP.301-1.en.html"),
            command_page("User Interface", r#"<p class="rte4d">Beeps. End.</p>"#),
        )
        .unwrap();
        std::fs::write(
            root.path().join("ABORT.301-2.en.html"),
            command_page("Processes", r#"<p class="rte4d">Aborts. End.</p>"#),
        )
        .unwrap();
        // Overview page that matches the filename convention only.
        std::fs::write(root.path().join("OVERVIEW.301-3.en.html"), "<html></html>").unwrap();

        let converter = converter(root.path(), out.path());
        let tasks = converter.plan().unwrap();
        assert_eq!(tasks.len(), 3);
        let summary = converter.run(&tasks, || {}).unwrap();

        assert_eq!(summary.converted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.themes, 2);

        assert!(out.path().join("en/commands-legacy/beep.md").exists());
        assert!(out.path().join("en/commands-legacy/abort.md").exists());

        let index = std::fs::read_to_string(out.path().join("command-index.md")).unwrap();
        assert!(index.contains("[`ABORT`](../commands-legacy/abort.md)<br/>"));
        assert!(index.contains("[`BEEP`](../commands-legacy/beep.md)<br/>"));

        let themes: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("themes.json")).unwrap())
                .unwrap();
        assert_eq!(themes[0]["label"], "Processes");
        assert_eq!(themes[0]["items"][0], "commands-legacy/abort");
        assert_eq!(themes[1]["label"], "User Interface");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join("BEEP.301-1.en.html"),
            command_page("User Interface", r#"<p class="rte4d">Beeps. End.</p>"#),
        )
        .unwrap();
        let mut opts = ConvertOptions::new(root.path(), out.path());
        opts.dry_run = true;
        let converter = CorpusConverter::new(opts).unwrap();
        let tasks = converter.plan().unwrap();
        let summary = converter.run(&tasks, || {}).unwrap();
        assert_eq!(summary.converted, 1);
        assert!(!out.path().join("en").exists());
        assert!(!out.path().join("command-index.md").exists());
    }

    #[test]
    fn test_deprecated_page_skipped() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join("o-GRAPH.301-1.en.html"),
            command_page("Graphs", r#"<p class="rte4d">Old. End.</p>"#),
        )
        .unwrap();
        let converter = converter(root.path(), out.path());
        let tasks = converter.plan().unwrap();
        let summary = converter.run(&tasks, || {}).unwrap();
        assert_eq!(summary.converted, 0);
        assert_eq!(summary.skipped, 1);
    }
}
