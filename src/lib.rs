//! # doc4md - 4D reference manual to Markdown
//!
//! Converts the legacy 4D reference-manual HTML corpus into a Docusaurus
//! Markdown corpus: one page per command and language, shared asset
//! folders, an alphabetical command index, and a theme-grouped sidebar
//! listing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doc4md::corpus::{ConvertOptions, CorpusConverter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let converter = CorpusConverter::new(ConvertOptions::new("4Dv20R6/4D/20-R6", "docs"))?;
//! let tasks = converter.plan()?;
//! let summary = converter.run(&tasks, || {})?;
//! println!("converted {} pages", summary.converted);
//! # Ok(())
//! # }
//! ```
//!
//! The pipeline per page: classify the file, extract and annotate the
//! syntax table, rewrite the description tree (cross-page links, images,
//! structures the Markdown translator cannot round-trip), translate to
//! Markdown, then normalize legacy 4D code samples.

pub mod assets;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod corpus;
pub mod dom;
pub mod identity;
pub mod legacy;
pub mod links;
pub mod page;
pub mod properties;
pub mod sentinel;
pub mod syntax;
pub mod translate;

pub use classify::OutputGroup;
pub use corpus::{ConvertOptions, CorpusConverter, RunSummary};
pub use identity::CommandIdentity;
pub use links::NegativeLinkCache;
pub use page::{PageAssembler, PageDocument};
