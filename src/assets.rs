//! Image relocation into the per-language asset tree.
//!
//! Every `<img>` in a description region is rewritten to point into the
//! shared asset folder for the page's output group, and the underlying file
//! is copied there. The rewrite always happens, even when the copy fails:
//! a missing source image is a corpus defect worth logging, not a reason to
//! break the page layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kuchiki::NodeRef;

use crate::classify::OutputGroup;
use crate::dom;
use crate::identity::CommandIdentity;

pub struct AssetRelocator<'a> {
    root_folder: &'a Path,
    out_root: &'a Path,
    dry_run: bool,
}

impl<'a> AssetRelocator<'a> {
    pub fn new(root_folder: &'a Path, out_root: &'a Path, dry_run: bool) -> Self {
        Self {
            root_folder,
            out_root,
            dry_run,
        }
    }

    /// Rewrite and copy every image under `region`.
    ///
    /// Only directory creation is fatal; individual copy failures are
    /// logged and the page keeps its rewritten reference.
    pub fn relocate_region(
        &self,
        region: &NodeRef,
        group: OutputGroup,
        referrer: &CommandIdentity,
    ) -> Result<()> {
        for img in dom::select(region, "img") {
            let Some(src) = dom::attr(&img, "src") else {
                continue;
            };
            if referrer.language.is_empty() {
                continue;
            }
            let file_name = match Path::new(&src).file_name() {
                Some(name) => PathBuf::from(name),
                None => continue,
            };

            let new_src = format!(
                "{}{}/{}",
                group.asset_folder_location(),
                group.asset_folder(),
                file_name.display()
            );
            dom::set_attr(&img, "src", &new_src);

            if self.dry_run {
                continue;
            }
            let dest_dir = self
                .out_root
                .join(&referrer.language)
                .join("assets/en")
                .join(group.asset_folder());
            fs::create_dir_all(&dest_dir)
                .with_context(|| format!("creating asset folder {}", dest_dir.display()))?;

            let source = self.root_folder.join(&src);
            if let Err(err) = fs::copy(&source, dest_dir.join(&file_name)) {
                tracing::error!(
                    image = %source.display(),
                    command = %referrer,
                    %err,
                    "image not found"
                );
            }
        }
        Ok(())
    }
}
