//! Single-page conversion: parsed page plus the Markdown assembler.
//!
//! A page renders as four sections joined by blank lines: Docusaurus front
//! matter, the syntax/parameter reference blocks, the rewritten
//! description, and the see-also block. The description is rewritten
//! in-tree (links, images, sentinels, code blocks) before one Markdown
//! translation pass; the remaining fixes happen on the translated text.

use std::path::Path;

use anyhow::Result;
use kuchiki::NodeRef;

use crate::assets::AssetRelocator;
use crate::classify::{self, ClassificationResult};
use crate::dom;
use crate::identity::CommandIdentity;
use crate::legacy;
use crate::links::{LinkRewriter, NegativeLinkCache};
use crate::sentinel;
use crate::syntax;
use crate::translate;

/// A parsed command page with its identity and classification verdict.
pub struct PageDocument {
    pub identity: CommandIdentity,
    pub classification: ClassificationResult,
    document: NodeRef,
}

impl PageDocument {
    pub fn load(path: impl AsRef<Path>, bytes: &[u8]) -> Self {
        let path = path.as_ref();
        Self {
            identity: CommandIdentity::from_path(path),
            classification: classify::classify(path, bytes),
            document: dom::parse_bytes(bytes),
        }
    }

    /// Theme label from the last breadcrumb element, when present.
    pub fn theme(&self) -> Option<String> {
        let crumbs = dom::select(&self.document, ".ppB");
        let theme = crumbs.last()?.text_contents().trim().to_string();
        (!theme.is_empty()).then_some(theme)
    }
}

/// Assembles one page into its Markdown document.
pub struct PageAssembler<'a> {
    root_folder: &'a Path,
    out_root: &'a Path,
    cache: &'a NegativeLinkCache,
    dry_run: bool,
}

impl<'a> PageAssembler<'a> {
    pub fn new(
        root_folder: &'a Path,
        out_root: &'a Path,
        cache: &'a NegativeLinkCache,
        dry_run: bool,
    ) -> Self {
        Self {
            root_folder,
            out_root,
            cache,
            dry_run,
        }
    }

    pub fn assemble(&self, page: &PageDocument) -> Result<String> {
        let sections = [
            self.front_matter(page),
            self.syntax_section(page),
            self.description(page)?,
            self.see_also(page),
        ];
        Ok(sections.join("\n"))
    }

    fn front_matter(&self, page: &PageDocument) -> String {
        format!(
            "---\nid: {id}\ntitle: {title}\nslug: /{prefix}/{slug}\ndisplayed_sidebar: docs\n---\n",
            id = page.identity.header_id(),
            title = page.identity.header_title(),
            prefix = page.classification.group.slug_prefix(),
            slug = page.identity.slug_id(),
        )
    }

    fn syntax_section(&self, page: &PageDocument) -> String {
        match syntax::extract(&page.document) {
            Some(section) => syntax::render(&section, &page.identity.display_name()),
            None => String::new(),
        }
    }

    /// Rewrite the description region in-tree, translate it, then run the
    /// text-level passes (sentinel restore, summary block, legacy code).
    fn description(&self, page: &PageDocument) -> Result<String> {
        let region = self.description_region(page);
        let group = page.classification.group;

        LinkRewriter::new(self.root_folder, self.cache).rewrite_region(
            &region,
            group,
            &page.identity,
        );
        AssetRelocator::new(self.root_folder, self.out_root, self.dry_run).relocate_region(
            &region,
            group,
            &page.identity,
        )?;

        match dom::select_first(&region, ".rte4d") {
            Some(first) => first.as_node().prepend(NodeRef::new_text(sentinel::DESC)),
            None => tracing::error!(command = %page.identity, "no description found"),
        }

        for prm in dom::select(&region, ".rte4d_prm") {
            let italic = dom::new_element("i");
            dom::move_children(prm.as_node(), &italic);
            prm.as_node().insert_after(italic);
            prm.as_node().detach();
        }

        // Code samples sit in a classed wrapper div around a bare <pre>, or
        // as an inline <code> inside a classed wrapper. Both are cut out of
        // the tree and come back as finished fences after translation.
        let mut code_stash = sentinel::CodeStash::new();
        for pre in dom::select(&region, "pre") {
            let Some(parent) = pre.as_node().parent() else {
                continue;
            };
            let language = code_language(dom::node_attr(&parent, "class").as_deref());
            code_stash.stash(&parent, &language, &pre.text_contents());
        }
        for code in dom::select(&region, "code") {
            let Some(parent) = code.as_node().parent() else {
                continue;
            };
            let Some(class) = dom::node_attr(&parent, "class") else {
                continue;
            };
            code_stash.stash(
                code.as_node(),
                &code_language(Some(&class)),
                &code.text_contents(),
            );
        }

        sentinel::protect_row_breaks(&region);
        sentinel::protect_nested_tables(&region);
        sentinel::protect_table_lists(&region);

        let markdown = translate::fragment_to_markdown(&dom::inner_html(&region));
        let markdown = sentinel::restore(&markdown);
        let markdown = code_stash.restore(&markdown);
        let markdown = sentinel::extract_summary(&markdown, &page.identity.display_name());
        Ok(legacy::normalize_fenced_blocks(&markdown, &page.identity))
    }

    fn description_region(&self, page: &PageDocument) -> NodeRef {
        dom::select_first(&page.document, ".command_paragraph")
            .or_else(|| dom::select_first(&page.document, "body"))
            .map(|el| el.as_node().clone())
            .unwrap_or_else(|| page.document.clone())
    }

    fn see_also(&self, page: &PageDocument) -> String {
        let Some(heading) = dom::select_first(&page.document, "#SeeAlso_title") else {
            return String::new();
        };
        let Some(list) = dom::next_element_sibling(heading.as_node()) else {
            return String::new();
        };
        LinkRewriter::new(self.root_folder, self.cache).rewrite_region(
            &list.as_node().clone(),
            page.classification.group,
            &page.identity,
        );
        format!(
            "\n#### {}\n\n{}",
            translate::fragment_to_markdown(&dom::inner_html(heading.as_node()))
                .trim(),
            translate::fragment_to_markdown(&dom::inner_html(list.as_node())),
        )
    }
}

/// Fence language from a wrapper class like `code4d`: the part after the
/// literal `code`.
fn code_language(class: Option<&str>) -> String {
    class
        .and_then(|c| c.split_once("code").map(|(_, lang)| lang))
        .unwrap_or_default()
        .to_string()
}
