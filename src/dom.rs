//! Thin wrappers around the HTML-tree capability (`kuchiki`).
//!
//! The pipeline needs exactly five things from its HTML engine: parse bytes
//! into a mutable tree, query by CSS selector, read/write attributes,
//! replace subtrees, and serialize back to HTML text. Everything else in
//! the crate goes through these helpers so the engine stays swappable.

use html5ever::{namespace_url, ns, LocalName, QualName};
use kuchiki::iter::NodeIterator;
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

/// Parse a raw byte buffer into a document tree. Invalid UTF-8 is replaced
/// lossily; the HTML5 parser synthesises missing `html`/`head`/`body`.
pub fn parse_bytes(bytes: &[u8]) -> NodeRef {
    parse_str(&String::from_utf8_lossy(bytes))
}

/// Parse an HTML string into a document tree.
pub fn parse_str(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// All elements under `root` matching a CSS selector, collected up front so
/// callers can mutate the tree while walking the result.
///
/// Selectors in this crate are hardcoded; a selector that fails to parse is
/// a programming error and yields an empty result.
pub fn select(root: &NodeRef, selector: &str) -> Vec<NodeDataRef<ElementData>> {
    match root.select(selector) {
        Ok(matches) => matches.collect(),
        Err(()) => {
            tracing::error!(selector, "invalid CSS selector");
            Vec::new()
        }
    }
}

/// First element under `root` matching a CSS selector.
pub fn select_first(root: &NodeRef, selector: &str) -> Option<NodeDataRef<ElementData>> {
    root.select_first(selector).ok()
}

/// Attribute value of an element, owned.
pub fn attr(el: &NodeDataRef<ElementData>, name: &str) -> Option<String> {
    el.attributes.borrow().get(name).map(str::to_string)
}

/// Set (or insert) an attribute on an element.
pub fn set_attr(el: &NodeDataRef<ElementData>, name: &str, value: &str) {
    el.attributes.borrow_mut().insert(name, value.to_string());
}

/// Attribute value of a bare node, if it is an element.
pub fn node_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

/// Create an empty element in the HTML namespace.
pub fn new_element(tag: &str) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), LocalName::from(tag)),
        Vec::<(kuchiki::ExpandedName, kuchiki::Attribute)>::new(),
    )
}

/// Replace a node with `<em>text</em>`.
pub fn replace_with_em(node: &NodeRef, text: &str) {
    let em = new_element("em");
    em.append(NodeRef::new_text(text));
    node.insert_after(em);
    node.detach();
}

/// Replace a node with a bare text node.
pub fn replace_with_text(node: &NodeRef, text: &str) {
    node.insert_after(NodeRef::new_text(text));
    node.detach();
}

/// Splice a node's children into its place, bracketed by two text tokens.
///
/// `<table>…</table>` becomes `OPEN…CLOSE` with the children kept as live
/// nodes, which is how structural markup is smuggled past the Markdown
/// translator (see [`crate::sentinel`]).
pub fn unwrap_with_tokens(node: &NodeRef, open: &str, close: &str) {
    node.insert_before(NodeRef::new_text(open));
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        node.insert_before(child);
    }
    node.insert_before(NodeRef::new_text(close));
    node.detach();
}

/// Move every child of `from` to the end of `to`, preserving order.
pub fn move_children(from: &NodeRef, to: &NodeRef) {
    let children: Vec<NodeRef> = from.children().collect();
    for child in children {
        to.append(child);
    }
}

/// Serialized HTML of the node itself.
pub fn outer_html(node: &NodeRef) -> String {
    let mut buf = Vec::new();
    if node.serialize(&mut buf).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serialized HTML of the node's children.
pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|c| outer_html(&c)).collect()
}

/// Next sibling that is an element, skipping text and comment nodes.
pub fn next_element_sibling(node: &NodeRef) -> Option<NodeDataRef<ElementData>> {
    node.following_siblings().elements().next()
}
