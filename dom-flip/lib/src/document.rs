//! A mutable HTML document tree.
//!
//! [`Document`] wraps a `scraper` DOM and exposes only the primitives the
//! rewriter needs: tag lookup, text-node enumeration, class tests and
//! fragment splicing. Nodes are addressed by [`NodeId`], which stays valid
//! while siblings are inserted or detached.
//!
//! New content always enters the tree as markup: it is parsed into a
//! [`Fragment`] and its top-level nodes are copied in. Callers are
//! responsible for escaping text they place into that markup.

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{Html, Node};

use crate::error::RewriteError;

/// Elements whose text content is not prose and is never rewritten.
const OPAQUE_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "noscript", "template", "xmp", "iframe", "noembed",
    "noframes",
];

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a complete document. Parsing never fails; malformed markup is
    /// repaired the way browsers do.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Serializes the document back to markup.
    pub fn serialize(&self) -> String {
        self.html.html()
    }

    fn tree(&self) -> &Tree<Node> {
        &self.html.tree
    }

    /// All elements named `tag`, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.tree()
            .root()
            .descendants()
            .filter(|node| is_element_named(node, tag))
            .map(|node| node.id())
            .collect()
    }

    /// The first element named `tag`.
    pub fn first_element(&self, tag: &str) -> Option<NodeId> {
        self.tree()
            .root()
            .descendants()
            .find(|node| is_element_named(node, tag))
            .map(|node| node.id())
    }

    /// Snapshot of the prose text nodes under `root`, in document order.
    ///
    /// The snapshot is taken before any mutation so a pass visits exactly the
    /// text nodes that existed when it started. Text inside script, style and
    /// similar opaque elements is excluded; comments and attribute values are
    /// not text nodes and never appear.
    pub fn text_nodes(&self, root: NodeId) -> Vec<NodeId> {
        let Some(root) = self.tree().get(root) else {
            return Vec::new();
        };

        root.descendants()
            .filter(|node| node.value().is_text())
            .filter(|node| {
                !node
                    .ancestors()
                    .any(|a| OPAQUE_TEXT_ELEMENTS.iter().any(|tag| is_element_named(&a, tag)))
            })
            .map(|node| node.id())
            .collect()
    }

    /// The content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.tree()
            .get(id)?
            .value()
            .as_text()
            .map(|text| &*text.text)
    }

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree().get(id)?.parent().map(|p| p.id())
    }

    /// Whether the node is an element whose class list contains `class`.
    ///
    /// Text nodes carry no classes and always return `false`.
    pub fn carries_class(&self, id: NodeId, class: &str) -> bool {
        self.tree()
            .get(id)
            .and_then(|node| node.value().as_element())
            .is_some_and(|element| element.classes().any(|c| c == class))
    }

    /// Inserts the fragment's nodes immediately before `anchor`, in order.
    pub fn insert_before(&mut self, anchor: NodeId, fragment: &Fragment) -> Result<(), RewriteError> {
        for node in fragment.nodes() {
            let id = graft(&mut self.html.tree, node);
            let mut anchor_node = self
                .html
                .tree
                .get_mut(anchor)
                .ok_or_else(|| RewriteError::FragmentParse("anchor node is not in the tree".to_string()))?;
            anchor_node.insert_id_before(id);
        }
        Ok(())
    }

    /// Inserts the fragment's nodes as the first children of `parent`, in order.
    pub fn prepend(&mut self, parent: NodeId, fragment: &Fragment) -> Result<(), RewriteError> {
        let nodes: Vec<_> = fragment.nodes().collect();
        for node in nodes.into_iter().rev() {
            let id = graft(&mut self.html.tree, node);
            let mut parent_node = self
                .html
                .tree
                .get_mut(parent)
                .ok_or_else(|| RewriteError::FragmentParse("parent node is not in the tree".to_string()))?;
            parent_node.prepend_id(id);
        }
        Ok(())
    }

    /// Replaces `old` with the fragment's nodes.
    pub fn replace(&mut self, old: NodeId, fragment: &Fragment) -> Result<(), RewriteError> {
        self.insert_before(old, fragment)?;
        self.remove(old);
        Ok(())
    }

    /// Detaches a node (and its subtree) from the document.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Parsed markup waiting to be spliced into a [`Document`].
#[derive(Debug, Clone)]
pub struct Fragment {
    html: Html,
    wrapper: NodeId,
}

impl Fragment {
    /// Parses `markup` inside a wrapper element.
    ///
    /// Fails if the markup escapes the wrapper (for instance through a stray
    /// closing tag), since its nodes could then not be spliced as a unit.
    pub fn parse(markup: &str) -> Result<Self, RewriteError> {
        let html = Html::parse_fragment(&format!("<div>{markup}</div>"));
        let root = html.root_element();

        let mut children = root.children();
        let wrapper = match (children.next(), children.next()) {
            (Some(first), None) if is_element_named(&first, "div") => first.id(),
            _ => {
                return Err(RewriteError::FragmentParse(format!(
                    "markup escaped its wrapper: {markup}"
                )));
            }
        };

        Ok(Self { html, wrapper })
    }

    fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, Node>> {
        self.html
            .tree
            .get(self.wrapper)
            .into_iter()
            .flat_map(|wrapper| wrapper.children())
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_element_named(node: &NodeRef<'_, Node>, tag: &str) -> bool {
    node.value()
        .as_element()
        .is_some_and(|element| element.name().eq_ignore_ascii_case(tag))
}

/// Deep-copies `source` into `tree` as an orphan and returns its id.
fn graft(tree: &mut Tree<Node>, source: NodeRef<'_, Node>) -> NodeId {
    let id = tree.orphan(source.value().clone()).id();
    for child in source.children() {
        let child_id = graft(tree, child);
        if let Some(mut parent) = tree.get_mut(id) {
            parent.append_id(child_id);
        }
    }
    id
}
