#![forbid(unsafe_code)]

//! Arena-backed in-memory document.
//!
//! Nodes are never freed, so a [`NodeId`] keeps its identity after the node
//! is detached, exactly like a JS reference to a removed element. Host-side
//! helpers ([`MemoryDom::remove`], [`MemoryDom::replace_body`]) and the
//! overlay's own writes both record removed element nodes, which a test
//! delivers to the guardian as a mutation batch.
//!
//! # Determinism
//! - Queries walk the tree in pre-order from the root (document order).
//! - `NodeId` values are allocation indices; identical build sequences give
//!   identical ids.

use std::fmt;

use chatnav_core::selector::Selector;
use chatnav_core::{ClickAction, DomError, HostDom};

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        id: Option<String>,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    click: Option<ClickAction<NodeId>>,
}

/// Deterministic document for tests.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    root: NodeId,
    head: Option<NodeId>,
    body: Option<NodeId>,
    removed: Vec<NodeId>,
    root_mutations: usize,
    scrolled: Vec<NodeId>,
    layout_reads: usize,
    fail_writes: bool,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// `<html><head></head><body></body></html>`
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self::without_body();
        dom.attach_body();
        dom
    }

    /// A document still loading: `<html><head></head></html>`.
    #[must_use]
    pub fn without_body() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: None,
            body: None,
            removed: Vec::new(),
            root_mutations: 0,
            scrolled: Vec::new(),
            layout_reads: 0,
            fail_writes: false,
        };
        dom.root = dom.alloc_element("html");
        let head = dom.alloc_element("head");
        dom.link(dom.root, head);
        dom.head = Some(head);
        dom
    }

    /// Create and attach an empty body (host finished parsing, or swapped
    /// its body). Returns the new body.
    pub fn attach_body(&mut self) -> NodeId {
        let body = self.alloc_element("body");
        self.link(self.root, body);
        self.body = Some(body);
        self.root_mutations += 1;
        body
    }

    /// Host replaces `document.body` wholesale, discarding everything in it.
    pub fn replace_body(&mut self) -> NodeId {
        if let Some(old) = self.body.take() {
            self.unlink(old);
            self.root_mutations += 1;
        }
        self.attach_body()
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current body. Panics if the document has none.
    #[must_use]
    pub fn body_id(&self) -> NodeId {
        self.body.expect("document has no body")
    }

    // --- host-side building ----------------------------------------------

    /// Append `<tag class=.. attr=..>text</tag>` under `parent`.
    pub fn add(
        &mut self,
        parent: NodeId,
        tag: &str,
        classes: &[&str],
        attrs: &[(&str, &str)],
        text: Option<&str>,
    ) -> NodeId {
        let el = self.alloc_element(tag);
        if let NodeKind::Element {
            classes: cls,
            attrs: at,
            ..
        } = &mut self.node_mut(el).kind
        {
            cls.extend(classes.iter().map(|c| (*c).to_owned()));
            at.extend(attrs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));
        }
        if let Some(text) = text {
            let node = self.alloc(NodeKind::Text(text.to_owned()));
            self.link(el, node);
        }
        self.link(parent, el);
        el
    }

    /// Host removes a node (and its subtree) from its parent.
    pub fn remove(&mut self, node: NodeId) {
        if self.node(node).parent.is_some() {
            self.unlink(node);
        }
    }

    /// Removed element nodes since the last call, as an observer would
    /// deliver them.
    pub fn take_removals(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.removed)
    }

    /// Child-list changes on the document root since the last call.
    pub fn take_root_mutations(&mut self) -> usize {
        std::mem::take(&mut self.root_mutations)
    }

    /// Make every subsequent write fail with [`DomError::Host`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    // --- inspection ------------------------------------------------------

    /// Attached elements carrying `id` (should never exceed one).
    #[must_use]
    pub fn count_id(&self, id: &str) -> usize {
        self.attached_elements()
            .into_iter()
            .filter(|&n| self.id_of(n) == Some(id))
            .count()
    }

    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    #[must_use]
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).kind {
            NodeKind::Element { id, .. } => id.as_deref(),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn tag_of(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn classes_of(&self, node: NodeId) -> Vec<&str> {
        match &self.node(node).kind {
            NodeKind::Element { classes, .. } => classes.iter().map(String::as_str).collect(),
            NodeKind::Text(_) => Vec::new(),
        }
    }

    /// Element children of `node`, in order.
    #[must_use]
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .children
            .iter()
            .copied()
            .filter(|&c| matches!(self.node(c).kind, NodeKind::Element { .. }))
            .collect()
    }

    /// Listener registered on `node`, if any.
    #[must_use]
    pub fn click_action(&self, node: NodeId) -> Option<ClickAction<NodeId>> {
        self.node(node).click.clone()
    }

    /// Elements scrolled into view, in call order.
    #[must_use]
    pub fn scrolled(&self) -> &[NodeId] {
        &self.scrolled
    }

    #[must_use]
    pub fn layout_reads(&self) -> usize {
        self.layout_reads
    }

    // --- arena internals -------------------------------------------------

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("arena exhausted"));
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            click: None,
        });
        id
    }

    fn alloc_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        })
    }

    /// Move `child` under `parent` (detaching it first, like `appendChild`).
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if self.node(child).parent.is_some() {
            self.unlink(child);
        }
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.node_mut(child).parent.take() else {
            return;
        };
        self.node_mut(parent).children.retain(|&c| c != child);
        let observed = self.body.is_some_and(|body| self.is_within(parent, body));
        if observed && matches!(self.node(child).kind, NodeKind::Element { .. }) {
            self.removed.push(child);
        }
    }

    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    /// Pre-order walk of elements under (and including) `from`.
    fn walk_elements(&self, from: NodeId, out: &mut Vec<NodeId>) {
        if let NodeKind::Element { .. } = self.node(from).kind {
            out.push(from);
            for &child in &self.node(from).children {
                self.walk_elements(child, out);
            }
        }
    }

    fn attached_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_elements(self.root, &mut out);
        out
    }

    fn collect_text(&self, from: NodeId, out: &mut String) {
        match &self.node(from).kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.node(from).children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn check_write(&self) -> Result<(), DomError> {
        if self.fail_writes {
            Err(DomError::Host(String::from("write rejected by test host")))
        } else {
            Ok(())
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut NodeKind, DomError> {
        let slot = self.nodes.get_mut(node.index()).ok_or(DomError::Detached)?;
        if matches!(slot.kind, NodeKind::Text(_)) {
            return Err(DomError::Unsupported("text node is not an element"));
        }
        Ok(&mut slot.kind)
    }
}

impl HostDom for MemoryDom {
    type Element = NodeId;

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn head(&self) -> Option<NodeId> {
        self.head
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.attached_elements()
            .into_iter()
            .find(|&n| self.id_of(n) == Some(id))
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.attached_elements()
            .into_iter()
            .filter(|&n| match &self.node(n).kind {
                NodeKind::Element {
                    tag,
                    classes,
                    attrs,
                    ..
                } => selector.matches(
                    tag,
                    |class| classes.iter().any(|c| c == class),
                    |name| {
                        attrs
                            .iter()
                            .find(|(k, _)| k == name)
                            .map(|(_, v)| v.as_str())
                    },
                ),
                NodeKind::Text(_) => false,
            })
            .collect()
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.classes_of(*element).contains(&class)
    }

    fn text_content(&self, element: &NodeId) -> String {
        let mut out = String::new();
        self.collect_text(*element, &mut out);
        out
    }

    fn subtree_contains_id(&self, root: &NodeId, id: &str) -> bool {
        let mut all = Vec::new();
        self.walk_elements(*root, &mut all);
        all.into_iter().any(|n| self.id_of(n) == Some(id))
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        self.check_write()?;
        Ok(self.alloc_element(tag))
    }

    fn set_id(&mut self, element: &NodeId, new_id: &str) -> Result<(), DomError> {
        self.check_write()?;
        if let NodeKind::Element { id, .. } = self.element_mut(*element)? {
            *id = Some(new_id.to_owned());
        }
        Ok(())
    }

    fn set_text(&mut self, element: &NodeId, text: &str) -> Result<(), DomError> {
        self.clear_children(element)?;
        self.append_text(element, text)
    }

    fn append_text(&mut self, parent: &NodeId, text: &str) -> Result<(), DomError> {
        self.check_write()?;
        self.element_mut(*parent)?;
        let node = self.alloc(NodeKind::Text(text.to_owned()));
        self.link(*parent, node);
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.check_write()?;
        self.element_mut(*parent)?;
        if self.is_within(*parent, *child) {
            return Err(DomError::Host(String::from("HierarchyRequestError")));
        }
        self.link(*parent, *child);
        Ok(())
    }

    fn clear_children(&mut self, element: &NodeId) -> Result<(), DomError> {
        self.check_write()?;
        for child in self.node(*element).children.clone() {
            self.unlink(child);
        }
        Ok(())
    }

    fn set_class(&mut self, element: &NodeId, class: &str, on: bool) -> Result<(), DomError> {
        self.check_write()?;
        if let NodeKind::Element { classes, .. } = self.element_mut(*element)? {
            let present = classes.iter().any(|c| c == class);
            if on && !present {
                classes.push(class.to_owned());
            } else if !on && present {
                classes.retain(|c| c != class);
            }
        }
        Ok(())
    }

    fn listen_click(
        &mut self,
        element: &NodeId,
        action: ClickAction<NodeId>,
    ) -> Result<(), DomError> {
        self.check_write()?;
        self.element_mut(*element)?;
        self.node_mut(*element).click = Some(action);
        Ok(())
    }

    fn scroll_into_view(&mut self, element: &NodeId) -> Result<(), DomError> {
        self.scrolled.push(*element);
        Ok(())
    }

    fn force_layout(&mut self, _element: &NodeId) {
        self.layout_reads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_follow_document_order() {
        let mut dom = MemoryDom::new();
        let body = dom.body_id();
        let outer = dom.add(body, "div", &["msg"], &[], Some("one"));
        let inner = dom.add(outer, "div", &["msg"], &[], Some("two"));
        let last = dom.add(body, "div", &["msg"], &[], Some("three"));

        let found = dom.query_all(&Selector::classes(&["msg"]));
        assert_eq!(found, vec![outer, inner, last]);
        assert_eq!(dom.text_content(&outer), "onetwo");
    }

    #[test]
    fn removed_nodes_are_recorded_and_detached() {
        let mut dom = MemoryDom::new();
        let body = dom.body_id();
        let wrapper = dom.add(body, "div", &[], &[], None);
        let inner = dom.add(wrapper, "span", &[], &[], None);
        dom.set_id(&inner, "target").unwrap();

        dom.remove(wrapper);
        assert_eq!(dom.take_removals(), vec![wrapper]);
        assert!(!dom.is_attached(inner));
        assert_eq!(dom.element_by_id("target"), None);
        assert!(dom.subtree_contains_id(&wrapper, "target"));
    }

    #[test]
    fn replacing_body_counts_as_root_mutation() {
        let mut dom = MemoryDom::new();
        dom.take_root_mutations();
        let old = dom.body_id();
        let new = dom.replace_body();
        assert_ne!(old, new);
        assert_eq!(dom.take_root_mutations(), 2);
        assert!(!dom.is_attached(old));
    }

    #[test]
    fn failing_host_rejects_writes() {
        let mut dom = MemoryDom::new();
        dom.set_fail_writes(true);
        assert!(matches!(dom.create_element("div"), Err(DomError::Host(_))));
    }
}
