//! Document arena and node handles.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::html_parser;
use super::{Attribute, DataValue, ElementData, NodeData, NodeId, NodeKind};

/// The arena owning every node of one tree (or several detached trees).
#[derive(Default)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub(crate) fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            parent,
            children: Vec::new(),
            kind,
            data: Default::default(),
        });
        id
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Unlink a node from its parent, if it has one.
    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|child| *child != id);
            self.node_mut(id).parent = None;
        }
    }

    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Deep copy of a subtree within the same arena. Names, attributes and
    /// text are copied verbatim; per-node behavior data is not (a clone must
    /// never inherit another instance's scope annotations).
    fn deep_clone(&mut self, id: NodeId, parent: Option<NodeId>) -> NodeId {
        let (kind, children) = {
            let node = self.node(id);
            (node.kind.clone(), node.children.clone())
        };
        let copy = self.alloc(kind, parent);
        for child in children {
            let child_copy = self.deep_clone(child, Some(copy));
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Text(value) => out.push_str(value),
            NodeKind::Comment(_) => {}
            NodeKind::Element(_) => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Text(value) => out.push_str(&escape_text(value)),
            NodeKind::Comment(value) => {
                out.push_str("<!--");
                out.push_str(value);
                out.push_str("-->");
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for attr in &element.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if html_parser::is_void_element(&element.name) {
                    return;
                }
                for child in &node.children {
                    self.serialize(*child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Cheap shared handle to a [`Document`]. Node creation lives here.
#[derive(Clone, Default)]
pub struct Dom {
    inner: Rc<RefCell<Document>>,
}

impl Dom {
    pub fn new() -> Dom {
        Dom::default()
    }

    pub fn create_element(&self, name: &str) -> NodeRef {
        self.alloc(NodeKind::Element(ElementData {
            name: name.to_string(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&self, text: &str) -> NodeRef {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&self, text: &str) -> NodeRef {
        self.alloc(NodeKind::Comment(text.to_string()))
    }

    /// Parse markup into detached root nodes owned by this document.
    pub fn parse(&self, markup: &str) -> Vec<NodeRef> {
        html_parser::parse_markup(self, markup)
    }

    pub(crate) fn alloc(&self, kind: NodeKind) -> NodeRef {
        let id = self.inner.borrow_mut().alloc(kind, None);
        self.node_ref(id)
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef {
            dom: self.clone(),
            id,
        }
    }

    fn same_document(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// The adapter handle behaviors receive: one node of one document.
///
/// Handles are position-stable (an arena index), so they stay valid across
/// arbitrary tree mutation; only structural queries go back to the live tree.
#[derive(Clone)]
pub struct NodeRef {
    dom: Dom,
    id: NodeId,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.dom.same_document(&other.dom)
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({}, {:?})", self.node_name(), self.id)
    }
}

impl NodeRef {
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn downgrade(&self) -> WeakNodeRef {
        WeakNodeRef {
            dom: Rc::downgrade(&self.dom.inner),
            id: self.id,
        }
    }

    /// Node name: the element's tag name, or `#text` / `#comment`.
    pub fn node_name(&self) -> String {
        let doc = self.dom.inner.borrow();
        match &doc.node(self.id).kind {
            NodeKind::Element(element) => element.name.clone(),
            NodeKind::Text(_) => "#text".to_string(),
            NodeKind::Comment(_) => "#comment".to_string(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(
            self.dom.inner.borrow().node(self.id).kind,
            NodeKind::Element(_)
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self.dom.inner.borrow().node(self.id).kind, NodeKind::Text(_))
    }

    pub fn parent(&self) -> Option<NodeRef> {
        let parent = self.dom.inner.borrow().node(self.id).parent;
        parent.map(|id| self.dom.node_ref(id))
    }

    pub fn child_nodes(&self) -> Vec<NodeRef> {
        let children = self.dom.inner.borrow().node(self.id).children.clone();
        children.into_iter().map(|id| self.dom.node_ref(id)).collect()
    }

    /// The live child at `index`, if that position still holds one.
    pub fn child_node(&self, index: usize) -> Option<NodeRef> {
        let child = self
            .dom
            .inner
            .borrow()
            .node(self.id)
            .children
            .get(index)
            .copied();
        child.map(|id| self.dom.node_ref(id))
    }

    pub fn child_count(&self) -> usize {
        self.dom.inner.borrow().node(self.id).children.len()
    }

    /// Position among the parent's children; 0 for a detached node.
    pub fn index_in_parent(&self) -> usize {
        let doc = self.dom.inner.borrow();
        match doc.node(self.id).parent {
            Some(parent) => doc
                .node(parent)
                .children
                .iter()
                .position(|child| *child == self.id)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Snapshot of the attributes in document order. Empty for non-elements.
    pub fn attributes(&self) -> Vec<Attribute> {
        let doc = self.dom.inner.borrow();
        match &doc.node(self.id).kind {
            NodeKind::Element(element) => element.attrs.clone(),
            _ => Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        let doc = self.dom.inner.borrow();
        match &doc.node(self.id).kind {
            NodeKind::Element(element) => element
                .attrs
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.clone()),
            _ => None,
        }
    }

    /// Set (or replace) an attribute. No-op on non-elements.
    pub fn set_attr(&self, name: &str, value: &str) {
        let mut doc = self.dom.inner.borrow_mut();
        if let NodeKind::Element(element) = &mut doc.node_mut(self.id).kind {
            match element.attrs.iter_mut().find(|attr| attr.name == name) {
                Some(attr) => attr.value = value.to_string(),
                None => element.attrs.push(Attribute::new(name, value)),
            }
        }
    }

    pub fn remove_attr(&self, name: &str) {
        let mut doc = self.dom.inner.borrow_mut();
        if let NodeKind::Element(element) = &mut doc.node_mut(self.id).kind {
            element.attrs.retain(|attr| attr.name != name);
        }
    }

    /// Append `name` to the `class` attribute. Empty names and duplicates
    /// are ignored; non-elements are left alone.
    pub fn add_class(&self, name: &str) {
        if name.is_empty() || !self.is_element() {
            return;
        }
        let classes = self.attr("class").unwrap_or_default();
        if classes.split_ascii_whitespace().any(|class| class == name) {
            return;
        }
        let classes = if classes.is_empty() {
            name.to_string()
        } else {
            format!("{classes} {name}")
        };
        self.set_attr("class", &classes);
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|class| class == name))
            .unwrap_or(false)
    }

    /// Arbitrary per-node metadata, keyed by string.
    pub fn data(&self, key: &str) -> Option<DataValue> {
        self.dom.inner.borrow().node(self.id).data.get(key).cloned()
    }

    pub fn set_data(&self, key: &str, value: DataValue) {
        self.dom
            .inner
            .borrow_mut()
            .node_mut(self.id)
            .data
            .insert(key.to_string(), value);
    }

    /// The node's text: a text node's own value, or the concatenated text of
    /// an element's descendants. Comments contribute nothing.
    pub fn text(&self) -> String {
        let doc = self.dom.inner.borrow();
        let mut out = String::new();
        doc.collect_text(self.id, &mut out);
        out
    }

    /// Replace the node's content with a single text node (for elements) or
    /// the new value (for text and comment nodes).
    pub fn set_text(&self, text: &str) {
        let new_text = {
            let mut doc = self.dom.inner.borrow_mut();
            match &mut doc.node_mut(self.id).kind {
                NodeKind::Text(value) | NodeKind::Comment(value) => {
                    *value = text.to_string();
                    false
                }
                NodeKind::Element(_) => {
                    let children = std::mem::take(&mut doc.node_mut(self.id).children);
                    for child in children {
                        doc.node_mut(child).parent = None;
                    }
                    true
                }
            }
        };
        if new_text {
            let child = self.dom.create_text(text);
            self.append_child(&child);
        }
    }

    pub fn append_child(&self, child: &NodeRef) {
        self.assert_same_document(child);
        let index = self.child_count();
        self.dom
            .inner
            .borrow_mut()
            .attach(self.id, index, child.id);
    }

    pub fn insert_child(&self, index: usize, child: &NodeRef) {
        self.assert_same_document(child);
        self.dom.inner.borrow_mut().attach(self.id, index, child.id);
    }

    /// Detach from the parent. The node stays alive in the arena and can be
    /// re-attached.
    pub fn remove(&self) {
        self.dom.inner.borrow_mut().detach(self.id);
    }

    /// Swap this node for `other` at the same position in the parent.
    pub fn replace_with(&self, other: &NodeRef) {
        self.assert_same_document(other);
        let mut doc = self.dom.inner.borrow_mut();
        let Some(parent) = doc.node(self.id).parent else {
            return;
        };
        let Some(index) = doc
            .node(parent)
            .children
            .iter()
            .position(|child| *child == self.id)
        else {
            return;
        };
        doc.detach(other.id);
        doc.node_mut(parent).children[index] = other.id;
        doc.node_mut(other.id).parent = Some(parent);
        doc.node_mut(self.id).parent = None;
    }

    /// Structure-preserving deep clone within the same document. The clone
    /// is detached; attributes and whitespace come across verbatim.
    pub fn clone_subtree(&self) -> NodeRef {
        let id = self.dom.inner.borrow_mut().deep_clone(self.id, None);
        self.dom.node_ref(id)
    }

    /// Serialize the subtree back to markup.
    pub fn outer_html(&self) -> String {
        let doc = self.dom.inner.borrow();
        let mut out = String::new();
        doc.serialize(self.id, &mut out);
        out
    }

    fn assert_same_document(&self, other: &NodeRef) {
        assert!(
            self.dom.same_document(&other.dom),
            "nodes belong to different documents"
        );
    }
}

/// Non-owning node handle, for back-references that must not keep the
/// document alive (scope → element).
#[derive(Clone)]
pub struct WeakNodeRef {
    dom: Weak<RefCell<Document>>,
    id: NodeId,
}

impl WeakNodeRef {
    pub fn upgrade(&self) -> Option<NodeRef> {
        self.dom.upgrade().map(|inner| NodeRef {
            dom: Dom { inner },
            id: self.id,
        })
    }
}
