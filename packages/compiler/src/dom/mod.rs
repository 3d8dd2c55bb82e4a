//! DOM Arena
//!
//! An arena-backed tree of element/text/comment nodes plus the adapter
//! handle behaviors receive. Nodes are addressed by position in the arena
//! and re-resolved from the live structure by child index, never through
//! stale references, so behaviors may freely mutate the tree mid-traversal.

mod document;
mod html_parser;

pub use document::{Dom, Document, NodeRef, WeakNodeRef};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scope::Scope;

/// Index of a node within its owning document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        NodeId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single name/value attribute pair, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Attribute {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Per-node metadata attached through [`NodeRef::set_data`].
#[derive(Clone)]
pub enum DataValue {
    Json(serde_json::Value),
    Scope(Scope),
}

impl DataValue {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            DataValue::Json(value) => Some(value),
            DataValue::Scope(_) => None,
        }
    }

    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            DataValue::Scope(scope) => Some(scope),
            DataValue::Json(_) => None,
        }
    }
}

/// What a node is.
#[derive(Clone)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Clone, Default)]
pub(crate) struct ElementData {
    pub(crate) name: String,
    pub(crate) attrs: Vec<Attribute>,
}

pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) data: HashMap<String, DataValue>,
}
