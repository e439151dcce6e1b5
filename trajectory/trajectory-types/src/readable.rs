//! Opaque annotations attached to a trajectory.

use serde::{Deserialize, Serialize};

/// An id-tagged annotation carried alongside the waypoint data.
///
/// Readables are stored verbatim and round-tripped by serialization; the
/// trajectory itself never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Readable {
    /// An opaque string payload.
    Text(String),
    /// A JSON document. Serialized as its compact string form.
    Json(serde_json::Value),
    /// A hierarchical markup payload.
    Hierarchy(HierarchicalReadable),
}

impl Readable {
    /// Creates a string readable.
    #[must_use]
    pub fn text(payload: impl Into<String>) -> Self {
        Self::Text(payload.into())
    }
}

/// A node in a hierarchical markup readable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalReadable {
    /// Element name.
    pub name: String,
    /// Attribute key/value pairs in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly under this node.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<HierarchicalReadable>,
}

impl HierarchicalReadable {
    /// Creates an empty node with the given element name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Sets the character data, builder style.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Adds a child element, builder style.
    #[must_use]
    pub fn with_child(mut self, child: HierarchicalReadable) -> Self {
        self.children.push(child);
        self
    }
}
