//! Canonical placement for brand-new well-known sections.
//!
//! OpenAPI files conventionally keep their top-level sections in a fixed
//! order (`info` before `paths`, `components` after `servers`, and so on).
//! When a fix creates such a section from scratch, the insert planners
//! anchor it next to the closest well-known neighbor that already exists.
//! Existing keys are never reordered, and nothing below the root and
//! `/components` is anchored.

use serde_json::Value;

use crate::pointer::Pointer;
use crate::tree::{find_node, Node, NodeRef};

/// Preferred order of root-level keys across Swagger 2.0 and OpenAPI 3.x.
pub const ROOT_KEYS: &[&str] = &[
    "swagger",
    "openapi",
    "info",
    "externalDocs",
    "host",
    "basePath",
    "schemes",
    "consumes",
    "produces",
    "tags",
    "servers",
    "components",
    "paths",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "security",
];

/// Preferred order of `components` sub-keys (OpenAPI 3.x).
pub const COMPONENTS_KEYS: &[&str] = &[
    "schemas",
    "responses",
    "parameters",
    "examples",
    "requestBodies",
    "headers",
    "securitySchemes",
    "links",
    "callbacks",
];

/// Root-level keys whose value is an array, relevant when synthesizing
/// missing containers.
const ARRAY_VALUED_KEYS: &[&str] = &["security", "servers"];

/// Ordering configuration passed into the engine at construction.
#[derive(Debug, Clone)]
pub struct OrderingPolicy {
    anchored: Vec<(Pointer, Vec<String>)>,
    array_valued: Vec<String>,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            anchored: vec![
                (
                    Pointer::root(),
                    ROOT_KEYS.iter().map(|key| key.to_string()).collect(),
                ),
                (
                    Pointer::parse("/components").expect("static pointer"),
                    COMPONENTS_KEYS.iter().map(|key| key.to_string()).collect(),
                ),
            ],
            array_valued: ARRAY_VALUED_KEYS
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }
}

impl OrderingPolicy {
    pub fn new(anchored: Vec<(Pointer, Vec<String>)>, array_valued: Vec<String>) -> Self {
        Self {
            anchored,
            array_valued,
        }
    }

    /// Ordering table for an anchored container, if `container` is one.
    pub fn table_for(&self, container: &Pointer) -> Option<&[String]> {
        self.anchored
            .iter()
            .find(|(pointer, _)| pointer == container)
            .map(|(_, table)| table.as_slice())
    }

    pub fn is_array_valued(&self, key: &str) -> bool {
        self.array_valued.iter().any(|entry| entry == key)
    }

    /// The single key a payload adds, if it adds exactly one.
    pub fn insertion_key(payload: &Value) -> Option<&str> {
        let object = payload.as_object()?;
        if object.len() == 1 {
            object.keys().next().map(String::as_str)
        } else {
            None
        }
    }

    /// The existing sibling a brand-new well-known `key` should be placed
    /// relative to. With `before` false the anchor is the nearest existing
    /// predecessor in table order (insert after it); with `before` true it
    /// is the nearest existing successor (insert before it). `None` when
    /// the container is not anchored, the key is not well known, or no
    /// neighbor exists yet.
    pub fn find_anchor<'a>(
        &self,
        root: &'a Node,
        container: &Pointer,
        key: &str,
        before: bool,
    ) -> Option<NodeRef<'a>> {
        let table = self.table_for(container)?;
        let index = table.iter().position(|entry| entry == key)?;
        if before {
            table[index + 1..]
                .iter()
                .find_map(|entry| find_node(root, &container.child(entry.clone())))
        } else {
            table[..index]
                .iter()
                .rev()
                .find_map(|entry| find_node(root, &container.child(entry.clone())))
        }
    }
}
