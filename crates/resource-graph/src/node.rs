//! # Resource Nodes
//!
//! [`ResourceNode`] is the assembled representation of one record: a typed resource with
//! attributes, links, meta and named relationship [`Linkage`]s holding child nodes.
//! Each node is created once per traversal and attached once, so a built graph is
//! always a tree of owned values.
//!
//! ## Serialized Form
//!
//! Relationships serialize as an ordered map from name to linkage. A linkage renders its
//! `data` as a single resource object when [`Linkage::is_list`] is false and as an array
//! otherwise:
//!
//! ```json
//! {
//!   "type": "article",
//!   "id": "1",
//!   "relationships": {
//!     "author": { "data": { "type": "author", "id": "5" } },
//!     "comments": { "data": [{ "type": "comment", "id": "10" }] }
//!   }
//! }
//! ```
//!
//! Deserializing gives back a graph that renders the same way. Array data comes back
//! with the list form forced.

use crate::record::Value;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::fmt;

/// The composed, relationship-linked representation of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub links: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "relationship_map"
    )]
    relationships: Vec<(String, Linkage)>,
}

impl ResourceNode {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            attributes: Map::new(),
            links: Map::new(),
            meta: Map::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the linkage for `name`, creating an empty one on first use.
    pub fn relationship_mut(&mut self, name: &str) -> &mut Linkage {
        let index = match self.relationships.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.relationships
                    .push((name.to_string(), Linkage::default()));
                self.relationships.len() - 1
            }
        };
        &mut self.relationships[index].1
    }

    pub fn relationship(&self, name: &str) -> Option<&Linkage> {
        self.relationships
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, linkage)| linkage)
    }

    /// Relationship names in the order they were first attached.
    pub fn relationship_names(&self) -> impl Iterator<Item = &str> {
        self.relationships.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_relationships(&self) -> bool {
        !self.relationships.is_empty()
    }
}

/// The ordered collection of child nodes attached for one relationship.
///
/// Two linkages are equal when they hold the same resources and render the same way.
#[derive(Debug, Clone, Default)]
pub struct Linkage {
    resources: Vec<ResourceNode>,
    force_list: bool,
}

impl Linkage {
    pub fn add(&mut self, node: ResourceNode) {
        self.resources.push(node);
    }

    pub fn force_resource_list(&mut self, force: bool) {
        self.force_list = force;
    }

    /// Whether the linkage renders as a list. A single child renders as a to-one
    /// resource unless the list form was forced.
    pub fn is_list(&self) -> bool {
        self.force_list || self.resources.len() != 1
    }

    pub fn resources(&self) -> &[ResourceNode] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl PartialEq for Linkage {
    fn eq(&self, other: &Self) -> bool {
        self.resources == other.resources && self.is_list() == other.is_list()
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum LinkageDataRef<'a> {
    Many(&'a [ResourceNode]),
    One(&'a ResourceNode),
}

#[derive(Serialize)]
struct LinkageRef<'a> {
    data: LinkageDataRef<'a>,
}

// Arrays are tried first: a node object never parses as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkageData {
    Many(Vec<ResourceNode>),
    One(Box<ResourceNode>),
}

#[derive(Deserialize)]
struct LinkageOwned {
    data: LinkageData,
}

impl Serialize for Linkage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = match (self.is_list(), self.resources.first()) {
            (false, Some(node)) => LinkageDataRef::One(node),
            _ => LinkageDataRef::Many(&self.resources),
        };
        LinkageRef { data }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Linkage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let linkage = match LinkageOwned::deserialize(deserializer)?.data {
            LinkageData::Many(resources) => Linkage {
                resources,
                force_list: true,
            },
            LinkageData::One(node) => Linkage {
                resources: vec![*node],
                force_list: false,
            },
        };
        Ok(linkage)
    }
}

/// Serializes the named linkages of a node as an ordered map.
mod relationship_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        relationships: &[(String, Linkage)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(relationships.iter().map(|(name, linkage)| (name, linkage)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Linkage)>, D::Error> {
        deserializer.deserialize_map(RelationshipsVisitor)
    }

    struct RelationshipsVisitor;

    impl<'de> Visitor<'de> for RelationshipsVisitor {
        type Value = Vec<(String, Linkage)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of relationship linkages")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut relationships = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Linkage>()? {
                relationships.push(entry);
            }
            Ok(relationships)
        }
    }
}
