use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Event type tag reserved for the tree root.
pub const ROOT_EVENT_TYPE: &str = "Root";

/// Metadata carried by a provenance node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// A node of the provenance tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl ProvenanceNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.metadata.event_type = Some(event_type.into());
        self
    }

    pub fn event_type(&self) -> Option<&str> {
        self.metadata.event_type.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.event_type() == Some(ROOT_EVENT_TYPE)
    }
}

/// A collapsed group of nodes shown through one representative node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleDescriptor {
    #[serde(alias = "bundleLabel")]
    pub bundle_label: String,
    #[serde(default, alias = "bunchedNodes")]
    pub bunched_nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl BundleDescriptor {
    pub fn new(bundle_label: impl Into<String>) -> Self {
        Self {
            bundle_label: bundle_label.into(),
            ..Self::default()
        }
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bunched_nodes = members.into_iter().map(Into::into).collect();
        self
    }
}

/// Bundle descriptors keyed by the id of the node that heads each bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleMap(HashMap<String, BundleDescriptor>);

impl BundleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, bundle: BundleDescriptor) {
        self.0.insert(id.into(), bundle);
    }

    pub fn get(&self, id: &str) -> Option<&BundleDescriptor> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every node id collapsed into some bundle.
    pub fn member_ids(&self) -> BundleNodeList {
        self.0
            .values()
            .flat_map(|bundle| bundle.bunched_nodes.iter().cloned())
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, BundleDescriptor)> for BundleMap {
    fn from_iter<T: IntoIterator<Item = (K, BundleDescriptor)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Ids of nodes drawn with bundle styling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleNodeList(HashSet<String>);

impl BundleNodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for BundleNodeList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// An SVG markup fragment used as a node marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glyph(String);

impl Glyph {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn markup(&self) -> &str {
        &self.0
    }
}

/// The three renderings configured for one event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeGlyphs {
    #[serde(alias = "bundleGlyph")]
    pub bundle_glyph: Glyph,
    #[serde(alias = "currentGlyph")]
    pub current_glyph: Glyph,
    #[serde(alias = "backboneGlyph")]
    pub backbone_glyph: Glyph,
}

/// Glyph renderings keyed by event type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventConfig(BTreeMap<String, TypeGlyphs>);

impl EventConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event_type: impl Into<String>, glyphs: TypeGlyphs) {
        self.0.insert(event_type.into(), glyphs);
    }

    pub fn get(&self, event_type: &str) -> Option<&TypeGlyphs> {
        self.0.get(event_type)
    }

    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeGlyphs)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub const DEFAULT_RADIUS: f32 = 5.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const DEFAULT_TEXT_SIZE: f32 = 15.0;

/// Per-render parameters for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// No entry delay when set.
    pub first: bool,
    pub current: bool,
    /// Caller's tree transition time in milliseconds.
    pub duration_ms: f64,
    pub cluster_labels: bool,
    pub radius: f32,
    pub stroke_width: f32,
    pub text_size: f32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            first: false,
            current: false,
            duration_ms: 0.0,
            cluster_labels: true,
            radius: DEFAULT_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_ids_flattens_every_bundle() {
        let bundles: BundleMap = [
            ("a", BundleDescriptor::new("2 steps").with_members(["a", "b"])),
            ("c", BundleDescriptor::new("3 steps").with_members(["c", "d", "e"])),
        ]
        .into_iter()
        .collect();

        let members = bundles.member_ids();
        assert_eq!(members.len(), 5);
        for id in ["a", "b", "c", "d", "e"] {
            assert!(members.contains(id), "missing {id}");
        }
    }

    #[test]
    fn node_type_is_read_from_metadata() {
        let json = r#"{"id":"n1","label":"Filter","metadata":{"type":"Transform"}}"#;
        let node: ProvenanceNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.event_type(), Some("Transform"));
        assert!(!node.is_root());

        let root = ProvenanceNode::new("r", "Root").with_type(ROOT_EVENT_TYPE);
        assert!(root.is_root());
    }

    #[test]
    fn bundle_descriptor_accepts_camel_case_keys() {
        let json = r#"{"bundleLabel":"3 steps","bunchedNodes":["x","y"]}"#;
        let bundle: BundleDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.bundle_label, "3 steps");
        assert_eq!(bundle.bunched_nodes, vec!["x", "y"]);
    }
}
