use crate::model::{BundleMap, BundleNodeList, EventConfig, Glyph, ProvenanceNode};

/// Font weight applied around a resolved glyph or label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Normal,
    Bold,
}

impl Weight {
    pub fn bold_if(flag: bool) -> Self {
        if flag { Weight::Bold } else { Weight::Normal }
    }

    pub fn as_svg(self) -> &'static str {
        match self {
            Weight::Normal => "normal",
            Weight::Bold => "bold",
        }
    }
}

/// Which marker a node is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphChoice<'a> {
    /// Plain circle colored by the current flag.
    Default { current: bool },
    Bundle(&'a Glyph),
    Current(&'a Glyph),
    Backbone(&'a Glyph),
}

impl GlyphChoice<'_> {
    pub fn weight(&self) -> Weight {
        match self {
            GlyphChoice::Current(_) => Weight::Bold,
            _ => Weight::Normal,
        }
    }

    pub fn glyph(&self) -> Option<&Glyph> {
        match self {
            GlyphChoice::Default { .. } => None,
            GlyphChoice::Bundle(g) | GlyphChoice::Current(g) | GlyphChoice::Backbone(g) => Some(*g),
        }
    }
}

/// Bundling facts shared by glyph and label resolution
#[derive(Debug, Clone, Copy)]
pub struct Bundling<'a> {
    pub map: Option<&'a BundleMap>,
    pub node_list: &'a BundleNodeList,
    pub cluster_labels: bool,
}

impl<'a> Bundling<'a> {
    pub fn new(map: Option<&'a BundleMap>, node_list: &'a BundleNodeList, cluster_labels: bool) -> Self {
        Self {
            map,
            node_list,
            cluster_labels,
        }
    }

    fn heads_bundle(&self, id: &str) -> bool {
        self.map.is_some_and(|map| map.contains(id))
    }

    fn styled_as_bundle(&self, id: &str) -> bool {
        self.node_list.contains(id) || self.heads_bundle(id)
    }
}

/// The glyph and label chosen for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation<'a> {
    pub glyph: GlyphChoice<'a>,
    pub label: &'a str,
    /// Label weight. A bundled current node keeps its bold label.
    pub label_weight: Weight,
}

pub fn resolve<'a>(
    node: &'a ProvenanceNode,
    current: bool,
    bundling: &Bundling<'a>,
    event_config: Option<&'a EventConfig>,
) -> Presentation<'a> {
    let presentation = Presentation {
        glyph: resolve_glyph(node, current, bundling, event_config),
        label: resolve_label(node, bundling),
        label_weight: Weight::bold_if(current),
    };
    tracing::debug!(
        node = %node.id,
        glyph = ?presentation.glyph,
        label = presentation.label,
        "resolved node presentation"
    );
    presentation
}

pub fn resolve_glyph<'a>(
    node: &ProvenanceNode,
    current: bool,
    bundling: &Bundling<'_>,
    event_config: Option<&'a EventConfig>,
) -> GlyphChoice<'a> {
    let Some(config) = event_config else {
        return GlyphChoice::Default { current };
    };
    if node.is_root() {
        return GlyphChoice::Default { current };
    }
    let Some(glyphs) = node.event_type().and_then(|t| config.get(t)) else {
        return GlyphChoice::Default { current };
    };

    if bundling.styled_as_bundle(&node.id) {
        return GlyphChoice::Bundle(&glyphs.bundle_glyph);
    }
    if current {
        return GlyphChoice::Current(&glyphs.current_glyph);
    }
    GlyphChoice::Backbone(&glyphs.backbone_glyph)
}

pub fn resolve_label<'a>(node: &'a ProvenanceNode, bundling: &Bundling<'a>) -> &'a str {
    if bundling.cluster_labels {
        if let Some(bundle) = bundling.map.and_then(|map| map.get(&node.id)) {
            return &bundle.bundle_label;
        }
    }
    if !bundling.node_list.contains(&node.id) || !bundling.cluster_labels {
        return &node.label;
    }
    // Member of a bundle whose head already carries the group label.
    ""
}
