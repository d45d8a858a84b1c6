use crate::model::{BundleMap, BundleNodeList, EventConfig, ProvenanceNode, RenderContext};
use crate::resolve::{Bundling, Presentation, resolve};
use crate::theme::TreeTheme;
use crate::transition::{Timeline, Transition, render_node};

/// One backbone node together with everything needed to draw it
#[derive(Debug, Clone, Copy)]
pub struct BackboneNode<'a> {
    pub node: &'a ProvenanceNode,
    pub context: RenderContext,
    pub bundles: Option<&'a BundleMap>,
    pub bundle_nodes: &'a BundleNodeList,
    pub event_config: Option<&'a EventConfig>,
}

impl<'a> BackboneNode<'a> {
    pub fn new(node: &'a ProvenanceNode, context: RenderContext, bundle_nodes: &'a BundleNodeList) -> Self {
        Self {
            node,
            context,
            bundles: None,
            bundle_nodes,
            event_config: None,
        }
    }

    pub fn with_bundles(mut self, bundles: &'a BundleMap) -> Self {
        self.bundles = Some(bundles);
        self
    }

    pub fn with_event_config(mut self, config: &'a EventConfig) -> Self {
        self.event_config = Some(config);
        self
    }

    pub fn presentation(&self) -> Presentation<'a> {
        let bundling = Bundling::new(self.bundles, self.bundle_nodes, self.context.cluster_labels);
        resolve(self.node, self.context.current, &bundling, self.event_config)
    }

    pub fn transition(&self) -> Transition {
        Transition::enter(self.context.first, self.context.duration_ms)
    }

    pub fn render(&self, theme: &TreeTheme, timeline: Timeline) -> String {
        render_node(&self.presentation(), &self.context, theme, timeline)
    }
}
