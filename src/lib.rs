//! Glyph and label resolution for provenance tree nodes.
//!
//! A node is resolved to exactly one glyph and one label from its event type,
//! the current-node flag, bundle membership and the cluster-label mode, then
//! drawn as an SVG fragment whose label fades in after the caller's tree
//! transition.

pub mod config;
pub mod error;
pub mod fonts;
pub mod model;
pub mod node;
pub mod raster;
pub mod resolve;
pub mod scene;
pub mod theme;
pub mod transition;
pub mod xml;

pub use error::{Error, Result};
pub use model::{
    BundleDescriptor, BundleMap, BundleNodeList, EventConfig, Glyph, ProvenanceNode,
    RenderContext, TypeGlyphs,
};
pub use node::BackboneNode;
pub use resolve::{Bundling, GlyphChoice, Presentation, Weight, resolve};
pub use scene::Scene;
pub use theme::TreeTheme;
pub use transition::{Phase, Timeline, Transition};
