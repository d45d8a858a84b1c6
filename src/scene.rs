use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::config::{DataFormat, read_file};
use crate::error::Result;
use crate::fonts::TextMeasure;
use crate::model::{
    BundleMap, BundleNodeList, DEFAULT_RADIUS, DEFAULT_STROKE_WIDTH, DEFAULT_TEXT_SIZE,
    EventConfig, ProvenanceNode, RenderContext,
};
use crate::node::BackboneNode;
use crate::raster::glyph_bounds;
use crate::resolve::GlyphChoice;
use crate::theme::TreeTheme;
use crate::transition::{LABEL_PADDING, Timeline, translate};
use crate::xml::escape_xml;

/// A node placed by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct SceneNode {
    #[serde(flatten)]
    pub node: ProvenanceNode,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Overrides the default of "first node in the list".
    #[serde(default)]
    pub first: Option<bool>,
}

#[derive(Debug, Clone)]
enum GlyphSource {
    Path(PathBuf),
    Inline(EventConfig),
}

impl<'de> Deserialize<'de> for GlyphSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Buffered so a bad inline table reports its own field error.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(path) => Ok(GlyphSource::Path(PathBuf::from(path))),
            table => serde_json::from_value(table)
                .map(GlyphSource::Inline)
                .map_err(|e| D::Error::custom(format!("invalid inline glyphs: {}", e))),
        }
    }
}

/// Positioned nodes plus the render context shared by all of them
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default, alias = "duration")]
    pub duration_ms: f64,
    #[serde(default = "default_cluster_labels")]
    pub cluster_labels: bool,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    #[serde(default = "default_text_size")]
    pub text_size: f32,
    #[serde(default)]
    pub bundles: BundleMap,
    /// Derived from the bundles' members when omitted.
    #[serde(default)]
    pub bundle_nodes: Option<BundleNodeList>,
    #[serde(default, rename = "glyphs")]
    glyph_source: Option<GlyphSource>,
    #[serde(skip)]
    pub event_config: Option<EventConfig>,
}

fn default_cluster_labels() -> bool {
    true
}
fn default_radius() -> f32 {
    DEFAULT_RADIUS
}
fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}
fn default_text_size() -> f32 {
    DEFAULT_TEXT_SIZE
}

/// Pixel bounds of drawn content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f32::MAX,
            min_y: f32::MAX,
            max_x: f32::MIN,
            max_y: f32::MIN,
        }
    }

    fn include(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.min_x = self.min_x.min(x0);
        self.min_y = self.min_y.min(y0);
        self.max_x = self.max_x.max(x1);
        self.max_y = self.max_y.max(y1);
    }

    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(0.0)
    }
}

impl Scene {
    /// Parse a scene. A glyph path is resolved against `base_dir`.
    pub fn parse(content: &str, format: DataFormat, base_dir: Option<&Path>) -> Result<Self> {
        let mut scene: Scene = format.parse(content)?;

        scene.event_config = match scene.glyph_source.take() {
            Some(GlyphSource::Path(path)) => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                };
                Some(EventConfig::load(&path)?)
            }
            Some(GlyphSource::Inline(config)) => {
                config.validate()?;
                Some(config)
            }
            None => None,
        };

        if let Some(current) = scene.current.as_deref() {
            if !scene.nodes.iter().any(|n| n.node.id == current) {
                tracing::warn!(current, "current node is not part of the scene");
            }
        }

        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let format = DataFormat::from_path(path)?;
        let content = read_file(path)?;
        let scene = Self::parse(&content, format, path.parent())?;
        tracing::info!(
            path = %path.display(),
            nodes = scene.nodes.len(),
            bundles = scene.bundles.len(),
            "loaded scene"
        );
        Ok(scene)
    }

    pub fn context_for(&self, index: usize) -> Option<RenderContext> {
        self.nodes
            .get(index)
            .map(|placed| self.placed_context(index, placed))
    }

    fn placed_context(&self, index: usize, placed: &SceneNode) -> RenderContext {
        RenderContext {
            first: placed.first.unwrap_or(index == 0),
            current: self.current.as_deref() == Some(placed.node.id.as_str()),
            duration_ms: self.duration_ms,
            cluster_labels: self.cluster_labels,
            radius: self.radius,
            stroke_width: self.stroke_width,
            text_size: self.text_size,
        }
    }

    /// Render every node, returning the fragment, translated so that its
    /// content starts at the origin, with its width and height.
    pub fn render<T: TextMeasure>(
        &self,
        theme: &TreeTheme,
        timeline: Timeline,
        measure: &mut T,
    ) -> (String, f32, f32) {
        if self.nodes.is_empty() {
            return ("<g></g>".to_string(), 0.0, 0.0);
        }

        let derived;
        let bundle_nodes = match &self.bundle_nodes {
            Some(list) => list,
            None => {
                derived = self.bundles.member_ids();
                &derived
            }
        };

        let mut bounds = Bounds::empty();
        let mut body = String::new();
        let mut glyph_extents: HashMap<&str, Option<Bounds>> = HashMap::new();
        let circle_extent = self.radius + self.stroke_width / 2.0;
        let circle = Bounds {
            min_x: -circle_extent,
            min_y: -circle_extent,
            max_x: circle_extent,
            max_y: circle_extent,
        };

        for (index, placed) in self.nodes.iter().enumerate() {
            let mut backbone =
                BackboneNode::new(&placed.node, self.placed_context(index, placed), bundle_nodes)
                    .with_bundles(&self.bundles);
            if let Some(config) = &self.event_config {
                backbone = backbone.with_event_config(config);
            }

            let presentation = backbone.presentation();
            let (label_w, label_h) = measure.measure_label(
                presentation.label,
                self.text_size,
                backbone.context.current,
            );
            let glyph = match presentation.glyph {
                GlyphChoice::Default { .. } => circle,
                GlyphChoice::Bundle(g) | GlyphChoice::Current(g) | GlyphChoice::Backbone(g) => {
                    let markup = g.markup();
                    let extent = *glyph_extents
                        .entry(markup)
                        .or_insert_with(|| glyph_bounds(markup));
                    extent.unwrap_or(circle)
                }
            };
            bounds.include(
                placed.x + glyph.min_x,
                placed.y + glyph.min_y,
                placed.x + glyph.max_x,
                placed.y + glyph.max_y,
            );
            bounds.include(
                placed.x + LABEL_PADDING,
                placed.y - label_h / 2.0,
                placed.x + LABEL_PADDING + label_w,
                placed.y + label_h / 2.0,
            );

            body.push_str(&format!(
                r#"<g transform="{}">{}</g>"#,
                translate(placed.x, placed.y),
                backbone.render(theme, timeline)
            ));
        }

        let svg = format!(
            r#"<g transform="{}">{}</g>"#,
            translate(-bounds.min_x, -bounds.min_y),
            body
        );
        (svg, bounds.width(), bounds.height())
    }

    /// A standalone SVG document with a background and padding.
    pub fn render_document<T: TextMeasure>(
        &self,
        theme: &TreeTheme,
        timeline: Timeline,
        measure: &mut T,
        padding: f32,
    ) -> String {
        let (inner, width, height) = self.render(theme, timeline, measure);
        let total_w = width + padding * 2.0;
        let total_h = height + padding * 2.0;

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_w:.2}" height="{total_h:.2}" viewBox="0 0 {total_w:.2} {total_h:.2}">
<rect width="{total_w:.2}" height="{total_h:.2}" fill="{background}"/>
<g transform="{offset}">
{inner}
</g>
</svg>"#,
            total_w = total_w,
            total_h = total_h,
            background = escape_xml(&theme.background_color),
            offset = translate(padding, padding),
            inner = inner,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::ApproximateMeasure;

    const SCENE_TOML: &str = r#"
current = "n3"
duration = 400
cluster_labels = true

[[nodes]]
id = "root"
label = "Root"
metadata = { type = "Root" }

[[nodes]]
id = "n1"
label = "Filter"
metadata = { type = "Transform" }
y = 20

[[nodes]]
id = "n2"
label = "Sort"
metadata = { type = "Transform" }
y = 40

[[nodes]]
id = "n3"
label = "Select"
metadata = { type = "Transform" }
y = 60

[bundles.n1]
bundle_label = "2 steps"
bunched_nodes = ["n1", "n2"]

[glyphs.Transform]
bundle_glyph = '<rect id="bundle" />'
current_glyph = '<rect id="current" />'
backbone_glyph = '<rect id="backbone" />'
"#;

    fn scene() -> Scene {
        Scene::parse(SCENE_TOML, DataFormat::Toml, None).unwrap()
    }

    #[test]
    fn parses_inline_glyphs_and_bundles() {
        let scene = scene();
        assert_eq!(scene.nodes.len(), 4);
        assert_eq!(scene.duration_ms, 400.0);
        assert_eq!(scene.nodes[2].y, 40.0);
        assert_eq!(scene.nodes[1].node.event_type(), Some("Transform"));
        assert!(scene.event_config.as_ref().unwrap().get("Transform").is_some());
        assert!(scene.bundle_nodes.is_none());
    }

    #[test]
    fn first_and_current_come_from_scene() {
        let scene = scene();
        let root = scene.context_for(0).unwrap();
        assert!(root.first);
        assert!(!root.current);
        let selected = scene.context_for(3).unwrap();
        assert!(!selected.first);
        assert!(selected.current);
        assert_eq!(selected.duration_ms, 400.0);
        assert!(scene.context_for(4).is_none());
    }

    #[test]
    fn canvas_covers_glyphs_larger_than_radius() {
        let content = r#"
[[nodes]]
id = "big"
label = ""
metadata = { type = "Transform" }

[glyphs.Transform]
bundle_glyph = '<rect x="-40" y="-40" width="80" height="80" />'
current_glyph = '<rect x="-40" y="-40" width="80" height="80" />'
backbone_glyph = '<rect x="-40" y="-40" width="80" height="80" />'
"#;
        let scene = Scene::parse(content, DataFormat::Toml, None).unwrap();
        let (svg, width, height) =
            scene.render(&TreeTheme::github_light(), Timeline::Animated, &mut ApproximateMeasure::default());
        assert!(width >= 80.0 - 0.01, "width {width}");
        assert!(height >= 80.0 - 0.01, "height {height}");
        assert!(svg.starts_with(r#"<g transform="translate(40.00,40.00)">"#), "{svg}");
    }

    #[test]
    fn inline_glyphs_missing_a_variant_name_the_field() {
        let content = r#"
[glyphs.Transform]
bundle_glyph = '<g />'
backbone_glyph = '<g />'
"#;
        let err = Scene::parse(content, DataFormat::Toml, None).unwrap_err();
        assert!(err.to_string().contains("current_glyph"), "{err}");
    }

    #[test]
    fn render_derives_bundle_members() {
        let scene = scene();
        let (svg, width, height) =
            scene.render(&TreeTheme::github_light(), Timeline::At(10_000.0), &mut ApproximateMeasure::default());

        // n1 heads the bundle, n2 is a silent member, n3 is current
        assert!(svg.contains(">2 steps</text>"), "{svg}");
        assert!(!svg.contains(">Sort</text>"));
        assert_eq!(svg.matches(r#"id="bundle""#).count(), 2);
        assert_eq!(svg.matches(r#"id="current""#).count(), 1);
        assert!(!svg.contains(r#"id="backbone""#));
        assert!(svg.contains(">Root</text>"));
        assert!(width > LABEL_PADDING);
        assert!(height >= 60.0);
    }

    #[test]
    fn empty_scene_renders_empty_group() {
        let scene = Scene::parse("", DataFormat::Toml, None).unwrap();
        let (svg, w, h) =
            scene.render(&TreeTheme::github_light(), Timeline::Animated, &mut ApproximateMeasure::default());
        assert_eq!(svg, "<g></g>");
        assert_eq!((w, h), (0.0, 0.0));
    }

    #[test]
    fn document_has_padding_and_background() {
        let scene = scene();
        let theme = TreeTheme::github_light();
        let doc = scene.render_document(&theme, Timeline::Animated, &mut ApproximateMeasure::default(), 20.0);
        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(doc.contains(&format!(r#"fill="{}""#, theme.background_color)));
        assert!(doc.contains("translate(20.00,20.00)"));
        assert!(doc.contains("<animate"));
    }

    #[test]
    fn rejects_malformed_inline_glyphs() {
        let content = r#"
[glyphs.Transform]
bundle_glyph = '<rect>'
current_glyph = '<g />'
backbone_glyph = '<g />'
"#;
        assert!(Scene::parse(content, DataFormat::Toml, None).is_err());
    }
}
