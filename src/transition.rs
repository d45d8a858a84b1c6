use crate::model::RenderContext;
use crate::resolve::{GlyphChoice, Presentation};
use crate::theme::TreeTheme;
use crate::xml::escape_xml;

/// Length of the label fade-in.
pub const ENTER_DURATION_MS: f64 = 100.0;
/// Horizontal gap between the glyph anchor and the label.
pub const LABEL_PADDING: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Opacity is still at or below its target, delay included.
    Entering,
    Settled,
}

/// Opacity animation applied to a node's label group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: f32,
    pub to: f32,
    pub duration_ms: f64,
    pub delay_ms: f64,
}

impl Transition {
    /// Entry fade for a node. The first node drawn starts at once; later ones
    /// wait out the caller's tree transition.
    pub fn enter(first: bool, duration_ms: f64) -> Self {
        let delay_ms = if first || !duration_ms.is_finite() {
            0.0
        } else {
            duration_ms.max(0.0)
        };
        Self {
            from: 0.0,
            to: 1.0,
            duration_ms: ENTER_DURATION_MS,
            delay_ms,
        }
    }

    pub fn settled_at(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }

    pub fn phase_at(&self, elapsed_ms: f64) -> Phase {
        if elapsed_ms >= self.settled_at() {
            Phase::Settled
        } else {
            Phase::Entering
        }
    }

    /// Linear interpolation from `from` to `to` after the delay.
    pub fn opacity_at(&self, elapsed_ms: f64) -> f32 {
        let t = elapsed_ms - self.delay_ms;
        if t.is_nan() || t <= 0.0 {
            return self.from;
        }
        if t >= self.duration_ms {
            return self.to;
        }
        let progress = (t / self.duration_ms) as f32;
        self.from + (self.to - self.from) * progress
    }
}

/// How the label fade is written into the SVG
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Timeline {
    /// SMIL `<animate>`, played by the viewer.
    #[default]
    Animated,
    /// Opacity frozen at this many milliseconds after mount.
    At(f64),
}

pub fn translate(x: f32, y: f32) -> String {
    format!("translate({:.2},{:.2})", x, y)
}

fn render_glyph(glyph: &GlyphChoice<'_>, ctx: &RenderContext, theme: &TreeTheme) -> String {
    match glyph {
        GlyphChoice::Default { current } => format!(
            r#"<circle r="{:.2}" stroke-width="{:.2}" fill="{}" stroke="{}" />"#,
            ctx.radius,
            ctx.stroke_width,
            escape_xml(theme.tree_color(*current)),
            escape_xml(&theme.node_stroke),
        ),
        GlyphChoice::Bundle(g) | GlyphChoice::Current(g) | GlyphChoice::Backbone(g) => format!(
            r#"<g font-weight="{}">{}</g>"#,
            glyph.weight().as_svg(),
            g.markup()
        ),
    }
}

/// Render a resolved node as an SVG fragment anchored at the origin.
///
/// The glyph is drawn as-is; only the label group fades in.
pub fn render_node(
    presentation: &Presentation<'_>,
    ctx: &RenderContext,
    theme: &TreeTheme,
    timeline: Timeline,
) -> String {
    let transition = Transition::enter(ctx.first, ctx.duration_ms);
    let mut svg = String::from(r#"<g class="backbone-node">"#);

    svg.push_str(&render_glyph(&presentation.glyph, ctx, theme));

    let (opacity, animate) = match timeline {
        Timeline::Animated => (
            transition.from,
            format!(
                r#"<animate attributeName="opacity" from="{}" to="{}" begin="{}ms" dur="{}ms" fill="freeze" />"#,
                transition.from, transition.to, transition.delay_ms, transition.duration_ms
            ),
        ),
        Timeline::At(elapsed_ms) => (transition.opacity_at(elapsed_ms), String::new()),
    };

    svg.push_str(&format!(
        r#"<g opacity="{:.3}" transform="{}">{}"#,
        opacity,
        translate(LABEL_PADDING, 0.0),
        animate
    ));
    svg.push_str(&format!(
        r#"<text dominant-baseline="middle" text-anchor="start" font-family="{}" font-size="{:.1}" font-weight="{}" fill="{}">{}</text>"#,
        escape_xml(&theme.font_family),
        ctx.text_size,
        presentation.label_weight.as_svg(),
        escape_xml(&theme.label_color),
        escape_xml(presentation.label)
    ));
    svg.push_str("</g></g>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Glyph;
    use crate::resolve::Weight;
    use proptest::prelude::*;

    fn presentation<'a>(glyph: GlyphChoice<'a>, label: &'a str, current: bool) -> Presentation<'a> {
        Presentation {
            glyph,
            label,
            label_weight: Weight::bold_if(current),
        }
    }

    #[test]
    fn first_node_has_no_delay() {
        let t = Transition::enter(true, 750.0);
        assert_eq!(t.delay_ms, 0.0);
        assert_eq!(t.duration_ms, ENTER_DURATION_MS);
    }

    #[test]
    fn later_nodes_wait_for_caller_duration() {
        let t = Transition::enter(false, 750.0);
        assert_eq!(t.delay_ms, 750.0);
        assert_eq!(t.opacity_at(749.0), 0.0);
        assert_eq!(t.phase_at(800.0), Phase::Entering);
        assert!((t.opacity_at(800.0) - 0.5).abs() < 1e-6);
        assert_eq!(t.opacity_at(850.0), 1.0);
        assert_eq!(t.phase_at(850.0), Phase::Settled);
    }

    #[test]
    fn invalid_duration_means_no_delay() {
        assert_eq!(Transition::enter(false, -20.0).delay_ms, 0.0);
        assert_eq!(Transition::enter(false, f64::NAN).delay_ms, 0.0);
        assert_eq!(Transition::enter(false, f64::INFINITY).delay_ms, 0.0);
    }

    #[test]
    fn animated_label_fades_in_after_delay() {
        let theme = TreeTheme::github_light();
        let ctx = RenderContext {
            duration_ms: 500.0,
            ..RenderContext::default()
        };
        let svg = render_node(
            &presentation(GlyphChoice::Default { current: false }, "Filter", false),
            &ctx,
            &theme,
            Timeline::Animated,
        );
        assert!(svg.contains(r#"begin="500ms" dur="100ms""#), "{svg}");
        assert!(svg.contains(r#"<g opacity="0.000" transform="translate(15.00,0.00)">"#));
        assert!(svg.contains(">Filter</text>"));
        assert!(svg.contains(r#"font-weight="normal""#));
        // glyph precedes the fading group and is never wrapped by it
        let circle = svg.find("<circle").unwrap();
        let group = svg.find("<g opacity").unwrap();
        assert!(circle < group);
    }

    #[test]
    fn current_default_glyph_uses_current_fill_and_bold_label() {
        let theme = TreeTheme::github_light();
        let ctx = RenderContext {
            current: true,
            first: true,
            radius: 7.0,
            ..RenderContext::default()
        };
        let svg = render_node(
            &presentation(GlyphChoice::Default { current: true }, "Load", true),
            &ctx,
            &theme,
            Timeline::At(1000.0),
        );
        assert!(svg.contains(r#"<circle r="7.00""#));
        assert!(svg.contains(&format!(r#"fill="{}""#, theme.current_node_fill)));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r#"opacity="1.000""#));
        assert!(!svg.contains("<animate"));
    }

    #[test]
    fn typed_glyph_is_wrapped_with_its_weight() {
        let theme = TreeTheme::github_light();
        let ctx = RenderContext::default();
        let glyph = Glyph::new(r#"<rect width="4" height="4" />"#);
        let svg = render_node(
            &presentation(GlyphChoice::Current(&glyph), "a<b", true),
            &ctx,
            &theme,
            Timeline::Animated,
        );
        assert!(svg.contains(r#"<g font-weight="bold"><rect width="4" height="4" /></g>"#));
        assert!(svg.contains(">a&lt;b</text>"));
    }

    proptest! {
        #[test]
        fn opacity_is_monotonic_and_settles(
            first in any::<bool>(),
            duration in 0.0f64..5000.0,
            a in 0.0f64..10000.0,
            b in 0.0f64..10000.0,
        ) {
            let t = Transition::enter(first, duration);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.opacity_at(lo) <= t.opacity_at(hi));
            prop_assert_eq!(t.opacity_at(0.0), 0.0);
            prop_assert_eq!(t.opacity_at(t.settled_at()), 1.0);
            prop_assert_eq!(t.delay_ms, if first { 0.0 } else { duration });
        }
    }
}
