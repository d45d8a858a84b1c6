use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};
use crate::scene::Bounds;

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::Render(format!("Invalid PNG scale: {}", scale)));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        configure_font_fallbacks(fontdb);
    }

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Render(format!("Failed to parse SVG: {}", e)))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| Error::Render("Failed to create pixmap".to_string()))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::Render(format!("Failed to encode PNG: {}", e)))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    configure_font_fallbacks_svg2pdf(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Render(format!("Failed to parse SVG: {}", e)))?;

    // Labels as paths keep PDFs readable when font embedding fails.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::Render(format!("Failed to convert SVG to PDF: {}", e)))
}

/// Stroke-inclusive bounds of a glyph fragment in its own coordinates.
///
/// `None` when the markup draws nothing or usvg cannot parse it.
pub fn glyph_bounds(markup: &str) -> Option<Bounds> {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1">{}</svg>"#,
        markup
    );
    let tree = match usvg::Tree::from_str(&svg, &usvg::Options::default()) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!(error = %e, "glyph markup not measurable");
            return None;
        }
    };
    if !tree.root().has_children() {
        return None;
    }

    let rect = tree.root().abs_stroke_bounding_box();
    Some(Bounds {
        min_x: rect.left(),
        min_y: rect.top(),
        max_x: rect.right(),
        max_y: rect.bottom(),
    })
}

fn pick_families<'a, I>(families: I) -> (Option<String>, Option<String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for family in families {
        if first_family.is_none() {
            first_family = Some(family.to_string());
        }
        if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
            sans_family = Some(family.to_string());
        }
    }

    (sans_family, first_family)
}

fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let (sans, first) = pick_families(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
    );
    if let Some(family) = sans.or(first) {
        fontdb.set_sans_serif_family(family.as_str());
        fontdb.set_serif_family(family.as_str());
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let (sans, first) = pick_families(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
    );
    if let Some(family) = sans.or(first) {
        fontdb.set_sans_serif_family(family.as_str());
        fontdb.set_serif_family(family.as_str());
    }
}
