use std::collections::HashMap;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
}

/// Measures label extents so a scene's canvas can be sized
pub trait TextMeasure {
    fn measure_label(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32);
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: HashMap<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            cache: HashMap::new(),
        }
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_label(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }

        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_bold,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new()
            .family(Family::SansSerif)
            .weight(if is_bold { Weight::BOLD } else { Weight::NORMAL });

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }

        let measured = (width, height);
        self.cache.insert(key, measured);
        measured
    }
}

/// Width estimate from character count, for callers without a font system.
pub struct ApproximateMeasure {
    pub char_width_ratio: f32,
}

impl Default for ApproximateMeasure {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
        }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn measure_label(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let ratio = if is_bold {
            self.char_width_ratio * 1.1
        } else {
            self.char_width_ratio
        };
        let chars = text.chars().count() as f32;
        (chars * font_size * ratio, font_size * 1.2)
    }
}
