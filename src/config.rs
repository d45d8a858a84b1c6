use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::EventConfig;
use crate::xml::check_fragment;

/// Text formats accepted for glyph configuration and scene files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Toml,
    Yaml,
    Json,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("toml") => Ok(DataFormat::Toml),
            Some("yaml") | Some("yml") => Ok(DataFormat::Yaml),
            Some("json") => Ok(DataFormat::Json),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Toml => "TOML",
            DataFormat::Yaml => "YAML",
            DataFormat::Json => "JSON",
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        let parsed = match self {
            DataFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            DataFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DataFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| Error::Parse {
            format: self.name(),
            message,
        })
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl EventConfig {
    /// Parse and validate a glyph configuration.
    ///
    /// Every entry must carry all three variants (enforced while parsing) and
    /// each variant must be well-formed SVG markup.
    pub fn parse(content: &str, format: DataFormat) -> Result<Self> {
        let config: EventConfig = format.parse(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let format = DataFormat::from_path(path)?;
        let config = Self::parse(&read_file(path)?, format)?;
        tracing::info!(
            path = %path.display(),
            types = config.len(),
            "loaded glyph configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (event_type, glyphs) in self.iter() {
            let variants = [
                ("bundle_glyph", &glyphs.bundle_glyph),
                ("current_glyph", &glyphs.current_glyph),
                ("backbone_glyph", &glyphs.backbone_glyph),
            ];
            for (variant, glyph) in variants {
                check_fragment(glyph.markup()).map_err(|message| Error::MalformedGlyph {
                    event_type: event_type.to_string(),
                    variant,
                    message,
                })?;
            }
            tracing::debug!(event_type, "glyph variants validated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYPHS_TOML: &str = r##"
[Transform]
bundle_glyph = '<rect width="8" height="8" fill="#888" />'
current_glyph = '<circle r="6" fill="#268bd2" />'
backbone_glyph = '<circle r="4" fill="#ccc" />'

[Root]
bundle_glyph = '<g />'
current_glyph = '<g />'
backbone_glyph = '<g />'
"##;

    #[test]
    fn parses_toml_glyph_table() {
        let config = EventConfig::parse(GLYPHS_TOML, DataFormat::Toml).unwrap();
        assert_eq!(config.event_types().collect::<Vec<_>>(), vec!["Root", "Transform"]);
        assert_eq!(
            config.get("Transform").unwrap().current_glyph.markup(),
            r##"<circle r="6" fill="#268bd2" />"##
        );
    }

    #[test]
    fn accepts_camel_case_json() {
        let json = r#"{"Filter":{"bundleGlyph":"<g/>","currentGlyph":"<g/>","backboneGlyph":"<g/>"}}"#;
        let config = EventConfig::parse(json, DataFormat::Json).unwrap();
        assert!(config.get("Filter").is_some());
    }

    #[test]
    fn missing_variant_fails_at_load() {
        let yaml = "Transform:\n  bundle_glyph: '<g/>'\n  backbone_glyph: '<g/>'\n";
        let err = EventConfig::parse(yaml, DataFormat::Yaml).unwrap_err();
        assert!(matches!(err, Error::Parse { format: "YAML", .. }), "{err}");
    }

    #[test]
    fn malformed_markup_names_type_and_variant() {
        let json = r#"{"Filter":{"bundle_glyph":"<g/>","current_glyph":"<g>","backbone_glyph":"<g/>"}}"#;
        let err = EventConfig::parse(json, DataFormat::Json).unwrap_err();
        match err {
            Error::MalformedGlyph {
                event_type,
                variant,
                ..
            } => {
                assert_eq!(event_type, "Filter");
                assert_eq!(variant, "current_glyph");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(DataFormat::from_path(Path::new("a.YML")).unwrap(), DataFormat::Yaml);
        assert_eq!(DataFormat::from_path(Path::new("a.toml")).unwrap(), DataFormat::Toml);
        assert!(DataFormat::from_path(Path::new("a.txt")).is_err());
    }
}
