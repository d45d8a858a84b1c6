use std::path::Path;

use serde::{Deserialize, Serialize};

const GITHUB_LIGHT_BACKGROUND: &str = "#ffffff";
const GITHUB_LIGHT_TEXT: &str = "#24292f";
const GITHUB_LIGHT_ACCENT: &str = "#0969da";
const GITHUB_LIGHT_MUTED: &str = "#6e7781";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("github_light", include_str!("../themes/github_light.toml")),
    ("nord", include_str!("../themes/nord.toml")),
    ("solarized_dark", include_str!("../themes/solarized_dark.toml")),
    ("solarized_light", include_str!("../themes/solarized_light.toml")),
];

const FONT_FAMILY: &str = "sans-serif";

/// Colors used to draw tree nodes and their labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeTheme {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_node_fill")]
    pub node_fill: String,
    #[serde(default = "default_current_fill")]
    pub current_node_fill: String,
    #[serde(default = "default_node_stroke")]
    pub node_stroke: String,
    #[serde(default = "default_label")]
    pub label_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_background() -> String {
    GITHUB_LIGHT_BACKGROUND.to_string()
}
fn default_node_fill() -> String {
    GITHUB_LIGHT_BACKGROUND.to_string()
}
fn default_current_fill() -> String {
    GITHUB_LIGHT_ACCENT.to_string()
}
fn default_node_stroke() -> String {
    GITHUB_LIGHT_MUTED.to_string()
}
fn default_label() -> String {
    GITHUB_LIGHT_TEXT.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}

impl Default for TreeTheme {
    fn default() -> Self {
        Self::from_builtin("solarized_light").unwrap_or_else(|_| Self::github_light())
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    blue: String,
    white: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl TreeTheme {
    pub fn github_light() -> Self {
        TreeTheme {
            background_color: default_background(),
            node_fill: default_node_fill(),
            current_node_fill: default_current_fill(),
            node_stroke: default_node_stroke(),
            label_color: default_label(),
            font_family: default_font_family(),
        }
    }

    /// Fill for the default circular marker.
    pub fn tree_color(&self, current: bool) -> &str {
        if current {
            &self.current_node_fill
        } else {
            &self.node_fill
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, String> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                format!(
                    "Unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                )
            })?;
        Self::from_alacritty_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    /// Resolve a `--theme` argument: a file path if one exists, otherwise a
    /// built-in name.
    pub fn load(name_or_path: &str) -> Result<Self, String> {
        let path = Path::new(name_or_path);
        if !path.is_file() {
            return Self::from_builtin(name_or_path);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file: {}", e))?;

        // Alacritty TOML, then Alacritty YAML, then a native palette file
        if let Ok(theme) = Self::from_alacritty_toml(&content) {
            return Ok(theme);
        }
        if let Ok(theme) = Self::from_alacritty_yaml(&content) {
            return Ok(theme);
        }
        if let Ok(theme) = toml::from_str::<TreeTheme>(&content) {
            return Ok(theme);
        }
        Err(format!(
            "Failed to parse theme file {} as TOML or YAML",
            path.display()
        ))
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty YAML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty TOML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;

        TreeTheme {
            node_fill: colors.primary.background.clone(),
            background_color: colors.primary.background,
            current_node_fill: colors.normal.blue,
            node_stroke: colors.normal.white,
            label_color: colors.primary.foreground,
            font_family: default_font_family(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TreeTheme;

    #[test]
    fn from_builtin_accepts_hyphenated_and_case_insensitive_names() {
        let underscore = TreeTheme::from_builtin("solarized_light").expect("underscore variant");
        let hyphen = TreeTheme::from_builtin("Solarized-Light").expect("hyphen variant");

        assert_eq!(underscore, hyphen);
    }

    #[test]
    fn every_builtin_parses() {
        for name in TreeTheme::list_builtins() {
            TreeTheme::from_builtin(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn tree_color_distinguishes_current_node() {
        let theme = TreeTheme::github_light();
        assert_eq!(theme.tree_color(true), "#0969da");
        assert_eq!(theme.tree_color(false), "#ffffff");
    }

    #[test]
    fn unknown_builtin_lists_alternatives() {
        let err = TreeTheme::from_builtin("paper").unwrap_err();
        assert!(err.contains("solarized_light"));
    }
}
