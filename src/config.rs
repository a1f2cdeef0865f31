use crate::render::{ColorMode, RenderMode};
use serde::Deserialize;
use std::path::PathBuf;

/// User configuration loaded from config file.
/// All fields are optional — CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Message spelled out by the show
    pub message: Option<String>,
    /// Render mode
    pub render: Option<RenderModeConfig>,
    /// Color mode
    pub color: Option<ColorModeConfig>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Leave glowing trails behind sparks
    pub trails: Option<bool>,
    /// Emit smoke puffs
    pub smoke: Option<bool>,
    /// Mix spark colors from a 3-color palette per burst
    pub colorful: Option<bool>,
    /// Hide status bar
    pub clean: Option<bool>,
}

/// Render mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderModeConfig {
    Braille,
    HalfBlock,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(c: RenderModeConfig) -> Self {
        match c {
            RenderModeConfig::Braille => RenderMode::Braille,
            RenderModeConfig::HalfBlock => RenderMode::HalfBlock,
        }
    }
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

/// Get the config file path: ~/.config/skywrite/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("skywrite").join("config.toml"))
}

/// Load config from file. Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: failed to parse {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# skywrite configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Message the fireworks spell out (spaces pause the show)
# message = " Happy Every Day!"

# Render mode: braille, half-block
# render = "braille"

# Color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 60

# Leave glowing trails behind sparks
# trails = true

# Emit smoke puffs from sparks
# smoke = true

# Mix spark colors from a 3-color palette per burst
# colorful = true

# Hide status bar
# clean = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_parses_when_uncommented() {
        let uncommented: String = default_config_string()
            .lines()
            .filter(|l| l.contains(" = "))
            .map(|l| l.trim_start_matches("# ").to_string() + "\n")
            .collect();
        let config: Config = toml::from_str(&uncommented).expect("template should parse");
        assert_eq!(config.fps, Some(60));
        assert_eq!(config.trails, Some(true));
        assert_eq!(config.message.as_deref(), Some(" Happy Every Day!"));
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("fps = 30\nrender = \"half-block\"").unwrap();
        assert_eq!(config.fps, Some(30));
        assert!(matches!(config.render, Some(RenderModeConfig::HalfBlock)));
        assert!(config.message.is_none());
    }
}
