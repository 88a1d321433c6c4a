//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default digest options, overridden by positional words on the command
/// line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// `all` or `onscreen`.
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default)]
    pub include_position: bool,

    /// Maximum characters per text node.
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            include_position: false,
            text_limit: default_text_limit(),
        }
    }
}

fn default_mode() -> String {
    "all".to_string()
}

fn default_text_limit() -> usize {
    100
}

/// Viewport used when a snapshot does not declare one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: u32,

    #[serde(default = "default_viewport_height")]
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rotated log files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.digest.mode, "all");
        assert!(!config.digest.include_position);
        assert_eq!(config.digest.text_limit, 100);
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: Config = toml::from_str(
            r#"
            [digest]
            mode = "onscreen"

            [viewport]
            height = 900
            "#,
        )
        .unwrap();
        assert_eq!(config.digest.mode, "onscreen");
        assert_eq!(config.digest.text_limit, 100);
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 900);
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.digest.mode, config.digest.mode);
        assert_eq!(parsed.viewport.width, config.viewport.width);
    }
}
