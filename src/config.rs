use std::fs::File;
use std::path::Path;

use serde::Deserialize;

/// Display geometry and pixel color overrides, read from an optional JSON
/// document. Absent fields keep the reference defaults, including the
/// 320x640 window dimensions the original shipped with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(rename = "APP_W")]
    pub app_w: u32,
    #[serde(rename = "APP_H")]
    pub app_h: u32,
    #[serde(rename = "PIXEL_W")]
    pub pixel_w: u32,
    #[serde(rename = "PIXEL_H")]
    pub pixel_h: u32,
    #[serde(rename = "PIXEL_R")]
    pub pixel_r: u8,
    #[serde(rename = "PIXEL_G")]
    pub pixel_g: u8,
    #[serde(rename = "PIXEL_B")]
    pub pixel_b: u8,
    #[serde(rename = "PIXEL_A")]
    pub pixel_a: u8,
}

impl Default for DisplayConfig {
    fn default() -> DisplayConfig {
        DisplayConfig {
            app_w: 320,
            app_h: 640,
            pixel_w: 10,
            pixel_h: 10,
            pixel_r: 255,
            pixel_g: 255,
            pixel_b: 255,
            pixel_a: 255,
        }
    }
}

impl DisplayConfig {
    /// Reads the config file if present; otherwise, or on a parse error,
    /// falls back to defaults.
    pub fn load(path: &Path) -> DisplayConfig {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(_) => return DisplayConfig::default(),
        };

        match serde_json::from_reader(file) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring malformed config {}: {}", path.display(), e);
                DisplayConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.app_w, 320);
        assert_eq!(config.app_h, 640);
        assert_eq!(config.pixel_w, 10);
        assert_eq!(config.pixel_h, 10);
        assert_eq!((config.pixel_r, config.pixel_g), (255, 255));
        assert_eq!((config.pixel_b, config.pixel_a), (255, 255));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: DisplayConfig =
            serde_json::from_str(r#"{"APP_W": 1280, "PIXEL_R": 0, "PIXEL_G": 128}"#).unwrap();
        assert_eq!(config.app_w, 1280);
        assert_eq!(config.pixel_r, 0);
        assert_eq!(config.pixel_g, 128);
        // untouched fields keep defaults
        assert_eq!(config.app_h, 640);
        assert_eq!(config.pixel_b, 255);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = DisplayConfig::load(Path::new("no-such-config.json"));
        assert_eq!(config.pixel_w, 10);
    }
}
