//! Editor and proxy configuration.
//!
//! Loaded from a TOML file (`gallery.toml` by default). Stock defaults are
//! serialized to a TOML table, the user file is merged on top, and the
//! result is deserialized and validated. A missing file means "all defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [grid]
//! system = "simple"         # "simple" (3 columns) or "dense" (9 columns)
//! gap = 8.0                 # Gap between cells, px
//! container_width = 1200.0  # Grid container width, px
//! dense_packing = true      # Backfill holes like `grid-auto-flow: row dense`
//!
//! [gestures]
//! drag_threshold = 8.0      # Pointer travel before a press becomes a drag, px
//! dead_zone = 0.2           # Fraction of target width around its centre
//! hysteresis = 15.0         # Margin a new drop target must win by, px
//!
//! [storage]
//! dir = ".gallery-layouts"  # Local layout records
//!
//! [proxy]
//! bind = "127.0.0.1:8787"
//! content_dir = "content"
//! secret_env = "GALLERY_LAYOUT_SECRET"
//! max_body_bytes = 1048576
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::grid::GridSystem;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Grid system and container measurements.
    pub grid: GridConfig,
    /// Gesture recognition tuning.
    pub gestures: GestureConfig,
    /// Local layout storage.
    pub storage: StorageConfig,
    /// Layout proxy settings.
    pub proxy: ProxyConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.gap >= 0.0) {
            return Err(ConfigError::Validation("grid.gap must be >= 0".into()));
        }
        if !(self.grid.container_width > 0.0) {
            return Err(ConfigError::Validation(
                "grid.container_width must be > 0".into(),
            ));
        }
        if !(self.gestures.drag_threshold >= 0.0) {
            return Err(ConfigError::Validation(
                "gestures.drag_threshold must be >= 0".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.gestures.dead_zone) {
            return Err(ConfigError::Validation(
                "gestures.dead_zone must be in [0, 0.5)".into(),
            ));
        }
        if !(self.gestures.hysteresis >= 0.0) {
            return Err(ConfigError::Validation(
                "gestures.hysteresis must be >= 0".into(),
            ));
        }
        if self.proxy.max_body_bytes == 0 {
            return Err(ConfigError::Validation(
                "proxy.max_body_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub system: GridSystem,
    pub gap: f64,
    pub container_width: f64,
    pub dense_packing: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            system: GridSystem::Simple,
            gap: 8.0,
            container_width: 1200.0,
            dense_packing: true,
        }
    }
}

/// Thresholds for telling clicks, drags, crops and resizes apart.
///
/// The reorder constants were tuned by hand against flicker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Euclidean pointer travel (px) before a press is classified.
    pub drag_threshold: f64,
    /// Half-width of the no-switch band around a target's centre, as a
    /// fraction of the target's width.
    pub dead_zone: f64,
    /// A new nearest tile must be this much closer (px) than the current
    /// target before the target switches.
    pub hysteresis: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 8.0,
            dead_zone: 0.2,
            hysteresis: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: ".gallery-layouts".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// Socket address the proxy listens on.
    pub bind: String,
    /// Directory the content source reads galleries from.
    pub content_dir: String,
    /// Environment variable holding the bearer secret for `PUT`.
    pub secret_env: String,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            content_dir: "content".to_string(),
            secret_env: "GALLERY_LAYOUT_SECRET".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl ProxyConfig {
    /// Bearer secret from the environment. Empty values count as unset.
    pub fn secret(&self) -> Option<String> {
        std::env::var(&self.secret_env)
            .ok()
            .filter(|s| !s.trim().is_empty())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file on top of stock defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Layout Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Grid
# ---------------------------------------------------------------------------
[grid]
# "simple": 3 columns, sizes 1, 2, "2x2", 3, "tall".
# "dense": 9 columns, sizes grouped into square / horizontal / vertical.
system = "simple"

# Gap between grid cells, in pixels.
gap = 8.0

# Width of the grid container, in pixels. Cells are square.
container_width = 1200.0

# Backfill holes left by wide tiles (CSS `grid-auto-flow: row dense`).
dense_packing = true

# ---------------------------------------------------------------------------
# Gestures
# ---------------------------------------------------------------------------
[gestures]
# Pointer travel, in pixels, before a press turns into a drag or crop.
drag_threshold = 8.0

# While reordering, the band around a target's centre (as a fraction of its
# width) in which the drop side does not flip.
dead_zone = 0.2

# A different tile must be this many pixels closer than the current drop
# target before the target switches.
hysteresis = 15.0

# ---------------------------------------------------------------------------
# Local storage
# ---------------------------------------------------------------------------
[storage]
# Directory holding one saved layout per gallery.
dir = ".gallery-layouts"

# ---------------------------------------------------------------------------
# Layout proxy
# ---------------------------------------------------------------------------
[proxy]
bind = "127.0.0.1:8787"

# Galleries: <content_dir>/<id>.json or <content_dir>/<id>/ image folders.
content_dir = "content"

# Environment variable holding the bearer secret required for PUT.
secret_env = "GALLERY_LAYOUT_SECRET"

# Largest accepted request body, in bytes.
max_body_bytes = 1048576
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.grid.system, GridSystem::Simple);
        assert_eq!(config.gestures.drag_threshold, 8.0);
        assert_eq!(config.gestures.dead_zone, 0.2);
        assert_eq!(config.gestures.hysteresis, 15.0);
        assert_eq!(config.proxy.bind, "127.0.0.1:8787");
    }

    #[test]
    fn parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
[grid]
system = "dense"
"#,
        )
        .unwrap();
        assert_eq!(config.grid.system, GridSystem::Dense);
        assert_eq!(config.grid.gap, 8.0);
        assert_eq!(config.storage.dir, ".gallery-layouts");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("gallery.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(
            &path,
            r#"
[gestures]
hysteresis = 25.0

[proxy]
bind = "0.0.0.0:9000"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.gestures.hysteresis, 25.0);
        assert_eq!(config.gestures.drag_threshold, 8.0);
        assert_eq!(config.proxy.bind, "0.0.0.0:9000");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[gestures]
hysterisis = 10.0
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_grid_system_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[grid]
system = "masonry"
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_dead_zone_range() {
        let mut config = Config::default();
        config.gestures.dead_zone = 0.5;
        assert!(config.validate().is_err());
        config.gestures.dead_zone = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_measurements() {
        let mut config = Config::default();
        config.grid.gap = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.grid.container_width = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gestures.hysteresis = -5.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hysteresis"));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(
            &path,
            r#"
[proxy]
max_body_bytes = 0
"#,
        )
        .unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml / stock config
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[grid]
gap = 8.0
system = "simple"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[grid]
gap = 4.0
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let grid = merged.get("grid").unwrap();
        assert_eq!(grid.get("gap").unwrap().as_float(), Some(4.0));
        assert_eq!(grid.get("system").unwrap().as_str(), Some("simple"));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["grid", "gestures", "storage", "proxy"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }
}
