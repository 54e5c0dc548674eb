//! Shrink configuration.
//!
//! Handles loading, validating, and merging `shrink.toml`. Stock defaults are
//! the base layer; a user file overrides any subset of keys; command-line
//! flags override both. The merged result is validated once, before any
//! image is touched.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [sizes]
//! landscape_width = 500        # Max width for landscape (and square) images
//! landscape_keep_small = true  # Leave narrower landscapes untouched
//! portrait_width = 200         # Width every portrait image is set to
//! portrait_keep_small = true   # Leave narrower portraits untouched
//!
//! [compression]
//! use_lossless = false             # PNG output instead of JPEG
//! jpeg_quality = 95                # Base JPEG quality (1-100)
//! skip_if_optimal = true           # Copy files that already fit unchanged
//! use_advanced_compression = true  # Progressive/trellis JPEG + adaptive quality
//! max_size_bytes = 71680           # Output size budget (70 KB)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default size budget: 70 KB.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 70 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShrinkConfig {
    /// Orientation-aware width rules.
    pub sizes: SizeSettings,
    /// Encoder choice, quality and size budget.
    pub compression: CompressionOptions,
}

impl ShrinkConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.compression;
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "compression.jpeg_quality must be 1-100, got {}",
                c.jpeg_quality
            )));
        }
        if c.max_size_bytes == 0 {
            return Err(ConfigError::Validation(
                "compression.max_size_bytes must be positive".into(),
            ));
        }
        if self.sizes.landscape_width == 0 {
            return Err(ConfigError::Validation(
                "sizes.landscape_width must be positive".into(),
            ));
        }
        if self.sizes.portrait_width == 0 {
            return Err(ConfigError::Validation(
                "sizes.portrait_width must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Orientation-aware target width rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeSettings {
    /// Maximum width for landscape and square images.
    pub landscape_width: u32,
    /// Keep landscapes narrower than `landscape_width` at their size.
    pub landscape_keep_small: bool,
    /// Width every portrait image is set to.
    pub portrait_width: u32,
    /// Keep portraits narrower than `portrait_width` at their size.
    pub portrait_keep_small: bool,
}

impl Default for SizeSettings {
    fn default() -> Self {
        Self {
            landscape_width: 500,
            landscape_keep_small: true,
            portrait_width: 200,
            portrait_keep_small: true,
        }
    }
}

/// Encoder selection and size budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionOptions {
    /// Write lossless PNG instead of JPEG.
    pub use_lossless: bool,
    /// Base JPEG quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    /// Copy inputs that need neither resizing nor compression.
    pub skip_if_optimal: bool,
    /// Use the tuned JPEG encoder and the adaptive quality curve.
    pub use_advanced_compression: bool,
    /// Target upper bound for each output file.
    pub max_size_bytes: u64,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            use_lossless: false,
            jpeg_quality: 95,
            skip_if_optimal: true,
            use_advanced_compression: true,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ShrinkConfig::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
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
) -> Result<ShrinkConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ShrinkConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `shrink.toml`, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<ShrinkConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Returns a fully-commented stock `shrink.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Shrink Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output dimensions
# ---------------------------------------------------------------------------
[sizes]
# Landscape (and square) images are shrunk to at most this width.
landscape_width = 500

# Leave landscape images narrower than landscape_width at their size.
landscape_keep_small = true

# Portrait images are set to exactly this width.
portrait_width = 200

# Leave portrait images narrower than portrait_width at their size.
# When false, narrow portraits are enlarged to portrait_width.
portrait_keep_small = true

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Write lossless PNG (maximum compression, palette when possible) instead of JPEG.
use_lossless = false

# Base JPEG quality (1 = worst, 100 = best).
jpeg_quality = 95

# Copy images that already fit the size rules and the budget unchanged.
skip_if_optimal = true

# Progressive, trellis-quantized JPEG with quality adapted to the budget.
use_advanced_compression = true

# Output size budget in bytes (70 KB).
max_size_bytes = 71680
"##
}
