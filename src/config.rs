//! # Analysis Configuration
//!
//! This module defines the configuration for a trajectory analysis run:
//! labeling thresholds, axis inversion, CSV column mapping and preprocessing.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [thresholds]
//! x = 60.0
//! y = 60.0
//! z = 60.0
//! main_direction = 5
//!
//! [axes]
//! invert_x = false
//!
//! [input]
//! col_x = 1
//! col_y = 2
//! col_z = 3
//! header = 1
//!
//! [preprocess]
//! smooth = true
//! interpolate = true
//! interdist = 0.5
//! ```
//!
//! - Every section and field is optional and falls back to the defaults above.
//! - Thresholds are angles in degrees between 0 and 90; `main_direction` is a
//!   step count and must be at least 1.
//!
//! ## Example: Rust Usage
//!
//! ```rust
//! use mpal_rs::config::AnalysisConfig;
//! let config: AnalysisConfig = toml::from_str("[thresholds]\nx = 45.0").unwrap();
//! assert_eq!(config.thresholds.x, 45.0);
//! assert_eq!(config.thresholds.main_direction, 5);
//! assert!(config.validate().is_ok());
//! ```

use mpal_preprocess::{InterpolationConfig, SmoothingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::level1::{AxisInversion, LabelThresholds};
use crate::analysis::AnalysisError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration of an analysis run.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub axes: AxisInversion,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
}

/// Labeling thresholds as written by the user.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ThresholdConfig {
    #[serde(default = "default_angle_threshold")]
    pub x: f64,
    #[serde(default = "default_angle_threshold")]
    pub y: f64,
    #[serde(default = "default_angle_threshold")]
    pub z: f64,
    #[serde(default = "default_main_direction")]
    pub main_direction: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            x: default_angle_threshold(),
            y: default_angle_threshold(),
            z: default_angle_threshold(),
            main_direction: default_main_direction(),
        }
    }
}

/// 1-based CSV column mapping.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_col_x")]
    pub col_x: usize,
    #[serde(default = "default_col_y")]
    pub col_y: usize,
    #[serde(default = "default_col_z")]
    pub col_z: usize,
    /// 1-based row number of the header line; rows up to it are skipped.
    #[serde(default)]
    pub header: Option<usize>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            col_x: default_col_x(),
            col_y: default_col_y(),
            col_z: default_col_z(),
            header: None,
        }
    }
}

/// Smoothing and resampling options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PreprocessConfig {
    #[serde(default)]
    pub smooth: bool,
    #[serde(default = "default_smooth_order")]
    pub smooth_order: usize,
    #[serde(default = "default_smooth_window")]
    pub smooth_window: usize,
    #[serde(default)]
    pub interpolate: bool,
    #[serde(default = "default_interdist")]
    pub interdist: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            smooth: false,
            smooth_order: default_smooth_order(),
            smooth_window: default_smooth_window(),
            interpolate: false,
            interdist: default_interdist(),
        }
    }
}

impl AnalysisConfig {
    /// Validated thresholds for the labeler.
    pub fn label_thresholds(&self) -> Result<LabelThresholds, AnalysisError> {
        let t = &self.thresholds;
        LabelThresholds::new(t.x, t.y, t.z, t.main_direction)
    }

    pub fn smoothing(&self) -> SmoothingConfig {
        SmoothingConfig {
            enabled: self.preprocess.smooth,
            order: self.preprocess.smooth_order,
            window: self.preprocess.smooth_window,
        }
    }

    pub fn interpolation(&self) -> InterpolationConfig {
        InterpolationConfig {
            enabled: self.preprocess.interpolate,
            interdist: self.preprocess.interdist,
        }
    }

    /// Validate thresholds, column mapping and preprocessing options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.label_thresholds()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        for (name, col) in [("col_x", self.input.col_x), ("col_y", self.input.col_y), ("col_z", self.input.col_z)] {
            if col == 0 {
                return Err(ConfigError::Invalid(format!("{} is 1-based and must be >= 1", name)));
            }
        }
        if self.preprocess.smooth {
            let window = self.preprocess.smooth_window;
            if window % 2 == 0 || window <= self.preprocess.smooth_order {
                return Err(ConfigError::Invalid(format!(
                    "smooth_window must be odd and larger than smooth_order ({}), got {}",
                    self.preprocess.smooth_order, window
                )));
            }
        }
        if self.preprocess.interpolate && !(self.preprocess.interdist > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "interdist must be > 0, got {}",
                self.preprocess.interdist
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_angle_threshold() -> f64 { 60.0 }
fn default_main_direction() -> usize { 5 }
fn default_col_x() -> usize { 1 }
fn default_col_y() -> usize { 2 }
fn default_col_z() -> usize { 3 }
fn default_smooth_order() -> usize { 2 }
fn default_smooth_window() -> usize { 7 }
fn default_interdist() -> f64 { 0.5 }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<AnalysisConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: AnalysisConfig = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.thresholds.x, 60.0);
        assert_eq!(config.thresholds.y, 60.0);
        assert_eq!(config.thresholds.z, 60.0);
        assert_eq!(config.thresholds.main_direction, 5);
        assert!(!config.axes.invert_x);
        assert_eq!(config.input.col_z, 3);
        assert_eq!(config.input.header, None);
        assert!(!config.preprocess.smooth);
        assert_eq!(config.preprocess.smooth_window, 7);
        assert_eq!(config.preprocess.interdist, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("settings.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[thresholds]\nx = 45.0\nmain_direction = 8\n[axes]\ninvert_z = true").unwrap();
        file.flush().unwrap();
        let config = load_config(file_path.to_str().unwrap()).unwrap();
        assert_eq!(config.thresholds.x, 45.0);
        assert_eq!(config.thresholds.main_direction, 8);
        assert!(config.axes.invert_z);
        // Defaults for missing fields
        assert_eq!(config.thresholds.y, 60.0);
        assert!(!config.axes.invert_x);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent_file.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_config_rejects_out_of_range_threshold() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("range.toml");
        std::fs::write(&file_path, "[thresholds]\nz = 95.0\n").unwrap();
        let result = load_config(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_preprocess_options() {
        let mut config = AnalysisConfig::default();
        config.preprocess.smooth = true;
        config.preprocess.smooth_window = 4;
        assert!(config.validate().is_err());
        config.preprocess.smooth_window = 5;
        assert!(config.validate().is_ok());
        config.preprocess.interpolate = true;
        config.preprocess.interdist = 0.0;
        assert!(config.validate().is_err());
        config.preprocess.interdist = 0.25;
        config.input.col_y = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preprocess_mapping() {
        let toml = r#"
        [preprocess]
        smooth = true
        smooth_window = 9
        interpolate = true
        interdist = 1.5
        "#;
        let config: AnalysisConfig = toml::from_str(toml).unwrap();
        let smoothing = config.smoothing();
        assert!(smoothing.enabled);
        assert_eq!(smoothing.window, 9);
        assert_eq!(smoothing.order, 2);
        let interpolation = config.interpolation();
        assert!(interpolation.enabled);
        assert_eq!(interpolation.interdist, 1.5);
    }
}
