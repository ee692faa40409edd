// src/lib.rs - Motion pattern analysis of 3D trajectories
pub mod analysis;
pub mod config;
pub mod export;
pub mod input;
pub mod labels;

// Re-exports for the common entry points
pub use crate::analysis::{analyze, Analysis, AnalysisError, Level};
pub use crate::analysis::level1::{AxisInversion, LabelThresholds};
pub use crate::config::{load_config, AnalysisConfig, ConfigError};
pub use crate::labels::{Heading, LabelTriple, Level3Label};
pub use mpal_preprocess::Point3;
