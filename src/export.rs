// src/export.rs - Saving analysis results as JSON and CSV

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::Writer;
use mpal_preprocess::Point3;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::geometry::GeometryRecord;
use crate::analysis::Analysis;
use crate::labels::Axis;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Header of the level-3 hash table.
pub const HASH_CSV_HEADER: [&str; 3] = [
    "label_of_segment",
    "starting_index_of_segment",
    "starting_index_of_segment_pre_interpolation",
];

/// Snapshot of an analysis in the saved-file layout.
///
/// Thresholds are stored the way the labeler applies them, so `y_threshold`
/// and `z_threshold` are the `90 - value` complements. Non-finite geometry
/// values are written as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisExport {
    pub original_corr: Vec<Point3>,
    #[serde(rename = "X")]
    pub processed: Vec<Point3>,
    pub x_threshold: f64,
    pub y_threshold: f64,
    pub z_threshold: f64,
    pub main_direction_threshold: usize,
    pub parameters: Vec<[f64; GeometryRecord::COLUMNS]>,
    pub lvl1hash: [String; 3],
    pub lvl2hash: [String; 3],
    pub lvl2hashframe: Vec<usize>,
    pub lvl3hash: Vec<String>,
    pub lvl3hashframe: Vec<usize>,
    pub idx: Vec<usize>,
}

impl From<&Analysis> for AnalysisExport {
    fn from(analysis: &Analysis) -> Self {
        let thresholds = analysis.thresholds();
        Self {
            original_corr: analysis.original_points().to_vec(),
            processed: analysis.points().to_vec(),
            x_threshold: thresholds.x(),
            y_threshold: thresholds.y_band(),
            z_threshold: thresholds.z_band(),
            main_direction_threshold: thresholds.main_direction(),
            parameters: analysis.geometry().iter().map(GeometryRecord::to_row).collect(),
            lvl1hash: Axis::ALL.map(|axis| analysis.level1().axis_symbols(axis)),
            lvl2hash: Axis::ALL.map(|axis| analysis.level2().axis_symbols(axis)),
            lvl2hashframe: analysis.level2().boundaries().to_vec(),
            lvl3hash: analysis.level3().hashes(),
            lvl3hashframe: analysis.level3().boundaries().to_vec(),
            idx: analysis.pre_post_index().to_vec(),
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let file = File::create(path).map_err(|e| {
        tracing::error!("Failed to create '{}': {}", path.display(), e);
        ExportError::Io(e)
    })?;
    Ok(BufWriter::new(file))
}

/// Write the full snapshot as pretty-printed JSON.
pub fn write_json<P: AsRef<Path>>(analysis: &Analysis, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, &AnalysisExport::from(analysis))?;
    out.flush()?;
    tracing::info!("Saved analysis to {}", path.display());
    Ok(())
}

/// Write one `(label, boundary, original index)` row per level-3 label.
pub fn write_hash_csv<P: AsRef<Path>>(analysis: &Analysis, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut wtr = Writer::from_writer(create(path)?);
    write_hash_rows(analysis, &mut wtr)?;
    wtr.flush()?;
    tracing::info!("Saved level-3 hash table to {}", path.display());
    Ok(())
}

fn write_hash_rows<W: Write>(analysis: &Analysis, wtr: &mut Writer<W>) -> Result<(), ExportError> {
    let hashes = analysis.level3().hashes();
    let frames = analysis.level3().boundaries();
    let idx = analysis.pre_post_index();
    let rows = hashes.len().max(frames.len()).max(idx.len());
    if hashes.len() != rows || frames.len() != rows || idx.len() != rows {
        tracing::warn!(
            "Level-3 output lengths differ (labels {}, boundaries {}, indices {}); padding with empty fields",
            hashes.len(),
            frames.len(),
            idx.len()
        );
    }

    wtr.write_record(HASH_CSV_HEADER)?;
    for row in 0..rows {
        wtr.write_record([
            hashes.get(row).cloned().unwrap_or_default(),
            frames.get(row).map(ToString::to_string).unwrap_or_default(),
            idx.get(row).map(ToString::to_string).unwrap_or_default(),
        ])?;
    }
    Ok(())
}

/// Write the processed points, one `x,y,z` row each, without a header.
pub fn write_points_csv<P: AsRef<Path>>(analysis: &Analysis, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut wtr = Writer::from_writer(create(path)?);
    for point in analysis.points() {
        wtr.write_record(point.iter().map(ToString::to_string))?;
    }
    wtr.flush()?;
    tracing::info!("Exported {} points to {}", analysis.points().len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisConfig;

    fn corner() -> Vec<Point3> {
        let mut points: Vec<Point3> = (0..7).map(|i| [i as f64, 0.0, 0.0]).collect();
        points.extend((1..7).map(|i| [6.0, i as f64, 0.0]));
        points
    }

    #[test]
    fn test_export_snapshot_fields() {
        let analysis = analyze(&corner(), &AnalysisConfig::default()).unwrap();
        let export = AnalysisExport::from(&analysis);
        assert_eq!(export.y_threshold, 30.0);
        assert_eq!(export.main_direction_threshold, 5);
        assert_eq!(export.parameters.len(), 13);
        assert_eq!(export.lvl1hash[0].len(), 13);
        assert_eq!(export.lvl2hashframe, vec![0, 6, 12]);
        assert_eq!(export.lvl3hash, vec!["L", "B", "END"]);
        assert_eq!(export.idx, export.lvl3hashframe);

        let json = serde_json::to_value(&export).unwrap();
        assert!(json.get("X").is_some());
        assert!(json.get("processed").is_none());
        // NaN geometry becomes null
        assert!(json["parameters"][0][3].is_null());
    }

    #[test]
    fn test_hash_rows() {
        let analysis = analyze(&corner(), &AnalysisConfig::default()).unwrap();
        let mut wtr = Writer::from_writer(Vec::new());
        write_hash_rows(&analysis, &mut wtr).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "label_of_segment,starting_index_of_segment,starting_index_of_segment_pre_interpolation",
                "L,0,0",
                "B,6,6",
                "END,12,12",
            ]
        );
    }
}
