// src/input.rs - Trajectory CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use mpal_preprocess::Point3;
use thiserror::Error;

use crate::config::InputConfig;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row} has {found} columns, column {column} is missing")]
    MissingColumn { row: usize, column: usize, found: usize },
    #[error("Row {row} column {column}: '{value}' is not a number")]
    Parse { row: usize, column: usize, value: String },
}

/// Read x/y/z samples from a CSV file.
pub fn read_points<P: AsRef<Path>>(path: P, input: &InputConfig) -> Result<Vec<Point3>, InputError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        tracing::error!("Failed to open trajectory '{}': {}", path.display(), e);
        InputError::Io(e)
    })?;
    let points = read_points_from(file, input)?;
    tracing::info!("Loaded {} samples from {}", points.len(), path.display());
    Ok(points)
}

/// Read x/y/z samples from any CSV source. Columns are 1-based; rows up to
/// and including `input.header` are skipped, as are empty lines.
pub fn read_points_from<R: Read>(source: R, input: &InputConfig) -> Result<Vec<Point3>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let skip = input.header.unwrap_or(0);
    let columns = [input.col_x, input.col_y, input.col_z];
    let mut points = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        if row <= skip || record.iter().all(str::is_empty) {
            continue;
        }
        let mut point = [0.0; 3];
        for (axis, &column) in columns.iter().enumerate() {
            point[axis] = field(&record, row, column)?;
        }
        points.push(point);
    }
    Ok(points)
}

fn field(record: &StringRecord, row: usize, column: usize) -> Result<f64, InputError> {
    let value = column
        .checked_sub(1)
        .and_then(|index| record.get(index))
        .ok_or(InputError::MissingColumn { row, column, found: record.len() })?;
    value.parse::<f64>().map_err(|_| InputError::Parse {
        row,
        column,
        value: value.to_string(),
    })
}
