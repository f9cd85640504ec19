//! Data loading utilities

use crate::error::{HazardError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use tracing::info;

/// Loader for tabular hazard datasets
pub struct DataLoader;

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| HazardError::DataError(format!("Error loading data: {}", e)))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| HazardError::DataError(format!("Error loading data: {}", e)))?;

        info!(path = %path, rows = df.height(), columns = df.width(), "Data loaded");
        Ok(df)
    }

    /// Load a line-delimited JSON file
    pub fn load_json(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| HazardError::DataError(format!("Error loading data: {}", e)))?;

        JsonReader::new(file)
            .finish()
            .map_err(|e| HazardError::DataError(format!("Error loading data: {}", e)))
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: &str) -> Result<DataFrame> {
        let path_lower = path.to_lowercase();

        if path_lower.ends_with(".json") || path_lower.ends_with(".jsonl") {
            self.load_json(path)
        } else {
            self.load_csv(path)
        }
    }
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
/// Missing values become 0.0 (the imputer runs before this on training paths).
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| HazardError::FeatureNotFound(col_name.clone()))?;
            let series_f64 = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| HazardError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| HazardError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Extract a single column as `Array1<f64>`
pub fn column_to_array1(df: &DataFrame, col_name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(col_name)
        .map_err(|_| HazardError::FeatureNotFound(col_name.to_string()))?;
    let series_f64 = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| HazardError::DataError(e.to_string()))?;
    let values: Vec<f64> = series_f64
        .f64()
        .map_err(|e| HazardError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(Array1::from_vec(values))
}

/// Names of the numeric columns in a DataFrame, in frame order
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_to_array2() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4.0, 5.0, 6.0],
        )
        .unwrap();

        let x = columns_to_array2(&df, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(x.nrows(), 3);
        assert_eq!(x.ncols(), 2);
        assert_eq!(x[[0, 0]], 1.0);
        assert_eq!(x[[2, 1]], 6.0);
    }

    #[test]
    fn test_missing_column_errors() {
        let df = df!("a" => &[1.0, 2.0]).unwrap();
        let result = columns_to_array2(&df, &["missing".to_string()]);
        assert!(matches!(result, Err(HazardError::FeatureNotFound(_))));
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df!(
            "x" => &[1.0, 2.0],
            "label" => &["a", "b"],
            "y" => &[3i64, 4],
        )
        .unwrap();

        let names = numeric_column_names(&df);
        assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
    }
}
