use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use chrono::Datelike;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CategoryColumn, CellValue, ListingTable, NumericColumn, RawRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid JSON layout: {0}")]
    InvalidJson(String),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Whether a source column is kept. Everything else is skipped while reading.
fn is_kept_column(name: &str) -> bool {
    NumericColumn::ALL.iter().any(|c| c.name() == name)
        || CategoryColumn::ALL.iter().any(|c| c.name() == name)
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listing table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one ad per line (the usual `vehicles_us.csv`)
/// * `.json`    – `[{ "price": 9400, "odometer": 145000, ... }, ...]`
/// * `.parquet` – flat columns named like the CSV header
pub fn load_file(path: &Path, current_year: i32) -> Result<ListingTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?, current_year)?,
        "json" => read_json(&std::fs::read_to_string(path)?, current_year)?,
        "parquet" | "pq" => load_parquet(path, current_year)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    if table.dropped.total() > 0 {
        log::warn!(
            "{}: dropped {} rows (missing price: {}, missing odometer: {}, invalid year: {})",
            path.display(),
            table.dropped.total(),
            table.dropped.missing_price,
            table.dropped.missing_odometer,
            table.dropped.invalid_year
        );
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Process-lifetime cache of loaded tables keyed by path.
/// Only successful loads are remembered.
pub struct ListingCache {
    current_year: i32,
    entries: HashMap<PathBuf, Arc<ListingTable>>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::with_year(current_year())
    }
}

impl ListingCache {
    pub fn with_year(current_year: i32) -> Self {
        Self {
            current_year,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<ListingTable>, LoadError> {
        if let Some(table) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path, self.current_year)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one listing per record.
/// Empty cells are null.
pub fn read_csv<R: Read>(source: R, current_year: i32) -> Result<ListingTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let kept: Vec<(usize, &String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_kept_column(h))
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut record = RawRecord::new();
        for (idx, name) in &kept {
            record.insert((*name).clone(), guess_cell_type(row.get(*idx).unwrap_or("")));
        }
        records.push(record);
    }

    Ok(ListingTable::from_records(&headers, records, current_year))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "price": 9400, "odometer": 145000, "model_year": 2011, "type": "SUV" },
///   ...
/// ]
/// ```
pub fn read_json(text: &str, current_year: i32) -> Result<ListingTable, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidJson("expected top-level array".into()))?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::InvalidJson(format!("row {i} is not an object")))?;

        let mut record = RawRecord::new();
        for (key, val) in obj {
            if !is_kept_column(key) {
                continue;
            }
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            record.insert(key.clone(), json_to_cell(val));
        }
        records.push(record);
    }

    Ok(ListingTable::from_records(&columns, records, current_year))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat listing columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Columns of unsupported Arrow types
/// are read as null.
fn load_parquet(path: &Path, current_year: i32) -> Result<ListingTable, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .filter(|name| is_kept_column(name))
        .collect();

    for field in builder.schema().fields() {
        if is_kept_column(field.name()) && !is_supported_type(field.data_type()) {
            log::warn!(
                "column '{}' has unsupported type {:?}; values read as null",
                field.name(),
                field.data_type()
            );
        }
    }

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let kept: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| is_kept_column(f.name()))
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for row in 0..batch.num_rows() {
            let mut record = RawRecord::new();
            for (col_idx, name) in &kept {
                record.insert(name.clone(), extract_cell(batch.column(*col_idx), row));
            }
            records.push(record);
        }
    }

    Ok(ListingTable::from_records(&columns, records, current_year))
}

fn is_supported_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
price,model_year,model,condition,cylinders,fuel,odometer,transmission,type,paint_color
9400,2011,bmw x5,good,6,gas,145000,automatic,SUV,
25500,,ford f-150,good,6,gas,88705,automatic,pickup,white
5500,2013.0,hyundai sonata,like new,4,gas,110000,automatic,sedan,red
,2003,ford f-150,fair,8,gas,181613,automatic,pickup,
1500,2003,ford f-150,fair,8,gas,,automatic,pickup,
14900,2017,chrysler 200,excellent,4,gas,80903,automatic,sedan,black
";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("car-ads-explorer-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_read_csv_applies_load_rules() {
        let table = read_csv(SAMPLE.as_bytes(), 2024).unwrap();
        // blank year, blank price and blank odometer rows are gone
        assert_eq!(table.len(), 3);
        assert_eq!(table.dropped.invalid_year, 1);
        assert_eq!(table.dropped.missing_price, 1);
        assert_eq!(table.dropped.missing_odometer, 1);
        assert!(table.listings.iter().all(|l| l.price.is_some() && l.odometer.is_some()));

        assert_eq!(table.listings[1].model_year, Some(2013));
        assert_eq!(table.listings[1].age, Some(11));
        assert_eq!(table.listings[0].category(CategoryColumn::PaintColor), None);
        assert_eq!(table.listings[2].category(CategoryColumn::Type), Some("sedan"));
    }

    #[test]
    fn test_read_csv_tracks_present_columns() {
        let table = read_csv("price,odometer,fuel\n100,200,gas\n".as_bytes(), 2024).unwrap();
        assert_eq!(
            table.numeric_columns,
            vec![NumericColumn::Price, NumericColumn::Odometer]
        );
        assert_eq!(table.category_columns, vec![CategoryColumn::Fuel]);
    }

    #[test]
    fn test_read_json_records() {
        let text = r#"[
            {"price": 1000, "odometer": 50000.5, "model_year": 2015, "fuel": "diesel"},
            {"price": null, "odometer": 1, "model_year": 2015, "fuel": "gas"},
            {"price": 2000, "odometer": 1, "model_year": "n/a", "fuel": "gas"}
        ]"#;
        let table = read_json(text, 2020).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.listings[0].age, Some(5));
        assert_eq!(table.listings[0].odometer, Some(50000.5));
    }

    #[test]
    fn test_read_json_rejects_non_array() {
        let err = read_json(r#"{"price": 1}"#, 2020).unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_file(Path::new("definitely/not/here/vehicles_us.csv"), 2024).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_path("listings.xlsx");
        std::fs::write(&path, b"irrelevant").unwrap();
        let err = load_file(&path, 2024).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn test_cache_memoizes_by_path() {
        let path = temp_path("cached.csv");
        std::fs::write(&path, "price,odometer\n1,2\n3,4\n").unwrap();

        let mut cache = ListingCache::with_year(2024);
        let first = cache.get_or_load(&path).unwrap();

        // the file changes on disk but the cached table is returned
        std::fs::write(&path, "price,odometer\n1,2\n").unwrap();
        let second = cache.get_or_load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_cache_does_not_remember_failures() {
        let path = temp_path("late.csv");
        let mut cache = ListingCache::with_year(2024);
        assert!(cache.get_or_load(&path).is_err());

        std::fs::write(&path, "price,odometer\n1,2\n").unwrap();
        let table = cache.get_or_load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(table.unwrap().len(), 1);
    }
}
