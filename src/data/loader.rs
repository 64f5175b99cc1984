use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::clean::{load_and_clean, MalformedRowPolicy};
use super::model::{Catalog, RawRecord, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and clean a catalog file in one step.
pub fn load_catalog(path: &Path, policy: MalformedRowPolicy) -> Result<Catalog> {
    let raw = load_file(path)?;
    let n_raw = raw.len();
    let catalog = load_and_clean(raw, policy)
        .with_context(|| format!("cleaning {}", path.display()))?;

    log::info!(
        "Loaded {} of {} records across {} categories from {}",
        catalog.len(),
        n_raw,
        catalog.categories.len(),
        path.display()
    );
    if !catalog.rejected.is_empty() {
        log::warn!("{} records rejected as malformed", catalog.rejected.len());
    }
    if catalog.is_empty() {
        log::warn!("No usable records in {}", path.display());
    }
    Ok(catalog)
}

/// Load raw catalog rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; the five catalog columns are required
/// * `.json`    – `[{ "category": "...", "discounted_price": "₹1,999", ... }, ...]`
/// * `.parquet` – one column per field, any of string / numeric / bool types
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn check_required_columns(
    format: &str,
    mut has_column: impl FnMut(&str) -> bool,
) -> Result<()> {
    for col in REQUIRED_COLUMNS {
        if !has_column(col) {
            bail!("{format} missing '{col}' column");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one product per row.
/// Columns other than the five catalog fields are carried in `extra`.
fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawRecord>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    check_required_columns("CSV", |col| headers.iter().any(|h| h == col))?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut raw = RawRecord::default();
        for (col_idx, value) in row.iter().enumerate() {
            if let Some(col_name) = headers.get(col_idx) {
                raw.set_column(col_name, value.to_string());
            }
        }
        records.push(raw);
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "category": "Electronics|Mobiles",
///     "discounted_price": "₹1,999",
///     "actual_price": "₹2,499",
///     "discount_percentage": "20%",
///     "rating": 4.2
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Vec<RawRecord>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        check_required_columns("JSON", |col| first.contains_key(col))?;
    }

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut raw = RawRecord::default();
        for (key, val) in obj {
            raw.set_column(key, json_to_text(val));
        }
        records.push(raw);
    }

    Ok(records)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the catalog.
///
/// Every column is read back as text so that the same cleaning rules apply
/// whether prices were stored as `"₹1,999"` or as a float.  Works with files
/// written by both **Pandas** (`df.to_parquet()`) and **Polars**.
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    {
        let schema = builder.schema();
        check_required_columns("Parquet file", |col| schema.index_of(col).is_ok())?;
    }

    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns: Vec<(&str, &Arc<dyn Array>)> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().as_str(), batch.column(i)))
            .collect();

        for row in 0..batch.num_rows() {
            let mut raw = RawRecord::default();
            for (name, col) in &columns {
                let text = extract_text(col, row)
                    .with_context(|| format!("Row {row}: failed to read '{name}'"))?;
                raw.set_column(name, text);
            }
            records.push(raw);
        }
    }

    Ok(records)
}

/// Render a single Arrow cell as text. Nulls become the empty string.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(text)
}
