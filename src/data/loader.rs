use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::Boat;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listing snapshot from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one row per listing, columns named like the backend table
/// * `.json`    – `[{ "id": ..., "builder": ..., ... }, ...]`
/// * `.csv`     – header row with the same column names
///
/// Listings come back newest first (by `last_seen_at`), matching the backend.
pub fn load_file(path: &Path) -> Result<Vec<Boat>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut boats = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    sort_newest_first(&mut boats);
    Ok(boats)
}

/// Stable sort by `last_seen_at` descending; listings without a timestamp go last.
pub fn sort_newest_first(boats: &mut [Boat]) {
    boats.sort_by(|a, b| match (&a.last_seen_at, &b.last_seen_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the same shape the REST backend returns.
fn load_json(path: &Path) -> Result<Vec<Boat>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            if !rec.is_object() {
                bail!("Row {i} is not a JSON object");
            }
            decode_boat(rec.clone()).with_context(|| format!("Row {i}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with backend column names, one listing per row.
/// Empty cells are unknown values.
///
/// Cells are handed to the decoder as text, never type-guessed, so ids like
/// `007` and models like `1.50` survive verbatim.
fn load_csv(path: &Path) -> Result<Vec<Boat>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    if !headers.iter().any(|h| h == "id") {
        bail!("CSV missing 'id' column");
    }

    reader
        .records()
        .enumerate()
        .map(|(row_no, result)| {
            let record = result.with_context(|| format!("CSV row {row_no}"))?;
            let obj: Map<String, JsonValue> = headers
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| {
                    let value = if cell.is_empty() {
                        JsonValue::Null
                    } else {
                        JsonValue::from(cell)
                    };
                    (name.to_string(), value)
                })
                .collect();
            decode_boat(JsonValue::Object(obj)).with_context(|| format!("CSV row {row_no}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet snapshot of the listings table.
///
/// Each row is turned into a JSON object and decoded with the same lenient
/// rules as the backend, so column types only need to be roughly right
/// (e.g. `year_built` may be Int32, Int64 or Float64).
fn load_parquet(path: &Path) -> Result<Vec<Boat>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut boats = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        if schema.index_of("id").is_err() {
            bail!("Parquet file missing 'id' column");
        }

        let columns: Vec<(String, &Arc<dyn Array>)> = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(f, col)| (f.name().clone(), col))
            .collect();

        for row in 0..batch.num_rows() {
            let mut obj = Map::with_capacity(columns.len());
            for (name, col) in &columns {
                obj.insert(name.clone(), extract_json_value(col, row));
            }
            let boat = decode_boat(JsonValue::Object(obj))
                .with_context(|| format!("Row {row}"))?;
            boats.push(boat);
        }
    }

    Ok(boats)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column as a JSON value.
fn extract_json_value(col: &Arc<dyn Array>, row: usize) -> JsonValue {
    if col.is_null(row) {
        return JsonValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| JsonValue::from(s.value(row)))
            .unwrap_or(JsonValue::Null),
        DataType::LargeUtf8 => JsonValue::from(col.as_string::<i64>().value(row)),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| JsonValue::from(a.value(row)))
            .unwrap_or(JsonValue::Null),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| JsonValue::from(a.value(row)))
            .unwrap_or(JsonValue::Null),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| JsonValue::from(a.value(row) as f64))
            .unwrap_or(JsonValue::Null),
        // serde_json maps non-finite floats to null
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| JsonValue::from(a.value(row)))
            .unwrap_or(JsonValue::Null),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| JsonValue::from(a.value(row)))
            .unwrap_or(JsonValue::Null),
        other => {
            log::debug!("Ignoring parquet column of type {other:?}");
            JsonValue::Null
        }
    }
}

fn decode_boat(value: JsonValue) -> Result<Boat> {
    serde_json::from_value(value).context("decoding listing")
}
