use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::dataset::{Dataset, Record};

pub const TIME_COLUMN: &str = "created_at";
pub const TAGS_COLUMN: &str = "tag_string";

/// Load records from a file, dispatching on extension.
///
/// Supported formats:
/// * `.parquet` – `created_at` (timestamp or string) and `tag_string` columns; other columns are not read
/// * `.json`    – `[{ "created_at": ..., "tag_string": ... }, ...]`
/// * `.jsonl`   – one such object per line
/// * `.csv`     – header row with `created_at` and `tag_string`
///
/// Rows whose timestamp is missing or unparseable are skipped with a warning.
/// A missing or null `tag_string` loads as a record with no tags.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (records, skipped) = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "jsonl" | "ndjson" => load_jsonl(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    if skipped > 0 {
        warn!("{}: skipped {skipped} rows without a usable {TIME_COLUMN}", path.display());
    }
    Ok(Dataset::new(records))
}

impl Dataset {
    /// Load once at startup. On failure the error is logged and the dataset is
    /// left unavailable, so queries report that instead of the load error.
    pub fn load_or_unavailable(path: &Path) -> Dataset {
        match load_file(path) {
            Ok(ds) => {
                info!("loaded {} records from {}", ds.len(), path.display());
                ds
            }
            Err(e) => {
                warn!("dataset unavailable, failed to load {}: {e:#}", path.display());
                Dataset::unavailable()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a textual creation time. Offsets are honored and normalized to UTC;
/// naive values and bare dates are taken as UTC; all-digit strings are epoch seconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z")
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z"))
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
    {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

fn epoch_to_utc(value: i64, unit: &TimeUnit) -> Option<DateTime<Utc>> {
    let (per_sec, nanos_per_unit) = match unit {
        TimeUnit::Second => (1, 0),
        TimeUnit::Millisecond => (1_000, 1_000_000),
        TimeUnit::Microsecond => (1_000_000, 1_000),
        TimeUnit::Nanosecond => (1_000_000_000, 1),
    };
    let secs = value.div_euclid(per_sec);
    let nsub = value.rem_euclid(per_sec) * nanos_per_unit;
    DateTime::from_timestamp(secs, nsub as u32)
}

// ---------------------------------------------------------------------------
// JSON / JSONL loaders
// ---------------------------------------------------------------------------

fn timestamp_from_json(val: Option<&JsonValue>) -> Option<DateTime<Utc>> {
    match val? {
        JsonValue::String(s) => parse_timestamp(s),
        JsonValue::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn record_from_json(row: usize, val: &JsonValue) -> Result<Option<Record>> {
    let obj = val
        .as_object()
        .with_context(|| format!("Row {row} is not a JSON object"))?;
    let Some(ts) = timestamp_from_json(obj.get(TIME_COLUMN)) else {
        return Ok(None);
    };
    let tags = obj.get(TAGS_COLUMN).and_then(|v| v.as_str()).unwrap_or("");
    Ok(Some(Record::new(ts, tags)))
}

fn load_json(path: &Path) -> Result<(Vec<Record>, usize)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for (i, row) in rows.iter().enumerate() {
        match record_from_json(i, row)? {
            Some(r) => records.push(r),
            None => skipped += 1,
        }
    }
    Ok((records, skipped))
}

fn load_jsonl(path: &Path) -> Result<(Vec<Record>, usize)> {
    let text = std::fs::read_to_string(path).context("reading JSONL file")?;
    let mut records = Vec::new();
    let mut skipped = 0;
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: JsonValue =
            serde_json::from_str(line).with_context(|| format!("parsing JSONL line {}", i + 1))?;
        match record_from_json(i, &row)? {
            Some(r) => records.push(r),
            None => skipped += 1,
        }
    }
    Ok((records, skipped))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    created_at: String,
    #[serde(default)]
    tag_string: Option<String>,
}

fn load_csv(path: &Path) -> Result<(Vec<Record>, usize)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut records = Vec::new();
    let mut skipped = 0;
    for (row_no, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        match parse_timestamp(&row.created_at) {
            Some(ts) => records.push(Record::new(ts, row.tag_string.unwrap_or_default())),
            None => skipped += 1,
        }
    }
    Ok((records, skipped))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Reads only the `created_at` and `tag_string` columns. Works with files written
/// by Pandas (`df.to_parquet()`) whether `created_at` is a timestamp or a string.
fn load_parquet(path: &Path) -> Result<(Vec<Record>, usize)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let leaves: Vec<usize> = builder
        .parquet_schema()
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name() == TIME_COLUMN || c.name() == TAGS_COLUMN)
        .map(|(i, _)| i)
        .collect();
    let mask = ProjectionMask::leaves(builder.parquet_schema(), leaves);
    let reader = builder
        .with_projection(mask)
        .build()
        .context("building parquet reader")?;

    let mut records = Vec::new();
    let mut skipped = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let time_idx = schema
            .index_of(TIME_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{TIME_COLUMN}' column"))?;
        let time_col = batch.column(time_idx);
        let tags_col = schema.index_of(TAGS_COLUMN).ok().map(|i| batch.column(i));

        for row in 0..batch.num_rows() {
            let Some(ts) = extract_timestamp(time_col, row)
                .with_context(|| format!("Row {row}: failed to read '{TIME_COLUMN}'"))?
            else {
                skipped += 1;
                continue;
            };
            let tags = match tags_col {
                Some(col) => extract_string(col, row)
                    .with_context(|| format!("Row {row}: failed to read '{TAGS_COLUMN}'"))?
                    .unwrap_or_default(),
                None => String::new(),
            };
            records.push(Record::new(ts, tags));
        }
    }

    Ok((records, skipped))
}

// -- Arrow helpers --

fn extract_string(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let s = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Utf8View => col.as_string_view().value(row).to_string(),
        other => bail!("Expected a string column, got {other:?}"),
    };
    Ok(Some(s))
}

fn extract_timestamp(col: &ArrayRef, row: usize) -> Result<Option<DateTime<Utc>>> {
    if col.is_null(row) {
        return Ok(None);
    }
    // Arrow timestamps are UTC epoch values whether or not a zone is attached.
    let ts = match col.data_type() {
        DataType::Timestamp(unit, _) => {
            let v = match unit {
                TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value(row),
                TimeUnit::Millisecond => col.as_primitive::<TimestampMillisecondType>().value(row),
                TimeUnit::Microsecond => col.as_primitive::<TimestampMicrosecondType>().value(row),
                TimeUnit::Nanosecond => col.as_primitive::<TimestampNanosecondType>().value(row),
            };
            epoch_to_utc(v, unit)
        }
        DataType::Date32 => {
            let days = col.as_primitive::<Date32Type>().value(row) as i64;
            DateTime::from_timestamp(days * 86_400, 0)
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            extract_string(col, row)?.as_deref().and_then(parse_timestamp)
        }
        other => bail!("Unsupported '{TIME_COLUMN}' type {other:?}"),
    };
    Ok(ts)
}
