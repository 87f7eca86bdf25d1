use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use indexmap::IndexMap;
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::float_or_nan;
use crate::borehole::Borehole;

// ---------------------------------------------------------------------------
// LogTable – columns pulled from one file
// ---------------------------------------------------------------------------

/// One domain column and any number of signal columns of equal length.
///
/// Cells that were missing or not numeric hold NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct LogTable {
    pub domain_key: String,
    pub domain: Vec<f64>,
    /// Signal columns in the order they were requested (or found).
    pub signals: IndexMap<String, Vec<f64>>,
}

impl LogTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}

/// Default display label: underscores become spaces.
pub fn default_label(key: &str) -> String {
    key.replace('_', " ")
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a borehole log table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one column per log
/// * `.json`    – `[{ "depth": 1.0, "gamma": 40.2, ... }, ...]`
/// * `.parquet` – one numeric column per log
///
/// With an empty `signal_keys` every non-domain column holding at least one
/// number is loaded; columns without any are skipped with a warning.  A
/// requested signal column that the file lacks is filled with NaN and a
/// warning is logged; a missing domain column is an error.
pub fn load_table(path: &Path, domain_key: &str, signal_keys: &[String]) -> Result<LogTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let columns = match ext.as_str() {
        "csv" | "txt" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    select_columns(columns, domain_key, signal_keys, path)
}

/// Add every signal column of `table` to `borehole`, one `add_datum` each.
///
/// Labels come from `labels`, falling back to [`default_label`].  The table
/// goes in whole or not at all: if any column is rejected, `borehole` is
/// left exactly as it was.
pub fn add_to_borehole(
    borehole: &mut Borehole,
    table: &LogTable,
    labels: &BTreeMap<String, String>,
) -> Result<()> {
    let mut staged = borehole.clone();
    for (key, signal) in &table.signals {
        let label = labels.get(key).cloned().unwrap_or_else(|| default_label(key));
        staged
            .add_datum(&table.domain, signal, key, Some(&label))
            .with_context(|| format!("adding column '{key}'"))?;
    }
    *borehole = staged;
    Ok(())
}

/// Load `path` and add the requested columns to `borehole`.
pub fn add_file(
    borehole: &mut Borehole,
    path: &Path,
    domain_key: &str,
    signal_keys: &[String],
    labels: &BTreeMap<String, String>,
) -> Result<LogTable> {
    let table = load_table(path, domain_key, signal_keys)
        .with_context(|| format!("loading {}", path.display()))?;
    info!(
        "Loaded {} rows and {} signal columns from {}",
        table.len(),
        table.signals.len(),
        path.display()
    );
    add_to_borehole(borehole, &table, labels)?;
    Ok(table)
}

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// Raw columns in file order.
type Columns = IndexMap<String, Vec<f64>>;

fn select_columns(
    mut columns: Columns,
    domain_key: &str,
    signal_keys: &[String],
    path: &Path,
) -> Result<LogTable> {
    let available: Vec<String> = columns.keys().cloned().collect();
    let domain = columns.shift_remove(domain_key).with_context(|| {
        format!(
            "{} has no domain column '{domain_key}' (columns are {})",
            path.display(),
            available.join(", ")
        )
    })?;
    let nrows = domain.len();

    let signals = if signal_keys.is_empty() {
        // Text-only columns (lithology codes, comments) come out all NaN
        columns
            .into_iter()
            .filter(|(key, values)| {
                let numeric = values.iter().any(|v| !v.is_nan());
                if !numeric {
                    warn!(
                        "Column '{key}' in {} has no numeric values; skipping it",
                        path.display()
                    );
                }
                numeric
            })
            .collect()
    } else {
        signal_keys
            .iter()
            .map(|key| {
                let values = columns.get(key).cloned().unwrap_or_else(|| {
                    warn!(
                        "Column '{key}' is not present in {} (columns are {}); filling with NaN",
                        path.display(),
                        available.join(", ")
                    );
                    vec![f64::NAN; nrows]
                });
                (key.clone(), values)
            })
            .collect()
    };

    Ok(LogTable {
        domain_key: domain_key.to_string(),
        domain,
        signals,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one row per sample.
///
/// Short rows, empty cells and text all become NaN.  A row the CSV parser
/// cannot read at all is skipped with a warning.
fn load_csv(path: &Path) -> Result<Columns> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Columns = headers.iter().map(|h| (h.clone(), Vec::new())).collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping unreadable CSV row {row_no}: {err}");
                continue;
            }
        };
        for (col_idx, values) in columns.values_mut().enumerate() {
            values.push(record.get(col_idx).map(float_or_nan).unwrap_or(f64::NAN));
        }
    }

    Ok(columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`).
///
/// Columns are collected in order of first appearance; a record lacking a
/// column gets NaN there.
fn load_json(path: &Path) -> Result<Columns> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns = Columns::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            columns
                .entry(key.clone())
                .or_insert_with(|| vec![f64::NAN; i]);
        }
        for (key, values) in columns.iter_mut() {
            values.push(obj.get(key).map(json_to_f64).unwrap_or(f64::NAN));
        }
    }

    Ok(columns)
}

fn json_to_f64(val: &JsonValue) -> f64 {
    match val {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => float_or_nan(s),
        _ => f64::NAN,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per log.
///
/// Float, integer and string columns are read (strings are parsed, nulls
/// become NaN); columns of any other type are filled with NaN.
fn load_parquet(path: &Path) -> Result<Columns> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns = Columns::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let values = extract_f64_column(batch.column(col_idx), field.name());
            columns.entry(field.name().clone()).or_default().extend(values);
        }
    }

    Ok(columns)
}

// -- Parquet / Arrow helpers --

/// Convert one Arrow column to `f64`, nulls and unsupported types → NaN.
fn extract_f64_column(col: &Arc<dyn Array>, name: &str) -> Vec<f64> {
    let len = col.len();
    let values: Option<Vec<f64>> = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|arr| arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect()),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|arr| arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|arr| arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect()),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|arr| arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect()),
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| arr.iter().map(|v| v.map_or(f64::NAN, float_or_nan)).collect()),
        DataType::LargeUtf8 => Some(
            col.as_string::<i64>()
                .iter()
                .map(|v| v.map_or(f64::NAN, float_or_nan))
                .collect(),
        ),
        _ => None,
    };

    values.unwrap_or_else(|| {
        warn!(
            "Parquet column '{name}' has unsupported type {:?}; filling with NaN",
            col.data_type()
        );
        vec![f64::NAN; len]
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_cells_degrade_to_nan() {
        let file = write_temp(
            ".csv",
            "depth,gamma,density\n1.0,40,2.6\n2.0,n/a,2.7\n3.0,42\n4.0,43,2.9\n",
        );
        let table = load_table(file.path(), "depth", &[]).unwrap();
        assert_eq!(table.domain, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.signals.keys().collect::<Vec<_>>(), vec!["gamma", "density"]);
        let gamma = &table.signals["gamma"];
        assert!(gamma[1].is_nan());
        assert_eq!(gamma[3], 43.0);
        assert!(table.signals["density"][2].is_nan());
    }

    #[test]
    fn missing_signal_column_is_nan_filled() {
        let file = write_temp(".csv", "depth,gamma\n1,2\n3,4\n");
        let keys = vec!["gamma".to_string(), "sonic".to_string()];
        let table = load_table(file.path(), "depth", &keys).unwrap();
        assert!(table.signals["sonic"].iter().all(|v| v.is_nan()));
        assert_eq!(table.signals["sonic"].len(), 2);
    }

    #[test]
    fn text_columns_are_skipped_when_loading_all() {
        let file = write_temp(".csv", "depth,gamma,lithology\n1,40,shale\n2,41,sand\n3,39,sand\n");
        let table = load_table(file.path(), "depth", &[]).unwrap();
        assert_eq!(table.signals.keys().collect::<Vec<_>>(), vec!["gamma"]);

        // Asked for by name, it is kept (and fails later when added)
        let keys = vec!["lithology".to_string()];
        let table = load_table(file.path(), "depth", &keys).unwrap();
        assert!(table.signals["lithology"].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn missing_domain_column_fails() {
        let file = write_temp(".csv", "gamma\n1\n");
        let err = load_table(file.path(), "depth", &[]).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn json_records_are_columnised() {
        let file = write_temp(
            ".json",
            r#"[{"depth": 1.0, "gamma": 3}, {"depth": 2.0, "gamma": "x", "sonic": 7.5}]"#,
        );
        let table = load_table(file.path(), "depth", &[]).unwrap();
        assert_eq!(table.domain, vec![1.0, 2.0]);
        assert_eq!(table.signals["gamma"][0], 3.0);
        assert!(table.signals["gamma"][1].is_nan());
        assert!(table.signals["sonic"][0].is_nan());
        assert_eq!(table.signals["sonic"][1], 7.5);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".xlsx", "");
        assert!(load_table(file.path(), "depth", &[]).is_err());
    }

    #[test]
    fn table_feeds_borehole_with_labels() {
        let file = write_temp(".csv", "depth,bulk_density\n0,1\n1,2\n2,3\n");
        let mut bh = Borehole::new();
        add_file(&mut bh, file.path(), "depth", &[], &BTreeMap::new()).unwrap();
        assert_eq!(bh.get_labels(&[]).unwrap(), vec!["bulk density"]);
    }
}
