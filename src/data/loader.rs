use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{AqiCategory, Dataset, Record};

/// Column names the input file must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 16] = [
    "year",
    "month",
    "hour",
    "station",
    "PM2.5",
    "PM10",
    "SO2",
    "NO2",
    "CO",
    "O3",
    "AQI",
    "Category_AQI",
    "TEMP",
    "PRES",
    "WSPM",
    "RAIN",
];

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Fatal load-time failures. Query-time emptiness is never an error.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("unknown AQI category '{label}' in row {row}")]
    UnknownCategory { row: usize, label: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the hourly observation table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the [`REQUIRED_COLUMNS`] names (primary)
/// * `.parquet` – flat typed columns of the same names
/// * `.json`    – records-oriented array (`df.to_json(orient='records')`)
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(DataLoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Raw CSV row. Measurement cells may be empty or `NA`, which both mean
/// "missing" (the pre-aggregated export writes NaN as an empty cell).
#[derive(Debug, Deserialize)]
struct RawCsvRecord {
    year: i32,
    month: u32,
    hour: u32,
    station: String,
    #[serde(rename = "PM2.5", deserialize_with = "opt_float")]
    pm25: Option<f64>,
    #[serde(rename = "PM10", deserialize_with = "opt_float")]
    pm10: Option<f64>,
    #[serde(rename = "SO2", deserialize_with = "opt_float")]
    so2: Option<f64>,
    #[serde(rename = "NO2", deserialize_with = "opt_float")]
    no2: Option<f64>,
    #[serde(rename = "CO", deserialize_with = "opt_float")]
    co: Option<f64>,
    #[serde(rename = "O3", deserialize_with = "opt_float")]
    o3: Option<f64>,
    #[serde(rename = "AQI", deserialize_with = "opt_float")]
    aqi: Option<f64>,
    #[serde(rename = "Category_AQI")]
    category: Option<String>,
    #[serde(rename = "TEMP", deserialize_with = "opt_float")]
    temp: Option<f64>,
    #[serde(rename = "PRES", deserialize_with = "opt_float")]
    pres: Option<f64>,
    #[serde(rename = "WSPM", deserialize_with = "opt_float")]
    wspm: Option<f64>,
    #[serde(rename = "RAIN", deserialize_with = "opt_float")]
    rain: Option<f64>,
}

/// Deserialize a float cell treating empty / `NA` / `NaN` as missing.
fn opt_float<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("NA") | Some("NaN") | Some("nan") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a number"))),
    }
}

fn parse_category(raw: Option<String>, row: usize) -> Result<Option<AqiCategory>, DataLoadError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("NA") => Ok(None),
        Some(label) => AqiCategory::parse(label)
            .map(Some)
            .ok_or_else(|| DataLoadError::UnknownCategory {
                row,
                label: label.to_string(),
            }),
    }
}

fn load_csv(path: &Path) -> Result<Dataset, DataLoadError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    check_columns(|name| headers.iter().any(|h| h == name))?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawCsvRecord>().enumerate() {
        let raw = result.map_err(|e| DataLoadError::Row {
            row: row_no,
            reason: e.to_string(),
        })?;
        records.push(Record {
            year: raw.year,
            month: raw.month,
            hour: raw.hour,
            station: raw.station,
            pm25: raw.pm25,
            pm10: raw.pm10,
            so2: raw.so2,
            no2: raw.no2,
            co: raw.co,
            o3: raw.o3,
            aqi: raw.aqi,
            category: parse_category(raw.category, row_no)?,
            temp: raw.temp,
            pres: raw.pres,
            wspm: raw.wspm,
            rain: raw.rain,
        });
    }

    Ok(Dataset::from_records(records))
}

fn check_columns(has: impl Fn(&str) -> bool) -> Result<(), DataLoadError> {
    for name in REQUIRED_COLUMNS {
        if !has(name) {
            return Err(DataLoadError::MissingColumn {
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON: an array of objects keyed by column name, the
/// default `df.to_json(orient='records')` layout. Nulls are missing values.
fn load_json(path: &Path) -> Result<Dataset, DataLoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| DataLoadError::Row {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, rec) in rows.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| DataLoadError::Row {
            row: row_no,
            reason: "not a JSON object".to_string(),
        })?;

        if row_no == 0 {
            check_columns(|name| obj.contains_key(name))?;
        }

        let int = |key: &str| -> Result<i64, DataLoadError> {
            obj.get(key)
                .and_then(JsonValue::as_i64)
                .ok_or_else(|| DataLoadError::Row {
                    row: row_no,
                    reason: format!("'{key}' is not an integer"),
                })
        };
        let float = |key: &str| obj.get(key).and_then(JsonValue::as_f64);

        let station = obj
            .get("station")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| DataLoadError::Row {
                row: row_no,
                reason: "'station' is not a string".to_string(),
            })?;
        let category_raw = obj
            .get("Category_AQI")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        records.push(Record {
            year: int("year")? as i32,
            month: int("month")? as u32,
            hour: int("hour")? as u32,
            station: station.to_string(),
            pm25: float("PM2.5"),
            pm10: float("PM10"),
            so2: float("SO2"),
            no2: float("NO2"),
            co: float("CO"),
            o3: float("O3"),
            aqi: float("AQI"),
            category: parse_category(category_raw, row_no)?,
            temp: float("TEMP"),
            pres: float("PRES"),
            wspm: float("WSPM"),
            rain: float("RAIN"),
        });
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat typed columns.
///
/// Integers may be Int32 or Int64, floats Float32 or Float64, strings Utf8
/// or LargeUtf8, covering files written by both Pandas and Polars.
fn load_parquet(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut row_base = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        check_columns(|name| schema.index_of(name).is_ok())?;

        let col = |name: &str| -> ArrayRef { batch.column(schema.index_of(name).unwrap()).clone() };

        let year = col("year");
        let month = col("month");
        let hour = col("hour");
        let station = col("station");
        let category = col("Category_AQI");
        let floats: Vec<(&str, ArrayRef)> = [
            "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "AQI", "TEMP", "PRES", "WSPM", "RAIN",
        ]
        .iter()
        .map(|&name| (name, col(name)))
        .collect();

        for row in 0..batch.num_rows() {
            let row_no = row_base + row;
            let f = |idx: usize| float_at(&floats[idx].1, row);

            records.push(Record {
                year: int_at(&year, row, row_no, "year")? as i32,
                month: int_at(&month, row, row_no, "month")? as u32,
                hour: int_at(&hour, row, row_no, "hour")? as u32,
                station: string_at(&station, row, row_no, "station")?,
                pm25: f(0),
                pm10: f(1),
                so2: f(2),
                no2: f(3),
                co: f(4),
                o3: f(5),
                aqi: f(6),
                category: parse_category(opt_string_at(&category, row), row_no)?,
                temp: f(7),
                pres: f(8),
                wspm: f(9),
                rain: f(10),
            });
        }
        row_base += batch.num_rows();
    }

    Ok(Dataset::from_records(records))
}

// -- Arrow column helpers --

fn float_at(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        _ => None,
    }
}

fn int_at(col: &ArrayRef, row: usize, row_no: usize, name: &str) -> Result<i64, DataLoadError> {
    if !col.is_null(row) {
        match col.data_type() {
            DataType::Int64 => {
                if let Some(a) = col.as_any().downcast_ref::<Int64Array>() {
                    return Ok(a.value(row));
                }
            }
            DataType::Int32 => {
                if let Some(a) = col.as_any().downcast_ref::<Int32Array>() {
                    return Ok(a.value(row) as i64);
                }
            }
            _ => {}
        }
    }
    Err(DataLoadError::Row {
        row: row_no,
        reason: format!("'{name}' is not an integer"),
    })
}

fn opt_string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).to_string()),
        _ => None,
    }
}

fn string_at(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    name: &str,
) -> Result<String, DataLoadError> {
    opt_string_at(col, row).ok_or_else(|| DataLoadError::Row {
        row: row_no,
        reason: format!("'{name}' is not a string"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "year,month,hour,station,PM2.5,PM10,SO2,NO2,CO,O3,AQI,Category_AQI,TEMP,PRES,WSPM,RAIN";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        writeln!(file, "{HEADER}").unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_a_well_formed_csv() {
        let file = write_csv(
            "2013,3,8,Dingling,42.0,60.5,7.1,30.0,900.0,55.0,98.0,Moderate,12.5,1012.3,2.1,0.0\n\
             2014,7,14,Wanliu,NA,80.0,,44.0,1100.0,70.0,120.0,Unhealthy for Sensitive Groups,28.0,1005.0,1.2,0.4\n",
        );
        let ds = load_file(file.path()).expect("load");
        assert_eq!(ds.len(), 2);

        let first = &ds.records()[0];
        assert_eq!(first.year, 2013);
        assert_eq!(first.station, "Dingling");
        assert_eq!(first.pm25, Some(42.0));
        assert_eq!(first.category, Some(AqiCategory::Moderate));

        let second = &ds.records()[1];
        assert_eq!(second.pm25, None); // NA
        assert_eq!(second.so2, None); // empty cell
        assert_eq!(second.category, Some(AqiCategory::UnhealthySensitive));
    }

    #[test]
    fn missing_column_is_named_in_the_error() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "year,month,hour,station,PM2.5").unwrap();
        writeln!(file, "2013,1,0,A,10.0").unwrap();
        file.flush().unwrap();

        let err = load_file(file.path()).unwrap_err();
        match err {
            DataLoadError::MissingColumn { column } => assert_eq!(column, "PM10"),
            other => panic!("expected MissingColumn, got {other}"),
        }
    }

    #[test]
    fn unknown_category_label_is_rejected() {
        let file = write_csv("2013,1,0,A,1,1,1,1,1,1,10,Very Bad,1,1,1,0\n");
        let err = load_file(file.path()).unwrap_err();
        match err {
            DataLoadError::UnknownCategory { row, label } => {
                assert_eq!(row, 0);
                assert_eq!(label, "Very Bad");
            }
            other => panic!("expected UnknownCategory, got {other}"),
        }
    }

    #[test]
    fn malformed_numeric_cell_reports_the_row() {
        let file = write_csv("2013,1,0,A,abc,1,1,1,1,1,10,Good,1,1,1,0\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::Row { row: 0, .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_file_is_an_io_or_csv_error() {
        let err = load_file(Path::new("definitely_missing.csv")).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Io(_) | DataLoadError::Csv(_)
        ));
    }

    #[test]
    fn loads_records_oriented_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"year":2013,"month":5,"hour":10,"station":"A","PM2.5":42.0,"PM10":null,
                "SO2":7.0,"NO2":30.0,"CO":900.0,"O3":55.0,"AQI":98.0,"Category_AQI":"Moderate",
                "TEMP":12.5,"PRES":1012.3,"WSPM":2.1,"RAIN":0.0}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let ds = load_file(file.path()).expect("load json");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].pm25, Some(42.0));
        assert_eq!(ds.records()[0].pm10, None);
        assert_eq!(ds.records()[0].category, Some(AqiCategory::Moderate));
    }
}
