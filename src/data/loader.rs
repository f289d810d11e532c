use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::filter::View;
use super::model::{Column, Country, DataError, Dataset, Measure, Record};
use super::summary::pivot_by_country_year;

/// File read at startup when no path is configured.
pub const DEFAULT_DATA_FILE: &str = "mercado_editorial_latam_2000_2025.csv";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the publishing dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the published table, one row per country-year (default)
/// * `.json`    – `[{ "pais": "Chile", "anio": 2010, ... }, ...]`
/// * `.parquet` – same columns as the CSV
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    report_duplicates(&dataset);
    Ok(dataset)
}

/// Duplicate country-years are averaged downstream; flag them once here.
fn report_duplicates(dataset: &Dataset) {
    let all: View<'_> = dataset.records.iter().collect();
    let pivot = pivot_by_country_year(&all, Measure::Revenue);
    for (country, year) in pivot.duplicates() {
        log::warn!("duplicate rows for {country} {year}; charts show their mean");
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV text with a header row. Empty cells in optional columns are
/// read as absent values.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the shape of `df.to_json(orient='records')`.
/// `null` stands for an absent optional value.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json(&text)
}

pub fn read_json(text: &str) -> Result<Dataset> {
    let records: Vec<Record> = serde_json::from_str(text).context("parsing JSON")?;
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the CSV columns.
///
/// Numeric columns may be stored as Int32/Int64/Float32/Float64; text
/// columns as Utf8 or LargeUtf8. Works with files written by both Pandas
/// and Polars.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns = ParquetColumns::locate(&schema)?;
        let offset = records.len();

        for row in 0..batch.num_rows() {
            let column = |c: Option<usize>| c.map(|i| batch.column(i));
            let required = |c: Column| -> Result<f64> {
                let idx = columns.index(c);
                number_at(batch.column(idx), row, c)?.ok_or_else(|| {
                    DataError::MissingValue {
                        row: offset + row,
                        column: c.header().to_string(),
                    }
                    .into()
                })
            };
            let optional = |c: Column| -> Result<Option<f64>> {
                match column(columns.optional(c)) {
                    Some(col) => Ok(number_at(col, row, c)?),
                    None => Ok(None),
                }
            };
            let text = |c: Column| -> Result<Option<String>> {
                match column(columns.optional(c)) {
                    Some(col) => Ok(text_at(col, row, c)?),
                    None => Ok(None),
                }
            };

            let country = text(Column::Country)?
                .ok_or_else(|| DataError::MissingValue {
                    row: offset + row,
                    column: Column::Country.header().to_string(),
                })?
                .parse::<Country>()?;

            records.push(Record {
                country,
                year: required(Column::Year)?.round() as i32,
                isbn_titles_registered: required(Column::Titles)?,
                copies_produced_millions: required(Column::Copies)?,
                revenue_estimate_usd_millions: required(Column::Revenue)?,
                average_print_run: required(Column::PrintRun)?,
                yoy_change_pct: optional(Column::YoyChange)?,
                digital_format_pct: optional(Column::DigitalPct)?,
                copies_per_capita: required(Column::PerCapita)?,
                context_note: text(Column::Context)?,
                primary_source: text(Column::Source)?,
                notes: text(Column::Notes)?,
            });
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Column positions in a record batch, keyed by [`Column`] order.
struct ParquetColumns {
    positions: [Option<usize>; 12],
}

impl ParquetColumns {
    const REQUIRED: [Column; 7] = [
        Column::Country,
        Column::Year,
        Column::Titles,
        Column::Copies,
        Column::Revenue,
        Column::PrintRun,
        Column::PerCapita,
    ];

    fn locate(schema: &Schema) -> Result<Self, DataError> {
        let mut positions = [None; 12];
        for (slot, column) in positions.iter_mut().zip(Column::ALL) {
            *slot = schema
                .index_of(column.header())
                .or_else(|_| schema.index_of(column.alias()))
                .ok();
        }
        for column in Self::REQUIRED {
            if positions[column as usize].is_none() {
                return Err(DataError::MissingColumn(column.header().to_string()));
            }
        }
        Ok(Self { positions })
    }

    fn optional(&self, column: Column) -> Option<usize> {
        self.positions[column as usize]
    }

    /// Position of a column checked present by [`ParquetColumns::locate`].
    fn index(&self, column: Column) -> usize {
        self.positions[column as usize].unwrap_or_default()
    }
}

/// Extract a numeric cell, widening integers and `f32` to `f64`.
fn number_at(col: &Arc<dyn Array>, row: usize, column: Column) -> Result<Option<f64>, DataError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
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
    };
    match value {
        Some(v) if v.is_nan() => Ok(None),
        Some(v) => Ok(Some(v)),
        None => Err(DataError::UnsupportedType {
            column: column.header().to_string(),
            found: format!("{:?}", col.data_type()),
        }),
    }
}

/// Extract a text cell; blank strings count as absent.
fn text_at(col: &Arc<dyn Array>, row: usize, column: Column) -> Result<Option<String>, DataError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        other => {
            return Err(DataError::UnsupportedType {
                column: column.header().to_string(),
                found: format!("{other:?}"),
            })
        }
    };
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
pais,anio,titulos_registrados_isbn,ejemplares_producidos_millones,facturacion_estimada_millones_usd,tirada_promedio_ejemplares,variacion_anual_pct,formato_digital_pct,ejemplares_per_capita,contexto,fuente_principal,notas
Argentina,2001,9500,70.5,410.0,4200,,,1.9,Crisis del corralito,CAL,
México,2001,15000,130.0,900.5,6100,-3.5,,1.3,,CANIEM,Sector educativo
Argentina,2013,28000,96.2,880.0,3400,2.1,4.5,2.3,,CAL,
";

    #[test]
    fn reads_published_csv_layout() {
        let ds = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        let first = &ds.records[0];
        assert_eq!(first.country, Country::Argentina);
        assert_eq!(first.year, 2001);
        assert_eq!(first.revenue_estimate_usd_millions, 410.0);
        assert_eq!(first.yoy_change_pct, None);
        assert_eq!(first.digital_format_pct, None);
        assert_eq!(first.context_note.as_deref(), Some("Crisis del corralito"));
        assert_eq!(first.notes, None);

        let mexico = &ds.records[1];
        assert_eq!(mexico.country, Country::Mexico);
        assert_eq!(mexico.yoy_change_pct, Some(-3.5));
        assert_eq!(mexico.notes.as_deref(), Some("Sector educativo"));

        assert_eq!(ds.records[2].digital_format_pct, Some(4.5));
        assert_eq!(ds.year_bounds, Some((2001, 2013)));
    }

    #[test]
    fn accepts_english_headers_without_optional_columns() {
        let text = "\
country,year,isbn_titles_registered,copies_produced_millions,revenue_estimate_usd_millions,average_print_run,copies_per_capita
Peru,2020,6000,12.0,95.0,2000,0.36
";
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.records[0].country, Country::Peru);
        assert_eq!(ds.records[0].copies_per_capita, 0.36);
        assert_eq!(ds.records[0].digital_format_pct, None);
        assert_eq!(ds.records[0].context_note, None);
    }

    #[test]
    fn rejects_unknown_country() {
        let text = SAMPLE.replace("México", "Uruguay");
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("Uruguay"));
    }

    #[test]
    fn rejects_non_numeric_measure() {
        let text = SAMPLE.replace("70.5", "lots");
        assert!(read_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn reads_records_json() {
        let text = r#"[
            {"pais": "Chile", "anio": 2012, "titulos_registrados_isbn": 6000,
             "ejemplares_producidos_millones": 20.0,
             "facturacion_estimada_millones_usd": 300.0,
             "tirada_promedio_ejemplares": 2500, "variacion_anual_pct": null,
             "formato_digital_pct": 1.5, "ejemplares_per_capita": 1.1,
             "contexto": null, "fuente_principal": "CCL", "notas": null}
        ]"#;
        let ds = read_json(text).unwrap();
        assert_eq!(ds.records[0].country, Country::Chile);
        assert_eq!(ds.records[0].digital_format_pct, Some(1.5));
        assert_eq!(ds.records[0].primary_source.as_deref(), Some("CCL"));
    }

    #[test]
    fn dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(load_file(&path).unwrap().len(), 3);

        let bad = dir.path().join("data.xlsx");
        std::fs::write(&bad, "").unwrap();
        assert!(load_file(&bad).is_err());

        assert!(load_file(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn reads_parquet_columns() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("pais", DataType::Utf8, false),
            Field::new("anio", DataType::Int64, false),
            Field::new("titulos_registrados_isbn", DataType::Int64, false),
            Field::new("ejemplares_producidos_millones", DataType::Float64, false),
            Field::new("facturacion_estimada_millones_usd", DataType::Float64, false),
            Field::new("tirada_promedio_ejemplares", DataType::Int64, false),
            Field::new("formato_digital_pct", DataType::Float64, true),
            Field::new("ejemplares_per_capita", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Ecuador", "Bolivia"])),
                Arc::new(Int64Array::from(vec![2011, 2015])),
                Arc::new(Int64Array::from(vec![3000, 1800])),
                Arc::new(Float64Array::from(vec![5.5, 2.5])),
                Arc::new(Float64Array::from(vec![60.0, 25.0])),
                Arc::new(Int64Array::from(vec![1800, 1400])),
                Arc::new(Float64Array::from(vec![None, Some(1.2)])),
                Arc::new(Float64Array::from(vec![0.35, 0.22])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].country, Country::Ecuador);
        assert_eq!(ds.records[0].year, 2011);
        assert_eq!(ds.records[0].isbn_titles_registered, 3000.0);
        assert_eq!(ds.records[0].digital_format_pct, None);
        assert_eq!(ds.records[1].digital_format_pct, Some(1.2));
        assert_eq!(ds.records[1].yoy_change_pct, None);
        assert_eq!(ds.records[1].context_note, None);
    }
}
