//! Writes a synthetic copy of the publishing market dataset, as CSV and as
//! Parquet, so the dashboard can run without the published file.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const FIRST_YEAR: i32 = 2000;
const LAST_YEAR: i32 = 2025;
const DIGITAL_SINCE: i32 = 2012;

/// Generate a synthetic publishing-market dataset.
#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output path without extension; `.csv` and `.parquet` are appended.
    #[arg(short, long, default_value = "sample_mercado_editorial_latam")]
    output: PathBuf,

    /// Replace files that already exist.
    #[arg(long)]
    force: bool,
}

/// Starting point of one country in 2000.
struct Profile {
    name: &'static str,
    titles: f64,
    copies: f64,
    usd_per_copy: f64,
    population: f64,
    growth: f64,
    source: &'static str,
}

const PROFILES: [Profile; 7] = [
    Profile { name: "Argentina", titles: 13_000.0, copies: 70.0, usd_per_copy: 6.5, population: 37.0, growth: 0.035, source: "CAL" },
    Profile { name: "Bolivia", titles: 1_200.0, copies: 4.0, usd_per_copy: 4.0, population: 8.4, growth: 0.045, source: "BNB" },
    Profile { name: "Chile", titles: 3_800.0, copies: 16.0, usd_per_copy: 8.0, population: 15.2, growth: 0.040, source: "CCL" },
    Profile { name: "Colombia", titles: 9_500.0, copies: 30.0, usd_per_copy: 5.5, population: 40.0, growth: 0.045, source: "CCdL" },
    Profile { name: "Ecuador", titles: 1_900.0, copies: 6.0, usd_per_copy: 5.0, population: 12.6, growth: 0.040, source: "CERLALC" },
    Profile { name: "México", titles: 15_000.0, copies: 140.0, usd_per_copy: 5.0, population: 98.0, growth: 0.030, source: "CANIEM" },
    Profile { name: "Perú", titles: 2_600.0, copies: 9.0, usd_per_copy: 4.5, population: 26.0, growth: 0.050, source: "BNP" },
];

/// Shock applied to a country's production in a year, with its label.
fn shock(country: &str, year: i32) -> Option<(f64, &'static str)> {
    match (country, year) {
        ("Argentina", 2001) => Some((0.85, "Crisis del corralito")),
        ("Argentina", 2002) => Some((0.65, "Default y devaluación")),
        ("México", 2009) | ("Chile", 2009) => Some((0.92, "Crisis financiera global")),
        ("Perú", 2017) => Some((0.95, "Niño costero")),
        ("Chile", 2019) => Some((0.93, "Estallido social")),
        ("Argentina", 2018) => Some((0.88, "Crisis cambiaria")),
        (_, 2020) => Some((0.75, "Pandemia de COVID-19")),
        _ => None,
    }
}

/// Small deterministic generator (SplitMix64); enough for plausible noise.
struct Noise(u64);

impl Noise {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform factor in `1 ± spread`.
    fn jitter(&mut self, spread: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        1.0 + spread * (2.0 * unit - 1.0)
    }
}

#[derive(Debug, Serialize)]
struct Row {
    pais: &'static str,
    anio: i32,
    titulos_registrados_isbn: i64,
    ejemplares_producidos_millones: f64,
    facturacion_estimada_millones_usd: f64,
    tirada_promedio_ejemplares: i64,
    variacion_anual_pct: Option<f64>,
    formato_digital_pct: Option<f64>,
    ejemplares_per_capita: f64,
    contexto: Option<&'static str>,
    fuente_principal: &'static str,
    notas: Option<&'static str>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn generate(noise: &mut Noise) -> Vec<Row> {
    let mut rows = Vec::new();
    for profile in &PROFILES {
        let mut previous_revenue: Option<f64> = None;
        for year in FIRST_YEAR..=LAST_YEAR {
            let t = f64::from(year - FIRST_YEAR);
            let trend = (1.0 + profile.growth).powf(t);
            let (factor, context) = shock(profile.name, year).unwrap_or((1.0, ""));

            let titles = profile.titles * trend * factor * noise.jitter(0.03);
            // Print runs shrink over time, so copies grow slower than titles.
            let copies = profile.copies * trend.sqrt() * factor * noise.jitter(0.04);
            let price = profile.usd_per_copy * (1.0 + 0.02 * t);
            let revenue = round_to(copies * price, 1);
            let population = profile.population * (1.0 + 0.011 * t);

            let digital = (year >= DIGITAL_SINCE).then(|| {
                let since = f64::from(year - DIGITAL_SINCE);
                round_to((1.5 + 2.2 * since) * noise.jitter(0.1), 1)
            });
            let yoy = previous_revenue.map(|prev| round_to((revenue - prev) / prev * 100.0, 1));
            previous_revenue = Some(revenue);

            rows.push(Row {
                pais: profile.name,
                anio: year,
                titulos_registrados_isbn: titles.round() as i64,
                ejemplares_producidos_millones: round_to(copies, 2),
                facturacion_estimada_millones_usd: revenue,
                tirada_promedio_ejemplares: (copies * 1_000_000.0 / titles).round() as i64,
                variacion_anual_pct: yoy,
                formato_digital_pct: digital,
                ejemplares_per_capita: round_to(copies / population, 2),
                contexto: (!context.is_empty()).then_some(context),
                fuente_principal: profile.source,
                notas: (year == LAST_YEAR).then_some("Estimación basada en tendencia"),
            });
        }
    }
    rows
}

/// Open `path` for writing; existing files are only replaced with `force`.
fn create_output(path: &Path, force: bool) -> Result<File> {
    if force {
        return File::create(path).with_context(|| format!("creating {}", path.display()));
    }
    match File::options().write(true).create_new(true).open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("{} already exists; pass --force to overwrite it", path.display())
        }
        Err(e) => Err(e).with_context(|| format!("creating {}", path.display())),
    }
}

fn write_csv(rows: &[Row], file: File) -> Result<()> {
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn text_column(rows: &[Row], f: impl Fn(&Row) -> Option<&'static str>) -> ArrayRef {
    Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn float_column(rows: &[Row], f: impl Fn(&Row) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn int_column(rows: &[Row], f: impl Fn(&Row) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(rows: &[Row], file: File) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("pais", DataType::Utf8, false),
        Field::new("anio", DataType::Int64, false),
        Field::new("titulos_registrados_isbn", DataType::Int64, false),
        Field::new("ejemplares_producidos_millones", DataType::Float64, false),
        Field::new("facturacion_estimada_millones_usd", DataType::Float64, false),
        Field::new("tirada_promedio_ejemplares", DataType::Int64, false),
        Field::new("variacion_anual_pct", DataType::Float64, true),
        Field::new("formato_digital_pct", DataType::Float64, true),
        Field::new("ejemplares_per_capita", DataType::Float64, false),
        Field::new("contexto", DataType::Utf8, true),
        Field::new("fuente_principal", DataType::Utf8, false),
        Field::new("notas", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text_column(rows, |r| Some(r.pais)),
            int_column(rows, |r| i64::from(r.anio)),
            int_column(rows, |r| r.titulos_registrados_isbn),
            float_column(rows, |r| Some(r.ejemplares_producidos_millones)),
            float_column(rows, |r| Some(r.facturacion_estimada_millones_usd)),
            int_column(rows, |r| r.tirada_promedio_ejemplares),
            float_column(rows, |r| r.variacion_anual_pct),
            float_column(rows, |r| r.formato_digital_pct),
            float_column(rows, |r| Some(r.ejemplares_per_capita)),
            text_column(rows, |r| r.contexto),
            text_column(rows, |r| Some(r.fuente_principal)),
            text_column(rows, |r| r.notas),
        ],
    )
    .context("building record batch")?;

    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let csv_path = args.output.with_extension("csv");
    let parquet_path = args.output.with_extension("parquet");
    if !args.force {
        if let Some(taken) = [&csv_path, &parquet_path].into_iter().find(|p| p.exists()) {
            bail!("{} already exists; pass --force to overwrite it", taken.display());
        }
    }
    let csv_file = create_output(&csv_path, args.force)?;
    let parquet_file = create_output(&parquet_path, args.force)?;

    let mut noise = Noise(2025);
    let rows = generate(&mut noise);
    write_csv(&rows, csv_file)?;
    write_parquet(&rows, parquet_file)?;

    println!(
        "Wrote {} rows ({} countries, {FIRST_YEAR}-{LAST_YEAR}) to {} and {}",
        rows.len(),
        PROFILES.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_output_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "pais,anio\n").unwrap();

        let err = create_output(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "pais,anio\n");

        assert!(create_output(&path, true).is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn new_output_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.parquet");
        assert!(create_output(&path, false).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn default_output_differs_from_dashboard_input() {
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_ne!(
            args.output.with_extension("csv"),
            PathBuf::from("mercado_editorial_latam_2000_2025.csv")
        );
    }

    #[test]
    fn covers_every_country_and_year() {
        let rows = generate(&mut Noise(1));
        assert_eq!(rows.len(), 7 * 26);
        assert!(rows
            .iter()
            .all(|r| r.formato_digital_pct.is_some() == (r.anio >= DIGITAL_SINCE)));
    }
}
