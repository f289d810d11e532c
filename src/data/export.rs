use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::View;
use super::model::{Column, YearRange};

/// Download name for the current view, e.g. `latam_libros_2000_2025.csv`.
pub fn export_file_name(years: YearRange) -> String {
    format!("latam_libros_{}_{}.csv", years.min, years.max)
}

/// Write the view as CSV: the published header, then every row in view order.
pub fn write_csv<W: Write>(view: &View<'_>, writer: W) -> Result<()> {
    // Headers are written by hand so an empty view still gets them.
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(Column::ALL.map(Column::header))
        .context("writing CSV header")?;
    for record in view.iter() {
        csv_writer.serialize(record).context("writing CSV row")?;
    }
    csv_writer.flush().context("flushing CSV")?;
    Ok(())
}

/// The view as UTF-8 CSV bytes.
pub fn to_csv_bytes(view: &View<'_>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

/// Save the view to `path`, returning the number of rows written.
pub fn save_csv(view: &View<'_>, path: &Path) -> Result<usize> {
    let bytes = to_csv_bytes(view)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(view.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, Selection};
    use crate::data::loader::{read_csv, read_json};
    use crate::data::model::tests::record;
    use crate::data::model::{Country, Dataset, Record};

    fn varied_rows() -> Vec<Record> {
        let mut a = record(Country::Argentina, 2019, 512.25);
        a.context_note = Some("Devaluación, \"cepo\" cambiario".into());
        a.yoy_change_pct = Some(-12.5);
        let mut m = record(Country::Mexico, 2020, 1250.0);
        m.digital_format_pct = Some(9.75);
        m.primary_source = Some("CANIEM".into());
        m.notes = Some("multi\nline".into());
        let c = record(Country::Chile, 2020, 300.0);
        vec![a, m, c]
    }

    #[test]
    fn file_name_embeds_year_range() {
        assert_eq!(
            export_file_name(YearRange::new(2005, 2018)),
            "latam_libros_2005_2018.csv"
        );
    }

    #[test]
    fn header_uses_published_column_names() {
        let rows = varied_rows();
        let view: View<'_> = rows.iter().collect();
        let text = String::from_utf8(to_csv_bytes(&view).unwrap()).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "pais,anio,titulos_registrados_isbn,ejemplares_producidos_millones,\
facturacion_estimada_millones_usd,tirada_promedio_ejemplares,variacion_anual_pct,\
formato_digital_pct,ejemplares_per_capita,contexto,fuente_principal,notas"
        );
        assert!(text.contains("México"));
    }

    #[test]
    fn export_round_trips_filtered_view() {
        let ds = Dataset::from_records(varied_rows());
        let sel = Selection::new(
            YearRange::new(2019, 2020),
            [Country::Argentina, Country::Mexico],
        );
        let view = filter(&ds.records, &sel);
        let bytes = to_csv_bytes(&view).unwrap();
        let reparsed = read_csv(bytes.as_slice()).unwrap();
        let original: Vec<Record> = view.iter().cloned().collect();
        assert_eq!(reparsed.records, original);
    }

    #[test]
    fn empty_view_still_gets_a_header() {
        let text = String::from_utf8(to_csv_bytes(&View::default()).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("pais,anio,"));
        assert!(read_csv(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn json_rows_survive_csv_export() {
        let json = r#"[
            {"pais": "Perú", "anio": 2017, "titulos_registrados_isbn": 7000,
             "ejemplares_producidos_millones": 12.0,
             "facturacion_estimada_millones_usd": 80.0,
             "tirada_promedio_ejemplares": 1700, "variacion_anual_pct": null,
             "formato_digital_pct": 6.0, "ejemplares_per_capita": 0.4,
             "contexto": "", "fuente_principal": "", "notas": "Niño costero"}
        ]"#;
        let loaded = read_json(json).unwrap();
        assert_eq!(loaded.records[0].context_note, None);
        assert_eq!(loaded.records[0].primary_source, None);

        let view: View<'_> = loaded.records.iter().collect();
        let reparsed = read_csv(to_csv_bytes(&view).unwrap().as_slice()).unwrap();
        assert_eq!(reparsed.records, loaded.records);
    }

    #[test]
    fn saves_to_disk() {
        let rows = varied_rows();
        let view: View<'_> = rows.iter().collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name(YearRange::FULL));
        assert_eq!(save_csv(&view, &path).unwrap(), 3);
        let reparsed = crate::data::loader::load_file(&path).unwrap();
        assert_eq!(reparsed.len(), 3);
    }
}
