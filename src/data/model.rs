use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// First year covered by the published series.
pub const FIRST_YEAR: i32 = 2000;
/// Last year covered; rows for this year are forward estimates.
pub const LAST_YEAR: i32 = 2025;

// ---------------------------------------------------------------------------
// DataError – typed failures of the data layer
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("unknown country '{0}'")]
    UnknownCountry(String),
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("column '{column}' has unsupported type {found}")]
    UnsupportedType { column: String, found: String },
    #[error("row {row}: missing value in required column '{column}'")]
    MissingValue { row: usize, column: String },
}

// ---------------------------------------------------------------------------
// Country – the closed set of covered markets
// ---------------------------------------------------------------------------

/// One of the seven covered countries.
///
/// Variants are declared alphabetically so the derived `Ord` matches the
/// order used by the sidebar and the heatmap rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Country {
    Argentina,
    Bolivia,
    Chile,
    Colombia,
    Ecuador,
    Mexico,
    Peru,
}

impl Country {
    pub const ALL: [Country; 7] = [
        Country::Argentina,
        Country::Bolivia,
        Country::Chile,
        Country::Colombia,
        Country::Ecuador,
        Country::Mexico,
        Country::Peru,
    ];

    /// Display name as it appears in the source data.
    pub fn name(self) -> &'static str {
        match self {
            Country::Argentina => "Argentina",
            Country::Bolivia => "Bolivia",
            Country::Chile => "Chile",
            Country::Colombia => "Colombia",
            Country::Ecuador => "Ecuador",
            Country::Mexico => "México",
            Country::Peru => "Perú",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Country {
    type Err = DataError;

    /// Accepts the accented names and their plain-ASCII spellings, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .map(|c| match c {
                'é' | 'É' => 'e',
                'ú' | 'Ú' => 'u',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match folded.as_str() {
            "argentina" => Ok(Country::Argentina),
            "bolivia" => Ok(Country::Bolivia),
            "chile" => Ok(Country::Chile),
            "colombia" => Ok(Country::Colombia),
            "ecuador" => Ok(Country::Ecuador),
            "mexico" => Ok(Country::Mexico),
            "peru" => Ok(Country::Peru),
            _ => Err(DataError::UnknownCountry(s.to_string())),
        }
    }
}

impl Serialize for Country {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Country {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Record – one country-year observation
// ---------------------------------------------------------------------------

/// A single row of the source table.
///
/// Field order is the column order of the published CSV; serde renames keep
/// the published Spanish headers while accepting English ones on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "pais", alias = "country")]
    pub country: Country,
    #[serde(rename = "anio", alias = "year")]
    pub year: i32,
    #[serde(rename = "titulos_registrados_isbn", alias = "isbn_titles_registered")]
    pub isbn_titles_registered: f64,
    #[serde(
        rename = "ejemplares_producidos_millones",
        alias = "copies_produced_millions"
    )]
    pub copies_produced_millions: f64,
    #[serde(
        rename = "facturacion_estimada_millones_usd",
        alias = "revenue_estimate_usd_millions"
    )]
    pub revenue_estimate_usd_millions: f64,
    #[serde(rename = "tirada_promedio_ejemplares", alias = "average_print_run")]
    pub average_print_run: f64,
    #[serde(rename = "variacion_anual_pct", alias = "yoy_change_pct")]
    pub yoy_change_pct: Option<f64>,
    /// Only published from 2012 onward.
    #[serde(rename = "formato_digital_pct", alias = "digital_format_pct")]
    pub digital_format_pct: Option<f64>,
    #[serde(rename = "ejemplares_per_capita", alias = "copies_per_capita")]
    pub copies_per_capita: f64,
    /// Historical disruption (currency crisis, pandemic, ...) affecting this row.
    #[serde(
        rename = "contexto",
        alias = "context_note",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub context_note: Option<String>,
    #[serde(
        rename = "fuente_principal",
        alias = "primary_source",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub primary_source: Option<String>,
    #[serde(
        rename = "notas",
        alias = "notes",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub notes: Option<String>,
}

/// Empty text cells mean "absent" in every input format, so that a row
/// survives an export and re-import unchanged.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.filter(|t| !t.is_empty()))
}

impl Record {
    /// Rows for the last covered year are projections, not observations.
    pub fn is_estimate(&self) -> bool {
        self.year >= LAST_YEAR
    }

    /// The context note, if it carries any visible text.
    pub fn event(&self) -> Option<&str> {
        self.context_note
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Measure – numeric fields usable as chart values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Titles,
    Copies,
    Revenue,
    PrintRun,
    YoyChange,
    DigitalPct,
    PerCapita,
}

impl Measure {
    /// Value of this measure for a record; `None` when the field is absent.
    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            Measure::Titles => Some(record.isbn_titles_registered),
            Measure::Copies => Some(record.copies_produced_millions),
            Measure::Revenue => Some(record.revenue_estimate_usd_millions),
            Measure::PrintRun => Some(record.average_print_run),
            Measure::YoyChange => record.yoy_change_pct,
            Measure::DigitalPct => record.digital_format_pct,
            Measure::PerCapita => Some(record.copies_per_capita),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::Titles => "ISBN titles registered",
            Measure::Copies => "Copies produced",
            Measure::Revenue => "Estimated revenue",
            Measure::PrintRun => "Average print run",
            Measure::YoyChange => "Year-over-year change",
            Measure::DigitalPct => "Digital format share",
            Measure::PerCapita => "Copies per capita",
        }
    }

    /// Short unit used on axis titles.
    pub fn unit(self) -> &'static str {
        match self {
            Measure::Titles => "Titles",
            Measure::Copies => "Millions",
            Measure::Revenue => "USD M",
            Measure::PrintRun => "Copies/title",
            Measure::YoyChange | Measure::DigitalPct => "%",
            Measure::PerCapita => "Copies/inhabitant",
        }
    }
}

// ---------------------------------------------------------------------------
// Column – raw-data table columns
// ---------------------------------------------------------------------------

/// Columns of the raw-data table, in CSV header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Country,
    Year,
    Titles,
    Copies,
    Revenue,
    PrintRun,
    YoyChange,
    DigitalPct,
    PerCapita,
    Context,
    Source,
    Notes,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Country,
        Column::Year,
        Column::Titles,
        Column::Copies,
        Column::Revenue,
        Column::PrintRun,
        Column::YoyChange,
        Column::DigitalPct,
        Column::PerCapita,
        Column::Context,
        Column::Source,
        Column::Notes,
    ];

    /// The table opens with the numeric columns and hides the free text.
    pub fn defaults() -> BTreeSet<Column> {
        Column::ALL.iter().copied().take(8).collect()
    }

    /// Header name in the CSV file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Country => "pais",
            Column::Year => "anio",
            Column::Titles => "titulos_registrados_isbn",
            Column::Copies => "ejemplares_producidos_millones",
            Column::Revenue => "facturacion_estimada_millones_usd",
            Column::PrintRun => "tirada_promedio_ejemplares",
            Column::YoyChange => "variacion_anual_pct",
            Column::DigitalPct => "formato_digital_pct",
            Column::PerCapita => "ejemplares_per_capita",
            Column::Context => "contexto",
            Column::Source => "fuente_principal",
            Column::Notes => "notas",
        }
    }

    /// English header accepted as an alternative on input.
    pub fn alias(self) -> &'static str {
        match self {
            Column::Country => "country",
            Column::Year => "year",
            Column::Titles => "isbn_titles_registered",
            Column::Copies => "copies_produced_millions",
            Column::Revenue => "revenue_estimate_usd_millions",
            Column::PrintRun => "average_print_run",
            Column::YoyChange => "yoy_change_pct",
            Column::DigitalPct => "digital_format_pct",
            Column::PerCapita => "copies_per_capita",
            Column::Context => "context_note",
            Column::Source => "primary_source",
            Column::Notes => "notes",
        }
    }

    /// Whether the column is numeric (right-aligned in the table).
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Column::Country | Column::Context | Column::Source | Column::Notes
        )
    }

    /// Text shown in a table cell.
    pub fn cell_text(self, record: &Record) -> String {
        fn opt_num(v: Option<f64>) -> String {
            v.map(|v| format!("{v:.2}")).unwrap_or_default()
        }
        match self {
            Column::Country => record.country.to_string(),
            Column::Year => record.year.to_string(),
            Column::Titles => format!("{:.0}", record.isbn_titles_registered),
            Column::Copies => format!("{:.2}", record.copies_produced_millions),
            Column::Revenue => format!("{:.1}", record.revenue_estimate_usd_millions),
            Column::PrintRun => format!("{:.0}", record.average_print_run),
            Column::YoyChange => opt_num(record.yoy_change_pct),
            Column::DigitalPct => opt_num(record.digital_format_pct),
            Column::PerCapita => format!("{:.2}", record.copies_per_capita),
            Column::Context => record.context_note.clone().unwrap_or_default(),
            Column::Source => record.primary_source.clone().unwrap_or_default(),
            Column::Notes => record.notes.clone().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// YearRange – inclusive year bounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// The full range offered by the year controls.
    pub const FULL: YearRange = YearRange {
        min: FIRST_YEAR,
        max: LAST_YEAR,
    };

    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Clamp both ends into the control domain; an inverted range is swapped.
    pub fn clamped(self) -> Self {
        let min = self.min.clamp(FIRST_YEAR, LAST_YEAR);
        let max = self.max.clamp(FIRST_YEAR, LAST_YEAR);
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::FULL
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows, in file order.
    pub records: Vec<Record>,
    /// Distinct countries present in the data.
    pub countries: BTreeSet<Country>,
    /// Smallest and largest year present, if any.
    pub year_bounds: Option<(i32, i32)>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let countries = records.iter().map(|r| r.country).collect();
        let year_bounds = records.iter().fold(None, |acc, r| match acc {
            None => Some((r.year, r.year)),
            Some((lo, hi)) => Some((i32::min(lo, r.year), i32::max(hi, r.year))),
        });
        Dataset {
            records,
            countries,
            year_bounds,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any row is a forward estimate.
    pub fn has_estimates(&self) -> bool {
        self.records.iter().any(Record::is_estimate)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal record with every optional field absent.
    pub(crate) fn record(country: Country, year: i32, revenue: f64) -> Record {
        Record {
            country,
            year,
            isbn_titles_registered: 1000.0,
            copies_produced_millions: 10.0,
            revenue_estimate_usd_millions: revenue,
            average_print_run: 3000.0,
            yoy_change_pct: None,
            digital_format_pct: None,
            copies_per_capita: 0.5,
            context_note: None,
            primary_source: None,
            notes: None,
        }
    }

    #[test]
    fn parses_accented_and_plain_country_names() {
        assert_eq!("México".parse::<Country>(), Ok(Country::Mexico));
        assert_eq!("mexico".parse::<Country>(), Ok(Country::Mexico));
        assert_eq!(" PERÚ ".parse::<Country>(), Ok(Country::Peru));
        assert_eq!("Peru".parse::<Country>(), Ok(Country::Peru));
        assert_eq!(
            "Uruguay".parse::<Country>(),
            Err(DataError::UnknownCountry("Uruguay".into()))
        );
    }

    #[test]
    fn country_order_is_alphabetical() {
        let mut sorted = Country::ALL.to_vec();
        sorted.sort_by_key(|c| c.name());
        assert_eq!(sorted, Country::ALL.to_vec());
    }

    #[test]
    fn blank_context_is_not_an_event() {
        let mut r = record(Country::Chile, 2010, 1.0);
        assert_eq!(r.event(), None);
        r.context_note = Some("   ".into());
        assert_eq!(r.event(), None);
        r.context_note = Some(" Terremoto ".into());
        assert_eq!(r.event(), Some("Terremoto"));
    }

    #[test]
    fn year_range_clamps_to_control_domain() {
        assert_eq!(
            YearRange::new(1990, 2030).clamped(),
            YearRange::new(2000, 2025)
        );
        assert_eq!(
            YearRange::new(2020, 2010).clamped(),
            YearRange::new(2010, 2020)
        );
        assert_eq!(
            YearRange::new(2030, 1990).clamped(),
            YearRange::FULL
        );
        assert!(YearRange::new(2019, 2020).contains(2020));
        assert!(!YearRange::new(2019, 2020).contains(2021));
    }

    #[test]
    fn dataset_indexes_countries_and_years() {
        let ds = Dataset::from_records(vec![
            record(Country::Peru, 2003, 1.0),
            record(Country::Argentina, 2025, 2.0),
            record(Country::Peru, 2001, 3.0),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.year_bounds, Some((2001, 2025)));
        assert_eq!(
            ds.countries.iter().copied().collect::<Vec<_>>(),
            vec![Country::Argentina, Country::Peru]
        );
        assert!(ds.has_estimates());
        assert!(Dataset::from_records(Vec::new()).year_bounds.is_none());
    }

    #[test]
    fn optional_measures_report_absence() {
        let mut r = record(Country::Bolivia, 2011, 5.0);
        assert_eq!(Measure::DigitalPct.value(&r), None);
        r.digital_format_pct = Some(4.5);
        assert_eq!(Measure::DigitalPct.value(&r), Some(4.5));
        assert_eq!(Measure::Revenue.value(&r), Some(5.0));
        assert_eq!(Column::DigitalPct.cell_text(&r), "4.50");
        assert_eq!(Column::Context.cell_text(&r), "");
    }
}
