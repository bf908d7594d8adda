//! Per-country time series tables
//!
//! Parses the wide JHU CSSE layout (`Province/State,Country/Region,Lat,Long,<dates>...`),
//! sums provinces into their country, and provides the column-wise
//! transformations the charts need.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::Population;

/// Header of the column holding the country name
const COUNTRY_COLUMN: &str = "Country/Region";

/// Header of the last non-date column
const LONGITUDE_COLUMN: &str = "Long";

/// Date format used in the JHU column headers (e.g. `1/22/20`)
const DATE_HEADER_FORMAT: &str = "%m/%d/%y";

/// Errors that can occur while loading or transforming tables
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Underlying CSV could not be read
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be opened
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required column is not present in the header
    #[error("Missing column in header: {0}")]
    MissingColumn(String),

    /// A date column header could not be parsed
    #[error("Invalid date header: {0}")]
    MalformedDate(String),

    /// A cell could not be parsed as a number
    #[error("Invalid value '{value}' for {country} on {date}")]
    MalformedValue {
        country: String,
        date: NaiveDate,
        value: String,
    },

    /// Normalization needed a population that the table doesn't have
    #[error("No population known for {0}")]
    MissingPopulation(String),

    /// Population table holds an unusable value
    #[error("Invalid population {population} for {country}")]
    InvalidPopulation { country: String, population: f64 },
}

/// Values per country, one column per date
///
/// Countries are kept sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryTable {
    dates: Vec<NaiveDate>,
    rows: BTreeMap<String, Vec<f64>>,
}

impl CountryTable {
    /// Builds a table from possibly repeated country rows, summing repeats
    ///
    /// Every row must have one value per date.
    pub fn from_rows<I>(dates: Vec<NaiveDate>, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<f64>)>,
    {
        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (country, values) in rows {
            debug_assert_eq!(values.len(), dates.len());
            match grouped.get_mut(&country) {
                Some(total) => {
                    for (sum, value) in total.iter_mut().zip(values) {
                        *sum += value;
                    }
                }
                None => {
                    grouped.insert(country, values);
                }
            }
        }

        Self {
            dates,
            rows: grouped,
        }
    }

    /// Loads a JHU time series file, grouped by country
    pub fn from_path(path: &Path) -> Result<Self, SeriesError> {
        let file = std::fs::File::open(path).map_err(|source| SeriesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parses a JHU time series CSV, grouped by country
    ///
    /// Province rows are summed into their country and the coordinate columns
    /// are dropped. Empty cells count as zero.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let country_idx = column_index(&headers, COUNTRY_COLUMN)?;
        let first_date_idx = column_index(&headers, LONGITUDE_COLUMN)? + 1;

        let dates = headers
            .iter()
            .skip(first_date_idx)
            .map(parse_date_header)
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let country = record.get(country_idx).unwrap_or_default().trim().to_string();

            let values = record
                .iter()
                .skip(first_date_idx)
                .zip(&dates)
                .map(|(cell, date)| parse_cell(cell, &country, *date))
                .collect::<Result<Vec<_>, _>>()?;

            rows.push((country, values));
        }

        Ok(Self::from_rows(dates, rows))
    }

    /// Column dates, oldest first
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Country names in table order
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Values of one country
    pub fn get(&self, country: &str) -> Option<&[f64]> {
        self.rows.get(country).map(Vec::as_slice)
    }

    /// Iterates over `(country, values)` rows
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.rows.iter().map(|(c, v)| (c.as_str(), v.as_slice()))
    }

    /// Number of countries
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no countries
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes the named countries; names not in the table are ignored
    pub fn drop_countries<S: AsRef<str>>(mut self, excluded: &[S]) -> Self {
        for name in excluded {
            self.rows.remove(name.as_ref());
        }
        self
    }

    /// Keeps only the named countries
    pub fn select_countries<S: AsRef<str>>(mut self, allowed: &[S]) -> Self {
        self.rows
            .retain(|country, _| allowed.iter().any(|a| a.as_ref() == country));
        self
    }

    /// Replaces every row with its trailing-window delta
    pub fn trailing_delta(&self, window: usize) -> Self {
        self.map_rows(|values| trailing_delta(values, window))
    }

    /// Divides every row by the country's population, in units per million people
    pub fn per_million(&self, population: &Population) -> Result<Self, SeriesError> {
        let mut rows = BTreeMap::new();
        for (country, values) in &self.rows {
            let people = population
                .get(country)
                .ok_or_else(|| SeriesError::MissingPopulation(country.clone()))?;
            let scaled = values.iter().map(|v| per_million(*v, people)).collect();
            rows.insert(country.clone(), scaled);
        }

        Ok(Self {
            dates: self.dates.clone(),
            rows,
        })
    }

    fn map_rows<F>(&self, f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        Self {
            dates: self.dates.clone(),
            rows: self
                .rows
                .iter()
                .map(|(country, values)| (country.clone(), f(values)))
                .collect(),
        }
    }
}

/// Difference between each value and the value `window` positions earlier
///
/// The first `window` entries are measured against the first value.
pub fn trailing_delta(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| values[i] - values[i.saturating_sub(window)])
        .collect()
}

/// Scales a raw count to a rate per million people
pub fn per_million(raw: f64, population: f64) -> f64 {
    raw / population * 1_000_000.0
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, SeriesError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SeriesError::MissingColumn(name.to_string()))
}

fn parse_date_header(header: &str) -> Result<NaiveDate, SeriesError> {
    NaiveDate::parse_from_str(header.trim(), DATE_HEADER_FORMAT)
        .map_err(|_| SeriesError::MalformedDate(header.to_string()))
}

fn parse_cell(cell: &str, country: &str, date: NaiveDate) -> Result<f64, SeriesError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.parse().map_err(|_| SeriesError::MalformedValue {
        country: country.to_string(),
        date,
        value: cell.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Chile,-35.6751,-71.543,0,1,3
Alberta,Canada,53.9333,-116.5765,1,2,4
Ontario,Canada,51.2538,-85.3232,10,20,40
,\"Korea, South\",35.9078,127.7669,5,,7
,Diamond Princess,0,0,1,1,1
";

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    fn sample_table() -> CountryTable {
        CountryTable::from_reader(SAMPLE.as_bytes()).expect("sample should parse")
    }

    #[test]
    fn test_from_reader_parses_date_headers() {
        let table = sample_table();
        assert_eq!(table.dates(), &[date(1, 22), date(1, 23), date(1, 24)]);
    }

    #[test]
    fn test_from_reader_groups_provinces_by_country() {
        let table = sample_table();
        assert_eq!(table.get("Canada"), Some(&[11.0, 22.0, 44.0][..]));
        assert_eq!(table.get("Chile"), Some(&[0.0, 1.0, 3.0][..]));
    }

    #[test]
    fn test_from_reader_sorts_countries() {
        let table = sample_table();
        let countries: Vec<&str> = table.countries().collect();
        assert_eq!(
            countries,
            vec!["Canada", "Chile", "Diamond Princess", "Korea, South"]
        );
    }

    #[test]
    fn test_from_reader_treats_empty_cells_as_zero() {
        let table = sample_table();
        assert_eq!(table.get("Korea, South"), Some(&[5.0, 0.0, 7.0][..]));
    }

    #[test]
    fn test_from_reader_missing_country_column() {
        let csv = "State,Lat,Long,1/22/20\nx,0,0,1\n";
        let result = CountryTable::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(SeriesError::MissingColumn(c)) if c == COUNTRY_COLUMN));
    }

    #[test]
    fn test_from_reader_rejects_bad_date_header() {
        let csv = "Province/State,Country/Region,Lat,Long,yesterday\n,Chile,0,0,1\n";
        let result = CountryTable::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(SeriesError::MalformedDate(_))));
    }

    #[test]
    fn test_from_reader_rejects_bad_value() {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n,Chile,0,0,many\n";
        let result = CountryTable::from_reader(csv.as_bytes());
        assert!(matches!(
            result,
            Err(SeriesError::MalformedValue { ref country, .. }) if country == "Chile"
        ));
    }

    #[test]
    fn test_drop_countries_ignores_unknown_names() {
        let table = sample_table().drop_countries(&["Diamond Princess", "Atlantis"]);
        assert_eq!(table.len(), 3);
        assert!(table.get("Diamond Princess").is_none());
    }

    #[test]
    fn test_select_countries_is_strict_intersection() {
        let table = sample_table().select_countries(&["Chile", "Canada", "Germany"]);
        let countries: Vec<&str> = table.countries().collect();
        assert_eq!(countries, vec!["Canada", "Chile"]);
    }

    #[test]
    fn test_select_countries_with_empty_allowlist() {
        let table = sample_table().select_countries::<&str>(&[]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_trailing_delta_before_and_after_window() {
        let values = [1.0, 3.0, 6.0, 10.0, 15.0, 21.0];
        let delta = trailing_delta(&values, 2);

        // i < N measures against the first value
        assert_eq!(delta[0], 0.0);
        assert_eq!(delta[1], 2.0);
        // i >= N measures against value[i - N]
        assert_eq!(delta[2], 5.0);
        assert_eq!(delta[3], 7.0);
        assert_eq!(delta[4], 9.0);
        assert_eq!(delta[5], 11.0);
    }

    #[test]
    fn test_trailing_delta_window_longer_than_series() {
        let values = [2.0, 4.0, 8.0];
        assert_eq!(trailing_delta(&values, 7), vec![0.0, 2.0, 6.0]);
    }

    #[test]
    fn test_trailing_delta_empty_series() {
        assert!(trailing_delta(&[], 7).is_empty());
    }

    #[test]
    fn test_table_trailing_delta_keeps_dates_and_countries() {
        let table = sample_table();
        let delta = table.trailing_delta(1);

        assert_eq!(delta.dates(), table.dates());
        assert_eq!(delta.get("Canada"), Some(&[0.0, 11.0, 22.0][..]));
    }

    #[test]
    fn test_per_million_value() {
        assert_eq!(per_million(500.0, 1_000_000.0), 500.0);
        assert_eq!(per_million(250.0, 500_000.0), 500.0);
        assert_eq!(per_million(0.0, 19_116_201.0), 0.0);
    }

    #[test]
    fn test_table_per_million() {
        let table = CountryTable::from_rows(
            vec![date(3, 1), date(3, 2)],
            vec![("Chile".to_string(), vec![20.0, 40.0])],
        );
        let population: Population = [("Chile".to_string(), 2_000_000.0)].into_iter().collect();

        let scaled = table.per_million(&population).unwrap();

        assert_eq!(scaled.get("Chile"), Some(&[10.0, 20.0][..]));
    }

    #[test]
    fn test_table_per_million_missing_population() {
        let table = sample_table().select_countries(&["Chile"]);
        let population = Population::default();

        let result = table.per_million(&population);

        assert!(matches!(result, Err(SeriesError::MissingPopulation(c)) if c == "Chile"));
    }

    #[test]
    fn test_from_rows_sums_duplicates() {
        let table = CountryTable::from_rows(
            vec![date(3, 1)],
            vec![
                ("US".to_string(), vec![1.0]),
                ("US".to_string(), vec![2.0]),
            ],
        );
        assert_eq!(table.get("US"), Some(&[3.0][..]));
    }
}
