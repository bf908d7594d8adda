//! Population table used for per-million normalization

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::SeriesError;

/// Default location of the population table, relative to the working directory
pub const DEFAULT_POPULATION_PATH: &str = "static_data/population.csv";

#[derive(Debug, Deserialize)]
struct PopulationRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Population")]
    population: f64,
}

/// Population by country name
#[derive(Debug, Clone, Default)]
pub struct Population {
    by_country: HashMap<String, f64>,
}

impl Population {
    /// Loads a `Country,Population` CSV file
    pub fn from_path(path: &Path) -> Result<Self, SeriesError> {
        let file = std::fs::File::open(path).map_err(|source| SeriesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parses a `Country,Population` CSV from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut by_country = HashMap::new();

        for row in csv_reader.deserialize() {
            let row: PopulationRow = row?;
            if row.population.is_nan() || row.population <= 0.0 {
                return Err(SeriesError::InvalidPopulation {
                    country: row.country,
                    population: row.population,
                });
            }
            by_country.insert(row.country, row.population);
        }

        Ok(Self { by_country })
    }

    /// Looks up the population of a country
    pub fn get(&self, country: &str) -> Option<f64> {
        self.by_country.get(country).copied()
    }

    /// Number of countries in the table
    pub fn len(&self) -> usize {
        self.by_country.len()
    }

    /// Returns true when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }
}

impl FromIterator<(String, f64)> for Population {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            by_country: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader_parses_rows() {
        let csv = "Country,Population\nChile,19116201\nUS,331002651\n";
        let population = Population::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(population.len(), 2);
        assert_eq!(population.get("Chile"), Some(19_116_201.0));
        assert_eq!(population.get("US"), Some(331_002_651.0));
        assert_eq!(population.get("Spain"), None);
    }

    #[test]
    fn test_from_reader_handles_quoted_names() {
        let csv = "Country,Population\n\"Korea, South\",51269185\n";
        let population = Population::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(population.get("Korea, South"), Some(51_269_185.0));
    }

    #[test]
    fn test_from_reader_rejects_zero_population() {
        let csv = "Country,Population\nNowhere,0\n";
        let result = Population::from_reader(csv.as_bytes());

        assert!(matches!(
            result,
            Err(SeriesError::InvalidPopulation { ref country, .. }) if country == "Nowhere"
        ));
    }

    #[test]
    fn test_from_reader_rejects_non_numeric_population() {
        let csv = "Country,Population\nChile,lots\n";
        assert!(Population::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Population::from_path(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(SeriesError::Io { .. })));
    }

    #[test]
    fn test_bundled_population_covers_default_countries() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_POPULATION_PATH);
        let population = Population::from_path(&path).expect("bundled table should load");

        for country in crate::cli::DEFAULT_COUNTRIES {
            assert!(
                population.get(country).is_some(),
                "missing population for {}",
                country
            );
        }
    }
}
