//! Recent-versus-cumulative comparisons
//!
//! Turns a grouped country table into the point series plotted on one chart:
//! cumulative values per million on x, trailing-window new values per million on y.

use tracing::debug;

use crate::data::{CountryTable, Dataset, Population, SeriesError};

/// Options shared by every comparison
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Length of the trailing window in days
    pub window_days: usize,
    /// Entries that are not countries and should be removed first
    pub excluded: Vec<String>,
    /// Countries to keep
    pub countries: Vec<String>,
}

/// One country's line on a comparison chart
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: String,
    /// `(cumulative per million, trailing per million)` per date
    pub points: Vec<(f64, f64)>,
}

impl CountrySeries {
    /// Most recent point, if any
    pub fn latest(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }
}

/// All the lines of one chart
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub dataset: Dataset,
    pub window_days: usize,
    pub series: Vec<CountrySeries>,
}

impl Comparison {
    /// Chart title
    pub fn title(&self) -> &'static str {
        self.dataset.title()
    }

    /// Label of the cumulative axis
    pub fn x_label(&self) -> &'static str {
        "Total per million people"
    }

    /// Label of the trailing-window axis
    pub fn y_label(&self) -> String {
        if self.window_days == 7 {
            "Weekly per million people".to_string()
        } else {
            format!("Last {} days per million people", self.window_days)
        }
    }
}

/// Builds the comparison chart data for one dataset
///
/// Exclusions are dropped, the trailing delta is taken on raw counts, then both
/// tables are restricted to the allowlist and scaled by population.
pub fn compare(
    dataset: Dataset,
    table: CountryTable,
    population: &Population,
    options: &AnalysisOptions,
) -> Result<Comparison, SeriesError> {
    let cumulative = table
        .drop_countries(options.excluded.as_slice())
        .select_countries(options.countries.as_slice());
    let trailing = cumulative.trailing_delta(options.window_days);

    let cumulative = cumulative.per_million(population)?;
    let trailing = trailing.per_million(population)?;

    let series: Vec<CountrySeries> = cumulative
        .iter()
        .filter_map(|(country, totals)| {
            let recent = trailing.get(country)?;
            Some(CountrySeries {
                country: country.to_string(),
                points: totals.iter().copied().zip(recent.iter().copied()).collect(),
            })
        })
        .collect();

    debug!(
        dataset = dataset.label(),
        countries = series.len(),
        dates = cumulative.dates().len(),
        "Built comparison"
    );

    Ok(Comparison {
        dataset,
        window_days: options.window_days,
        series,
    })
}
