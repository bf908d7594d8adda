//! Data sources and tables for covidplot
//!
//! This module knows where the time series live, how to keep local copies of
//! them fresh, and how to turn the downloaded CSVs into per-country tables.

pub mod fetch;
pub mod population;
pub mod series;

pub use fetch::{FetchError, FetchOutcome, Fetcher};
pub use population::Population;
pub use series::{CountryTable, SeriesError};

/// Base URL of the JHU CSSE global time series
const JHU_TIME_SERIES_BASE_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";

/// A tracked time series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Cumulative confirmed cases
    Confirmed,
    /// Cumulative deaths
    Deaths,
}

impl Dataset {
    /// All datasets in display order
    pub const ALL: [Dataset; 2] = [Dataset::Confirmed, Dataset::Deaths];

    /// URL the dataset is downloaded from
    pub fn url(self) -> String {
        let file = match self {
            Dataset::Confirmed => "time_series_covid19_confirmed_global.csv",
            Dataset::Deaths => "time_series_covid19_deaths_global.csv",
        };
        format!("{}/{}", JHU_TIME_SERIES_BASE_URL, file)
    }

    /// Local file name, taken from the last segment of the URL
    pub fn file_name(self) -> String {
        file_name_from_url(&self.url()).to_string()
    }

    /// Chart title for the dataset
    pub fn title(self) -> &'static str {
        match self {
            Dataset::Confirmed => "Confirmed cases per country",
            Dataset::Deaths => "Deaths per country",
        }
    }

    /// Short label used in summaries
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Confirmed => "confirmed",
            Dataset::Deaths => "deaths",
        }
    }
}

/// Returns the last path segment of a URL, ignoring any query string
pub fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}
