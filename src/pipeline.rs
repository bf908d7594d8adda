//! Fetch, parse and analyze every tracked dataset
//!
//! Runs strictly in order: one dataset is brought up to date and analyzed
//! before the next one is touched.

use thiserror::Error;
use tracing::info;

use crate::analysis::{compare, Comparison};
use crate::cache::CacheManager;
use crate::cli::PipelineConfig;
use crate::data::{
    file_name_from_url, CountryTable, Dataset, FetchError, Fetcher, Population, SeriesError,
};

/// Errors that can stop a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Downloading a dataset failed
    #[error("Failed to fetch {dataset}: {source}")]
    Fetch {
        dataset: &'static str,
        #[source]
        source: FetchError,
    },

    /// Parsing or analyzing a table failed
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Builds the fetcher described by a config
pub fn fetcher_for(config: &PipelineConfig) -> Fetcher {
    let cache = match &config.data_dir {
        Some(dir) => CacheManager::with_dir(dir.clone()),
        None => CacheManager::default(),
    };
    Fetcher::new(cache).with_stale_after(config.stale_after)
}

/// Makes sure a dataset downloaded from `url` is cached locally and loads it
pub async fn load_dataset(
    fetcher: &Fetcher,
    dataset: Dataset,
    url: &str,
) -> Result<CountryTable, PipelineError> {
    let destination = fetcher.cache().file_path(file_name_from_url(url));

    fetcher
        .ensure_fresh(url, &destination)
        .await
        .map_err(|source| PipelineError::Fetch {
            dataset: dataset.label(),
            source,
        })?;

    let table = CountryTable::from_path(&destination)?;
    info!(
        dataset = dataset.label(),
        countries = table.len(),
        dates = table.dates().len(),
        "Loaded table"
    );
    Ok(table)
}

/// Runs the whole pipeline and returns one comparison per dataset
pub async fn run(config: &PipelineConfig) -> Result<Vec<Comparison>, PipelineError> {
    let sources: Vec<(Dataset, String)> = Dataset::ALL.iter().map(|d| (*d, d.url())).collect();
    run_with(&fetcher_for(config), config, &sources).await
}

/// Runs the pipeline for explicit `(dataset, url)` sources with an explicit fetcher
pub async fn run_with(
    fetcher: &Fetcher,
    config: &PipelineConfig,
    sources: &[(Dataset, String)],
) -> Result<Vec<Comparison>, PipelineError> {
    let population = Population::from_path(&config.population_path)?;

    let mut comparisons = Vec::with_capacity(sources.len());
    for (dataset, url) in sources {
        let table = load_dataset(fetcher, *dataset, url).await?;
        comparisons.push(compare(*dataset, table, &population, &config.analysis)?);
    }

    Ok(comparisons)
}

/// Formats the latest point of every country, one block per chart
pub fn summary(comparisons: &[Comparison]) -> String {
    let mut out = String::new();
    for comparison in comparisons {
        out.push_str(comparison.title());
        out.push('\n');
        out.push_str(&format!(
            "  {:<20} {:>14} {:>14}\n",
            "country", "total/M", "recent/M"
        ));
        for series in &comparison.series {
            if let Some((total, recent)) = series.latest() {
                out.push_str(&format!(
                    "  {:<20} {:>14.2} {:>14.2}\n",
                    series.country, total, recent
                ));
            }
        }
    }
    out
}
