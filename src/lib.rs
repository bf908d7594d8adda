//! covidplot library
//!
//! Exposes the fetch/cache, analysis and rendering modules to the binary and
//! to integration tests.

pub mod analysis;
pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod pipeline;
pub mod ui;
