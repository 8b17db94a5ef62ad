pub mod error;
pub mod rules;
pub mod classifier;
pub mod dataset;
pub mod loader;
pub mod frequency;
pub mod temporal;
pub mod cooccurrence;
pub mod query;
pub mod validate;
pub mod config;
pub mod format;
pub mod chart;
pub mod tools;

pub use dataset::{Dataset, Record};
pub use error::AnalyticsError;
pub use query::QueryEngine;
