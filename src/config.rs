use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::QuerySettings;
use crate::validate::Limits;

/// Runtime tunables. Every field has a default, so a config file only names what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub top_entities_k: usize,
    /// Raw candidates examined when ranking entities for a year.
    pub top_entities_pool: usize,
    pub drivers_k: usize,
    pub drivers_pool: usize,
    pub required_co_tag: String,
    /// Latest monthly count must exceed this to report "Still Active".
    pub activity_threshold: usize,
    pub min_year: i32,
    pub max_year: i32,
    pub min_tag_len: usize,
    pub charts_dir: PathBuf,
    /// Optional JSON rule set replacing the built-in lists.
    pub rules: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let q = QuerySettings::default();
        let l = Limits::default();
        Self {
            top_entities_k: q.top_entities_k,
            top_entities_pool: q.top_entities_pool,
            drivers_k: q.drivers_k,
            drivers_pool: q.drivers_pool,
            required_co_tag: q.required_co_tag,
            activity_threshold: q.activity_threshold,
            min_year: l.min_year,
            max_year: l.max_year,
            min_tag_len: l.min_tag_len,
            charts_dir: PathBuf::from("charts"),
            rules: None,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            top_entities_k: self.top_entities_k,
            top_entities_pool: self.top_entities_pool,
            drivers_k: self.drivers_k,
            drivers_pool: self.drivers_pool,
            required_co_tag: self.required_co_tag.clone(),
            activity_threshold: self.activity_threshold,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits { min_year: self.min_year, max_year: self.max_year, min_tag_len: self.min_tag_len }
    }
}
