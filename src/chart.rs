use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::format::plot_label;
use crate::frequency::ClassifiedEntity;
use crate::temporal::TimeSeries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub label: String,
    pub series: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: usize,
}

/// Renderer-agnostic description of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Line {
        title: String,
        x_label: String,
        y_label: String,
        lines: Vec<LabeledSeries>,
    },
    HorizontalBar {
        title: String,
        x_label: String,
        bars: Vec<Bar>,
    },
}

impl ChartSpec {
    pub fn popularity(entity: &str, monthly: &TimeSeries) -> Self {
        ChartSpec::Line {
            title: format!("Popularity History: {entity}"),
            x_label: "Year".into(),
            y_label: "Uploads per Month".into(),
            lines: vec![LabeledSeries { label: entity.to_string(), series: monthly.clone() }],
        }
    }

    pub fn drivers(trait_tag: &str, year: i32, drivers: &[ClassifiedEntity]) -> Self {
        ChartSpec::HorizontalBar {
            title: format!("Top Characters Driving '{trait_tag}' in {year}"),
            x_label: "Number of Co-occurrences".into(),
            bars: drivers
                .iter()
                .map(|d| Bar { label: plot_label(&d.tag), value: d.count })
                .collect(),
        }
    }

    pub fn head_to_head(first: &str, first_yearly: &TimeSeries, second: &str, second_yearly: &TimeSeries) -> Self {
        ChartSpec::Line {
            title: format!("Head-to-Head: {first} vs {second}"),
            x_label: "Year".into(),
            y_label: "Uploads per Year".into(),
            lines: vec![
                LabeledSeries { label: first.to_string(), series: first_yearly.clone() },
                LabeledSeries { label: second.to_string(), series: second_yearly.clone() },
            ],
        }
    }
}

/// Where charts go. `stem` is already sanitized; the sink picks the extension.
/// Returns the artifact path, or `None` when nothing was written.
pub trait ChartSink: Send + Sync {
    fn render(&self, stem: &str, chart: &ChartSpec) -> anyhow::Result<Option<PathBuf>>;
}

pub struct NullChartSink;

impl ChartSink for NullChartSink {
    fn render(&self, _stem: &str, _chart: &ChartSpec) -> anyhow::Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Writes each chart as pretty JSON into a directory, for an external plotter to pick up.
pub struct JsonChartSink {
    dir: PathBuf,
}

impl JsonChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartSink for JsonChartSink {
    fn render(&self, stem: &str, chart: &ChartSpec) -> anyhow::Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating charts directory {}", self.dir.display()))?;
        let path = self.dir.join(format!("{stem}.json"));
        let body = serde_json::to_string_pretty(chart)?;
        std::fs::write(&path, body).with_context(|| format!("writing chart {}", path.display()))?;
        Ok(Some(path))
    }
}
