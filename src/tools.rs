use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::chart::{ChartSink, ChartSpec};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::format;
use crate::query::QueryEngine;
use crate::validate::Limits;

/// A tool call as it arrives from a client, e.g.
/// `{"tool": "character_stats", "character_tag": "hatsune_miku"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolRequest {
    TopCharactersByYear { year: i32 },
    CharacterStats { character_tag: String },
    ShipDependency { char1: String, char2: String },
    TagDriver { year: i32, tag: String },
    CompareCharacters { char1: String, char2: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub ok: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<PathBuf>,
}

impl ToolResponse {
    fn success(text: String, chart: Option<PathBuf>) -> Self {
        Self { ok: true, text, chart }
    }

    fn failure(text: String) -> Self {
        Self { ok: false, text, chart: None }
    }
}

/// Validates requests, runs them against the dataset, renders text and charts.
pub struct Toolbox<'a> {
    dataset: &'a Dataset,
    engine: QueryEngine,
    limits: Limits,
    charts: Box<dyn ChartSink + 'a>,
}

impl<'a> Toolbox<'a> {
    pub fn new(dataset: &'a Dataset, engine: QueryEngine, limits: Limits, charts: Box<dyn ChartSink + 'a>) -> Self {
        Self { dataset, engine, limits, charts }
    }

    /// Never fails: errors come back as a response with `ok = false`.
    pub fn invoke(&self, req: &ToolRequest) -> ToolResponse {
        info!("tool call: {req:?}");
        match self.dispatch(req) {
            Ok((text, chart)) => ToolResponse::success(text, chart),
            Err(e) => {
                warn!("tool call failed: {e}");
                ToolResponse::failure(format!("Error: {e}"))
            }
        }
    }

    fn dispatch(&self, req: &ToolRequest) -> Result<(String, Option<PathBuf>)> {
        let ds = self.dataset;
        match req {
            ToolRequest::TopCharactersByYear { year } => {
                let year = self.limits.year(*year)?;
                let r = self.engine.top_entities_by_year(ds, year)?;
                Ok((format::render_top_entities(&r), None))
            }
            ToolRequest::CharacterStats { character_tag } => {
                let tag = self.limits.tag("character_tag", character_tag)?;
                let r = self.engine.entity_stats(ds, tag)?;
                let chart = self.chart(&format::chart_stem("popularity", tag), &ChartSpec::popularity(tag, &r.monthly));
                Ok((format::render_entity_stats(&r, chart.as_deref()), chart))
            }
            ToolRequest::ShipDependency { char1, char2 } => {
                let base = self.limits.tag("char1", char1)?;
                let partner = self.limits.tag("char2", char2)?;
                let r = self.engine.co_occurrence(ds, base, partner)?;
                Ok((format::render_co_occurrence(&r), None))
            }
            ToolRequest::TagDriver { year, tag } => {
                let year = self.limits.year(*year)?;
                let tag = self.limits.tag("tag", tag)?;
                let r = self.engine.trend_drivers(ds, year, tag)?;
                let stem = format::chart_stem("drivers", &format!("{year}_{tag}"));
                let chart = self.chart(&stem, &ChartSpec::drivers(tag, year, &r.drivers));
                Ok((format::render_trend_drivers(&r, chart.as_deref()), chart))
            }
            ToolRequest::CompareCharacters { char1, char2 } => {
                let a = self.limits.tag("char1", char1)?;
                let b = self.limits.tag("char2", char2)?;
                let r = self.engine.compare(ds, a, b)?;
                let stem = format::chart_stem("compare", &format!("{a}_vs_{b}"));
                let spec = ChartSpec::head_to_head(a, &r.first_yearly, b, &r.second_yearly);
                let chart = self.chart(&stem, &spec);
                Ok((format::render_comparison(&r, chart.as_deref()), chart))
            }
        }
    }

    /// Answers one JSON request per input line until the reader is exhausted.
    /// Blank lines are skipped; a line that is not a request gets an error response.
    pub fn serve_lines<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> anyhow::Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let resp = match serde_json::from_str::<ToolRequest>(&line) {
                Ok(req) => self.invoke(&req),
                Err(e) => ToolResponse::failure(format!("Error: invalid request: {e}")),
            };
            writeln!(writer, "{}", serde_json::to_string(&resp)?)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// A chart that fails to render drops out of the response; the numbers still go back.
    fn chart(&self, stem: &str, spec: &ChartSpec) -> Option<PathBuf> {
        match self.charts.render(stem, spec) {
            Ok(path) => path,
            Err(e) => {
                warn!("chart {stem} not written: {e:#}");
                None
            }
        }
    }
}
