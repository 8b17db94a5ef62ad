//! Text rendering of query results. Tags are only normalized here, never when
//! classifying or counting.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;

use crate::cooccurrence::CoOccurrence;
use crate::query::{Comparison, EntityStats, TopEntities, TrendDrivers};

static RE_UNSAFE_FILENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:/ ]").unwrap());

/// Uppercase the first letter of every run of letters, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(ch);
            prev_letter = false;
        }
    }
    out
}

/// `rem_(re:zero)` → `Rem [Re:Zero]`
pub fn display_name(tag: &str) -> String {
    title_case(&tag.replace('_', " ")).replace('(', "[").replace(')', "]")
}

/// Chart axis label: like [`display_name`] with the parentheses dropped.
pub fn plot_label(tag: &str) -> String {
    title_case(&tag.replace('_', " ")).replace(['(', ')'], "")
}

/// `compare`, `rem_(re:zero)` → `compare_rem_(re_zero)`
pub fn chart_stem(prefix: &str, query: &str) -> String {
    format!("{prefix}_{}", RE_UNSAFE_FILENAME.replace_all(query, "_"))
}

/// `1234567` → `1,234,567`
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn chart_line(out: &mut String, label: &str, chart: Option<&Path>) {
    if let Some(p) = chart {
        let _ = write!(out, "\n{label}: {}", p.display());
    }
}

pub fn render_top_entities(r: &TopEntities) -> String {
    let mut out = format!("Top {} Characters of {}:", r.entities.len(), r.year);
    if r.entities.is_empty() {
        out.push_str("\n(no character tags found)");
    }
    for (i, e) in r.entities.iter().enumerate() {
        let _ = write!(out, "\n{}. {}", i + 1, display_name(&e.tag));
    }
    out
}

pub fn render_entity_stats(r: &EntityStats, chart: Option<&Path>) -> String {
    let mut out = format!(
        "Stats for '{}':\n- Total Artworks: {}\n- Peak Popularity: {} ({} uploads/month)\n- Current Status: {}",
        r.entity,
        thousands(r.total),
        r.peak.period.format("%B %Y"),
        r.peak.count,
        r.status,
    );
    chart_line(&mut out, "Graph Saved", chart);
    out
}

pub fn render_co_occurrence(r: &CoOccurrence) -> String {
    format!(
        "Ship Analysis:\n- When {} is drawn, {} appears {:.1}% of the time.\n- {} Total Images: {}\n- Joint Images: {}",
        r.base, r.partner, r.percentage, r.base, r.base_total, r.joint_count,
    )
}

pub fn render_trend_drivers(r: &TrendDrivers, chart: Option<&Path>) -> String {
    let drivers = r
        .drivers
        .iter()
        .map(|d| display_name(&format!("{} ({})", d.tag, d.count)))
        .join(", ");
    let mut out = format!(
        "Analysis of '{}' in {}:\n- Total Images: {}\n- Top Drivers: {}",
        r.trait_tag, r.year, r.subset_size, drivers,
    );
    chart_line(&mut out, "Graph Saved", chart);
    out
}

pub fn render_comparison(r: &Comparison, chart: Option<&Path>) -> String {
    let mut out = format!(
        "{a} vs {b}\n- {a}: {ta}\n- {b}: {tb}\n- Winner: {w}",
        a = r.first.entity,
        b = r.second.entity,
        ta = thousands(r.first.total),
        tb = thousands(r.second.total),
        w = r.winner,
    );
    chart_line(&mut out, "Comparison Chart Saved", chart);
    out
}
