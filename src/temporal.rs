use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Year,
}

impl Granularity {
    fn step(self) -> Months {
        match self {
            Granularity::Month => Months::new(1),
            Granularity::Year => Months::new(12),
        }
    }

    /// First day of the UTC calendar period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Month => date.with_day(1),
            Granularity::Year => date.with_ordinal(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub period: NaiveDate,
    pub count: usize,
}

/// Ascending, gap-free run of calendar buckets. Empty periods between the first
/// and last populated bucket are present with a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    Active,
    Declining,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::Active => write!(f, "Still Active"),
            ActivityStatus::Declining => write!(f, "Declining"),
        }
    }
}

/// Count timestamps per UTC calendar period.
pub fn bucket_by_period<I>(times: I, granularity: Granularity) -> TimeSeries
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for t in times {
        if let Some(p) = granularity.period_start(t.date_naive()) {
            *counts.entry(p).or_insert(0) += 1;
        }
    }
    fill_gaps(counts, granularity)
}

fn fill_gaps(counts: BTreeMap<NaiveDate, usize>, granularity: Granularity) -> TimeSeries {
    let mut buckets = Vec::with_capacity(counts.len());
    let (first, last) = match (counts.keys().next(), counts.keys().next_back()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return TimeSeries { granularity, buckets },
    };
    let mut cursor = Some(first);
    while let Some(period) = cursor.filter(|p| *p <= last) {
        buckets.push(Bucket { period, count: counts.get(&period).copied().unwrap_or(0) });
        cursor = period.checked_add_months(granularity.step());
    }
    TimeSeries { granularity, buckets }
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Highest bucket; the earliest wins a tie.
    pub fn peak(&self) -> Option<Bucket> {
        let mut best: Option<Bucket> = None;
        for b in &self.buckets {
            if best.map_or(true, |cur| b.count > cur.count) {
                best = Some(*b);
            }
        }
        best
    }

    pub fn latest(&self) -> Option<Bucket> {
        self.buckets.last().copied()
    }

    /// `Active` when the most recent bucket is strictly above `threshold`.
    pub fn status(&self, threshold: usize) -> ActivityStatus {
        match self.latest() {
            Some(b) if b.count > threshold => ActivityStatus::Active,
            _ => ActivityStatus::Declining,
        }
    }

    /// Re-bucket to a coarser granularity by summing.
    pub fn resample(&self, granularity: Granularity) -> TimeSeries {
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for b in &self.buckets {
            if let Some(p) = granularity.period_start(b.period) {
                *counts.entry(p).or_insert(0) += b.count;
            }
        }
        fill_gaps(counts, granularity)
    }
}
