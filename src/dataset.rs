use chrono::{DateTime, TimeZone, Utc};
use rayon::prelude::*;

use crate::error::{AnalyticsError, Result};

/// One artwork: when it was created and its whitespace-separated tag string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub tag_string: String,
}

impl Record {
    pub fn new<Tz: TimeZone>(timestamp: DateTime<Tz>, tag_string: impl Into<String>) -> Self {
        Self { timestamp: timestamp.with_timezone(&Utc), tag_string: tag_string.into() }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tag_string.split_whitespace()
    }

    /// Substring match against the joined tag text, so `miku` also hits `hatsune_miku`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.tag_string.contains(needle)
    }
}

/// Loaded once and read-only afterwards; queries borrow it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The state a failed load degrades to. Every query on it reports `DatasetUnavailable`.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ensure_available(&self) -> Result<()> {
        if self.records.is_empty() {
            return Err(AnalyticsError::DatasetUnavailable);
        }
        Ok(())
    }

    /// Records passing `pred`, in dataset order.
    pub fn select<F>(&self, pred: F) -> Vec<&Record>
    where
        F: Fn(&Record) -> bool + Sync,
    {
        self.records.par_iter().filter(|r| pred(*r)).collect()
    }

    pub fn mentioning(&self, needle: &str) -> Vec<&Record> {
        self.select(|r| r.mentions(needle))
    }

    /// Records created in `year` whose tag text contains `needle`.
    pub fn in_year_mentioning(&self, year: i32, needle: &str) -> Vec<&Record> {
        match year_window(year) {
            Some((start, end)) => self.select(|r| {
                r.timestamp >= start && r.timestamp < end && r.mentions(needle)
            }),
            None => Vec::new(),
        }
    }
}

/// Half-open UTC window `[Jan 1 of year, Jan 1 of year + 1)`.
pub fn year_window(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc.with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0).single()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn normalizes_timestamps_to_utc() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let local = tokyo.with_ymd_and_hms(2017, 1, 1, 3, 0, 0).unwrap();
        let rec = Record::new(local, "1girl");
        assert_eq!(rec.timestamp, Utc.with_ymd_and_hms(2016, 12, 31, 18, 0, 0).unwrap());
    }

    #[test]
    fn year_filter_includes_last_day_of_year() {
        let ds = Dataset::new(vec![
            Record::new(Utc.with_ymd_and_hms(2016, 12, 31, 23, 59, 59).unwrap(), "1girl a_(b)"),
            Record::new(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap(), "1girl a_(b)"),
            Record::new(Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap(), "solo"),
        ]);
        assert_eq!(ds.in_year_mentioning(2016, "1girl").len(), 1);
        assert_eq!(ds.in_year_mentioning(2017, "1girl").len(), 1);
    }

    #[test]
    fn empty_tag_string_yields_no_tags() {
        let rec = Record::new(Utc::now(), "   ");
        assert_eq!(rec.tags().count(), 0);
    }

    #[test]
    fn unavailable_dataset_fails_fast() {
        assert_eq!(Dataset::unavailable().ensure_available(), Err(AnalyticsError::DatasetUnavailable));
    }
}
