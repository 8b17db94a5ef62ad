use crate::error::{AnalyticsError, Result};

/// Input bounds enforced before a request reaches the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min_year: i32,
    pub max_year: i32,
    pub min_tag_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { min_year: 2005, max_year: 2025, min_tag_len: 2 }
    }
}

impl Limits {
    pub fn year(&self, year: i32) -> Result<i32> {
        if year < self.min_year || year > self.max_year {
            return Err(AnalyticsError::InvalidInput(format!(
                "year must be between {} and {}, got {year}",
                self.min_year, self.max_year
            )));
        }
        Ok(year)
    }

    /// Checks the tag as given. Matching is by substring, so surrounding
    /// whitespace is significant and is not stripped.
    pub fn tag<'a>(&self, field: &str, tag: &'a str) -> Result<&'a str> {
        if tag.trim().is_empty() || tag.chars().count() < self.min_tag_len {
            return Err(AnalyticsError::InvalidInput(format!(
                "{field} must be at least {} characters, got {tag:?}",
                self.min_tag_len
            )));
        }
        Ok(tag)
    }
}
