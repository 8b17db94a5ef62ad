use serde::{Deserialize, Serialize};

use crate::dataset::Record;
use crate::error::{AnalyticsError, Result};

/// How often `partner` shows up on records that mention `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoOccurrence {
    pub base: String,
    pub partner: String,
    pub base_total: usize,
    pub joint_count: usize,
    /// `joint_count / base_total * 100`, always within `[0, 100]`.
    pub percentage: f64,
}

/// Asymmetric by construction: `co_occurrence(a, b)` answers "given a, how often b".
///
/// Both entities are substring-matched against each record's tag text.
pub fn co_occurrence<'a, I>(records: I, base: &str, partner: &str) -> Result<CoOccurrence>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut base_total = 0usize;
    let mut joint_count = 0usize;
    for rec in records {
        if rec.mentions(base) {
            base_total += 1;
            if rec.mentions(partner) {
                joint_count += 1;
            }
        }
    }
    if base_total == 0 {
        return Err(AnalyticsError::EmptyBase { entity: base.to_string() });
    }
    let percentage = (joint_count as f64) / (base_total as f64) * 100.0;
    Ok(CoOccurrence {
        base: base.to_string(),
        partner: partner.to_string(),
        base_total,
        joint_count,
        percentage,
    })
}
