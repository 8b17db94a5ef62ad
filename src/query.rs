use log::debug;
use serde::{Deserialize, Serialize};

use crate::classifier::EntityClassifier;
use crate::cooccurrence::{self, CoOccurrence};
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::frequency::{ClassifiedEntity, FrequencyTable};
use crate::temporal::{bucket_by_period, ActivityStatus, Bucket, Granularity, TimeSeries};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySettings {
    pub top_entities_k: usize,
    pub top_entities_pool: usize,
    pub drivers_k: usize,
    pub drivers_pool: usize,
    pub required_co_tag: String,
    pub activity_threshold: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            top_entities_k: 10,
            top_entities_pool: 5000,
            drivers_k: 5,
            drivers_pool: 2000,
            required_co_tag: "1girl".to_string(),
            activity_threshold: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntities {
    pub year: i32,
    pub required_co_tag: String,
    pub subset_size: usize,
    pub entities: Vec<ClassifiedEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    pub entity: String,
    pub total: usize,
    pub monthly: TimeSeries,
    pub peak: Bucket,
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendDrivers {
    pub year: i32,
    pub trait_tag: String,
    pub subset_size: usize,
    pub drivers: Vec<ClassifiedEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub first: EntityStats,
    pub second: EntityStats,
    pub first_yearly: TimeSeries,
    pub second_yearly: TimeSeries,
    pub winner: String,
}

/// The analytical operations. Holds only immutable settings, so one engine can
/// serve concurrent callers against a shared `Dataset`.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    classifier: EntityClassifier,
    settings: QuerySettings,
}

impl QueryEngine {
    pub fn new(classifier: EntityClassifier, settings: QuerySettings) -> Self {
        Self { classifier, settings }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    pub fn classifier(&self) -> &EntityClassifier {
        &self.classifier
    }

    /// Most frequent entities among `year`'s records carrying the required co-tag.
    pub fn top_entities_by_year(&self, dataset: &Dataset, year: i32) -> Result<TopEntities> {
        dataset.ensure_available()?;
        let co_tag = self.settings.required_co_tag.as_str();
        let subset = dataset.in_year_mentioning(year, co_tag);
        if subset.is_empty() {
            return Err(AnalyticsError::NoDataInRange { year, scope: format!("'{co_tag}'") });
        }
        let table = FrequencyTable::from_records(subset.iter().copied());
        debug!("year {year}: {} records, {} distinct tags", subset.len(), table.len());
        let entities = table.top_entities(
            &self.classifier,
            self.settings.top_entities_k,
            &[co_tag],
            self.settings.top_entities_pool,
        );
        Ok(TopEntities {
            year,
            required_co_tag: co_tag.to_string(),
            subset_size: subset.len(),
            entities,
        })
    }

    pub fn entity_stats(&self, dataset: &Dataset, entity: &str) -> Result<EntityStats> {
        dataset.ensure_available()?;
        let subset = dataset.mentioning(entity);
        let monthly = bucket_by_period(subset.iter().map(|r| r.timestamp), Granularity::Month);
        let peak = monthly
            .peak()
            .ok_or_else(|| AnalyticsError::EntityNotFound { entity: entity.to_string() })?;
        Ok(EntityStats {
            entity: entity.to_string(),
            total: subset.len(),
            status: monthly.status(self.settings.activity_threshold),
            peak,
            monthly,
        })
    }

    pub fn co_occurrence(&self, dataset: &Dataset, base: &str, partner: &str) -> Result<CoOccurrence> {
        dataset.ensure_available()?;
        cooccurrence::co_occurrence(dataset.records(), base, partner)
    }

    /// Entities most often tagged alongside `trait_tag` during `year`.
    pub fn trend_drivers(&self, dataset: &Dataset, year: i32, trait_tag: &str) -> Result<TrendDrivers> {
        dataset.ensure_available()?;
        let subset = dataset.in_year_mentioning(year, trait_tag);
        if subset.is_empty() {
            return Err(AnalyticsError::NoDataInRange { year, scope: format!("tag '{trait_tag}'") });
        }
        let table = FrequencyTable::from_records(subset.iter().copied());
        let drivers = table.top_entities(
            &self.classifier,
            self.settings.drivers_k,
            &[trait_tag],
            self.settings.drivers_pool,
        );
        Ok(TrendDrivers {
            year,
            trait_tag: trait_tag.to_string(),
            subset_size: subset.len(),
            drivers,
        })
    }

    /// Head-to-head totals. The first entity wins a tie.
    pub fn compare(&self, dataset: &Dataset, first: &str, second: &str) -> Result<Comparison> {
        let first = self.entity_stats(dataset, first)?;
        let second = self.entity_stats(dataset, second)?;
        let winner = if second.total > first.total {
            second.entity.clone()
        } else {
            first.entity.clone()
        };
        Ok(Comparison {
            first_yearly: first.monthly.resample(Granularity::Year),
            second_yearly: second.monthly.resample(Granularity::Year),
            first,
            second,
            winner,
        })
    }
}
