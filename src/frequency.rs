use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::classifier::EntityClassifier;
use crate::dataset::Record;

/// A tag confirmed to name an entity, with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEntity {
    pub tag: String,
    pub count: usize,
}

/// Tag → count, remembering the order each tag was first seen so ties rank stably.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    index: AHashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut table = Self::new();
        for rec in records {
            table.extend(rec.tags());
        }
        table
    }

    pub fn add(&mut self, tag: &str) {
        match self.index.get(tag) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(tag.to_string(), self.entries.len());
                self.entries.push((tag.to_string(), 1));
            }
        }
    }

    pub fn extend<'a, I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for t in tags {
            self.add(t);
        }
    }

    pub fn get(&self, tag: &str) -> usize {
        self.index.get(tag).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total tag tokens counted.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn to_map(&self) -> HashMap<String, usize> {
        self.entries.iter().cloned().collect()
    }

    /// Up to `n` tags by descending count; equal counts keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut v: Vec<(&str, usize)> = self.entries.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v.truncate(n);
        v
    }

    /// First `k` entity tags among the `pool` most frequent raw tags.
    ///
    /// Only the top `pool` candidates are classified; when fewer than `k`
    /// entities live inside that ceiling the result is simply shorter.
    pub fn top_entities(
        &self,
        classifier: &EntityClassifier,
        k: usize,
        exclude: &[&str],
        pool: usize,
    ) -> Vec<ClassifiedEntity> {
        let mut out = Vec::with_capacity(k);
        if k == 0 {
            return out;
        }
        for (tag, count) in self.most_common(pool) {
            if exclude.contains(&tag) || !classifier.classify(tag) {
                continue;
            }
            out.push(ClassifiedEntity { tag: tag.to_string(), count });
            if out.len() == k {
                break;
            }
        }
        out
    }
}
