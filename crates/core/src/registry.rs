// SPDX-License-Identifier: MIT

//! `Registry` — the in-memory form of the State Store's JSON document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::worker_record::WorkerRecord;

/// `{"workers": [WorkerRecord, ...]}` on disk; keyed by name in memory so
/// lookups and the uniqueness invariant are cheap to enforce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(with = "workers_as_list")]
    workers: BTreeMap<String, WorkerRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&WorkerRecord> {
        self.workers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workers.contains_key(name)
    }

    /// Insert a new worker. Fails (returning `false`) if the name is
    /// already taken, preserving registry uniqueness.
    #[must_use]
    pub fn insert(&mut self, record: WorkerRecord) -> bool {
        if self.workers.contains_key(&record.name) {
            return false;
        }
        self.workers.insert(record.name.clone(), record);
        true
    }

    /// Unconditionally replace or insert; used for updates, not creation.
    pub fn upsert(&mut self, record: WorkerRecord) {
        self.workers.insert(record.name.clone(), record);
    }

    pub fn remove(&mut self, name: &str) -> Option<WorkerRecord> {
        self.workers.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerRecord> {
        self.workers.values()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn update(&mut self, name: &str, f: impl FnOnce(&mut WorkerRecord)) -> bool {
        match self.workers.get_mut(name) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }
}

/// Serializes as `{"workers": [...]}`, matching spec.md §6's on-disk schema,
/// while keeping the in-memory representation a name-keyed map.
mod workers_as_list {
    use super::WorkerRecord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, WorkerRecord>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&WorkerRecord> = map.values().collect();
        list.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, WorkerRecord>, D::Error> {
        let list = Vec::<WorkerRecord>::deserialize(d)?;
        Ok(list.into_iter().map(|r| (r.name.clone(), r)).collect())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
