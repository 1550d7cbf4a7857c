use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::stat::{title_from_key, StatRecord, StatValue};

/// Scope used when no participant is resolved.
pub const GLOBAL_SCOPE: &str = "global";

/// All stats of one participant, keyed by stat key, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatScope {
    entries: Vec<(String, StatRecord)>,
}

impl StatScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&StatRecord> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut StatRecord> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r)
    }

    /// Replaces in place (keeping position) or appends.
    pub fn insert(&mut self, key: impl Into<String>, record: StatRecord) -> Option<StatRecord> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.entries.push((key, record));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<StatRecord> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut StatRecord)> {
        self.entries.iter_mut().map(|(k, r)| (k.as_str(), r))
    }

    /// Owned, ordered copy for readers that must not hold on to the store.
    pub fn snapshot(&self) -> Vec<(String, StatRecord)> {
        self.entries.clone()
    }
}

impl Serialize for StatScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

/// On disk a stat is normally a record object, older data stored the bare value.
/// Anything else (a `null` value, say) is dropped on its own so one bad
/// record does not take the rest of the store with it.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredStat {
    Record(StatRecord),
    Bare(StatValue),
    Unreadable(IgnoredAny),
}

impl StoredStat {
    fn into_record(self, key: &str) -> Option<StatRecord> {
        match self {
            StoredStat::Record(mut record) => {
                if record.name.trim().is_empty() {
                    record.name = title_from_key(key);
                }
                Some(record)
            }
            StoredStat::Bare(value) => Some(StatRecord::new(title_from_key(key), value, "")),
            StoredStat::Unreadable(_) => None,
        }
    }
}

struct ScopeVisitor;

impl<'de> Visitor<'de> for ScopeVisitor {
    type Value = StatScope;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of stat key to stat record")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StatScope, A::Error> {
        let mut scope = StatScope::new();
        while let Some((key, stored)) = access.next_entry::<String, StoredStat>()? {
            match stored.into_record(&key) {
                Some(record) => {
                    scope.insert(key, record);
                }
                None => log::warn!("Skipping unreadable stat: {}", key),
            }
        }
        Ok(scope)
    }
}

impl<'de> Deserialize<'de> for StatScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ScopeVisitor)
    }
}
