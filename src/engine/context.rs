//! The stat engine's application context: store, preferences, active scope
//! and the collaborators it persists to and reads identity from.

use crate::engine::error::{Result, StatsError};
use crate::engine::extractor;
use crate::engine::injection::{build_summary, InjectionSnapshot};
use crate::engine::persistence::{Partition, Persistence};
use crate::engine::ranker::ComparisonReport;
use crate::engine::store::{self, StatStore};
use crate::model::preferences::Preferences;
use crate::model::scope::GLOBAL_SCOPE;
use crate::model::stat::StatRecord;

/// The participant the host currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participant {
    Active {
        name: Option<String>,
        avatar: Option<String>,
        id: String,
    },
    Unresolved,
}

impl Participant {
    /// `char_<name|avatar|id>`, or `global` when unresolved.
    pub fn scope_key(&self) -> String {
        match self {
            Participant::Active { name, avatar, id } => {
                let label = [name.as_deref(), avatar.as_deref()]
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .find(|s| !s.is_empty())
                    .unwrap_or(id.as_str());
                format!("char_{}", label)
            }
            Participant::Unresolved => GLOBAL_SCOPE.to_string(),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Participant::Active { name, .. } => name.as_deref().filter(|n| !n.trim().is_empty()),
            Participant::Unresolved => None,
        }
    }
}

/// Read access to the host application's session.
pub trait HostContext: Send {
    fn active_participant(&self) -> Participant;

    /// Receives the plain-text stat sheet of the active character after
    /// every stat change.
    fn store_card_stats(&self, _scope: &str, _text: &str) {}
}

/// Remembers the last resolved scope key and reports changes.
#[derive(Debug)]
pub struct CharacterResolver {
    current: String,
}

impl Default for CharacterResolver {
    fn default() -> Self {
        Self {
            current: GLOBAL_SCOPE.to_string(),
        }
    }
}

impl CharacterResolver {
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Resolves against the host; the bool is true only when the key differs
    /// from the previous resolution.
    pub fn resolve(&mut self, host: &dyn HostContext) -> (String, bool) {
        let key = host.active_participant().scope_key();
        if key == self.current {
            return (key, false);
        }
        log::info!("Character changed: {} -> {}", self.current, key);
        self.current = key.clone();
        (key, true)
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsEvent {
    /// The active scope's records changed, or the active scope switched.
    Refresh { scope: String },
    PreferencesChanged,
}

/// Owns all stat state. Every public operation resolves the active scope,
/// mutates, persists and queues its events within one call.
pub struct StatsContext {
    store: StatStore,
    prefs: Preferences,
    resolver: CharacterResolver,
    persistence: Box<dyn Persistence>,
    host: Box<dyn HostContext>,
    events: Vec<StatsEvent>,
}

impl StatsContext {
    /// Loads both partitions once. Unreadable data is logged and replaced by
    /// empty defaults.
    pub fn load(persistence: Box<dyn Persistence>, host: Box<dyn HostContext>) -> Self {
        let prefs = match persistence.load(Partition::Preferences) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(prefs) => {
                    log::info!("Loaded preferences");
                    prefs
                }
                Err(e) => {
                    log::error!("Stored preferences are malformed: {}", e);
                    Preferences::default()
                }
            },
            Ok(None) => Preferences::default(),
            Err(e) => {
                log::error!("Storage error: {}", e);
                Preferences::default()
            }
        };

        let store = match persistence.load(Partition::Stats) {
            Ok(Some(json)) => match StatStore::from_json(&json) {
                Ok(store) => {
                    log::info!("Loaded stats");
                    store
                }
                Err(e) => {
                    log::error!("Stored stats are malformed: {}", e);
                    StatStore::new()
                }
            },
            Ok(None) => StatStore::new(),
            Err(e) => {
                log::error!("Storage error: {}", e);
                StatStore::new()
            }
        };

        let mut ctx = Self {
            store,
            prefs,
            resolver: CharacterResolver::default(),
            persistence,
            host,
            events: Vec::new(),
        };
        ctx.resolver.resolve(ctx.host.as_ref());
        ctx
    }

    /// Resolves the active scope, queueing one refresh if it changed.
    pub fn active_scope(&mut self) -> String {
        let (key, changed) = self.resolver.resolve(self.host.as_ref());
        if changed {
            self.events.push(StatsEvent::Refresh { scope: key.clone() });
        }
        key
    }

    /// Polling tick for host-side identity changes.
    pub fn poll(&mut self) {
        self.active_scope();
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn set_preferences(&mut self, prefs: Preferences) {
        if prefs == self.prefs {
            return;
        }
        self.prefs = prefs;
        self.save_preferences();
        self.events.push(StatsEvent::PreferencesChanged);
    }

    pub fn store(&self) -> &StatStore {
        &self.store
    }

    /// Ordered records of the active scope.
    pub fn snapshot(&mut self) -> Vec<(String, StatRecord)> {
        let scope = self.active_scope();
        self.store.snapshot(&scope)
    }

    pub fn snapshot_of(&self, scope: &str) -> Vec<(String, StatRecord)> {
        self.store.snapshot(scope)
    }

    pub fn set_record(&mut self, key: &str, record: StatRecord) {
        let scope = self.active_scope();
        self.store.scope_mut(&scope).insert(key, record);
        self.commit(&scope);
    }

    pub fn delete_record(&mut self, key: &str) -> bool {
        let scope = self.active_scope();
        let removed = self.store.scope_mut(&scope).remove(key).is_some();
        if removed {
            log::info!("Deleted stat: {}", key);
            self.commit(&scope);
        }
        removed
    }

    pub fn reset_scope(&mut self) {
        let scope = self.active_scope();
        self.store.reset(&scope);
        self.commit(&scope);
    }

    pub fn add_record(&mut self, name: &str, value: &str, unit: &str) -> Result<String> {
        let scope = self.active_scope();
        let key = store::add_from_input(self.store.scope_mut(&scope), name, value, unit)?;
        log::info!("Added stat: {}", key);
        self.commit(&scope);
        Ok(key)
    }

    pub fn edit_record(&mut self, key: &str, name: &str, value: &str, unit: &str) -> Result<()> {
        let scope = self.active_scope();
        store::edit_from_input(self.store.scope_mut(&scope), key, name, value, unit)?;
        log::info!("Edited stat: {}", key);
        self.commit(&scope);
        Ok(())
    }

    pub fn add_default(&mut self, name: &str) -> Option<String> {
        let scope = self.active_scope();
        let key = store::add_default_stat(self.store.scope_mut(&scope), name)?;
        log::info!("Added default stat: {}", name);
        self.commit(&scope);
        Some(key)
    }

    /// Grows every numeric stat by a percentage given as text.
    pub fn grow(&mut self, percent: &str) -> Result<usize> {
        let percent = store::parse_growth(percent)?;
        let scope = self.active_scope();
        let count = store::grow_numeric(self.store.scope_mut(&scope), percent)?;
        log::info!("Grew {} stats by {}%", count, percent);
        self.commit(&scope);
        Ok(count)
    }

    /// Runs the extractor over one piece of transcript text. At most one
    /// persistence write and one refresh per call.
    pub fn observe_text(&mut self, text: &str) -> bool {
        let extractions = extractor::extract(text);
        if extractions.is_empty() {
            return false;
        }
        let scope = self.active_scope();
        let changed = extractor::apply(self.store.scope_mut(&scope), &extractions);
        if changed {
            self.commit(&scope);
        }
        changed
    }

    pub fn summary(&mut self) -> Option<String> {
        let scope = self.active_scope();
        self.store.scope(&scope).and_then(build_summary)
    }

    /// Owned view for one outbound request.
    pub fn injection_snapshot(&mut self) -> InjectionSnapshot {
        InjectionSnapshot {
            summary: self.summary(),
            prefs: self.prefs.clone(),
        }
    }

    /// Compares the first positive numeric stat of the active scope against
    /// the reference catalog.
    pub fn compare(&mut self) -> Result<ComparisonReport> {
        let scope = self.active_scope();
        let subject = self
            .host
            .active_participant()
            .display_name()
            .unwrap_or("Character")
            .to_string();

        let target = self.store.scope(&scope).and_then(|s| {
            s.iter()
                .find(|(_, r)| r.value.as_number().is_some_and(|v| v > 0.0))
                .map(|(_, r)| r.clone())
        });
        let record = target.ok_or(StatsError::NoNumericStats)?;
        let value = record.value.as_number().ok_or(StatsError::NoNumericStats)?;

        let report = ComparisonReport::build(&record.name, &subject, value, &record.unit)?;
        log::info!("Comparisons built for {}", record.name);
        Ok(report)
    }

    pub fn take_events(&mut self) -> Vec<StatsEvent> {
        std::mem::take(&mut self.events)
    }

    fn commit(&mut self, scope: &str) {
        self.save_stats();
        self.export_card(scope);
        self.events.push(StatsEvent::Refresh {
            scope: scope.to_string(),
        });
    }

    fn save_stats(&self) {
        let result = self
            .store
            .to_json()
            .and_then(|json| self.persistence.save(Partition::Stats, &json));
        if let Err(e) = result {
            log::error!("Save stats error: {}", e);
        }
    }

    fn save_preferences(&self) {
        let result = serde_json::to_string(&self.prefs)
            .map_err(StatsError::from)
            .and_then(|json| self.persistence.save(Partition::Preferences, &json));
        if let Err(e) = result {
            log::error!("Save prefs error: {}", e);
        }
    }

    fn export_card(&self, scope: &str) {
        if scope == GLOBAL_SCOPE {
            return;
        }
        let text = card_text(&self.store.snapshot(scope));
        if !text.is_empty() {
            self.host.store_card_stats(scope, &text);
        }
    }
}

/// Plain stat sheet, one `Name: value` line per record.
pub fn card_text(records: &[(String, StatRecord)]) -> String {
    records
        .iter()
        .map(|(_, r)| format!("{}: {}\n", r.name, r.display_value()))
        .collect()
}
