use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::error::{Result, StatsError};
use crate::model::scope::StatScope;
use crate::model::stat::{leading_number_of, stat_key, StatRecord, StatValue};

/// Stats for every participant, keyed by scope key ("char_Alex", "global").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatStore {
    scopes: BTreeMap<String, StatScope>,
}

impl StatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The scope for `key`, created empty on first access.
    pub fn scope_mut(&mut self, key: &str) -> &mut StatScope {
        self.scopes.entry(key.to_string()).or_default()
    }

    pub fn scope(&self, key: &str) -> Option<&StatScope> {
        self.scopes.get(key)
    }

    pub fn snapshot(&self, key: &str) -> Vec<(String, StatRecord)> {
        self.scope(key).map(StatScope::snapshot).unwrap_or_default()
    }

    /// Empties a scope. The scope key stays in the store.
    pub fn reset(&mut self, key: &str) {
        self.scope_mut(key).clear();
    }

    pub fn scope_keys(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }
}

/// Stats offered by the "add default stat" picker.
pub const DEFAULT_STATS: &[(&str, &str)] = &[("Height", " ft"), ("Weight", " lbs")];

/// Adds a default stat with value 0 unless its key already exists.
/// Returns the key when something was added.
pub fn add_default_stat(scope: &mut StatScope, name: &str) -> Option<String> {
    let key = stat_key(name);
    let (name, unit) = DEFAULT_STATS
        .iter()
        .find(|(default, _)| stat_key(default) == key)?;

    if scope.contains_key(&key) {
        return None;
    }
    scope.insert(key.clone(), StatRecord::new(*name, StatValue::Number(0.0), *unit));
    Some(key)
}

/// Creates or replaces a record from form input; the key comes from the name.
pub fn add_from_input(scope: &mut StatScope, name: &str, value: &str, unit: &str) -> Result<String> {
    let record = validated_input(name, value, unit)?;
    let key = stat_key(&record.name);
    scope.insert(key.clone(), record);
    Ok(key)
}

/// Rewrites name, value and unit of an existing record. Its key is kept
/// even when the name changes.
pub fn edit_from_input(
    scope: &mut StatScope,
    key: &str,
    name: &str,
    value: &str,
    unit: &str,
) -> Result<()> {
    let record = validated_input(name, value, unit)?;
    let existing = scope
        .get_mut(key)
        .ok_or_else(|| StatsError::UnknownStat(key.to_string()))?;
    *existing = record;
    Ok(())
}

fn validated_input(name: &str, value: &str, unit: &str) -> Result<StatRecord> {
    if name.trim().is_empty() {
        return Err(StatsError::MissingField("name"));
    }
    if value.trim().is_empty() {
        return Err(StatsError::MissingField("value"));
    }
    Ok(StatRecord::from_input(name, value, unit))
}

/// Parses a growth percentage; empty, zero and non-numeric input is rejected.
pub fn parse_growth(input: &str) -> Result<f64> {
    match leading_number_of(input) {
        Some(percent) if percent != 0.0 => Ok(percent),
        _ => Err(StatsError::InvalidGrowth(input.to_string())),
    }
}

/// Scales every numeric record by `1 + percent / 100`. Text records are left
/// alone. Returns how many records grew. Nothing changes when any result
/// would overflow.
pub fn grow_numeric(scope: &mut StatScope, percent: f64) -> Result<usize> {
    if percent == 0.0 || !percent.is_finite() {
        return Err(StatsError::InvalidGrowth(percent.to_string()));
    }

    let factor = 1.0 + percent / 100.0;
    let overflows = scope
        .iter()
        .filter_map(|(_, r)| r.value.as_number())
        .any(|v| !(v * factor).is_finite());
    if !factor.is_finite() || overflows {
        return Err(StatsError::InvalidGrowth(percent.to_string()));
    }

    let mut count = 0;
    for (_, record) in scope.iter_mut() {
        if let StatValue::Number(value) = &mut record.value {
            *value *= factor;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn number(scope: &StatScope, key: &str) -> f64 {
        scope.get(key).and_then(|r| r.value.as_number()).unwrap()
    }

    #[test]
    fn scopes_are_created_lazily_and_survive_reset() {
        let mut store = StatStore::new();
        assert!(store.scope("char_Alex").is_none());

        add_from_input(store.scope_mut("char_Alex"), "Height", "6", "ft").unwrap();
        store.reset("char_Alex");

        assert!(store.scope("char_Alex").unwrap().is_empty());
        assert_eq!(store.scope_keys().collect::<Vec<_>>(), vec!["char_Alex"]);
    }

    #[test]
    fn store_json_shape() {
        let mut store = StatStore::new();
        add_from_input(store.scope_mut("global"), "Max HP", "40", "").unwrap();

        assert_eq!(
            store.to_json().unwrap(),
            r#"{"global":{"max_hp":{"value":40.0,"unit":"","name":"Max HP"}}}"#
        );
        assert_eq!(StatStore::from_json(&store.to_json().unwrap()).unwrap(), store);
    }

    #[test]
    fn input_requires_name_and_value() {
        let mut scope = StatScope::new();
        assert!(matches!(
            add_from_input(&mut scope, " ", "1", ""),
            Err(StatsError::MissingField("name"))
        ));
        assert!(matches!(
            add_from_input(&mut scope, "Luck", "", ""),
            Err(StatsError::MissingField("value"))
        ));
        assert!(scope.is_empty());
    }

    #[test]
    fn text_values_are_kept() {
        let mut scope = StatScope::new();
        let key = add_from_input(&mut scope, "Eye Color", "green", "").unwrap();
        assert_eq!(key, "eye_color");
        assert_eq!(scope.get(&key).unwrap().value, StatValue::Text("green".into()));
    }

    #[test]
    fn edit_keeps_key() {
        let mut scope = StatScope::new();
        let key = add_from_input(&mut scope, "Height", "6", "ft").unwrap();
        edit_from_input(&mut scope, &key, "Stature", "7", "m").unwrap();

        let record = scope.get("height").unwrap();
        assert_eq!(record.name, "Stature");
        assert_eq!(record.unit, " m");
        assert!(!scope.contains_key("stature"));
        assert!(matches!(
            edit_from_input(&mut scope, "nope", "A", "1", ""),
            Err(StatsError::UnknownStat(_))
        ));
    }

    #[test]
    fn growth_scales_numbers_only() {
        let mut scope = StatScope::new();
        add_from_input(&mut scope, "Strength", "100", "").unwrap();
        add_from_input(&mut scope, "Mood", "calm", "").unwrap();

        let grown = grow_numeric(&mut scope, 10.0).unwrap();

        assert_eq!(grown, 1);
        assert!((number(&scope, "strength") - 110.0).abs() < 1e-9);
        assert_eq!(scope.get("mood").unwrap().value, StatValue::Text("calm".into()));
    }

    #[test]
    fn zero_growth_is_rejected() {
        assert!(matches!(parse_growth("0"), Err(StatsError::InvalidGrowth(_))));
        assert!(matches!(parse_growth(""), Err(StatsError::InvalidGrowth(_))));
        assert!(matches!(parse_growth("lots"), Err(StatsError::InvalidGrowth(_))));
        assert_eq!(parse_growth(" -5 ").unwrap(), -5.0);

        let mut scope = StatScope::new();
        assert!(grow_numeric(&mut scope, 0.0).is_err());
    }

    #[test]
    fn growth_accepts_trailing_text() {
        assert_eq!(parse_growth("5%").unwrap(), 5.0);
        assert_eq!(parse_growth("10 percent").unwrap(), 10.0);
        assert!(matches!(parse_growth("%5"), Err(StatsError::InvalidGrowth(_))));
    }

    #[test]
    fn overflowing_growth_leaves_scope_untouched() {
        let mut scope = StatScope::new();
        add_from_input(&mut scope, "Luck", "3", "").unwrap();
        add_from_input(&mut scope, "Mass", "1e300", "").unwrap();

        let percent = parse_growth("1e308").unwrap();
        assert!(matches!(
            grow_numeric(&mut scope, percent),
            Err(StatsError::InvalidGrowth(_))
        ));

        assert_eq!(number(&scope, "luck"), 3.0);
        assert_eq!(number(&scope, "mass"), 1e300);
        assert!(!store_has_null(&scope));
    }

    fn store_has_null(scope: &StatScope) -> bool {
        serde_json::to_string(scope).unwrap().contains("null")
    }

    #[test]
    fn defaults_are_added_once() {
        let mut scope = StatScope::new();
        assert_eq!(add_default_stat(&mut scope, "Height").as_deref(), Some("height"));
        assert_eq!(add_default_stat(&mut scope, "height"), None);
        assert_eq!(add_default_stat(&mut scope, "Wingspan"), None);

        let height = scope.get("height").unwrap();
        assert_eq!(height.unit, " ft");
        assert_eq!(height.value, StatValue::Number(0.0));
    }
}
