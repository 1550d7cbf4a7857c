use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();

fn leading_number() -> &'static Regex {
    LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
    })
}

/// Leading numeric prefix of `input` ("5%" is 5, "10 percent" is 10).
/// Overflowing or non-numeric input yields `None`.
pub fn leading_number_of(input: &str) -> Option<f64> {
    leading_number()
        .find(input.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// A stat value. Numbers grow and compare, text is carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    /// Parses form input the way a lenient float parser would: the leading
    /// numeric prefix wins ("6 ft" is 6), anything else stays text.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        leading_number_of(input)
            .map(StatValue::Number)
            .unwrap_or_else(|| StatValue::Text(input.to_string()))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::Text(_) => None,
        }
    }

    /// Raw value for an edit field: numbers without forced decimals.
    pub fn to_input(&self) -> String {
        match self {
            StatValue::Number(n) => n.to_string(),
            StatValue::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(n) => write!(f, "{:.2}", n),
            StatValue::Text(t) => f.write_str(t),
        }
    }
}

/// One tracked attribute of one participant. The key lives in the owning scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub value: StatValue,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub name: String,
}

impl StatRecord {
    pub fn new(name: impl Into<String>, value: StatValue, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }

    /// Record built from the add/edit form: trimmed fields, a non-empty unit
    /// is stored with a leading space so it reads "6.00 ft".
    pub fn from_input(name: &str, value: &str, unit: &str) -> Self {
        let unit = unit.trim();
        Self {
            name: name.trim().to_string(),
            value: StatValue::parse(value),
            unit: if unit.is_empty() {
                String::new()
            } else {
                format!(" {}", unit)
            },
        }
    }

    /// "6.00 ft", "tall"
    pub fn display_value(&self) -> String {
        format!("{}{}", self.value, self.unit)
    }
}

/// Storage key for a display name: lowercased, whitespace runs become `_`.
pub fn stat_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// "strength" -> "Strength"
pub fn capitalize(phrase: &str) -> String {
    let mut chars = phrase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display name for a record that only has a key: "max_hp" -> "Max Hp".
pub fn title_from_key(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_takes_leading_number() {
        assert_eq!(StatValue::parse("6"), StatValue::Number(6.0));
        assert_eq!(StatValue::parse(" 6.5 ft"), StatValue::Number(6.5));
        assert_eq!(StatValue::parse("-2"), StatValue::Number(-2.0));
        assert_eq!(StatValue::parse("tall"), StatValue::Text("tall".into()));
    }

    #[test]
    fn display_uses_two_decimals_for_numbers() {
        let record = StatRecord::new("Height", StatValue::Number(6.0), " ft");
        assert_eq!(record.display_value(), "6.00 ft");

        let record = StatRecord::new("Mood", StatValue::Text("calm".into()), "");
        assert_eq!(record.display_value(), "calm");
    }

    #[test]
    fn form_input_pads_unit() {
        let record = StatRecord::from_input(" Height ", "7", "ft ");
        assert_eq!(record.name, "Height");
        assert_eq!(record.unit, " ft");
        assert_eq!(StatRecord::from_input("Luck", "3", "").unit, "");
    }

    #[test]
    fn keys_and_names() {
        assert_eq!(stat_key("Max  Hit Points"), "max_hit_points");
        assert_eq!(capitalize("big tail"), "Big tail");
        assert_eq!(title_from_key("max_hp"), "Max Hp");
    }
}
