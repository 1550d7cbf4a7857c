//! Turns narrative sentences into stat mutations.
//!
//! Four independent rules run against every piece of text, in order:
//!
//! ```text
//! "Alex has grown a tail."        -> create `tail` = 1
//! "Alex gained strength."         -> create `strength` = 1
//! "strength increased to 20"      -> set `strength` = 20
//! "height is now 7"               -> set `height` = 7
//! ```
//!
//! Creation never overwrites. "increased by N" sets N, it is not a delta.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::message::{Message, Speaker};
use crate::model::scope::StatScope;
use crate::model::stat::{capitalize, StatRecord, StatValue};

/// Subjects that are almost always a false positive for the "now" rule.
const PRONOUNS: &[&str] = &["it", "that", "this"];

struct Rules {
    growth: Regex,
    gain: Regex,
    increase: Regex,
    now: Regex,
}

static RULES: OnceLock<Rules> = OnceLock::new();

fn rules() -> &'static Rules {
    RULES.get_or_init(|| Rules {
        growth: Regex::new(r"(?i)has\s+grown\s+(?:a|an)?\s+([a-z\s]+?)(?:\.|,|$)").unwrap(),
        gain: Regex::new(r"(?i)gained\s+([a-z\s]+?)(?:\.|,|$)").unwrap(),
        increase: Regex::new(r"(?i)([a-z\s]+?)\s+increased\s+(?:to|by)\s+(\d+(?:\.\d+)?)")
            .unwrap(),
        now: Regex::new(r"(?i)([a-z\s]+?)\s+(?:is\s+)?now\s+(\d+(?:\.\d+)?)").unwrap(),
    })
}

/// One mutation proposed by a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Add `key` with value 1 unless it exists.
    Create { key: String },
    /// Set `key` to an absolute value, creating it if needed.
    Set { key: String, value: f64 },
}

impl Extraction {
    pub fn key(&self) -> &str {
        match self {
            Extraction::Create { key } | Extraction::Set { key, .. } => key,
        }
    }
}

fn phrase_key(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

fn create_rule(re: &Regex, text: &str) -> Option<Extraction> {
    let caps = re.captures(text)?;
    let key = phrase_key(caps.get(1)?.as_str())?;
    Some(Extraction::Create { key })
}

fn set_rule(re: &Regex, text: &str, skip: &[&str]) -> Option<Extraction> {
    let caps = re.captures(text)?;
    let key = phrase_key(caps.get(1)?.as_str())?;
    if skip.contains(&key.as_str()) {
        return None;
    }
    let value = caps
        .get(2)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())?;
    Some(Extraction::Set { key, value })
}

/// Runs all rules over `text`. Each rule contributes at most one extraction.
pub fn extract(text: &str) -> Vec<Extraction> {
    let rules = rules();
    [
        create_rule(&rules.growth, text),
        create_rule(&rules.gain, text),
        set_rule(&rules.increase, text, &[]),
        set_rule(&rules.now, text, PRONOUNS),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Applies extractions in order. Returns true when the scope changed, so
/// re-applying the same text reports no change.
pub fn apply(scope: &mut StatScope, extractions: &[Extraction]) -> bool {
    let mut changed = false;

    for extraction in extractions {
        match extraction {
            Extraction::Create { key } => {
                if scope.contains_key(key) {
                    continue;
                }
                scope.insert(
                    key.clone(),
                    StatRecord::new(capitalize(key), StatValue::Number(1.0), ""),
                );
                log::info!("Auto-added stat from chat: {}", key);
                changed = true;
            }
            Extraction::Set { key, value } => {
                let next = StatValue::Number(*value);
                match scope.get_mut(key) {
                    Some(record) if record.value == next => {}
                    Some(record) => {
                        record.value = next;
                        log::info!("Auto-updated stat from chat: {} = {}", key, value);
                        changed = true;
                    }
                    None => {
                        scope.insert(key.clone(), StatRecord::new(capitalize(key), next, ""));
                        log::info!("Auto-added stat from chat: {} = {}", key, value);
                        changed = true;
                    }
                }
            }
        }
    }

    changed
}

/// Tracks which transcript messages were already fed to the extractor.
/// Only appended messages are observed, and stat changes never write to the
/// transcript, so a mutation cannot re-trigger extraction.
#[derive(Debug, Default)]
pub struct TranscriptObserver {
    seen: usize,
}

impl TranscriptObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts of messages appended since the last call. Local system notices
    /// are skipped. A shorter transcript than before counts as a fresh one.
    pub fn take_new<'a>(&mut self, transcript: &'a [Message]) -> Vec<&'a str> {
        if transcript.len() < self.seen {
            self.seen = 0;
        }
        let fresh = transcript[self.seen..]
            .iter()
            .filter(|m| m.speaker != Speaker::System)
            .map(|m| m.text.as_str())
            .collect();
        self.seen = transcript.len();
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_with(key: &str, value: f64) -> StatScope {
        let mut scope = StatScope::new();
        scope.insert(key, StatRecord::new(capitalize(key), StatValue::Number(value), ""));
        scope
    }

    #[test]
    fn gained_creates_stat() {
        let mut scope = StatScope::new();
        assert!(apply(&mut scope, &extract("Alex gained strength.")));

        let record = scope.get("strength").unwrap();
        assert_eq!(record.value, StatValue::Number(1.0));
        assert_eq!(record.name, "Strength");
        assert_eq!(record.unit, "");
    }

    #[test]
    fn has_grown_with_article() {
        assert_eq!(
            extract("Alex has grown a tail, and it twitches"),
            vec![Extraction::Create { key: "tail".into() }]
        );
        assert_eq!(
            extract("She has grown an extra arm"),
            vec![Extraction::Create { key: "extra arm".into() }]
        );
    }

    #[test]
    fn creation_never_overwrites() {
        let mut scope = scope_with("strength", 12.0);
        assert!(!apply(&mut scope, &extract("He gained strength.")));
        assert_eq!(scope.get("strength").unwrap().value, StatValue::Number(12.0));
    }

    #[test]
    fn increased_to_sets_absolute_value() {
        let mut scope = scope_with("strength", 5.0);
        assert!(apply(&mut scope, &extract("strength increased to 20")));
        assert_eq!(scope.get("strength").unwrap().value, StatValue::Number(20.0));
    }

    #[test]
    fn increased_by_is_not_a_delta() {
        let mut scope = scope_with("strength", 5.0);
        apply(&mut scope, &extract("strength increased by 3"));
        assert_eq!(scope.get("strength").unwrap().value, StatValue::Number(3.0));
    }

    #[test]
    fn now_rule_creates_and_sets() {
        let mut scope = StatScope::new();
        apply(&mut scope, &extract("Her height is now 7.5"));
        assert_eq!(scope.get("her height").unwrap().value, StatValue::Number(7.5));

        apply(&mut scope, &extract("Wow. health now 150"));
        assert_eq!(scope.get("health").unwrap().value, StatValue::Number(150.0));
    }

    #[test]
    fn pronoun_subjects_are_ignored() {
        let mut scope = StatScope::new();
        assert!(extract("it is now 50").is_empty());
        assert!(!apply(&mut scope, &extract("That now 3")));
        assert!(scope.is_empty());
    }

    #[test]
    fn rules_fire_independently() {
        let found = extract("She has grown a mane. She gained speed, and speed increased to 4");
        let keys: Vec<_> = found.iter().map(Extraction::key).collect();
        assert_eq!(keys, vec!["mane", "speed", "and speed"]);
    }

    #[test]
    fn reprocessing_is_a_no_op() {
        let mut scope = StatScope::new();
        let text = "Alex gained wings. Wings increased to 2";
        assert!(apply(&mut scope, &extract(text)));
        let before = scope.clone();

        assert!(!apply(&mut scope, &extract(text)));
        assert_eq!(scope, before);
    }

    #[test]
    fn overflowing_numbers_are_ignored() {
        let huge = "9".repeat(400);
        assert!(extract(&format!("power increased to {huge}")).is_empty());
        assert!(extract(&format!("Power is now {huge}")).is_empty());

        let mut scope = scope_with("power", 5.0);
        assert!(!apply(&mut scope, &extract(&format!("power increased to {huge}"))));
        assert_eq!(scope.get("power").unwrap().value, StatValue::Number(5.0));
    }

    #[test]
    fn plain_dialogue_extracts_nothing() {
        assert!(extract("Hello there, how was the trip?").is_empty());
    }

    #[test]
    fn observer_yields_only_new_non_system_messages() {
        let mut observer = TranscriptObserver::new();
        let mut transcript = vec![Message::user("hi"), Message::system("Loaded")];
        assert_eq!(observer.take_new(&transcript), vec!["hi"]);
        assert!(observer.take_new(&transcript).is_empty());

        transcript.push(Message::character("He gained focus."));
        assert_eq!(observer.take_new(&transcript), vec!["He gained focus."]);

        transcript.truncate(1);
        assert_eq!(observer.take_new(&transcript), vec!["hi"]);
    }
}
