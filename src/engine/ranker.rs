//! Ranks the reference catalog by how close each item is to a length.

use std::cmp::Ordering;

use crate::engine::error::Result;
use crate::engine::units::normalize;
use crate::model::comparison::{ComparisonItem, COMPARISON_ITEMS};

pub const MAX_MATCHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub item: &'static ComparisonItem,
    /// subject length / item length
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Bigger,
    Smaller,
}

impl Comparison {
    /// Direction and the factor to print. Factor is always >= 1 except for the
    /// exact-match case, which reads "1.00x smaller".
    pub fn relation(&self) -> (Relation, f64) {
        if self.ratio > 1.0 {
            (Relation::Bigger, self.ratio)
        } else {
            (Relation::Smaller, 1.0 / self.ratio)
        }
    }

    pub fn describe(&self, subject: &str) -> String {
        let (relation, times) = self.relation();
        let word = match relation {
            Relation::Bigger => "bigger",
            Relation::Smaller => "smaller",
        };
        format!("{} is {:.2}x {} than {}", subject, times, word, self.item.name)
    }

    fn distance(&self) -> f64 {
        self.ratio.ln().abs()
    }
}

/// The closest catalog items to `length_cm`, nearest first. Distance is
/// `|ln(ratio)|` so twice as big and half as big are equally close.
pub fn rank(length_cm: f64) -> Vec<Comparison> {
    rank_against(length_cm, COMPARISON_ITEMS)
}

pub fn rank_against(length_cm: f64, catalog: &'static [ComparisonItem]) -> Vec<Comparison> {
    let mut matches: Vec<Comparison> = catalog
        .iter()
        .map(|item| Comparison {
            item,
            ratio: length_cm / item.length_cm,
        })
        .collect();

    // stable: equal distances keep catalog order
    matches.sort_by(|a, b| {
        a.distance()
            .partial_cmp(&b.distance())
            .unwrap_or(Ordering::Equal)
    });
    matches.truncate(MAX_MATCHES);
    matches
}

/// Result of the comparison action for one stat.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub stat_name: String,
    pub subject: String,
    pub matches: Vec<Comparison>,
}

impl ComparisonReport {
    pub fn build(stat_name: &str, subject: &str, value: f64, unit: &str) -> Result<Self> {
        let length_cm = normalize(value, unit)?;
        Ok(Self {
            stat_name: stat_name.to_string(),
            subject: subject.to_string(),
            matches: rank(length_cm),
        })
    }

    pub fn render(&self) -> String {
        let mut text = format!("📏 {} Comparisons:\n\n", self.stat_name);
        for comparison in &self.matches {
            text.push_str(&comparison.describe(&self.subject));
            text.push('\n');
        }
        text
    }
}
