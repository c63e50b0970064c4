// File: src/learning.rs
use crate::config::SpacePlacement;
use crate::core::types::LessonTally;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Exposures at which a phrase counts as retained.
pub const RETAINED_THRESHOLD: u32 = 30;

/// A phrase's learning stage, derived from its exposure count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Familiarity {
    New,
    Seen,
    Retained,
}

impl Familiarity {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Self::New,
            c if c < RETAINED_THRESHOLD => Self::Seen,
            _ => Self::Retained,
        }
    }
}

/// Maps a phrase key to how many times it was typed accurately without a hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamiliarityStore {
    counts: HashMap<String, u32>,
}

impl FamiliarityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw count for a key exactly as stored.
    pub fn count(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn classify(&self, key: &str) -> Familiarity {
        Familiarity::from_count(self.count(key))
    }

    /// Increments `key`, returning the count it had before.
    pub fn record_success(&mut self, key: &str) -> u32 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        let previous = *count;
        *count = count.saturating_add(1);
        previous
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Read-only view keyed the way `placement` keys phrases.
    pub fn view(&self, placement: SpacePlacement) -> FamiliarityView<'_> {
        let counts = match placement {
            SpacePlacement::BeforeOutput | SpacePlacement::AfterOutput => Cow::Borrowed(&self.counts),
            SpacePlacement::Off | SpacePlacement::Exact => {
                let mut merged: HashMap<String, u32> = HashMap::with_capacity(self.counts.len());
                for (key, &count) in &self.counts {
                    *merged.entry(stored_key(key, placement)).or_insert(0) += count;
                }
                Cow::Owned(merged)
            }
        };
        FamiliarityView { counts, placement }
    }

    /// Trimmed phrases with a positive count, most exposed first.
    pub fn words_by_exposure(&self) -> Vec<(String, u32)> {
        let mut merged: HashMap<String, u32> = HashMap::new();
        for (key, &count) in &self.counts {
            let word = key.trim();
            if !word.is_empty() && count > 0 {
                *merged.entry(word.to_string()).or_insert(0) += count;
            }
        }
        let mut words: Vec<(String, u32)> = merged.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words
    }
}

impl FromIterator<(String, u32)> for FamiliarityStore {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        Self { counts: iter.into_iter().collect() }
    }
}

/// The familiarity store paired with the spacing policy used to key phrases.
/// Both sides of every lookup go through the same policy.
pub struct FamiliarityView<'a> {
    counts: Cow<'a, HashMap<String, u32>>,
    placement: SpacePlacement,
}

impl FamiliarityView<'_> {
    pub fn count(&self, phrase: &str) -> u32 {
        self.counts.get(&normalize_key(phrase, self.placement)).copied().unwrap_or(0)
    }

    pub fn classify(&self, phrase: &str) -> Familiarity {
        Familiarity::from_count(self.count(phrase))
    }
}

/// Key for a lesson phrase under a spacing policy.
pub fn normalize_key(phrase: &str, placement: SpacePlacement) -> String {
    match placement {
        SpacePlacement::Off => strip_whitespace(phrase),
        SpacePlacement::Exact => collapse_whitespace(phrase),
        SpacePlacement::BeforeOutput | SpacePlacement::AfterOutput => placement.with_spacing(phrase),
    }
}

/// Key for an already stored entry, so typed keys line up with phrase keys.
fn stored_key(key: &str, placement: SpacePlacement) -> String {
    match placement {
        SpacePlacement::Off => strip_whitespace(key),
        SpacePlacement::Exact => collapse_whitespace(key),
        SpacePlacement::BeforeOutput | SpacePlacement::AfterOutput => key.to_string(),
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outcome of one completed phrase as seen by the learning engine.
pub struct PhraseCompletion {
    /// Key written to the familiarity store.
    pub key: String,
    pub accurate: bool,
    pub hinted: bool,
}

pub struct LearningEngine;

impl LearningEngine {
    pub fn new() -> Self {
        Self
    }

    /// Applies a completion to the store and the lesson tally. Only accurate,
    /// unhinted completions count as exposures; there is no per-lesson cap.
    pub fn learn(&self, store: &mut FamiliarityStore, tally: &mut LessonTally, completion: &PhraseCompletion) {
        if completion.hinted {
            tally.hinted_words += 1;
        }
        if !completion.accurate {
            tally.mistyped_words += 1;
        }
        if completion.hinted || !completion.accurate {
            return;
        }

        let previous = store.record_success(&completion.key);
        match Familiarity::from_count(previous) {
            Familiarity::New => tally.new_words_met += 1,
            Familiarity::Seen => tally.low_exposures_seen += 1,
            Familiarity::Retained => tally.retained_words += 1,
        }
        tracing::debug!(key = %completion.key, previous, "recorded exposure");
    }
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[(&str, u32)]) -> FamiliarityStore {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn success_count_stops_at_the_ceiling() {
        let mut met = store(&[("cat", u32::MAX)]);
        assert_eq!(met.record_success("cat"), u32::MAX);
        assert_eq!(met.count("cat"), u32::MAX);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(Familiarity::from_count(0), Familiarity::New);
        assert_eq!(Familiarity::from_count(1), Familiarity::Seen);
        assert_eq!(Familiarity::from_count(29), Familiarity::Seen);
        assert_eq!(Familiarity::from_count(30), Familiarity::Retained);
        assert_eq!(Familiarity::from_count(u32::MAX), Familiarity::Retained);
    }

    #[test]
    fn record_success_treats_absent_as_zero() {
        let mut store = FamiliarityStore::new();
        assert_eq!(store.record_success("cat"), 0);
        assert_eq!(store.record_success("cat"), 1);
        assert_eq!(store.count("cat"), 2);
        assert_eq!(store.classify("cat"), Familiarity::Seen);
        assert_eq!(store.classify("dog"), Familiarity::New);
    }

    #[test]
    fn space_off_merges_spaced_keys() {
        let store = store(&[(" the", 3), ("the ", 2), ("of the", 1)]);
        let view = store.view(SpacePlacement::Off);
        assert_eq!(view.count("the"), 5);
        assert_eq!(view.count("of the"), 1);
        assert_eq!(view.classify("the"), Familiarity::Seen);
    }

    #[test]
    fn space_before_keys_include_the_space() {
        let store = store(&[(" the", 30), ("the", 2)]);
        let view = store.view(SpacePlacement::BeforeOutput);
        assert_eq!(view.classify("the"), Familiarity::Retained);
        let after = store.view(SpacePlacement::AfterOutput);
        assert_eq!(after.classify("the"), Familiarity::New);
    }

    #[test]
    fn space_exact_trims_and_sums() {
        let store = store(&[(" of  the ", 1), ("of the", 1)]);
        let view = store.view(SpacePlacement::Exact);
        assert_eq!(view.count("of the"), 2);
        assert_eq!(view.count(" of the"), 2);
    }

    #[test]
    fn learning_skips_hinted_and_mistyped() {
        let engine = LearningEngine::new();
        let mut store = FamiliarityStore::new();
        let mut tally = LessonTally::default();

        let hinted = PhraseCompletion { key: "cat".into(), accurate: true, hinted: true };
        engine.learn(&mut store, &mut tally, &hinted);
        let mistyped = PhraseCompletion { key: "cat".into(), accurate: false, hinted: false };
        engine.learn(&mut store, &mut tally, &mistyped);
        assert_eq!(store.count("cat"), 0);
        assert_eq!(tally.hinted_words, 1);
        assert_eq!(tally.mistyped_words, 1);

        let clean = PhraseCompletion { key: "cat".into(), accurate: true, hinted: false };
        engine.learn(&mut store, &mut tally, &clean);
        engine.learn(&mut store, &mut tally, &clean);
        assert_eq!(store.count("cat"), 2);
        assert_eq!(tally.new_words_met, 1);
        assert_eq!(tally.low_exposures_seen, 1);
    }

    #[test]
    fn retained_tally_uses_pre_increment_count() {
        let engine = LearningEngine::new();
        let mut store = store(&[("cat", 29)]);
        let mut tally = LessonTally::default();
        let clean = PhraseCompletion { key: "cat".into(), accurate: true, hinted: false };
        engine.learn(&mut store, &mut tally, &clean);
        engine.learn(&mut store, &mut tally, &clean);
        assert_eq!(tally.low_exposures_seen, 1);
        assert_eq!(tally.retained_words, 1);
    }

    #[test]
    fn words_by_exposure_sorts_most_seen_first() {
        let store = store(&[(" cat", 2), ("dog", 5), ("cat ", 4), ("zero", 0)]);
        assert_eq!(
            store.words_by_exposure(),
            vec![("cat".to_string(), 6), ("dog".to_string(), 5)]
        );
    }
}
