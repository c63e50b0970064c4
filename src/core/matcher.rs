// src/core/matcher.rs
//! Compares what the learner has typed so far with the current phrase.

use crate::config::{SpacePlacement, UserSettings};
use regex::Regex;

/// The comparison rules the match engine needs from the user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchSettings {
    pub case_sensitive: bool,
    pub space_placement: SpacePlacement,
}

impl From<&UserSettings> for MatchSettings {
    fn from(settings: &UserSettings) -> Self {
        Self { case_sensitive: settings.case_sensitive, space_placement: settings.space_placement }
    }
}

/// Four-way split of expected and typed text at the end of their common prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSplit {
    pub matched_expected: String,
    pub unmatched_expected: String,
    pub matched_typed: String,
    pub unmatched_typed: String,
}

impl MatchSplit {
    /// The typed text covers the whole expected phrase.
    pub fn is_complete(&self) -> bool {
        self.unmatched_expected.is_empty()
    }
}

/// Splits `expected` and `typed` at the longest common prefix.
///
/// Expected characters listed in `ignored_chars` never need typing. With
/// `SpacePlacement::Off` spaces are ignored on both sides; with spaces
/// before or after output the space becomes part of the expected text.
pub fn match_split_text(expected: &str, typed: &str, ignored_chars: &str, settings: MatchSettings) -> MatchSplit {
    let expected = match settings.space_placement {
        SpacePlacement::BeforeOutput | SpacePlacement::AfterOutput => settings.space_placement.with_spacing(expected),
        SpacePlacement::Off | SpacePlacement::Exact => expected.to_string(),
    };
    let ignore_spaces = settings.space_placement == SpacePlacement::Off;
    let is_ignored = |c: char| ignored_chars.contains(c) || (ignore_spaces && c == ' ');

    let expected_chars: Vec<(usize, char)> = expected.char_indices().collect();
    let typed_chars: Vec<(usize, char)> = typed.char_indices().collect();
    let (mut e, mut t) = (0, 0);

    loop {
        while e < expected_chars.len() && is_ignored(expected_chars[e].1) {
            e += 1;
        }
        while ignore_spaces && t < typed_chars.len() && typed_chars[t].1 == ' ' {
            t += 1;
        }
        if e >= expected_chars.len() || t >= typed_chars.len() {
            break;
        }
        if !chars_match(expected_chars[e].1, typed_chars[t].1, settings.case_sensitive) {
            break;
        }
        e += 1;
        t += 1;
    }

    let expected_at = expected_chars.get(e).map_or(expected.len(), |&(i, _)| i);
    let typed_at = typed_chars.get(t).map_or(typed.len(), |&(i, _)| i);
    MatchSplit {
        matched_expected: expected[..expected_at].to_string(),
        unmatched_expected: expected[expected_at..].to_string(),
        matched_typed: typed[..typed_at].to_string(),
        unmatched_typed: typed[typed_at..].to_string(),
    }
}

fn chars_match(expected: char, typed: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        expected == typed
    } else {
        expected == typed || expected.to_lowercase().eq(typed.to_lowercase())
    }
}

/// Counts matched characters, leaving out the lesson's ignored characters.
pub struct MatchedCharCounter {
    ignored: Option<Regex>,
}

impl MatchedCharCounter {
    pub fn new(ignored_chars: &str) -> Self {
        let ignored = if ignored_chars.is_empty() {
            None
        } else {
            let class: String = ignored_chars.chars().map(|c| regex::escape(&c.to_string())).collect();
            Regex::new(&format!("[{class}]")).ok()
        };
        Self { ignored }
    }

    pub fn count(&self, matched: &str) -> usize {
        match &self.ignored {
            Some(re) => re.replace_all(matched, "").chars().count(),
            None => matched.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(expected: &str, typed: &str) -> MatchSplit {
        match_split_text(expected, typed, "", MatchSettings::default())
    }

    #[test]
    fn full_match_completes() {
        let result = split("cat", "cat");
        assert_eq!(result.matched_expected, "cat");
        assert_eq!(result.unmatched_expected, "");
        assert!(result.is_complete());
    }

    #[test]
    fn partial_match_leaves_the_rest() {
        let result = split("cat", "ca");
        assert_eq!(result.matched_expected, "ca");
        assert_eq!(result.unmatched_expected, "t");
        assert!(!result.is_complete());
    }

    #[test]
    fn mistyped_tail_is_reported() {
        let result = split("cat", "cut");
        assert_eq!(result.matched_expected, "c");
        assert_eq!(result.unmatched_expected, "at");
        assert_eq!(result.matched_typed, "c");
        assert_eq!(result.unmatched_typed, "ut");
    }

    #[test]
    fn case_rules() {
        assert!(split("The", "the").is_complete());
        let strict = MatchSettings { case_sensitive: true, ..MatchSettings::default() };
        let result = match_split_text("The", "the", "", strict);
        assert_eq!(result.unmatched_expected, "The");
    }

    #[test]
    fn ignored_chars_need_no_typing() {
        let result = match_split_text("^ing", "ing", "^", MatchSettings::default());
        assert!(result.is_complete());
        assert_eq!(result.matched_expected, "^ing");
        assert_eq!(MatchedCharCounter::new("^").count(&result.matched_expected), 3);

        let trailing = match_split_text("un^", "un", "^", MatchSettings::default());
        assert!(trailing.is_complete());
    }

    #[test]
    fn space_placement_changes_the_target() {
        let before = MatchSettings { space_placement: SpacePlacement::BeforeOutput, ..MatchSettings::default() };
        assert!(match_split_text("cat", " cat", "", before).is_complete());
        assert!(!match_split_text("cat", "cat", "", before).is_complete());

        let after = MatchSettings { space_placement: SpacePlacement::AfterOutput, ..MatchSettings::default() };
        assert_eq!(match_split_text("cat", "cat", "", after).unmatched_expected, " ");

        let off = MatchSettings::default();
        assert!(match_split_text("of the", " ofthe ", "", off).is_complete());
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let result = split("café", "cafe");
        assert_eq!(result.matched_expected, "caf");
        assert_eq!(result.unmatched_expected, "é");
        assert_eq!(result.unmatched_typed, "e");
    }

    #[test]
    fn counter_escapes_regex_metacharacters() {
        assert_eq!(MatchedCharCounter::new("^-]").count("^a-b]"), 2);
        assert_eq!(MatchedCharCounter::new("").count("abc"), 3);
    }
}
