// File: src/config.rs
//! User settings that shape the material pipeline and the match engine.
//!
//! Settings are persisted as one camelCase JSON document and may be
//! overridden by shareable-link parameters, which are validated against
//! allow-lists before anything is applied.

use serde::{Deserialize, Serialize};

/// Repetitions beyond this are ignored by the pipeline.
pub const MAX_REPETITIONS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "sortOff")]
    Off,
    #[serde(rename = "sortNew")]
    New,
    #[serde(rename = "sortOld")]
    Old,
    #[serde(rename = "sortRandom")]
    Random,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "sortOff" => Some(Self::Off),
            "sortNew" => Some(Self::New),
            "sortOld" => Some(Self::Old),
            "sortRandom" => Some(Self::Random),
            _ => None,
        }
    }
}

/// Where the learner's steno software places spaces, which decides how
/// phrases are keyed in the familiarity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpacePlacement {
    #[default]
    #[serde(rename = "spaceOff")]
    Off,
    #[serde(rename = "spaceBeforeOutput")]
    BeforeOutput,
    #[serde(rename = "spaceAfterOutput")]
    AfterOutput,
    #[serde(rename = "spaceExact")]
    Exact,
}

impl SpacePlacement {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "spaceOff" => Some(Self::Off),
            "spaceBeforeOutput" => Some(Self::BeforeOutput),
            "spaceAfterOutput" => Some(Self::AfterOutput),
            "spaceExact" => Some(Self::Exact),
            _ => None,
        }
    }

    /// The phrase as the learner's software would output it.
    pub fn with_spacing(self, phrase: &str) -> String {
        match self {
            Self::BeforeOutput => format!(" {phrase}"),
            Self::AfterOutput => format!("{phrase} "),
            Self::Off | Self::Exact => phrase.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Study {
    #[default]
    Discover,
    Revise,
    Drill,
    Practice,
}

impl Study {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "discover" => Some(Self::Discover),
            "revise" => Some(Self::Revise),
            "drill" => Some(Self::Drill),
            "practice" => Some(Self::Practice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub case_sensitive: bool,
    pub simple_typography: bool,
    pub new_words: bool,
    pub seen_words: bool,
    pub retained_words: bool,
    /// 0 means unlimited.
    pub limit_number_of_words: u32,
    /// 1-based; 0 behaves like 1.
    pub start_from_word: u32,
    pub repetitions: u32,
    pub sort_order: SortOrder,
    pub space_placement: SpacePlacement,
    pub show_strokes: bool,
    pub hide_strokes_on_last_repetition: bool,
    pub speak_material: bool,
    pub study: Study,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            simple_typography: true,
            new_words: true,
            seen_words: true,
            retained_words: true,
            limit_number_of_words: 45,
            start_from_word: 1,
            repetitions: 3,
            sort_order: SortOrder::Off,
            space_placement: SpacePlacement::Off,
            show_strokes: true,
            hide_strokes_on_last_repetition: true,
            speak_material: false,
            study: Study::Discover,
        }
    }
}

impl UserSettings {
    /// Repetitions as applied by the pipeline: at least one pass, at most 30.
    pub fn effective_repetitions(&self) -> u32 {
        self.repetitions.clamp(1, MAX_REPETITIONS)
    }

    /// Returns a copy with every valid parameter applied. Unknown names and
    /// values outside the allow-lists are dropped one by one.
    pub fn with_params<'a, I>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut settings = self.clone();
        for (name, value) in params {
            if !settings.apply_param(name, value) {
                tracing::debug!(name, value, "dropping invalid settings parameter");
            }
        }
        settings
    }

    fn apply_param(&mut self, name: &str, value: &str) -> bool {
        if let Some(flag) = self.flag_mut(name) {
            return match value {
                "1" => {
                    *flag = true;
                    true
                }
                "0" => {
                    *flag = false;
                    true
                }
                _ => false,
            };
        }
        match name {
            "spacePlacement" => SpacePlacement::from_param(value).map(|v| self.space_placement = v).is_some(),
            "sortOrder" => SortOrder::from_param(value).map(|v| self.sort_order = v).is_some(),
            "study" => Study::from_param(value).map(|v| self.study = v).is_some(),
            "repetitions" => parse_normal_integer(value).map(|v| self.repetitions = v).is_some(),
            "limitNumberOfWords" => parse_normal_integer(value).map(|v| self.limit_number_of_words = v).is_some(),
            "startFromWord" => parse_normal_integer(value).map(|v| self.start_from_word = v).is_some(),
            _ => false,
        }
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "caseSensitive" => Some(&mut self.case_sensitive),
            "simpleTypography" => Some(&mut self.simple_typography),
            "newWords" => Some(&mut self.new_words),
            "seenWords" => Some(&mut self.seen_words),
            "retainedWords" => Some(&mut self.retained_words),
            "showStrokes" => Some(&mut self.show_strokes),
            "hideStrokesOnLastRepetition" => Some(&mut self.hide_strokes_on_last_repetition),
            "speakMaterial" => Some(&mut self.speak_material),
            _ => None,
        }
    }
}

/// Splits `a=1&b=2` (an optional leading `?` is skipped) into pairs.
pub fn parse_query(query: &str) -> Vec<(&str, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

/// Accepts only canonical non-negative integers: "0", "12" but not "012" or "1.5".
fn parse_normal_integer(value: &str) -> Option<u32> {
    let n: u32 = value.parse().ok()?;
    (n.to_string() == value).then_some(n)
}

/// Which familiarity classes a progress lesson draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamiliaritySelection {
    pub new_words: bool,
    pub seen_words: bool,
    pub retained_words: bool,
}

impl FamiliaritySelection {
    /// Settings preset for a lesson built from the learner's own words.
    pub fn preset(&self, base: &UserSettings) -> UserSettings {
        let mut settings = base.clone();
        settings.new_words = self.new_words;
        settings.seen_words = self.seen_words;
        settings.retained_words = self.retained_words;
        settings.show_strokes = false;
        let (study, sort_order, limit, repetitions) = if self.seen_words && !self.retained_words {
            (Study::Revise, SortOrder::New, 50, 3)
        } else if self.retained_words && !self.seen_words {
            (Study::Drill, SortOrder::Random, 100, 3)
        } else {
            (Study::Practice, SortOrder::Off, 0, 1)
        };
        settings.study = study;
        settings.sort_order = sort_order;
        settings.limit_number_of_words = limit;
        settings.repetitions = repetitions;
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_params_are_applied() {
        let settings = UserSettings::default().with_params(parse_query(
            "?caseSensitive=1&sortOrder=sortRandom&spacePlacement=spaceExact&repetitions=5",
        ));
        assert!(settings.case_sensitive);
        assert_eq!(settings.sort_order, SortOrder::Random);
        assert_eq!(settings.space_placement, SpacePlacement::Exact);
        assert_eq!(settings.repetitions, 5);
    }

    #[test]
    fn invalid_params_are_dropped() {
        let base = UserSettings::default();
        let settings = base.with_params(parse_query(
            "caseSensitive=yes&sortOrder=sideways&repetitions=012&limitNumberOfWords=-3&startFromWord=1.5&colour=red",
        ));
        assert_eq!(settings, base);
    }

    #[test]
    fn repetitions_are_capped() {
        let mut settings = UserSettings::default();
        settings.repetitions = 99;
        assert_eq!(settings.effective_repetitions(), 30);
        settings.repetitions = 0;
        assert_eq!(settings.effective_repetitions(), 1);
    }

    #[test]
    fn settings_document_uses_camel_case() {
        let json = serde_json::to_value(UserSettings::default()).unwrap();
        assert_eq!(json["spacePlacement"], "spaceOff");
        assert_eq!(json["sortOrder"], "sortOff");
        assert_eq!(json["limitNumberOfWords"], 45);

        let partial: UserSettings = serde_json::from_str(r#"{"caseSensitive": true}"#).unwrap();
        assert!(partial.case_sensitive);
        assert_eq!(partial.repetitions, 3);
    }

    #[test]
    fn seen_only_selection_is_a_revise_preset() {
        let selection = FamiliaritySelection { new_words: false, seen_words: true, retained_words: false };
        let settings = selection.preset(&UserSettings::default());
        assert_eq!(settings.study, Study::Revise);
        assert_eq!(settings.sort_order, SortOrder::New);
        assert_eq!(settings.limit_number_of_words, 50);
        assert!(!settings.show_strokes);
    }
}
