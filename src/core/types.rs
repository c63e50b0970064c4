// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Outline used when a phrase has no known stroke.
pub const UNKNOWN_OUTLINE: &str = "XXX";

/// Outline used to size the stroke target when nothing is left to type.
pub const END_OF_LESSON_OUTLINE: &str = "TK-LS";

/// One phrase to type and the outline that writes it.
/// The stroke is one or more outlines separated by `/` within a word
/// and by a space between words, e.g. "STEPB/TKPWRAEF TP-PL".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialItem {
    pub phrase: String,
    pub stroke: String,
}

impl MaterialItem {
    pub fn new(phrase: impl Into<String>, stroke: impl Into<String>) -> Self {
        Self { phrase: phrase.into(), stroke: stroke.into() }
    }

    /// The empty item presented once a lesson runs out of material.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Per-lesson settings carried in the lesson source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSettings {
    /// Characters in the material that never need to be typed, e.g. "^".
    #[serde(default)]
    pub ignored_chars: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// A lesson as authored (`source_material`) and as presented after the
/// material pipeline has run (`presented_material`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonMaterial {
    pub source_material: Vec<MaterialItem>,
    pub presented_material: Vec<MaterialItem>,
    pub settings: LessonSettings,
    pub title: String,
    pub subtitle: String,
    pub path: String,
}

impl LessonMaterial {
    pub fn new(title: impl Into<String>, path: impl Into<String>, source: Vec<MaterialItem>) -> Self {
        Self {
            presented_material: source.clone(),
            source_material: source,
            settings: LessonSettings::default(),
            title: title.into(),
            subtitle: String::new(),
            path: path.into(),
        }
    }

    /// Custom lessons never contribute to per-lesson progress.
    pub fn is_custom(&self) -> bool {
        self.path.ends_with("/lessons/custom") || self.path.ends_with("/lessons/custom/setup")
    }
}

/// History of one completed phrase, kept for review and revision lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub word: String,
    /// Attempts that were corrected or over the stroke target.
    pub attempts: Vec<String>,
    pub stroke: String,
    /// Opt-in flag for the follow-up revision lesson.
    pub checked: bool,
    pub accuracy: bool,
}

/// Counters shown while typing and on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonTally {
    pub new_words_met: u32,
    pub low_exposures_seen: u32,
    pub retained_words: u32,
    pub mistyped_words: u32,
    pub hinted_words: u32,
    /// Matched characters of completed phrases, ignored characters excluded.
    pub matched_chars: usize,
}
