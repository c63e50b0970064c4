// src/core/lesson.rs
//! Lesson sources: published lesson text, custom material, the built-in
//! fallback lesson, and lessons derived from a finished lesson or from the
//! learner's familiarity store.

use crate::config::{FamiliaritySelection, SpacePlacement};
use crate::core::types::{LessonMaterial, LessonSettings, MaterialItem, StrokeRecord, UNKNOWN_OUTLINE};
use crate::dictionary::LayeredDictionary;
use crate::error::{Result, StenoError};
use crate::learning::{Familiarity, FamiliarityStore};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const CUSTOM_LESSON_PATH: &str = "/lessons/custom";

/// Result of checking custom material before it enters the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Success,
    Fail(Vec<String>),
}

/// Lesson text served for a missing page is an HTML document.
pub fn is_lesson_text_valid(text: &str) -> bool {
    !(text.trim().is_empty() || text.trim_start().starts_with("<!DOCTYPE html>"))
}

/// Parses published lesson text:
///
/// ```text
/// Lesson title
/// Subtitle
/// 'the': -T
/// 'cat': KAT
/// ignoredChars='^'
/// ```
pub fn parse_lesson(text: &str, path: &str) -> Result<LessonMaterial> {
    if !is_lesson_text_valid(text) {
        return Err(StenoError::LessonNotFound(path.to_string()));
    }
    let mut lines = text.lines();
    let title = lines.next().unwrap_or_default().trim().to_string();
    let subtitle = lines.next().unwrap_or_default().trim().to_string();

    let mut source = Vec::new();
    let mut settings = LessonSettings::default();
    for line in text.lines().skip(2) {
        if let Some(entry) = line.strip_prefix('\'') {
            if let Some((phrase, stroke)) = entry.split_once("': ") {
                source.push(MaterialItem::new(phrase, stroke.trim()));
            }
        } else if let Some((option, value)) = line.split_once('=') {
            let value = value.replace('\'', "");
            match option.trim() {
                "ignoredChars" => settings.ignored_chars = value,
                "customMessage" => settings.custom_message = Some(value),
                other => tracing::debug!(option = other, "skipping unsupported lesson setting"),
            }
        }
    }

    let mut lesson = LessonMaterial::new(title, path, source);
    lesson.subtitle = subtitle;
    lesson.settings = settings;
    Ok(lesson)
}

/// Parses `phrase<TAB>stroke` lines typed in by the learner. Failing material
/// yields a single empty item so the pipeline still gets a well-formed lesson.
pub fn parse_custom_material(text: &str) -> (LessonMaterial, Validation) {
    let fail = |message: &str| {
        let empty = LessonMaterial::new("Custom", CUSTOM_LESSON_PATH, vec![MaterialItem::new("", "")]);
        (empty, Validation::Fail(vec![message.to_string()]))
    };

    if text.is_empty() {
        return fail("Your material needs at least 1 word");
    }
    if !text.contains('\t') {
        return fail("Your material needs at least 1 “Tab” character");
    }

    let source: Vec<MaterialItem> = text
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('\t'))
        .map(|line| {
            let mut parts = line.split('\t');
            let phrase = parts.next().unwrap_or_default();
            let stroke = parts.next().map(str::trim).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_OUTLINE);
            MaterialItem::new(phrase, stroke)
        })
        .collect();

    if source.is_empty() {
        return fail("Your material needs at least 1 word and 1 “Tab” character");
    }
    (LessonMaterial::new("Custom", CUSTOM_LESSON_PATH, source), Validation::Success)
}

/// The lesson used whenever real lesson text cannot be loaded.
pub fn fallback_lesson() -> LessonMaterial {
    let source = [
        ("The", "-T"),
        ("process", "PROEUS"),
        ("of", "-F"),
        ("writing", "WREUG"),
        ("shorthand", "SHORT/HA*PBD"),
        ("is", "S"),
        ("called", "KAULD"),
        ("stenography.", "STEPB/TKPWRAEF TP-PL"),
        ("It's", "T-S"),
        ("typed", "TAOEUPD"),
        ("with a", "WA*EU"),
        ("stenotype", "STEPB/TAOEUP"),
        ("or", "OR"),
        ("fancy", "TPAPB/SEU"),
        ("keyboard.", "KAOEBD TP-PL"),
        ("You can", "KU"),
        ("transcribe,", "TREUB KW-BG"),
        ("caption,", "KAPGS KW-BG"),
        ("dictate,", "TKEUBG/TAEUT KW-BG"),
        ("code,", "KOED KW-BG"),
        ("chat,", "KHAT KW-BG"),
        ("or", "OR"),
        ("write", "WREU"),
        ("prose", "PROES"),
        ("at", "AT"),
        ("over", "OEFR"),
        ("200", "#T-Z"),
        ("words", "WORDZ"),
        ("per", "PER"),
        ("minute.", "PHEUPB TP-PL"),
        ("and", "SKP"),
        ("hundreds", "HUPBS"),
        ("of", "-F"),
        ("lessons", "HROEFPBS"),
        ("to", "TO"),
        ("help", "HEP"),
        ("you", "U"),
        ("master", "PHAFRT"),
        ("typing", "TAOEUPG"),
        ("with", "W"),
        ("stenography.", "STEPB/TKPWRAEF TP-PL"),
    ]
    .into_iter()
    .map(|(phrase, stroke)| MaterialItem::new(phrase, stroke))
    .collect();
    LessonMaterial::new("Steno", "", source)
}

/// Checked stroke records become the material of a revision lesson.
/// Returns `None` when nothing is checked.
pub fn revision_material(records: &[StrokeRecord]) -> Option<Vec<MaterialItem>> {
    let material: Vec<MaterialItem> = records
        .iter()
        .filter(|record| record.checked)
        .map(|record| MaterialItem::new(record.word.clone(), record.stroke.clone()))
        .collect();
    (!material.is_empty()).then_some(material)
}

/// Builds a lesson from the learner's own words, most exposed first, with
/// outlines from the dictionary. Returns `None` when no word qualifies.
pub fn progress_lesson(
    familiarity: &FamiliarityStore,
    dictionary: &LayeredDictionary,
    selection: &FamiliaritySelection,
) -> Option<LessonMaterial> {
    let source: Vec<MaterialItem> = familiarity
        .words_by_exposure()
        .into_iter()
        .map(|(word, _)| {
            let stroke = dictionary.stroke_hint(&word);
            MaterialItem::new(word, stroke)
        })
        .collect();
    if source.is_empty() {
        return None;
    }

    let (title, path) = match (selection.seen_words, selection.retained_words) {
        (true, true) => ("Your words", "/lessons/progress/"),
        (_, true) => ("Your memorised words", "/lessons/progress/memorised/"),
        _ => ("Your revision words", "/lessons/progress/seen/"),
    };
    Some(LessonMaterial::new(title, path, source))
}

/// How much of a lesson's vocabulary the learner has met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    /// Unique phrases with at least one exposure.
    pub number_of_words_seen: usize,
    pub number_of_words_to_discover: usize,
}

/// Phrases are compared trimmed and lower-cased.
pub fn lesson_progress(source: &[MaterialItem], familiarity: &FamiliarityStore) -> LessonProgress {
    let mut normalised: HashMap<String, u32> = HashMap::new();
    for (key, count) in familiarity.iter() {
        *normalised.entry(key.trim().to_lowercase()).or_insert(0) += count;
    }

    let mut seen = HashSet::new();
    let mut to_discover = HashSet::new();
    for item in source {
        let phrase = item.phrase.trim().to_lowercase();
        if normalised.get(&phrase).is_some_and(|&count| count > 0) {
            seen.insert(phrase);
        } else {
            to_discover.insert(phrase);
        }
    }
    LessonProgress { number_of_words_seen: seen.len(), number_of_words_to_discover: to_discover.len() }
}

/// Key written to the familiarity store for a completed phrase. Lessons with
/// ignored characters record the phrase itself rather than what was typed.
pub fn familiarity_key(typed: &str, item: &MaterialItem, lesson: &LessonSettings, placement: SpacePlacement) -> String {
    if lesson.ignored_chars.is_empty() {
        typed.to_string()
    } else {
        placement.with_spacing(&item.phrase)
    }
}

/// Classifies every phrase of a lesson, for summary displays.
pub fn familiarity_breakdown(source: &[MaterialItem], familiarity: &FamiliarityStore, placement: SpacePlacement) -> HashMap<Familiarity, usize> {
    let view = familiarity.view(placement);
    let mut breakdown = HashMap::new();
    for item in source {
        *breakdown.entry(view.classify(&item.phrase)).or_insert(0) += 1;
    }
    breakdown
}
