// src/core/accuracy.rs
use crate::core::types::{MaterialItem, END_OF_LESSON_OUTLINE};

/// Whether a phrase was written cleanly, and the attempts that show it wasn't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeVerdict {
    pub accurate: bool,
    pub attempts: Vec<String>,
}

/// Number of outlines expected for an item: `/`-separated strokes within a
/// word plus space-separated words. Never less than one.
pub fn target_stroke_count(item: &MaterialItem) -> usize {
    item.stroke.split(['/', ' ']).filter(|s| !s.is_empty()).count().max(1)
}

/// Target used after the last item has been typed.
pub fn end_of_lesson_target() -> usize {
    target_stroke_count(&MaterialItem::new("", END_OF_LESSON_OUTLINE))
}

/// Judges the attempts recorded for one completed phrase, oldest first.
///
/// An attempt followed by a shorter one was undone, which marks a
/// correction. Taking more attempts than the phrase has strokes is also
/// inaccurate; then every attempt before the final one is reported.
pub fn stroke_accuracy(attempts: &[String], target_stroke_count: usize) -> StrokeVerdict {
    let corrected: Vec<String> = attempts
        .windows(2)
        .filter(|pair| pair[0].chars().count() > pair[1].chars().count())
        .map(|pair| pair[0].clone())
        .collect();

    if !corrected.is_empty() {
        return StrokeVerdict { accurate: false, attempts: corrected };
    }
    if attempts.len() > target_stroke_count {
        let intermediate = attempts[..attempts.len() - 1].to_vec();
        return StrokeVerdict { accurate: false, attempts: intermediate };
    }
    StrokeVerdict { accurate: true, attempts: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_outline_tokens() {
        assert_eq!(target_stroke_count(&MaterialItem::new("cat", "KAT")), 1);
        assert_eq!(target_stroke_count(&MaterialItem::new("stenography.", "STEPB/TKPWRAEF TP-PL")), 3);
        assert_eq!(target_stroke_count(&MaterialItem::new("", "")), 1);
        assert_eq!(end_of_lesson_target(), 1);
    }

    #[test]
    fn single_clean_attempt_is_accurate() {
        let verdict = stroke_accuracy(&attempts(&["cat"]), 1);
        assert!(verdict.accurate);
        assert!(verdict.attempts.is_empty());
    }

    #[test]
    fn multi_stroke_word_within_target_is_accurate() {
        let verdict = stroke_accuracy(&attempts(&["steno", "stenotype"]), 2);
        assert!(verdict.accurate);
    }

    #[test]
    fn corrections_are_reported() {
        let verdict = stroke_accuracy(&attempts(&["cut", "", "cat"]), 1);
        assert!(!verdict.accurate);
        assert_eq!(verdict.attempts, attempts(&["cut"]));
    }

    #[test]
    fn too_many_attempts_are_inaccurate() {
        let verdict = stroke_accuracy(&attempts(&["c", "ca", "cat"]), 1);
        assert!(!verdict.accurate);
        assert_eq!(verdict.attempts, attempts(&["c", "ca"]));
    }
}
