// src/core/typography.rs
use crate::core::types::{MaterialItem, UNKNOWN_OUTLINE};
use regex::Regex;
use std::sync::LazyLock;

/// Canonical outline for a plain hyphen.
const HYPHEN_OUTLINE: &str = "H-PB";

/// Rewrites one family of smart punctuation to its plain form.
struct TypographyRule {
    /// Matches the smart characters in a phrase.
    target: Regex,
    replacement: &'static str,
    /// Matches a whole outline token only when it is the default stroke
    /// for the smart character.
    default_outline: Regex,
    replacement_outline: &'static str,
}

impl TypographyRule {
    fn new(target: &str, replacement: &'static str, default_outline: &str, replacement_outline: &'static str) -> Self {
        Self {
            target: Regex::new(target).expect("typography pattern is valid"),
            replacement,
            default_outline: Regex::new(default_outline).expect("typography outline pattern is valid"),
            replacement_outline,
        }
    }

    fn apply(&self, item: &MaterialItem) -> Option<MaterialItem> {
        if !self.target.is_match(&item.phrase) {
            return None;
        }
        let phrase = self.target.replace_all(&item.phrase, self.replacement).into_owned();
        let mut stroke = item
            .stroke
            .split(' ')
            .map(|token| self.default_outline.replace(token, self.replacement_outline).into_owned())
            .collect::<Vec<_>>()
            .join(" ");

        // Only reached for smart dashes, so a learner's own hyphen outline survives.
        if phrase == "-" && stroke == UNKNOWN_OUTLINE {
            stroke = HYPHEN_OUTLINE.to_string();
        }
        Some(MaterialItem { phrase, stroke })
    }
}

static RULES: LazyLock<Vec<TypographyRule>> = LazyLock::new(|| {
    vec![
        // em dash, en dash, non-breaking hyphen, mongolian soft hyphen, double hyphen
        TypographyRule::new("[—–‑᠆⹀]", "-", r"^(EPL/TKA\*RB|TPH-RB|PH-RB)$", HYPHEN_OUTLINE),
        TypographyRule::new("[‘’]", "'", r"^(TP-P|TP-L)$", "AE"),
        TypographyRule::new("…", "...", r"^SKWR-RBGSZ$", "HR-PS"),
        // grave used as a left single quote
        TypographyRule::new("`", "'", r"^(TR\*RL|TR-RL|KH-FG|KH\*FG)$", "A*E"),
        TypographyRule::new("“", "\"", r"^KW-GS$", "KW-GS"),
        TypographyRule::new("”", "\"", r"^KR-GS$", "KR-GS"),
    ]
});

/// Replaces smart typography in one item. Running it twice changes nothing.
pub fn simplify_item(item: &MaterialItem) -> MaterialItem {
    RULES
        .iter()
        .fold(item.clone(), |current, rule| rule.apply(&current).unwrap_or(current))
}

pub fn simplify_material(material: &[MaterialItem]) -> Vec<MaterialItem> {
    material.iter().map(simplify_item).collect()
}
