// src/dictionary/lookup.rs
//! Phrase → outline resolution over a [`LayeredDictionary`].

use crate::core::types::UNKNOWN_OUTLINE;
use crate::dictionary::layered::{LayeredDictionary, Namespace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outline used in stroke hints for characters nothing can write.
const UNKNOWN_CHARACTER_OUTLINE: &str = "xxx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCandidate {
    pub outline: String,
    pub translation: String,
    pub dictionary: String,
    pub namespace: Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    /// Best first.
    pub candidates: Vec<LookupCandidate>,
    /// The form of the phrase that was actually found, e.g. `{^ing}` for `ing`.
    pub modified: String,
}

impl LookupResult {
    fn unmatched(phrase: &str) -> Self {
        Self { candidates: Vec::new(), modified: phrase.to_string() }
    }

    pub fn is_match(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// The top outline, or the "XXX" sentinel on a miss.
    pub fn best_outline(&self) -> &str {
        self.candidates.first().map_or(UNKNOWN_OUTLINE, |c| c.outline.as_str())
    }

    /// Drops known misstrokes of the resolved translation. Outlines from the
    /// learner's own dictionaries always stay.
    pub fn without_misstrokes(mut self, misstrokes: &Misstrokes) -> Self {
        let modified = &self.modified;
        self.candidates
            .retain(|c| c.namespace == Namespace::User || !misstrokes.is_misstroke_of(&c.outline, modified));
        self
    }
}

/// Known mistyped outlines, outline → the translation they produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Misstrokes {
    entries: HashMap<String, String>,
}

impl Misstrokes {
    pub fn is_misstroke_of(&self, outline: &str, translation: &str) -> bool {
        self.entries.get(outline).is_some_and(|t| t == translation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<O: Into<String>, T: Into<String>> FromIterator<(O, T)> for Misstrokes {
    fn from_iter<I: IntoIterator<Item = (O, T)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(o, t)| (o.into(), t.into())).collect() }
    }
}

impl LayeredDictionary {
    /// Looks up a phrase. A single character after a space (`" B"`) is
    /// treated as a fingerspelled letter preceded by a space.
    pub fn lookup(&self, phrase: &str) -> LookupResult {
        match phrase.strip_prefix(' ') {
            Some(rest) if rest.chars().count() == 1 => self.lookup_in_context(rest, Some(' ')),
            _ => self.lookup_in_context(phrase, None),
        }
    }

    /// Looks up a phrase knowing the character typed just before it.
    pub fn lookup_in_context(&self, phrase: &str, preceding: Option<char>) -> LookupResult {
        if let Some(found) = self.resolve(phrase) {
            return found;
        }

        let mut forms = vec![format!("{{^{phrase}}}"), format!("{{{phrase}^}}")];
        let lowercase = phrase.to_lowercase();
        if lowercase != phrase {
            forms.push(lowercase);
        }
        if phrase.chars().count() == 1 {
            if preceding == Some(' ') {
                forms.push(format!("{{{phrase}}}"));
                forms.push(phrase.to_string());
            } else {
                forms.push(format!("{{&{phrase}}}"));
                forms.push(format!("{{>}}{{&{phrase}}}"));
            }
        }

        forms
            .iter()
            .find_map(|form| self.resolve(form))
            .unwrap_or_else(|| LookupResult::unmatched(phrase))
    }

    /// Outline hint for a phrase: the whole phrase if known, else word by word,
    /// else fingerspelled letter by letter.
    pub fn stroke_hint(&self, phrase: &str) -> String {
        let whole = self.lookup(phrase);
        if whole.is_match() {
            return whole.best_outline().to_string();
        }

        phrase
            .split(' ')
            .filter(|word| !word.is_empty())
            .enumerate()
            .map(|(i, word)| {
                let found = self.lookup_in_context(word, (i > 0).then_some(' '));
                if found.is_match() {
                    found.best_outline().to_string()
                } else {
                    self.fingerspell(word, i > 0)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fingerspell(&self, word: &str, after_space: bool) -> String {
        let mut preceding = after_space.then_some(' ');
        let mut outlines = Vec::new();
        for c in word.chars() {
            let found = self.lookup_in_context(&c.to_string(), preceding);
            outlines.push(if found.is_match() {
                found.best_outline().to_string()
            } else {
                UNKNOWN_CHARACTER_OUTLINE.to_string()
            });
            preceding = Some(c);
        }
        outlines.join("/")
    }

    fn resolve(&self, translation: &str) -> Option<LookupResult> {
        let outlines = self.outlines(translation)?;
        let candidates = outlines
            .iter()
            .map(|o| LookupCandidate {
                outline: o.outline.clone(),
                translation: translation.to_string(),
                dictionary: o.dictionary.clone(),
                namespace: o.namespace,
            })
            .collect();
        Some(LookupResult { candidates, modified: translation.to_string() })
    }
}
