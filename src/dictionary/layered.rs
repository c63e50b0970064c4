// src/dictionary/layered.rs
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Priority tier of a dictionary source. Earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
    /// Dictionaries the learner wrote.
    User,
    /// Dictionaries shipped alongside the lessons.
    ThirdParty,
    /// The steno engine's own default dictionary.
    Builtin,
}

/// One outline for a translation, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedOutline {
    pub outline: String,
    pub dictionary: String,
    pub namespace: Namespace,
    seq: u64,
}

/// Several outline → translation dictionaries merged into one reverse index
/// (translation → outlines), ordered by namespace then insertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayeredDictionary {
    index: HashMap<String, Vec<IndexedOutline>>,
    sources: Vec<(String, Namespace)>,
    next_seq: u64,
}

impl LayeredDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `entries` (outline, translation) from one named source.
    /// O(n + t log t) where t is the number of outlines per touched translation.
    pub fn add_dictionary<I, O, T>(&mut self, name: &str, namespace: Namespace, entries: I)
    where
        I: IntoIterator<Item = (O, T)>,
        O: Into<String>,
        T: Into<String>,
    {
        let mut touched = HashSet::new();
        for (outline, translation) in entries {
            let translation = translation.into();
            let seq = self.next_seq;
            self.next_seq += 1;
            self.index.entry(translation.clone()).or_default().push(IndexedOutline {
                outline: outline.into(),
                dictionary: name.to_string(),
                namespace,
                seq,
            });
            touched.insert(translation);
        }

        for translation in &touched {
            if let Some(outlines) = self.index.get_mut(translation) {
                outlines.sort_by_key(|o| (o.namespace, o.seq));
            }
        }
        self.sources.push((name.to_string(), namespace));
        tracing::debug!(dictionary = name, ?namespace, translations = touched.len(), "merged dictionary");
    }

    /// Every outline for a translation, best first.
    pub fn outlines(&self, translation: &str) -> Option<&[IndexedOutline]> {
        self.index.get(translation).map(Vec::as_slice).filter(|o| !o.is_empty())
    }

    pub fn contains(&self, translation: &str) -> bool {
        self.outlines(translation).is_some()
    }

    /// Names and namespaces of the merged sources, in merge order.
    pub fn sources(&self) -> &[(String, Namespace)] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_outlines_rank_first_regardless_of_merge_order() {
        let mut dict = LayeredDictionary::new();
        dict.add_dictionary("main.json", Namespace::Builtin, [("KAT", "cat")]);
        dict.add_dictionary("typey.json", Namespace::ThirdParty, [("KA*T", "cat")]);
        dict.add_dictionary("mine.json", Namespace::User, [("KAEUT", "cat")]);

        let outlines: Vec<&str> = dict.outlines("cat").unwrap().iter().map(|o| o.outline.as_str()).collect();
        assert_eq!(outlines, vec!["KAEUT", "KA*T", "KAT"]);
    }

    #[test]
    fn insertion_order_breaks_ties_within_a_namespace() {
        let mut dict = LayeredDictionary::new();
        dict.add_dictionary("main.json", Namespace::Builtin, [("THE", "the"), ("-T", "the")]);
        dict.add_dictionary("extra.json", Namespace::Builtin, [("TH-E", "the")]);
        let outlines: Vec<&str> = dict.outlines("the").unwrap().iter().map(|o| o.outline.as_str()).collect();
        assert_eq!(outlines, vec!["THE", "-T", "TH-E"]);
        assert_eq!(dict.sources().len(), 2);
    }

    #[test]
    fn missing_translation() {
        let dict = LayeredDictionary::new();
        assert!(dict.outlines("cat").is_none());
        assert!(!dict.contains("cat"));
    }
}
