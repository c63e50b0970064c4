// File: src/persistence.rs
//! Personal preferences (familiarity store, user settings, lesson progress)
//! and dictionary files on disk.

use crate::config::UserSettings;
use crate::core::lesson::LessonProgress;
use crate::dictionary::{LayeredDictionary, Misstrokes};
use crate::error::Result;
use crate::learning::FamiliarityStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const MET_WORDS_KEY: &str = "metWords";
pub const USER_SETTINGS_KEY: &str = "userSettings";
pub const LESSONS_PROGRESS_KEY: &str = "lessonsProgress";

/// Everything a session restores on start-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalPreferences {
    pub met_words: FamiliarityStore,
    pub user_settings: UserSettings,
    pub lessons_progress: HashMap<String, LessonProgress>,
}

/// Key/value storage for JSON preference documents.
pub trait PreferenceStore {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>>;
    fn write(&mut self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Reads every preference document. Missing documents fall back to their
/// defaults, and so do documents that no longer parse.
pub fn load_preferences(store: &dyn PreferenceStore) -> Result<PersonalPreferences> {
    Ok(PersonalPreferences {
        met_words: read_or_default(store, MET_WORDS_KEY)?,
        user_settings: read_or_default(store, USER_SETTINGS_KEY)?,
        lessons_progress: read_or_default(store, LESSONS_PROGRESS_KEY)?,
    })
}

fn read_or_default<T: DeserializeOwned + Default>(store: &dyn PreferenceStore, key: &str) -> Result<T> {
    let Some(value) = store.read(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            tracing::warn!(key, %err, "discarding unreadable preference");
            Ok(T::default())
        }
    }
}

pub fn write_preference<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) -> Result<()> {
    store.write(key, serde_json::to_value(value)?)
}

/// One `<key>.json` file per preference, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    dir: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&path)?);
        match serde_json::from_reader(reader) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "preference file is not JSON");
                Ok(None)
            }
        }
    }

    fn write(&mut self, key: &str, value: serde_json::Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let temp_file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer_pretty(&mut writer, &value)?;
            writer.flush()?;
        }
        temp_file.persist(self.path_for(key))?;
        tracing::debug!(key, dir = %self.dir.display(), "wrote preference");
        Ok(())
    }
}

/// In-memory store for sessions that should leave nothing behind.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, serde_json::Value>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: serde_json::Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Reads a steno dictionary in the usual `{"OUTLINE": "translation"}` JSON
/// shape. Entries are returned sorted by outline; non-string values are skipped.
pub fn read_steno_dictionary(path: &Path) -> Result<Vec<(String, String)>> {
    let reader = BufReader::new(File::open(path)?);
    let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_reader(reader)?;
    Ok(entries
        .into_iter()
        .filter_map(|(outline, translation)| match translation {
            serde_json::Value::String(t) => Some((outline, t)),
            _ => None,
        })
        .collect())
}

/// Reads a misstrokes file, which has the same shape as a dictionary.
pub fn read_misstrokes(path: &Path) -> Result<Misstrokes> {
    Ok(read_steno_dictionary(path)?.into_iter().collect())
}

/// Writes a merged dictionary as a bincode snapshot so later runs skip the
/// JSON merge.
pub fn save_dictionary(dictionary: &LayeredDictionary, path: &Path) -> Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        bincode::serialize_into(&mut writer, dictionary)?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

pub fn load_dictionary(path: &Path) -> Result<LayeredDictionary> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Namespace;
    use tempfile::tempdir;

    #[test]
    fn json_store_round_trips_preferences() {
        let dir = tempdir().unwrap();
        let mut store = JsonPreferenceStore::new(dir.path().join("prefs"));

        let met: FamiliarityStore = [("cat".to_string(), 3)].into_iter().collect();
        write_preference(&mut store, MET_WORDS_KEY, &met).unwrap();
        let settings = UserSettings { case_sensitive: true, ..UserSettings::default() };
        write_preference(&mut store, USER_SETTINGS_KEY, &settings).unwrap();

        assert!(dir.path().join("prefs/metWords.json").exists());
        let loaded = load_preferences(&store).unwrap();
        assert_eq!(loaded.met_words.count("cat"), 3);
        assert!(loaded.user_settings.case_sensitive);
        assert!(loaded.lessons_progress.is_empty());
    }

    #[test]
    fn missing_or_corrupt_documents_use_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("userSettings.json"), "{not json").unwrap();
        fs::write(dir.path().join("metWords.json"), "[1, 2]").unwrap();
        let store = JsonPreferenceStore::new(dir.path());
        let loaded = load_preferences(&store).unwrap();
        assert_eq!(loaded, PersonalPreferences::default());
    }

    #[test]
    fn memory_store_keeps_values() {
        let mut store = MemoryPreferenceStore::new();
        assert!(store.read(MET_WORDS_KEY).unwrap().is_none());
        store.write(MET_WORDS_KEY, serde_json::json!({"the": 2})).unwrap();
        assert_eq!(load_preferences(&store).unwrap().met_words.count("the"), 2);
    }

    #[test]
    fn steno_dictionary_and_snapshot() {
        let dir = tempdir().unwrap();
        let json = dir.path().join("main.json");
        fs::write(&json, r#"{"KAT": "cat", "-T": "the", "STPH-FPLT": {"nested": true}}"#).unwrap();
        let entries = read_steno_dictionary(&json).unwrap();
        assert_eq!(entries.len(), 2);

        let mut dict = LayeredDictionary::new();
        dict.add_dictionary("main.json", Namespace::Builtin, entries);
        let snapshot = dir.path().join("cache/dictionary.bin");
        save_dictionary(&dict, &snapshot).unwrap();

        let restored = load_dictionary(&snapshot).unwrap();
        assert_eq!(restored.lookup("cat").best_outline(), "KAT");
        assert_eq!(restored.sources(), dict.sources());
    }

    #[test]
    fn misstrokes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("misstrokes.json");
        fs::write(&path, r#"{"KA*T": "cat"}"#).unwrap();
        let misstrokes = read_misstrokes(&path).unwrap();
        assert!(misstrokes.is_misstroke_of("KA*T", "cat"));
        assert!(!misstrokes.is_misstroke_of("KAT", "cat"));
    }
}
