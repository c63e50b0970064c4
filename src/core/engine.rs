use crate::config::{parse_query, FamiliaritySelection, UserSettings};
use crate::core::accuracy::{end_of_lesson_target, stroke_accuracy, target_stroke_count};
use crate::core::cursor::PresentationCursor;
use crate::core::lesson::{
    fallback_lesson, familiarity_key, lesson_progress, parse_custom_material, parse_lesson, progress_lesson,
    revision_material, LessonProgress, Validation,
};
use crate::core::matcher::{match_split_text, MatchSettings, MatchSplit, MatchedCharCounter};
use crate::core::pipeline::{present_material, PipelineContext};
use crate::core::speech::{spoken_form, Speaker};
use crate::core::types::{LessonMaterial, LessonTally, MaterialItem, StrokeRecord};
use crate::dictionary::LayeredDictionary;
use crate::error::Result;
use crate::learning::{FamiliarityStore, LearningEngine, PhraseCompletion};
use crate::persistence::{
    load_preferences, write_preference, PreferenceStore, LESSONS_PROGRESS_KEY, MET_WORDS_KEY, USER_SETTINGS_KEY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const CHARS_PER_WORD: f64 = 5.0;

/// Repetitions left from phrase `index` of a presented sequence of `len`
/// items built with `repetitions` passes.
pub fn repetitions_remaining(repetitions: u32, len: usize, index: usize) -> u32 {
    if len == 0 || index >= len {
        return 0;
    }
    ((len - index) * repetitions as usize).div_ceil(len) as u32
}

pub fn should_show_hint(revealed: bool, settings: &UserSettings, repetitions_remaining: u32) -> bool {
    revealed || (settings.show_strokes && (repetitions_remaining > 1 || !settings.hide_strokes_on_last_repetition))
}

/// `round(max(words - 1, 0) / minutes)` with five characters to a word.
pub fn words_per_minute(matched_chars: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    let words = matched_chars as f64 / CHARS_PER_WORD;
    ((words - 1.0).max(0.0) / minutes).round() as u32
}

/// Percentage of completed phrases typed cleanly without a hint.
pub fn numeric_accuracy(tally: &LessonTally, completed: usize) -> f64 {
    let misses = tally.mistyped_words + tally.hinted_words;
    if misses == 0 {
        return 100.0;
    }
    if completed == 0 {
        return 0.0;
    }
    ((1.0 - f64::from(misses) / completed as f64) * 100.0).max(0.0)
}

/// What the learner sees after typing something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupUpdate {
    pub split: MatchSplit,
    /// Set when the typed text completed the phrase.
    pub completed: Option<StrokeRecord>,
    /// Set when that completion ended the lesson.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonSummary {
    pub wpm: u32,
    pub accuracy: f64,
    pub elapsed: Duration,
    pub tally: LessonTally,
    pub records: Vec<StrokeRecord>,
}

/// One typing session: the current lesson, its presentation cursor, and the
/// learner's familiarity store and settings.
pub struct LessonEngine {
    settings: UserSettings,
    familiarity: FamiliarityStore,
    lessons_progress: HashMap<String, LessonProgress>,
    lesson: LessonMaterial,
    revision_mode: bool,
    revision_source: Vec<MaterialItem>,
    cursor: PresentationCursor,
    typed: String,
    attempts: Vec<String>,
    records: Vec<StrokeRecord>,
    tally: LessonTally,
    target_stroke_count: usize,
    show_strokes_in_lesson: bool,
    char_counter: MatchedCharCounter,
    started_at: Option<Instant>,
    elapsed: Duration,
    learning_engine: LearningEngine,
    preferences: Box<dyn PreferenceStore>,
    speaker: Option<Box<dyn Speaker>>,
    rng: StdRng,
}

impl LessonEngine {
    /// Restores the learner's preferences. No lesson is loaded yet.
    pub fn new(preferences: Box<dyn PreferenceStore>) -> Result<Self> {
        let restored = load_preferences(preferences.as_ref())?;
        tracing::info!(met_words = restored.met_words.len(), "restored personal preferences");
        Ok(Self {
            settings: restored.user_settings,
            familiarity: restored.met_words,
            lessons_progress: restored.lessons_progress,
            lesson: LessonMaterial::default(),
            revision_mode: false,
            revision_source: Vec::new(),
            cursor: PresentationCursor::default(),
            typed: String::new(),
            attempts: Vec::new(),
            records: Vec::new(),
            tally: LessonTally::default(),
            target_stroke_count: end_of_lesson_target(),
            show_strokes_in_lesson: false,
            char_counter: MatchedCharCounter::new(""),
            started_at: None,
            elapsed: Duration::ZERO,
            learning_engine: LearningEngine::new(),
            preferences,
            speaker: None,
            rng: StdRng::from_entropy(),
        })
    }

    /// Makes random ordering reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    /// Loads published lesson text, or the built-in lesson if the text is
    /// not a lesson. Returns whether the fallback was used.
    pub fn load_lesson(&mut self, text: &str, path: &str) -> bool {
        let (lesson, fell_back) = match parse_lesson(text, path) {
            Ok(lesson) => (lesson, false),
            Err(err) => {
                tracing::warn!(path, %err, "using the fallback lesson");
                (fallback_lesson(), true)
            }
        };
        self.lesson = lesson;
        self.revision_mode = false;
        self.setup_lesson();
        fell_back
    }

    /// Starts a lesson from learner-supplied `phrase<TAB>stroke` lines.
    pub fn start_custom_lesson(&mut self, text: &str) -> Validation {
        let (lesson, validation) = parse_custom_material(text);
        if let Validation::Fail(messages) = &validation {
            tracing::info!(?messages, "custom material rejected");
        }
        self.lesson = lesson;
        self.revision_mode = false;
        self.setup_lesson();
        validation
    }

    /// Starts a lesson built from the learner's own words. Returns false and
    /// leaves the current lesson alone when no word qualifies.
    pub fn start_progress_lesson(
        &mut self,
        dictionary: &LayeredDictionary,
        selection: &FamiliaritySelection,
    ) -> Result<bool> {
        let Some(lesson) = progress_lesson(&self.familiarity, dictionary, selection) else {
            tracing::info!(?selection, "no words for a progress lesson");
            return Ok(false);
        };
        self.settings = selection.preset(&self.settings);
        self.lesson = lesson;
        self.revision_mode = false;
        self.setup_lesson();
        self.save_settings()?;
        Ok(true)
    }

    /// Runs the material pipeline and resets everything tied to the previous run.
    pub fn setup_lesson(&mut self) {
        let ctx = PipelineContext {
            settings: &self.settings,
            familiarity: &self.familiarity,
            revision_mode: self.revision_mode,
        };
        let source = if self.revision_mode { &self.revision_source } else { &self.lesson.source_material };
        let presented = present_material(source, &ctx, &mut self.rng);

        self.lesson.presented_material = presented.clone();
        self.cursor = PresentationCursor::new(presented);
        self.char_counter = MatchedCharCounter::new(&self.lesson.settings.ignored_chars);
        self.typed.clear();
        self.attempts.clear();
        self.records.clear();
        self.tally = LessonTally::default();
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.show_strokes_in_lesson = false;
        self.target_stroke_count = self.current_target();

        tracing::info!(
            title = %self.lesson.title,
            presented = self.cursor.len(),
            revision = self.revision_mode,
            "lesson set up"
        );
        self.speak_current();
    }

    /// Same lesson, same mode, fresh run.
    pub fn restart_lesson(&mut self) {
        self.setup_lesson();
    }

    /// Drills the checked stroke records of the last run. With nothing
    /// checked the whole lesson is presented again.
    pub fn revise_lesson(&mut self) {
        match revision_material(&self.records) {
            Some(material) => {
                self.revision_source = material;
                self.revision_mode = true;
            }
            None => {
                self.revision_source.clear();
                self.revision_mode = false;
            }
        }
        self.setup_lesson();
    }

    /// Replaces the settings, saves them and re-presents the lesson.
    pub fn apply_settings(&mut self, settings: UserSettings) -> Result<()> {
        self.settings = settings;
        self.setup_lesson();
        self.save_settings()
    }

    /// Applies a shareable-link query such as `?repetitions=5&sortOrder=sortNew`.
    pub fn apply_params(&mut self, query: &str) -> Result<()> {
        let settings = self.settings.with_params(parse_query(query));
        self.apply_settings(settings)
    }

    fn save_settings(&mut self) -> Result<()> {
        write_preference(self.preferences.as_mut(), USER_SETTINGS_KEY, &self.settings)
    }

    /// Handles the full text typed for the current phrase so far.
    pub fn update_markup(&mut self, typed: &str) -> Result<MarkupUpdate> {
        if self.started_at.is_none() && !self.cursor.is_finished() {
            self.started_at = Some(Instant::now());
        }
        self.typed = typed.to_string();
        self.attempts.push(typed.to_string());

        let split = self.current_split();
        if self.cursor.is_finished() || !split.is_complete() {
            return Ok(MarkupUpdate { split, completed: None, finished: self.cursor.is_finished() });
        }

        let record = self.complete_phrase(&split);
        let finished = self.cursor.is_finished();
        if finished {
            self.stop_lesson()?;
        }
        Ok(MarkupUpdate { split, completed: Some(record), finished })
    }

    fn complete_phrase(&mut self, split: &MatchSplit) -> StrokeRecord {
        let item = self.cursor.current().clone();
        let verdict = stroke_accuracy(&self.attempts, self.target_stroke_count);
        let hinted = self.is_hint_shown();
        let completion = PhraseCompletion {
            key: familiarity_key(&self.typed, &item, &self.lesson.settings, self.settings.space_placement),
            accurate: verdict.accurate,
            hinted,
        };
        self.learning_engine.learn(&mut self.familiarity, &mut self.tally, &completion);
        self.tally.matched_chars += self.char_counter.count(&split.matched_expected);

        let record = StrokeRecord {
            word: item.phrase,
            attempts: verdict.attempts,
            stroke: item.stroke,
            checked: true,
            accuracy: verdict.accurate,
        };
        self.records.push(record.clone());
        tracing::debug!(word = %record.word, accurate = record.accuracy, hinted, "phrase completed");

        if let Some(next) = self.cursor.remaining().first().map(|item| item.phrase.clone()) {
            self.say(&next);
        }
        self.cursor.advance();
        self.target_stroke_count = self.current_target();
        self.typed.clear();
        self.attempts.clear();
        self.show_strokes_in_lesson = false;
        record
    }

    /// Ends the run and saves the learner's progress. The run is over even
    /// when saving fails.
    pub fn stop_lesson(&mut self) -> Result<LessonSummary> {
        if let Some(started) = self.started_at.take() {
            self.elapsed = started.elapsed();
        }
        if let Some(speaker) = self.speaker.as_mut() {
            speaker.cancel();
        }

        let tracks_progress = !self.lesson.path.is_empty() && !self.lesson.is_custom();
        if tracks_progress {
            let progress = lesson_progress(&self.lesson.source_material, &self.familiarity);
            self.lessons_progress.insert(self.lesson.path.clone(), progress);
        }
        for record in self.records.iter_mut().filter(|r| r.accuracy) {
            record.checked = false;
        }
        self.typed.clear();
        self.attempts.clear();
        self.cursor.finish();
        self.target_stroke_count = end_of_lesson_target();

        write_preference(self.preferences.as_mut(), MET_WORDS_KEY, &self.familiarity)?;
        self.save_settings()?;
        if tracks_progress {
            write_preference(self.preferences.as_mut(), LESSONS_PROGRESS_KEY, &self.lessons_progress)?;
        }

        let summary = self.summary();
        tracing::info!(wpm = summary.wpm, accuracy = summary.accuracy, "lesson stopped");
        Ok(summary)
    }

    pub fn summary(&self) -> LessonSummary {
        let elapsed = self.elapsed();
        LessonSummary {
            wpm: words_per_minute(self.tally.matched_chars, elapsed),
            accuracy: numeric_accuracy(&self.tally, self.records.len()),
            elapsed,
            tally: self.tally,
            records: self.records.clone(),
        }
    }

    /// Shows the stroke for the current phrase; the phrase then counts as hinted.
    pub fn reveal_hint(&mut self) {
        self.show_strokes_in_lesson = true;
    }

    /// Flips whether a finished phrase goes into the next revision lesson.
    pub fn toggle_record(&mut self, index: usize) -> Option<bool> {
        let record = self.records.get_mut(index)?;
        record.checked = !record.checked;
        Some(record.checked)
    }

    pub fn repetitions_remaining(&self) -> u32 {
        repetitions_remaining(self.settings.effective_repetitions(), self.cursor.len(), self.cursor.position())
    }

    pub fn is_hint_shown(&self) -> bool {
        should_show_hint(self.show_strokes_in_lesson, &self.settings, self.repetitions_remaining())
    }

    /// The current outline when a hint is showing.
    pub fn current_hint(&self) -> Option<&str> {
        (!self.cursor.is_finished() && self.is_hint_shown()).then(|| self.cursor.current().stroke.as_str())
    }

    pub fn current_split(&self) -> MatchSplit {
        match_split_text(
            &self.cursor.current().phrase,
            &self.typed,
            &self.lesson.settings.ignored_chars,
            MatchSettings::from(&self.settings),
        )
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.map_or(self.elapsed, |started| started.elapsed())
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn familiarity(&self) -> &FamiliarityStore {
        &self.familiarity
    }

    pub fn lesson(&self) -> &LessonMaterial {
        &self.lesson
    }

    pub fn cursor(&self) -> &PresentationCursor {
        &self.cursor
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn records(&self) -> &[StrokeRecord] {
        &self.records
    }

    pub fn tally(&self) -> &LessonTally {
        &self.tally
    }

    pub fn target_stroke_count(&self) -> usize {
        self.target_stroke_count
    }

    pub fn is_revision(&self) -> bool {
        self.revision_mode
    }

    pub fn lessons_progress(&self) -> &HashMap<String, LessonProgress> {
        &self.lessons_progress
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.preferences.as_ref()
    }

    fn current_target(&self) -> usize {
        if self.cursor.is_finished() {
            end_of_lesson_target()
        } else {
            target_stroke_count(self.cursor.current())
        }
    }

    fn speak_current(&mut self) {
        if !self.cursor.is_finished() {
            let phrase = self.cursor.current().phrase.clone();
            self.say(&phrase);
        }
    }

    fn say(&mut self, phrase: &str) {
        if !self.settings.speak_material {
            return;
        }
        if let Some(speaker) = self.speaker.as_mut() {
            speaker.say(spoken_form(phrase));
        }
    }
}
