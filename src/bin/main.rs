use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, terminal};
use std::error::Error;
use std::fs;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use steno_core::config::FamiliaritySelection;
use steno_core::core::lesson::{familiarity_breakdown, Validation};
use steno_core::core::speech::Speaker;
use steno_core::dictionary::{LayeredDictionary, Misstrokes, Namespace};
use steno_core::learning::Familiarity;
use steno_core::persistence::{load_dictionary, read_misstrokes, read_steno_dictionary, save_dictionary, JsonPreferenceStore};
use steno_core::{LessonEngine, LessonSummary};

const LOOK_AHEAD: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "steno_drill")]
#[command(about = "Stenography typing drills with familiarity tracking")]
struct Cli {
    /// Directory holding metWords.json, userSettings.json and lessonsProgress.json
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Steno dictionary JSON files, lowest priority
    #[arg(short, long = "dictionary", global = true)]
    dictionaries: Vec<PathBuf>,

    /// Dictionaries shipped with the lessons
    #[arg(long = "lesson-dictionary", global = true)]
    lesson_dictionaries: Vec<PathBuf>,

    /// The learner's own dictionaries, highest priority
    #[arg(short, long = "user-dictionary", global = true)]
    user_dictionaries: Vec<PathBuf>,

    /// Merged dictionary cache; read when no dictionary files are given
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type through a lesson in the terminal
    Drill {
        /// Lesson text file; the built-in lesson is used when missing
        lesson: Option<PathBuf>,

        /// Tab-separated `phrase<TAB>stroke` material instead of a lesson
        #[arg(long, conflicts_with = "lesson")]
        custom: Option<PathBuf>,

        /// Drill words from your own familiarity store
        #[arg(long, value_enum, conflicts_with_all = ["lesson", "custom"])]
        progress: Option<ProgressWords>,

        /// Settings overrides, e.g. "repetitions=5&sortOrder=sortRandom"
        #[arg(long)]
        params: Option<String>,
    },
    /// Show the outlines that write a phrase
    Lookup {
        phrase: String,

        /// Known misstrokes to leave out
        #[arg(long)]
        misstrokes: Option<PathBuf>,

        #[arg(long)]
        show_misstrokes: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProgressWords {
    All,
    Seen,
    Memorised,
}

impl ProgressWords {
    fn selection(self) -> FamiliaritySelection {
        let (seen_words, retained_words) = match self {
            Self::All => (true, true),
            Self::Seen => (true, false),
            Self::Memorised => (false, true),
        };
        FamiliaritySelection { new_words: false, seen_words, retained_words }
    }
}

/// Reads material out through the log; terminals have no voice.
struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn say(&mut self, utterance: &str) {
        tracing::info!(utterance, "say");
    }

    fn cancel(&mut self) {}
}

/// Raw mode for as long as it lives.
struct RawMode;

impl RawMode {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN })
        .init();

    let dictionary = load_dictionaries(&cli)?;
    match &cli.command {
        Command::Drill { lesson, custom, progress, params } => {
            let prefs_dir = cli.prefs.clone().unwrap_or_else(default_prefs_dir);
            let mut engine = LessonEngine::new(Box::new(JsonPreferenceStore::new(prefs_dir)))?
                .with_speaker(Box::new(LogSpeaker));

            if let Some(path) = custom {
                let text = fs::read_to_string(path)?;
                if let Validation::Fail(messages) = engine.start_custom_lesson(&text) {
                    for message in messages {
                        eprintln!("{message}");
                    }
                    return Ok(());
                }
            } else if let Some(words) = progress {
                if !engine.start_progress_lesson(&dictionary, &words.selection())? {
                    println!("No words to drill yet. Finish a lesson first.");
                    return Ok(());
                }
            } else {
                let (text, path) = read_lesson(lesson.as_deref());
                engine.load_lesson(&text, &path);
            }
            if let Some(query) = params {
                engine.apply_params(query)?;
            }

            let summary = run_drill(&mut engine)?;
            print_summary(&summary);
            print_breakdown(&engine);
        }
        Command::Lookup { phrase, misstrokes, show_misstrokes } => {
            let mut result = dictionary.lookup(phrase);
            if !show_misstrokes {
                let known = match misstrokes {
                    Some(path) => read_misstrokes(path)?,
                    None => Misstrokes::default(),
                };
                result = result.without_misstrokes(&known);
            }
            if result.is_match() {
                for candidate in &result.candidates {
                    println!("{}\t{}\t{} ({:?})", candidate.outline, candidate.translation, candidate.dictionary, candidate.namespace);
                }
            } else {
                println!("{}\t(hint: {})", result.best_outline(), dictionary.stroke_hint(phrase));
            }
        }
    }
    Ok(())
}

fn default_prefs_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("steno_drill")
}

fn load_dictionaries(cli: &Cli) -> Result<LayeredDictionary, Box<dyn Error>> {
    let no_files = cli.dictionaries.is_empty() && cli.lesson_dictionaries.is_empty() && cli.user_dictionaries.is_empty();
    if let (true, Some(snapshot)) = (no_files, &cli.snapshot) {
        if snapshot.exists() {
            return Ok(load_dictionary(snapshot)?);
        }
    }

    let mut dictionary = LayeredDictionary::new();
    let layers = [
        (&cli.dictionaries, Namespace::Builtin),
        (&cli.lesson_dictionaries, Namespace::ThirdParty),
        (&cli.user_dictionaries, Namespace::User),
    ];
    for (paths, namespace) in layers {
        for path in paths {
            match read_steno_dictionary(path) {
                Ok(entries) => dictionary.add_dictionary(&display_name(path), namespace, entries),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping dictionary"),
            }
        }
    }
    if let (false, Some(snapshot)) = (no_files, &cli.snapshot) {
        save_dictionary(&dictionary, snapshot)?;
    }
    Ok(dictionary)
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// An unreadable lesson file becomes empty text so the engine falls back.
fn read_lesson(path: Option<&Path>) -> (String, String) {
    let Some(path) = path else {
        return (String::new(), String::new());
    };
    let text = fs::read_to_string(path).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "could not read lesson");
        String::new()
    });
    (text, path.display().to_string())
}

/// Keys build up one stroke; Enter or a trailing space sends it, like a
/// steno machine writing a whole word at once.
fn run_drill(engine: &mut LessonEngine) -> Result<LessonSummary, Box<dyn Error>> {
    let _raw = RawMode::enable()?;
    let mut pending = String::new();

    loop {
        render(engine, &pending)?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if is_exit(&key) {
            return Ok(engine.stop_lesson()?);
        }

        let submission = match key.code {
            KeyCode::Tab => {
                engine.reveal_hint();
                None
            }
            KeyCode::Enter if !pending.is_empty() => Some(format!("{}{}", engine.typed(), std::mem::take(&mut pending))),
            KeyCode::Char(' ') if !pending.is_empty() => {
                Some(format!("{}{} ", engine.typed(), std::mem::take(&mut pending)))
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                pending.push(c);
                None
            }
            KeyCode::Backspace => {
                if pending.pop().is_some() {
                    None
                } else {
                    let mut typed = engine.typed().to_string();
                    typed.pop().map(|_| typed)
                }
            }
            _ => None,
        };

        if let Some(typed) = submission {
            if engine.update_markup(&typed)?.finished {
                return Ok(engine.summary());
            }
        }
    }
}

fn is_exit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Esc => true,
        _ => false,
    }
}

fn render(engine: &LessonEngine, pending: &str) -> std::io::Result<()> {
    let mut out = stdout();
    let split = engine.current_split();
    let cursor_state = engine.cursor();
    let upcoming: Vec<&str> = cursor_state.upcoming(LOOK_AHEAD).iter().map(|item| item.phrase.as_str()).collect();

    execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0),
        Print(format!("{}  [{}/{}]", engine.lesson().title, cursor_state.position() + 1, cursor_state.len())),
        cursor::MoveTo(0, 2),
        SetForegroundColor(Color::Green),
        Print(&split.matched_expected),
        SetForegroundColor(Color::White),
        Print(&split.unmatched_expected),
        ResetColor,
        Print(format!("   {}", upcoming.join(" "))),
        cursor::MoveTo(0, 3),
        SetForegroundColor(Color::DarkGrey),
        Print(engine.current_hint().unwrap_or("")),
        ResetColor,
        cursor::MoveTo(0, 5),
        Print(&split.matched_typed),
        SetForegroundColor(Color::Red),
        Print(&split.unmatched_typed),
        SetForegroundColor(Color::Yellow),
        Print(pending),
        ResetColor,
        cursor::MoveTo(0, 7),
        SetForegroundColor(Color::DarkGrey),
        Print("Enter/Space: send stroke  Tab: hint  Esc: stop"),
        ResetColor,
    )?;
    out.flush()
}

fn print_summary(summary: &LessonSummary) {
    println!("\n{} WPM, {:.0}% accuracy in {:.0?}", summary.wpm, summary.accuracy, summary.elapsed);
    let tally = &summary.tally;
    println!(
        "new {}  seen {}  retained {}  mistyped {}  hinted {}",
        tally.new_words_met, tally.low_exposures_seen, tally.retained_words, tally.mistyped_words, tally.hinted_words
    );
    for record in summary.records.iter().filter(|r| !r.accuracy) {
        println!("  {}  {}  tried: {}", record.word, record.stroke, record.attempts.join(", "));
    }
}

fn print_breakdown(engine: &LessonEngine) {
    let breakdown = familiarity_breakdown(
        &engine.lesson().source_material,
        engine.familiarity(),
        engine.settings().space_placement,
    );
    let count = |class: Familiarity| breakdown.get(&class).copied().unwrap_or(0);
    println!(
        "lesson words: {} new, {} seen, {} memorised",
        count(Familiarity::New),
        count(Familiarity::Seen),
        count(Familiarity::Retained)
    );
}
