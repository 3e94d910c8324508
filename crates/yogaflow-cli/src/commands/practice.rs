use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Local;
use clap::Subcommand;
use serde_json::json;
use tracing::{debug, warn};
use yogaflow_core::library::{builtin_sessions, load_session_file, require_session};
use yogaflow_core::mood::{MoodScreen, ENERGY_LABELS, MOOD_LABELS};
use yogaflow_core::timer::{AudioNotifier, NullAudio, NullHaptic, SystemClock, TerminalBell};
use yogaflow_core::{
    Database, Event, PracticeRun, Preferences, ProgressLedger, RunStage, SignalEmitter, TestMode,
};

use super::progress::save;

/// Sleep used when no tick is scheduled.
const IDLE_POLL: StdDuration = StdDuration::from_millis(50);

#[derive(Subcommand)]
pub enum PracticeAction {
    /// List built-in sessions
    List,
    /// Run a session in the foreground
    Run {
        /// Built-in session id (see `practice list`)
        id: Option<String>,
        /// Load the session from a JSON file instead
        #[arg(long)]
        session_file: Option<PathBuf>,
        /// Skip the mood checks for this run
        #[arg(long)]
        skip_mood: bool,
        /// Ring the terminal bell on transition cues
        #[arg(long)]
        bell: bool,
    },
}

pub fn run(action: PracticeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PracticeAction::List => {
            let sessions: Vec<_> = builtin_sessions()
                .into_iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "name": s.name,
                        "practice_type": s.practice_type,
                        "steps": s.len(),
                        "total_secs": s.total_duration_secs(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        PracticeAction::Run {
            id,
            session_file,
            skip_mood,
            bell,
        } => {
            let session = match (session_file, id) {
                (Some(path), _) => load_session_file(&path)?,
                (None, Some(id)) => require_session(&id)?,
                (None, None) => return Err("a session id or --session-file is required".into()),
            };
            let mut prefs = Preferences::load_or_default();
            let audio: Box<dyn AudioNotifier> = if bell {
                Box::new(TerminalBell)
            } else {
                Box::new(NullAudio::default())
            };
            let signals = SignalEmitter::new(
                audio,
                Box::new(NullHaptic::default()),
                prefs.transition.clone(),
            );

            let mut practice = PracticeRun::new(session, &prefs, TestMode::from_env(), signals);
            let stdin = io::stdin();
            let mut input = stdin.lock();

            emit(&mut prefs, practice.begin())?;
            loop {
                match practice.stage() {
                    RunStage::PreCheck | RunStage::PostCheck => {
                        let events = answer_mood_check(&mut practice, &mut input, skip_mood)?;
                        emit(&mut prefs, events)?;
                    }
                    RunStage::Practicing => {
                        let wait = practice
                            .until_next_tick()
                            .and_then(|d| d.to_std().ok())
                            .unwrap_or(IDLE_POLL);
                        std::thread::sleep(wait);
                        emit(&mut prefs, practice.pump())?;
                    }
                    RunStage::NotStarted | RunStage::Finished | RunStage::Cancelled => break,
                }
            }
            emit(&mut prefs, practice.teardown())?;

            let Some(new_session) = practice.completed_session() else {
                return Err("practice ended before completion".into());
            };
            let db = Database::open()?;
            let mut ledger = ProgressLedger::load(&db);
            let record = ledger.record_session(new_session, Local::now());
            let new_achievements = ledger.take_new_achievements();
            save(&ledger, &db)?;

            let summary = json!({
                "type": "summary",
                "record": record,
                "current_streak": ledger.data().current_streak,
                "new_achievements": new_achievements,
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
    }
    Ok(())
}

/// Print events as JSON lines and persist a disabled mood prompt.
fn emit(prefs: &mut Preferences, events: Vec<Event>) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    for event in events {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
        if let Event::MoodPromptDisabled { practice_type, .. } = event {
            prefs.set_mood_check_enabled(practice_type, false);
            if let Err(e) = prefs.save() {
                warn!(error = %e, "Failed to save mood check preference");
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Value(u8),
    Skip,
    /// Skip and don't ask again
    Never,
}

fn parse_answer(line: &str) -> Option<Answer> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "skip" => Some(Answer::Skip),
        "n" | "never" => Some(Answer::Never),
        other => other
            .parse::<u8>()
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Answer::Value),
    }
}

fn prompt<R: BufRead>(input: &mut R, question: &str, labels: &[&str]) -> io::Result<Answer> {
    let choices: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{} {label}", i + 1))
        .collect();
    loop {
        eprint!("{question} [{}] (s skip, n never ask): ", choices.join(", "));
        io::stderr().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            debug!("stdin closed; skipping mood check");
            return Ok(Answer::Skip);
        }
        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => eprintln!("Please enter 1-5, s or n."),
        }
    }
}

fn answer_mood_check<R: BufRead>(
    practice: &mut PracticeRun<SystemClock>,
    input: &mut R,
    skip_all: bool,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    if skip_all {
        return Ok(practice.skip_mood());
    }
    let screen = practice.mood_check().map(|c| c.screen());
    let answer = match screen {
        Some(MoodScreen::Mood) => prompt(input, "How do you feel?", &MOOD_LABELS)?,
        Some(MoodScreen::Energy) => prompt(input, "How is your energy?", &ENERGY_LABELS)?,
        Some(MoodScreen::Done) | None => return Ok(practice.skip_mood()),
    };
    Ok(match (answer, screen) {
        (Answer::Value(v), Some(MoodScreen::Mood)) => {
            practice.select_mood(v);
            Vec::new()
        }
        (Answer::Value(v), _) => practice.select_energy(v),
        (Answer::Skip, _) => practice.skip_mood(),
        (Answer::Never, _) => {
            practice.set_dont_show_again(true);
            practice.skip_mood()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers() {
        assert_eq!(parse_answer("3\n"), Some(Answer::Value(3)));
        assert_eq!(parse_answer(" S "), Some(Answer::Skip));
        assert_eq!(parse_answer(""), Some(Answer::Skip));
        assert_eq!(parse_answer("never"), Some(Answer::Never));
        assert_eq!(parse_answer("0"), None);
        assert_eq!(parse_answer("6"), None);
        assert_eq!(parse_answer("great"), None);
    }

    #[test]
    fn prompt_retries_until_valid() {
        let mut input = io::Cursor::new("9\nfoo\n4\n");
        assert_eq!(prompt(&mut input, "Mood?", &MOOD_LABELS).unwrap(), Answer::Value(4));
    }

    #[test]
    fn prompt_skips_on_eof() {
        let mut input = io::Cursor::new("");
        assert_eq!(prompt(&mut input, "Mood?", &MOOD_LABELS).unwrap(), Answer::Skip);
    }
}
