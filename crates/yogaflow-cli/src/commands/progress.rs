use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Subcommand;
use serde_json::json;
use yogaflow_core::{Database, ProgressLedger};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Streak, totals, stats and achievements
    Show,
    /// Most recent practices, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Export progress as JSON (stdout if no path given)
    Export { path: Option<PathBuf> },
    /// Replace progress with a previous export
    Import { path: PathBuf },
    /// Delete all progress
    Reset,
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut ledger = ProgressLedger::load(&db);

    match action {
        ProgressAction::Show => {
            ledger.refresh_stats(Local::now().date_naive());
            let data = ledger.data();
            let out = json!({
                "current_streak": data.current_streak,
                "longest_streak": data.longest_streak,
                "total_sessions": data.total_sessions,
                "total_minutes": data.total_minutes,
                "last_practice_date": data.last_practice_date,
                "stats": data.stats,
                "achievements": data.achievements,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ProgressAction::History { limit } => {
            println!("{}", serde_json::to_string_pretty(&ledger.recent(limit))?);
        }
        ProgressAction::Export { path } => {
            let content = ledger.export_json(Utc::now())?;
            match path {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    eprintln!("Progress exported to {}", path.display());
                }
                None => println!("{content}"),
            }
        }
        ProgressAction::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            ledger.import_json(&content)?;
            save(&ledger, &db)?;
            println!("imported {} sessions", ledger.history().len());
        }
        ProgressAction::Reset => {
            ledger.reset();
            save(&ledger, &db)?;
            println!("progress reset");
        }
    }
    Ok(())
}

pub(crate) fn save(
    ledger: &ProgressLedger,
    db: &Database,
) -> Result<(), Box<dyn std::error::Error>> {
    if ledger.save(db) {
        Ok(())
    } else {
        Err("failed to save progress".into())
    }
}
