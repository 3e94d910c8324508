use clap::Subcommand;
use yogaflow_core::{ConfigError, Preferences};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a preference value
    Get {
        /// Dotted key (e.g. "practice.rest_duration_secs", "transition.delay_secs")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// List all preferences
    List,
    /// Reset preferences to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let prefs = Preferences::load_or_default();
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut prefs = Preferences::load()?;
            prefs.set(&key, &value)?;
            prefs.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let prefs = Preferences::load_or_default();
            let json = serde_json::to_string_pretty(&prefs)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let prefs = Preferences::default();
            prefs.save()?;
            println!("preferences reset to defaults");
        }
    }
    Ok(())
}
