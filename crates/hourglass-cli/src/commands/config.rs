use clap::Subcommand;
use hourglass_core::{JsonFileStore, StateStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file location
    Path,
    /// Get a config value
    Get {
        /// Config key (e.g. "dob", "settings.lifespan_years")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::open_default()?;
    match action {
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
        ConfigAction::Get { key } => {
            let state = store.load_or_default();
            match state.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut state = store.load_or_default();
            state.set(&key, &value)?;
            store.save(&state)?;
            println!("ok");
        }
        ConfigAction::List => {
            let state = store.load_or_default();
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}
