mod config;
mod dockutil;
mod error;
mod fragment;
mod hotkeys;
mod matcher;
mod model;
mod parser;
mod sequencer;
mod state;
mod store;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directories::BaseDirs;
use crate::config::load_config;
use crate::dockutil::DockUtil;
use crate::hotkeys::{HotkeyHub, KeyCombo, ManualListener};
use crate::model::Locator;
use crate::sequencer::ApplyOutcome;
use crate::state::AppState;
use crate::store::{default_store_path, PresetStore};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Save and restore Dock layouts with dockutil", long_about = None)]
struct Args {
    /// Preset file to use instead of the per-user default
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List saved presets
    List,
    /// Show the live Dock as it would be captured
    Current,
    /// Save the live Dock as a new preset
    Capture { name: String },
    /// Restore a preset, found by id or by name
    Apply {
        #[arg(required_unless_present = "hotkey")]
        query: Option<String>,
        /// Resolve the preset through a `[hotkeys]` binding instead
        #[arg(long, conflicts_with = "query")]
        hotkey: Option<String>,
    },
    /// Delete a preset by id
    Delete { id: String },
    /// Delete presets by list position, end exclusive
    DeleteRange { start: usize, end: usize },
    /// Fuzzy-search presets by name
    Search { query: String },
    /// Show configured hotkeys
    Hotkeys,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config()?;
    let store_path = args
        .store
        .or_else(default_store_path)
        .unwrap_or_else(|| PathBuf::from("presets.json"));
    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("could not determine the home directory"))?;

    let store = PresetStore::load(store_path);
    let tool = Box::new(DockUtil::new(&config.general));
    let mut app = AppState::new(&config, store, tool, &home)?;
    log::debug!("Using preset store {:?}", app.store.path());

    match args.command {
        Cmd::List => {
            for (i, preset) in app.store.presets().iter().enumerate() {
                println!("{:>3}  {}  {} ({} items)", i, preset.id, preset.name, preset.fragments.len());
            }
        }
        Cmd::Current => {
            for item in app.current()? {
                let locator = match &item.locator {
                    Locator::Path(path) => path.as_str(),
                    Locator::Spacer { small: false } => "<spacer>",
                    Locator::Spacer { small: true } => "<small spacer>",
                };
                println!("{}\t{}", item.label, locator);
            }
        }
        Cmd::Capture { name } => {
            let preset = app.capture(&name)?;
            println!("Saved {} ({} items) as {}", preset.name, preset.fragments.len(), preset.id);
        }
        Cmd::Apply { query, hotkey } => {
            let id = match (query, hotkey) {
                (_, Some(combo)) => resolve_hotkey(&config.hotkeys, &combo)?,
                (Some(query), None) => app
                    .find(&query)
                    .map(|p| p.id.clone())
                    .ok_or_else(|| anyhow!("no preset matches {:?}", query))?,
                (None, None) => return Err(anyhow!("give a preset name or --hotkey")),
            };
            match app.apply(&id)? {
                ApplyOutcome::Applied => println!("Dock restored"),
                ApplyOutcome::AppliedWithWarning(note) => {
                    println!("Dock restored, but it did not restart ({}); run `killall Dock`", note)
                }
            }
        }
        Cmd::Delete { id } => {
            let removed = app.delete(&id)?;
            println!("Deleted {}", removed.name);
        }
        Cmd::DeleteRange { start, end } => {
            let removed = app.delete_range(start..end)?;
            println!("Deleted {} presets", removed.len());
        }
        Cmd::Search { query } => {
            match app.find(&query) {
                Some(preset) => println!("{}  {}", preset.id, preset.name),
                None => println!("No match"),
            }
        }
        Cmd::Hotkeys => {
            let hub = HotkeyHub::new(ManualListener::default(), &config.hotkeys)?;
            for (combo, id) in hub.bindings() {
                let name = app.store.get(id).map(|p| p.name.as_str()).unwrap_or("<missing>");
                println!("{}\t{}\t{}", combo, id, name);
            }
        }
    }

    Ok(())
}

fn resolve_hotkey(bindings: &std::collections::HashMap<String, String>, combo: &str) -> Result<String> {
    let mut hub = HotkeyHub::new(ManualListener::default(), bindings)?;
    // A command-line invocation is an explicit user action, so no monitoring permission is involved.
    hub.install(&|| true)?;
    let combo: KeyCombo = combo.parse()?;
    let id = hub
        .dispatch(&combo)
        .map(str::to_string)
        .with_context(|| format!("no preset bound to {}", combo))?;
    Ok(id)
}
