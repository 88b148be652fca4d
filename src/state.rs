use std::ops::Range;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use log::{info, warn};
use crate::config::Config;
use crate::dockutil::DockTool;
use crate::error::DockError;
use crate::fragment::{FragmentBuilder, QuoteStyle};
use crate::matcher::PresetMatcher;
use crate::model::{ParsedItem, Preset};
use crate::parser::ListingParser;
use crate::sequencer::{ApplyOutcome, ApplyState, Sequencer};
use crate::store::PresetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Capture,
    Apply,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    ActionStarted(Action),
    ActionFinished { action: Action, result: Result<String, String> },
    Applying(ApplyState),
    PresetAdded(Preset),
    PresetsRemoved(Vec<String>),
}

/// Clears the in-flight flag when the action ends, however it ends.
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct AppState {
    pub store: PresetStore,
    tool: Box<dyn DockTool>,
    parser: ListingParser,
    builder: FragmentBuilder,
    matcher: PresetMatcher,
    in_flight: Arc<AtomicBool>,
    subscribers: Vec<Sender<StateEvent>>,
}

impl AppState {
    pub fn new(config: &Config, store: PresetStore, tool: Box<dyn DockTool>, home: &Path) -> Result<Self, DockError> {
        Ok(Self {
            store,
            tool,
            parser: ListingParser::new(home, config.parser.malformed_lines)?,
            builder: FragmentBuilder::new(QuoteStyle::from_config(config.fragments.escape_single_quotes)),
            matcher: PresetMatcher::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            subscribers: Vec::new(),
        })
    }

    #[allow(dead_code)]
    pub fn subscribe(&mut self) -> Receiver<StateEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    #[allow(dead_code)]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Marks an action as outstanding; fails if one already is.
    pub fn begin(&self) -> Result<InFlight, DockError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(DockError::Busy);
        }
        Ok(InFlight { flag: Arc::clone(&self.in_flight) })
    }

    /// Reads the live Dock without saving anything.
    pub fn current(&self) -> Result<Vec<ParsedItem>, DockError> {
        let report = self.tool.list()?;
        self.parser.parse(&report)
    }

    pub fn capture(&mut self, name: &str) -> Result<Preset, DockError> {
        let _guard = self.begin()?;
        broadcast(&mut self.subscribers, StateEvent::ActionStarted(Action::Capture));

        let result = self.capture_inner(name);
        if let Err(e) = &result {
            warn!("Capture of {:?} failed: {}", name, e);
        }
        let summary = result.as_ref().map(|p| p.name.clone()).map_err(|e| e.to_string());
        broadcast(&mut self.subscribers, StateEvent::ActionFinished { action: Action::Capture, result: summary });
        result
    }

    fn capture_inner(&mut self, name: &str) -> Result<Preset, DockError> {
        let items = self.current()?;
        let fragments = items
            .iter()
            .map(|item| self.builder.build(item))
            .collect::<Result<Vec<_>, _>>()?;

        let preset = Preset::new(name, fragments);
        self.store.add(preset.clone())?;
        info!("Captured preset {:?} with {} items", preset.name, preset.fragments.len());
        broadcast(&mut self.subscribers, StateEvent::PresetAdded(preset.clone()));
        Ok(preset)
    }

    pub fn apply(&mut self, id: &str) -> Result<ApplyOutcome, DockError> {
        let _guard = self.begin()?;
        let preset = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| DockError::PresetNotFound(id.to_string()))?;
        broadcast(&mut self.subscribers, StateEvent::ActionStarted(Action::Apply));

        let subscribers = &mut self.subscribers;
        let result = Sequencer::new(&*self.tool)
            .with_observer(|state| broadcast(subscribers, StateEvent::Applying(state.clone())))
            .apply(&preset);

        let summary = match &result {
            Ok(ApplyOutcome::Applied) => Ok(preset.name.clone()),
            Ok(ApplyOutcome::AppliedWithWarning(note)) => Ok(format!("{} (restart the Dock manually: {})", preset.name, note)),
            Err(e) => {
                warn!("Applying {:?} failed: {}", preset.name, e);
                Err(e.to_string())
            }
        };
        broadcast(&mut self.subscribers, StateEvent::ActionFinished { action: Action::Apply, result: summary });
        result
    }

    pub fn delete(&mut self, id: &str) -> Result<Preset, DockError> {
        let removed = self.store.delete(id)?;
        broadcast(&mut self.subscribers, StateEvent::PresetsRemoved(vec![removed.id.clone()]));
        Ok(removed)
    }

    pub fn delete_range(&mut self, range: Range<usize>) -> Result<Vec<Preset>, DockError> {
        let removed = self.store.delete_range(range)?;
        let ids = removed.iter().map(|p| p.id.clone()).collect();
        broadcast(&mut self.subscribers, StateEvent::PresetsRemoved(ids));
        Ok(removed)
    }

    /// Looks a preset up by exact id first, then by fuzzy name match.
    pub fn find(&mut self, query: &str) -> Option<&Preset> {
        if let Some(index) = self.store.presets().iter().position(|p| p.id == query) {
            return self.store.presets().get(index);
        }
        let hits = self.matcher.search(query, self.store.presets());
        hits.first().and_then(|&i| self.store.presets().get(i))
    }
}

fn broadcast(subscribers: &mut Vec<Sender<StateEvent>>, event: StateEvent) {
    subscribers.retain(|tx| tx.send(event.clone()).is_ok());
}
