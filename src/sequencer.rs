use log::{debug, info, warn};
use crate::dockutil::DockTool;
use crate::error::DockError;
use crate::model::Preset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyState {
    Clearing,
    Adding(usize),
    Restarting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Layout is in place but the Dock has to be restarted by hand.
    AppliedWithWarning(String),
}

pub struct Sequencer<'a, T: DockTool + ?Sized> {
    tool: &'a T,
    observer: Option<Box<dyn FnMut(&ApplyState) + 'a>>,
}

impl<'a, T: DockTool + ?Sized> Sequencer<'a, T> {
    pub fn new(tool: &'a T) -> Self {
        Self { tool, observer: None }
    }

    pub fn with_observer(mut self, observer: impl FnMut(&ApplyState) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn enter(&mut self, state: ApplyState) {
        debug!("Sequencer: {:?}", state);
        if let Some(observer) = self.observer.as_mut() {
            observer(&state);
        }
    }

    pub fn apply(&mut self, preset: &Preset) -> Result<ApplyOutcome, DockError> {
        info!("Applying preset {:?} ({} items)", preset.name, preset.fragments.len());

        self.enter(ApplyState::Clearing);
        self.tool.remove_all()?;

        for (index, fragment) in preset.fragments.iter().enumerate() {
            self.enter(ApplyState::Adding(index));
            self.tool.add(fragment).map_err(|source| DockError::AddFailed {
                index,
                fragment: fragment.clone(),
                source: Box::new(source),
            })?;
        }

        self.enter(ApplyState::Restarting);
        match self.tool.restart_dock() {
            Ok(()) => Ok(ApplyOutcome::Applied),
            Err(e) => {
                warn!("Preset applied but the Dock did not restart: {}", e);
                Ok(ApplyOutcome::AppliedWithWarning(e.to_string()))
            }
        }
    }
}
