use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockError {
    #[error("dockutil is not available: {0}")]
    ToolUnavailable(String),

    #[error("dockutil exited with status {status}: {message}")]
    ExecutionFailed { status: i32, message: String },

    #[error("Could not parse dockutil listing: {0}")]
    ParseFailed(String),

    #[error("Could not build add fragment: {0}")]
    ConstructionFailed(String),

    #[error("Adding item {index} ({fragment}) failed: {source}")]
    AddFailed {
        index: usize,
        fragment: String,
        #[source]
        source: Box<DockError>,
    },

    #[error("Another Dock action is still running")]
    Busy,

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Invalid hotkey {0:?}")]
    InvalidHotkey(String),

    #[error("Preset storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for DockError {
    fn from(err: std::io::Error) -> Self {
        DockError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DockError {
    fn from(err: serde_json::Error) -> Self {
        DockError::Storage(err.to_string())
    }
}
