use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use log::{debug, info};
use crate::error::DockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Cmd,
    Ctrl,
    Alt,
    Shift,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    modifiers: Vec<Modifier>, // Sorted, no duplicates
    key: String,
}

impl FromStr for KeyCombo {
    type Err = DockError;

    /// Parses combos like `cmd+alt+1`; modifier order does not matter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DockError::InvalidHotkey(s.to_string());
        let mut parts: Vec<String> = s.split('+').map(|p| p.trim().to_lowercase()).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;

        let mut modifiers = Vec::new();
        for part in parts {
            let modifier = match part.as_str() {
                "cmd" | "command" => Modifier::Cmd,
                "ctrl" | "control" => Modifier::Ctrl,
                "alt" | "opt" | "option" => Modifier::Alt,
                "shift" => Modifier::Shift,
                _ => return Err(invalid()),
            };
            modifiers.push(modifier);
        }
        if modifiers.is_empty() {
            return Err(invalid());
        }
        modifiers.sort();
        modifiers.dedup();
        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            let name = match m {
                Modifier::Cmd => "cmd",
                Modifier::Ctrl => "ctrl",
                Modifier::Alt => "alt",
                Modifier::Shift => "shift",
            };
            write!(f, "{}+", name)?;
        }
        write!(f, "{}", self.key)
    }
}

/// Whether the host lets us observe global key events.
pub trait PermissionCheck {
    fn is_granted(&self) -> bool;
}

impl<F: Fn() -> bool> PermissionCheck for F {
    fn is_granted(&self) -> bool {
        self()
    }
}

/// An OS-level key event source.
pub trait HotkeyListener {
    fn install(&mut self, combos: &[KeyCombo]) -> Result<(), DockError>;
    fn uninstall(&mut self);
}

/// Listener without an OS hook; combos are delivered by the caller.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct ManualListener {
    pub installed: Vec<KeyCombo>,
}

impl HotkeyListener for ManualListener {
    fn install(&mut self, combos: &[KeyCombo]) -> Result<(), DockError> {
        self.installed = combos.to_vec();
        Ok(())
    }

    fn uninstall(&mut self) {
        self.installed.clear();
    }
}

pub struct HotkeyHub<L: HotkeyListener> {
    listener: L,
    bindings: HashMap<KeyCombo, String>,
    installed: bool,
}

impl<L: HotkeyListener> HotkeyHub<L> {
    /// `bindings` maps combo strings to preset ids, as in the `[hotkeys]` config table.
    pub fn new(listener: L, bindings: &HashMap<String, String>) -> Result<Self, DockError> {
        let bindings = bindings
            .iter()
            .map(|(combo, id)| Ok((combo.parse::<KeyCombo>()?, id.clone())))
            .collect::<Result<HashMap<_, _>, DockError>>()?;
        Ok(Self { listener, bindings, installed: false })
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&KeyCombo, &str)> {
        self.bindings.iter().map(|(c, id)| (c, id.as_str()))
    }

    #[allow(dead_code)]
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Installs the listener if permission is granted. Returns whether it is installed.
    pub fn install(&mut self, permission: &dyn PermissionCheck) -> Result<bool, DockError> {
        if self.installed {
            return Ok(true);
        }
        if !permission.is_granted() {
            info!("Hotkeys disabled: input monitoring permission not granted");
            return Ok(false);
        }
        let combos: Vec<KeyCombo> = self.bindings.keys().cloned().collect();
        self.listener.install(&combos)?;
        self.installed = true;
        info!("Installed {} hotkeys", combos.len());
        Ok(true)
    }

    pub fn uninstall(&mut self) {
        if self.installed {
            self.listener.uninstall();
            self.installed = false;
        }
    }

    /// Preset id bound to `combo`, if the hub is live.
    pub fn dispatch(&self, combo: &KeyCombo) -> Option<&str> {
        if !self.installed {
            return None;
        }
        let id = self.bindings.get(combo).map(String::as_str);
        debug!("Hotkey {} -> {:?}", combo, id);
        id
    }

    #[allow(dead_code)]
    pub fn listener(&self) -> &L {
        &self.listener
    }
}

impl<L: HotkeyListener> Drop for HotkeyHub<L> {
    fn drop(&mut self) {
        self.uninstall();
    }
}
