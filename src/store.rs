use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Path, PathBuf};
use log::{info, warn};
use crate::config::project_dirs;
use crate::error::DockError;
use crate::model::Preset;

pub fn default_store_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("presets.json"))
}

/// Presets in insertion order, written through to a JSON file on every change.
pub struct PresetStore {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetStore {
    /// A missing or unreadable file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let presets = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt preset file {:?}: {}", path, e);
                Vec::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Could not read preset file {:?}: {}", path, e);
                Vec::new()
            }
        };
        info!("PresetStore: loaded {} presets from {:?}", presets.len(), path);
        Self { path, presets }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    // Each mutation writes the new list first and only then replaces `presets`,
    // so a failed write leaves memory matching the file.
    pub fn add(&mut self, preset: Preset) -> Result<(), DockError> {
        let mut next = self.presets.clone();
        next.push(preset);
        self.commit(next)
    }

    pub fn delete(&mut self, id: &str) -> Result<Preset, DockError> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DockError::PresetNotFound(id.to_string()))?;
        let mut next = self.presets.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    pub fn delete_range(&mut self, range: Range<usize>) -> Result<Vec<Preset>, DockError> {
        if range.start > range.end || range.end > self.presets.len() {
            return Err(DockError::PresetNotFound(format!(
                "index range {}..{} (have {})",
                range.start,
                range.end,
                self.presets.len()
            )));
        }
        let mut next = self.presets.clone();
        let removed: Vec<Preset> = next.drain(range).collect();
        self.commit(next)?;
        Ok(removed)
    }

    fn commit(&mut self, presets: Vec<Preset>) -> Result<(), DockError> {
        self.write(&presets)?;
        self.presets = presets;
        Ok(())
    }

    fn write(&self, presets: &[Preset]) -> Result<(), DockError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_file = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(presets)?;
        fs::write(&tmp_file, content)?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(names: &[&str], dir: &Path) -> PresetStore {
        let mut store = PresetStore::load(dir.join("presets.json"));
        for name in names {
            store.add(Preset::new(*name, vec![format!("/{}", name)])).unwrap();
        }
        store
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = PresetStore::load(dir.path().join("nope/presets.json"));
        assert!(store.presets().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("presets.json");
        fs::write(&path, "{not json").unwrap();
        assert!(PresetStore::load(&path).presets().is_empty());
    }

    #[test]
    fn test_unreadable_file_is_empty() {
        let dir = tempdir().unwrap();
        // Reading a directory fails with something other than NotFound.
        let path = dir.path().join("presets.json");
        fs::create_dir(&path).unwrap();
        assert!(PresetStore::load(&path).presets().is_empty());
    }

    #[test]
    fn test_failed_add_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let mut store = PresetStore::load(blocker.join("presets.json"));
        assert!(store.add(Preset::new("work", vec![])).is_err());
        assert!(store.presets().is_empty());
    }

    #[test]
    fn test_failed_delete_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&["a", "b", "c"], dir.path());
        let id = store.presets()[0].id.clone();

        // A non-empty directory in place of the file makes the final rename fail.
        fs::remove_file(store.path()).unwrap();
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("keep"), "").unwrap();

        assert!(store.delete(&id).is_err());
        assert!(store.delete_range(0..2).is_err());
        assert_eq!(store.presets().len(), 3);
        assert!(store.get(&id).is_some());
        assert!(!dir.path().join("presets.tmp").exists());
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let store = store_with(&["work", "home"], dir.path());
        let reloaded = PresetStore::load(store.path());
        assert_eq!(reloaded.presets(), store.presets());
        assert!(!dir.path().join("presets.tmp").exists());
    }

    #[test]
    fn test_delete_by_id_keeps_order() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&["a", "b", "c"], dir.path());
        let id = store.presets()[1].id.clone();

        let removed = store.delete(&id).unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<&str> = store.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(PresetStore::load(store.path()).presets().len(), 2);
    }

    #[test]
    fn test_delete_unknown_id() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&["a"], dir.path());
        assert!(matches!(store.delete("missing"), Err(DockError::PresetNotFound(_))));
        assert_eq!(store.presets().len(), 1);
    }

    #[test]
    fn test_delete_range() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&["a", "b", "c", "d"], dir.path());
        let removed = store.delete_range(1..3).unwrap();
        assert_eq!(removed.len(), 2);
        let names: Vec<&str> = store.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "d"]);
        assert!(store.delete_range(1..5).is_err());
    }
}
