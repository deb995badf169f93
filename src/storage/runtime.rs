//! Runtime key/value storage for per-device protocol state.
//!
//! Some devices need values to survive between invocations, e.g. protocol
//! sequence numbers or the last configured duty of channels the hardware
//! cannot report back. Stores are explicit objects handed to the code that
//! needs them; nothing here is process-global.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{LiquidError, Result};

const APP_NAME: &str = "liquid-rust";
const FALLBACK_RUNTIME_DIR: &str = "/var/run";

// =============================================================================
// KeyValueStore
// =============================================================================

/// A small persistent key/value store.
///
/// Values are stored as text; typed access encodes them as JSON.
pub trait KeyValueStore: fmt::Debug {
    /// Read the raw value of `key`, `None` if missing or empty.
    fn load_raw(&mut self, key: &str) -> Result<Option<String>>;

    /// Write the raw value of `key`; `None` clears it.
    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()>;

    /// Read a typed value, falling back to `default`.
    fn load<T: DeserializeOwned>(&mut self, key: &str, default: T) -> Result<T>
    where
        Self: Sized,
    {
        match self.load_raw(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(default),
        }
    }

    /// Write a typed value.
    fn store<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.store_raw(key, Some(&raw))
    }

    fn load_int(&mut self, key: &str, default: i64) -> Result<i64>
    where
        Self: Sized,
    {
        self.load(key, default)
    }

    fn store_int(&mut self, key: &str, value: i64) -> Result<()>
    where
        Self: Sized,
    {
        self.store(key, &value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load_raw(&mut self, key: &str) -> Result<Option<String>> {
        (**self).load_raw(key)
    }

    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        (**self).store_raw(key, value)
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Store kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn load_raw(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.values.insert(key.to_string(), value.to_string()),
            None => self.values.remove(key),
        };
        Ok(())
    }
}

// =============================================================================
// RuntimeStorage
// =============================================================================

/// Base directories for runtime data, in order of preference.
///
/// The user runtime directory comes first when available. `/var/run` is
/// always a fallback so that data stored by another user can still be found.
pub fn get_runtime_dirs() -> Result<Vec<PathBuf>> {
    let mut dirs_found = Vec::new();
    if let Some(dir) = dirs::runtime_dir() {
        dirs_found.push(dir.join(APP_NAME));
    }
    let fallback = Path::new(FALLBACK_RUNTIME_DIR);
    if fallback.is_dir() {
        dirs_found.push(fallback.join(APP_NAME));
    }
    if dirs_found.is_empty() {
        return Err(LiquidError::Storage(
            "Could not find a directory for runtime data".into(),
        ));
    }
    Ok(dirs_found)
}

/// File-backed store, one file per key.
///
/// Keys live under a per-device prefix, e.g. `1b1c_0c18/<bus address>`.
/// The first base directory receives writes; reads try every base directory.
#[derive(Debug)]
pub struct RuntimeStorage {
    read_dirs: Vec<PathBuf>,
    write_dir: PathBuf,
    cache: HashMap<String, Option<String>>,
}

impl RuntimeStorage {
    /// Open the store for `key_prefixes` under the default runtime dirs.
    pub fn new(key_prefixes: &[&str]) -> Result<Self> {
        Self::with_base_dirs(get_runtime_dirs()?, key_prefixes)
    }

    /// Open the store for `key_prefixes` under explicit base dirs.
    pub fn with_base_dirs(base_dirs: Vec<PathBuf>, key_prefixes: &[&str]) -> Result<Self> {
        for prefix in key_prefixes {
            validate_relative(prefix)?;
        }
        if base_dirs.is_empty() {
            return Err(LiquidError::Storage("No base directory for runtime data".into()));
        }

        let read_dirs: Vec<PathBuf> = base_dirs
            .into_iter()
            .map(|base| key_prefixes.iter().fold(base, |dir, prefix| dir.join(prefix)))
            .collect();
        let write_dir = read_dirs[0].clone();

        fs::create_dir_all(&write_dir)?;
        if dirs::runtime_dir().is_some_and(|runtime| write_dir.starts_with(runtime)) {
            set_sticky(&write_dir)?;
            debug!("data in {} (within runtime dir)", write_dir.display());
        } else {
            debug!("data in {}", write_dir.display());
        }

        Ok(Self {
            read_dirs,
            write_dir,
            cache: HashMap::new(),
        })
    }

    /// Directory that receives writes.
    pub fn write_dir(&self) -> &Path {
        &self.write_dir
    }
}

impl KeyValueStore for RuntimeStorage {
    fn load_raw(&mut self, key: &str) -> Result<Option<String>> {
        validate_relative(key)?;
        if let Some(value) = self.cache.get(key) {
            debug!("loaded {}={:?} (from cache)", key, value);
            return Ok(value.clone());
        }

        for base in &self.read_dirs {
            let path = base.join(key);
            if !path.is_file() {
                continue;
            }
            let data = match fs::read_to_string(&path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("{} exists but cannot be read: {}", path.display(), e);
                    continue;
                }
            };
            let data = data.trim();
            let value = (!data.is_empty()).then(|| data.to_string());
            debug!("loaded {}={:?} (from {})", key, value, path.display());
            self.cache.insert(key.to_string(), value.clone());
            return Ok(value);
        }

        debug!("no data (file) found for {}", key);
        Ok(None)
    }

    fn store_raw(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        validate_relative(key)?;
        let path = self.write_dir.join(key);
        fs::write(&path, value.unwrap_or(""))?;
        self.cache
            .insert(key.to_string(), value.map(str::to_string));
        debug!("stored {}={:?} (in {})", key, value, path.display());
        Ok(())
    }
}

// sticky bit prevents removal during runtime dir cleanup
#[cfg(unix)]
fn set_sticky(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o1700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_sticky(_dir: &Path) -> Result<()> {
    Ok(())
}

fn validate_relative(part: &str) -> Result<()> {
    let path = Path::new(part);
    let valid = !part.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !valid {
        return Err(LiquidError::InvalidArgument(format!(
            "Storage key '{}' must be a relative path without '..'",
            part
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("liquid-rust-test-{}-{}-{}", name, std::process::id(), nanos))
    }

    #[test]
    fn test_memory_storage_typed_values() {
        let mut store = MemoryStorage::new();
        assert_eq!(store.load_int("sequence", 7).unwrap(), 7);
        store.store_int("sequence", 12).unwrap();
        assert_eq!(store.load_int("sequence", 7).unwrap(), 12);

        store.store("fan1_profile", &vec![(20, 30), (40, 60)]).unwrap();
        let profile: Vec<(i32, i32)> = store.load("fan1_profile", Vec::new()).unwrap();
        assert_eq!(profile, vec![(20, 30), (40, 60)]);

        store.store_raw("sequence", None).unwrap();
        assert_eq!(store.load_int("sequence", 1).unwrap(), 1);
    }

    #[test]
    fn test_boxed_store_keeps_typed_access() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStorage::new());
        store.store_int("fan1_mode", 2).unwrap();
        assert_eq!(store.load_int("fan1_mode", 0).unwrap(), 2);
        assert_eq!(store.load_raw("fan1_mode").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_runtime_storage_persists_across_instances() {
        let base = scratch_dir("persist");
        let mut store = RuntimeStorage::with_base_dirs(vec![base.clone()], &["1b1c_0c18", "usb1"]).unwrap();
        assert!(store.write_dir().ends_with("1b1c_0c18/usb1"));
        store.store_int("fan1_duty", 55).unwrap();

        let mut reopened = RuntimeStorage::with_base_dirs(vec![base.clone()], &["1b1c_0c18", "usb1"]).unwrap();
        assert_eq!(reopened.load_int("fan1_duty", 100).unwrap(), 55);
        assert_eq!(reopened.load_int("fan2_duty", 100).unwrap(), 100);

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn test_runtime_storage_reads_fallback_dirs() {
        let primary = scratch_dir("primary");
        let fallback = scratch_dir("fallback");
        let fallback_dir = fallback.join("dev");
        fs::create_dir_all(&fallback_dir).unwrap();
        fs::write(fallback_dir.join("pump_mode"), "2\n").unwrap();

        let mut store =
            RuntimeStorage::with_base_dirs(vec![primary.clone(), fallback.clone()], &["dev"]).unwrap();
        assert_eq!(store.load_int("pump_mode", 1).unwrap(), 2);

        store.store_int("pump_mode", 0).unwrap();
        assert!(primary.join("dev").join("pump_mode").is_file());
        assert_eq!(store.load_int("pump_mode", 1).unwrap(), 0);

        fs::remove_dir_all(primary).ok();
        fs::remove_dir_all(fallback).ok();
    }

    #[test]
    fn test_runtime_storage_empty_file_uses_default() {
        let base = scratch_dir("empty");
        let mut store = RuntimeStorage::with_base_dirs(vec![base.clone()], &["dev"]).unwrap();
        store.store_raw("fan1_duty", None).unwrap();

        let mut reopened = RuntimeStorage::with_base_dirs(vec![base.clone()], &["dev"]).unwrap();
        assert_eq!(reopened.load_int("fan1_duty", 100).unwrap(), 100);

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let base = scratch_dir("escape");
        assert!(RuntimeStorage::with_base_dirs(vec![base.clone()], &["../etc"]).is_err());
        assert!(RuntimeStorage::with_base_dirs(vec![base.clone()], &["/abs"]).is_err());

        let mut store = RuntimeStorage::with_base_dirs(vec![base.clone()], &["dev"]).unwrap();
        assert!(matches!(
            store.store_int("../sequence", 1),
            Err(LiquidError::InvalidArgument(_))
        ));

        fs::remove_dir_all(base).ok();
    }
}
