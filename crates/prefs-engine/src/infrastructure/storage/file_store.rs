//! TOML-backed [`KeyValueStore`].
//!
//! The flat `group/name` key space maps onto TOML tables: the key is split
//! at its last `/`, the group becomes a table and the name a key inside it.
//! Un-grouped keys live at the top level.
//!
//! ```toml
//! threadCount = 6
//! chatTheme = "Light"
//!
//! [localdocs]
//! chunkSize = 512
//!
//! [network]
//! isActive = false
//!
//! ["model-Meta-Llama-3-8B-Instruct.Q4_0.gguf"]
//! temperature = 0.9
//! recency = 2024-05-02T18:31:07Z
//! ```
//!
//! # Access pattern
//!
//! The file is read on every access; nothing is cached, so edits made by
//! hand between two calls are picked up.  Writes re-read the file, apply the
//! change and write it back while holding an in-process lock.  The
//! [`KeyValueStore`] methods never fail: I/O and parse errors are logged and
//! treated as an empty file (reads) or a dropped write (writes).  Use
//! [`TomlFileStore::try_load`] / [`TomlFileStore::try_save`] to observe
//! errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use prefs_core::store::split_key;
use prefs_core::{KeyValueStore, SettingValue};
use thiserror::Error;
use toml::value::Datetime;
use toml::{Table, Value};
use tracing::{debug, warn};

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings file on disk.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file.  A missing file is an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system errors other than "not
    /// found", and [`StoreError::Parse`] if the TOML is malformed.
    pub fn try_load(&self) -> Result<Table, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str::<Table>(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Table::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes `table` to the file, creating the parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system failures or
    /// [`StoreError::Serialize`] if serialization fails.
    pub fn try_save(&self, table: &Table) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(table)?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn load(&self) -> Table {
        self.try_load().unwrap_or_else(|e| {
            warn!("reading {} failed, using empty settings: {e}", self.path.display());
            Table::new()
        })
    }

    /// Read-modify-write under the write lock.
    ///
    /// A file that cannot be read is left untouched rather than replaced.
    fn update(&self, apply: impl FnOnce(&mut Table) -> bool) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = match self.try_load() {
            Ok(table) => table,
            Err(e) => {
                warn!("not writing {}: {e}", self.path.display());
                return;
            }
        };
        if !apply(&mut table) {
            return;
        }
        if let Err(e) = self.try_save(&table) {
            warn!("writing {} failed: {e}", self.path.display());
        }
    }
}

impl KeyValueStore for TomlFileStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        let table = self.load();
        lookup(&table, key).and_then(from_toml)
    }

    fn set(&self, key: &str, value: SettingValue) {
        let (group, name) = split_key(key);
        let value = to_toml(value);
        self.update(|table| {
            match group {
                None => {
                    table.insert(name.to_string(), value);
                }
                Some(group) => {
                    // A scalar stored under the group's name is replaced.
                    let mut inner = match table.remove(group) {
                        Some(Value::Table(inner)) => inner,
                        _ => Table::new(),
                    };
                    inner.insert(name.to_string(), value);
                    table.insert(group.to_string(), Value::Table(inner));
                }
            }
            true
        });
    }

    fn remove(&self, key: &str) {
        let (group, name) = split_key(key);
        self.update(|table| match group {
            None => table.remove(name).is_some(),
            Some(group) => {
                let Some(Value::Table(inner)) = table.get_mut(group) else {
                    return false;
                };
                let removed = inner.remove(name).is_some();
                if inner.is_empty() {
                    table.remove(group);
                }
                removed
            }
        });
    }

    fn contains(&self, key: &str) -> bool {
        let table = self.load();
        lookup(&table, key).is_some_and(|v| !v.is_table())
    }

    fn keys(&self) -> Vec<String> {
        let table = self.load();
        let mut keys = Vec::new();
        for (name, value) in &table {
            match value {
                Value::Table(inner) => keys.extend(
                    inner
                        .iter()
                        .filter(|(_, v)| !v.is_table())
                        .map(|(n, _)| format!("{name}/{n}")),
                ),
                _ => keys.push(name.clone()),
            }
        }
        keys
    }

    /// Drops the group's table (and any nested `group/...` tables) in a
    /// single write.
    fn remove_group(&self, group: &str) {
        let prefix = format!("{group}/");
        debug!("removing group {group}");
        self.update(|table| {
            let doomed: Vec<String> = table
                .keys()
                .filter(|name| *name == group || name.starts_with(&prefix))
                .cloned()
                .collect();
            for name in &doomed {
                table.remove(name);
            }
            !doomed.is_empty()
        });
    }
}

fn lookup<'t>(table: &'t Table, key: &str) -> Option<&'t Value> {
    match split_key(key) {
        (Some(group), name) => table.get(group)?.as_table()?.get(name),
        (None, name) => table.get(name),
    }
}

fn to_toml(value: SettingValue) -> Value {
    match value {
        SettingValue::Bool(b) => Value::Boolean(b),
        SettingValue::Int(i) => Value::Integer(i),
        SettingValue::Double(d) => Value::Float(d),
        SettingValue::Text(s) => Value::String(s),
        SettingValue::Timestamp(t) => {
            let text = t.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            match Datetime::from_str(&text) {
                Ok(dt) => Value::Datetime(dt),
                Err(_) => Value::String(text),
            }
        }
    }
}

fn from_toml(value: &Value) -> Option<SettingValue> {
    match value {
        Value::Boolean(b) => Some(SettingValue::Bool(*b)),
        Value::Integer(i) => Some(SettingValue::Int(*i)),
        Value::Float(d) => Some(SettingValue::Double(*d)),
        Value::String(s) => Some(SettingValue::Text(s.clone())),
        Value::Datetime(dt) => {
            let text = dt.to_string();
            Some(match DateTime::parse_from_rfc3339(&text) {
                Ok(t) => SettingValue::Timestamp(t.with_timezone(&Utc)),
                // Local dates and times carry no offset; keep them as text.
                Err(_) => SettingValue::Text(text),
            })
        }
        Value::Array(_) | Value::Table(_) => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
