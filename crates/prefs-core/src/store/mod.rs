//! The key/value store port.
//!
//! The settings engine never talks to a file or database directly.  It goes
//! through [`KeyValueStore`], a flat mapping from `group/name` strings to
//! [`SettingValue`]s.  Backends:
//!
//! - [`memory::MemoryStore`] – in-process map, used by tests and benches.
//! - `TomlFileStore` in `prefs-engine` – the durable settings file.
//!
//! # Contract
//!
//! Every method takes `&self` and is infallible.  A backend that can fail
//! (disk full, permission denied) logs the failure and carries on; surfacing
//! such errors to the user is the job of an outer layer.  Callers are
//! single-threaded per process, but implementations must still be
//! `Send + Sync` so the engine handle can be shared.

use tracing::debug;

use crate::domain::value::SettingValue;

pub mod memory;

/// Durable mapping from string keys to typed scalar values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: SettingValue);

    /// Removes `key`.  Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Returns `true` if any value is stored under `key`.
    fn contains(&self, key: &str) -> bool;

    /// Returns every stored key.
    fn keys(&self) -> Vec<String>;

    /// Returns the stored value, or `default` when absent.
    fn get_or(&self, key: &str, default: SettingValue) -> SettingValue {
        self.get(key).unwrap_or(default)
    }

    /// Removes every key inside `group` (keys of the form `group/...`).
    fn remove_group(&self, group: &str) {
        let prefix = format!("{group}/");
        let doomed: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .collect();
        debug!("removing group {group} ({} keys)", doomed.len());
        for key in doomed {
            self.remove(&key);
        }
    }
}

/// Splits `key` into `(group, name)` at the last `/`.
///
/// Un-grouped keys return `None` as the group.
pub fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.rsplit_once('/') {
        Some((group, name)) => (Some(group), name),
        None => (None, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key_ungrouped() {
        assert_eq!(split_key("threadCount"), (None, "threadCount"));
    }

    #[test]
    fn test_split_key_grouped() {
        assert_eq!(split_key("localdocs/chunkSize"), (Some("localdocs"), "chunkSize"));
    }

    #[test]
    fn test_split_key_uses_last_separator() {
        // Model ids may themselves contain a slash.
        assert_eq!(
            split_key("model-org/repo/topP"),
            (Some("model-org/repo"), "topP")
        );
    }
}
