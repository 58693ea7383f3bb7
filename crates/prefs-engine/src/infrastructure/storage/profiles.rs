//! Model profiles read from TOML files.
//!
//! ```toml
//! id = "Meta-Llama-3-8B-Instruct.Q4_0.gguf"
//! should_save_metadata = false
//!
//! [defaults]
//! name = "Llama 3 Instruct"
//! filename = "Meta-Llama-3-8B-Instruct.Q4_0.gguf"
//! temperature = 0.7
//! recency = "2024-05-02T18:31:07Z"
//! ```
//!
//! Missing defaults take the stock values.  `recency` is an RFC 3339 string.

use std::path::{Path, PathBuf};

use prefs_core::ModelProfile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("I/O error reading profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Reads the profile stored at `path`.
///
/// # Errors
///
/// Returns [`ProfileError::Io`] if the file cannot be read and
/// [`ProfileError::Parse`] if it is not a valid profile.
pub fn load_profile(path: &Path) -> Result<ModelProfile, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ProfileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
