//! Platform directories and the filesystem side of the model-path setting.
//!
//! The settings file lives in the platform config directory:
//! - Windows:  `%APPDATA%\ModelPrefs\settings.toml`
//! - Linux:    `~/.config/modelprefs/settings.toml`
//! - macOS:    `~/Library/Application Support/ModelPrefs/settings.toml`
//!
//! Downloaded models default to the platform data directory:
//! - Windows:  `%LOCALAPPDATA%\ModelPrefs\`
//! - Linux:    `~/.local/share/modelprefs/`
//! - macOS:    `~/Library/Application Support/ModelPrefs/`

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::{debug, warn};

use super::file_store::StoreError;
use crate::application::PathResolver;

/// File written to check that the model directory is writable.
const PROBE_FILE: &str = "test_write.txt";

const SETTINGS_FILE: &str = "settings.toml";

/// Resolves the full path to the settings file.
///
/// # Errors
///
/// Returns [`StoreError::NoPlatformDir`] if the base directory cannot be
/// determined.
pub fn settings_file_path() -> Result<PathBuf, StoreError> {
    platform_config_dir()
        .map(|dir| dir.join(SETTINGS_FILE))
        .ok_or(StoreError::NoPlatformDir)
}

/// Resolves the platform config directory, including the application
/// subdirectory.
pub fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("ModelPrefs"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("modelprefs"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ModelPrefs")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// Resolves the platform data directory, including the application
/// subdirectory.
pub fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %LOCALAPPDATA% e.g. C:\Users\<user>\AppData\Local
        std::env::var_os("LOCALAPPDATA").map(|p| PathBuf::from(p).join("ModelPrefs"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_DATA_HOME or ~/.local/share
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })?;
        Some(base.join("modelprefs"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ModelPrefs")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// [`PathResolver`] over the real filesystem.
#[derive(Debug, Clone)]
pub struct FsPathResolver {
    data_dir: PathBuf,
}

impl FsPathResolver {
    /// Uses `data_dir` as the default model directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl PathResolver for FsPathResolver {
    /// Creates the data directory if needed and checks it is writable.
    ///
    /// Failures are logged; the path is returned either way.
    fn default_models_path(&self) -> String {
        let dir = &self.data_dir;
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("local download directory can't be created: {}: {e}", dir.display());
                return with_trailing_separator(dir);
            }
        }

        let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.clone());
        let probe = canonical.join(PROBE_FILE);
        if probe.exists() {
            return with_trailing_separator(&canonical);
        }

        match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&probe)
        {
            Ok(_) => debug!("{} is writable", canonical.display()),
            Err(e) => warn!(
                "local download path appears not writeable: {}: {e}",
                canonical.display()
            ),
        }
        with_trailing_separator(&canonical)
    }

    fn normalize(&self, raw: &str) -> String {
        let path = match raw.strip_prefix("file://") {
            Some(rest) => file_url_path(rest),
            None => PathBuf::from(raw),
        };
        let resolved = fs::canonicalize(&path).unwrap_or_else(|_| absolutize(path));
        with_trailing_separator(&resolved)
    }
}

/// Decodes the path part of a `file://` URL.
fn file_url_path(rest: &str) -> PathBuf {
    let decoded = urlencoding::decode(rest).unwrap_or(Cow::Borrowed(rest));
    // "file:///C:/models" carries a slash before the drive letter.
    let bytes = decoded.as_bytes();
    if cfg!(windows) && bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' {
        return PathBuf::from(&decoded[1..]);
    }
    PathBuf::from(decoded.as_ref())
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn with_trailing_separator(path: &Path) -> String {
    let mut s = path.to_string_lossy().into_owned();
    if !s.ends_with('/') && !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("prefs-paths-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_default_models_path_creates_dir_and_probe() {
        // Arrange
        let dir = scratch_dir();
        let resolver = FsPathResolver::new(&dir);

        // Act
        let path = resolver.default_models_path();

        // Assert
        assert!(path.ends_with(MAIN_SEPARATOR));
        assert!(dir.is_dir());
        assert!(dir.join(PROBE_FILE).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_models_path_is_returned_when_dir_cannot_be_created() {
        // Arrange: a regular file where a parent directory should be
        let root = scratch_dir();
        fs::create_dir_all(&root).unwrap();
        let blocker = root.join("blocker");
        fs::write(&blocker, b"").unwrap();
        let resolver = FsPathResolver::new(blocker.join("models"));

        // Act
        let path = resolver.default_models_path();

        // Assert: logged, not raised
        assert_eq!(path, with_trailing_separator(&blocker.join("models")));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_normalize_canonicalizes_existing_dir() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        let resolver = FsPathResolver::new(&dir);

        let normalized = resolver.normalize(&dir.to_string_lossy());

        let canonical = fs::canonicalize(&dir).unwrap();
        assert_eq!(normalized, with_trailing_separator(&canonical));
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_decodes_file_url() {
        // Arrange
        let dir = scratch_dir().join("my models");
        fs::create_dir_all(&dir).unwrap();
        let url = format!(
            "file://{}",
            dir.to_string_lossy().replace(' ', "%20")
        );

        // Act
        let normalized = FsPathResolver::new("/unused").normalize(&url);

        // Assert
        let canonical = fs::canonicalize(&dir).unwrap();
        assert_eq!(normalized, with_trailing_separator(&canonical));
        let _ = fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn test_normalize_missing_relative_path_is_made_absolute() {
        let normalized = FsPathResolver::new("/unused").normalize("no-such-dir-for-prefs");

        assert!(Path::new(&normalized).is_absolute());
        assert!(normalized.ends_with(&format!("no-such-dir-for-prefs{MAIN_SEPARATOR}")));
    }

    #[test]
    fn test_trailing_separator_is_not_doubled() {
        assert_eq!(with_trailing_separator(Path::new("/a/")), "/a/");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_settings_file_is_named_settings_toml() {
        if let Ok(path) = settings_file_path() {
            assert!(path.ends_with("modelprefs/settings.toml"));
        }
    }
}
