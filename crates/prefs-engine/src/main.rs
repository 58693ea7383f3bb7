//! prefsctl: inspect and edit model and application settings.
//!
//! # Usage
//!
//! ```text
//! prefsctl [OPTIONS] <COMMAND>
//!
//! Commands:
//!   model    Per-model overrides (show, get, set, restore, erase)
//!   app      Application settings (show, set, restore)
//!   devices  List selectable compute devices
//!   raw      Direct access to stored keys (get, remove)
//!
//! Options:
//!   --settings-file <PATH>  Settings file [env: PREFS_SETTINGS_FILE]
//!   --data-dir <PATH>       Default model directory [env: PREFS_DATA_DIR]
//!   --log-level <FILTER>    Log filter when RUST_LOG is unset [env: PREFS_LOG]
//! ```
//!
//! # Examples
//!
//! ```text
//! prefsctl model set --profile llama3.toml temperature 0.9
//! prefsctl model show --profile llama3.toml
//! prefsctl app set threadCount 8
//! prefsctl app show --json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use prefs_core::{KeyValueStore, ModelField, ModelProfile, SettingValue};
use prefs_engine::config::{EngineConfig, DEFAULT_LOG_LEVEL};
use prefs_engine::infrastructure::devices::StaticDeviceCatalog;
use prefs_engine::infrastructure::storage::load_profile;
use prefs_engine::{AppSetting, PersistAction, Settings};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "prefsctl",
    about = "Inspect and edit per-model and application settings",
    version
)]
struct Cli {
    /// Settings file to read and write.
    #[arg(long, env = "PREFS_SETTINGS_FILE", global = true)]
    settings_file: Option<PathBuf>,

    /// Directory used as the model path when none is stored.
    #[arg(long, env = "PREFS_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "PREFS_LOG", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Per-model overrides.
    #[command(subcommand)]
    Model(ModelCommand),
    /// Application settings.
    #[command(subcommand)]
    App(AppCommand),
    /// List selectable compute devices.
    Devices {
        /// Report these GPUs instead of probing, e.g. `cuda:RTX 4090,kompute:Arc A770`.
        #[arg(long, env = "PREFS_GPUS")]
        gpus: Option<String>,
    },
    /// Direct access to stored keys.
    #[command(subcommand)]
    Raw(RawCommand),
}

#[derive(Debug, Args)]
struct ProfileArg {
    /// TOML file describing the model profile.
    #[arg(long)]
    profile: PathBuf,
}

#[derive(Debug, Subcommand)]
enum ModelCommand {
    /// Print every field with its effective value.
    Show {
        #[command(flatten)]
        profile: ProfileArg,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective value of one field.
    Get {
        #[command(flatten)]
        profile: ProfileArg,
        field: ModelField,
    },
    /// Set one field.
    Set {
        #[command(flatten)]
        profile: ProfileArg,
        field: ModelField,
        value: String,
        /// Bypass the unchanged-value check and suppress notification.
        #[arg(long)]
        force: bool,
    },
    /// Reset the generation parameters to the profile defaults.
    Restore {
        #[command(flatten)]
        profile: ProfileArg,
    },
    /// Delete every stored override of the profile.
    Erase {
        #[command(flatten)]
        profile: ProfileArg,
    },
}

#[derive(Debug, Subcommand)]
enum AppCommand {
    /// Print every application setting.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set one application setting by its storage key.
    Set { setting: AppSetting, value: String },
    /// Reset application settings to their defaults.
    Restore {
        /// Reset the local document settings instead.
        #[arg(long)]
        local_docs: bool,
    },
}

#[derive(Debug, Subcommand)]
enum RawCommand {
    /// Print the stored value of a key.
    Get { key: String },
    /// Delete a key.
    Remove { key: String },
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            settings_file: self
                .settings_file
                .clone()
                .unwrap_or(defaults.settings_file),
            data_dir: self.data_dir.clone().unwrap_or(defaults.data_dir),
            log_level: self.log_level.clone(),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.engine_config();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("using settings file {}", config.settings_file.display());
    let settings = config.open();

    match cli.command {
        Command::Model(cmd) => run_model(&settings, cmd),
        Command::App(cmd) => run_app(&settings, cmd),
        Command::Devices { gpus } => {
            if let Some(spec) = gpus {
                settings.app().refresh_device_list(&StaticDeviceCatalog::parse(&spec));
            }
            let current = settings.app().device();
            for name in settings.app().device_list() {
                let marker = if name == current { "*" } else { " " };
                println!("{marker} {name}");
            }
            Ok(())
        }
        Command::Raw(cmd) => run_raw(settings.store(), cmd),
    }
}

fn open_profile(path: &Path) -> anyhow::Result<ModelProfile> {
    load_profile(path).with_context(|| format!("cannot load profile {}", path.display()))
}

fn run_model(settings: &Settings, cmd: ModelCommand) -> anyhow::Result<()> {
    match cmd {
        ModelCommand::Show { profile, json } => {
            let profile = open_profile(&profile.profile)?;
            let overridden = settings.overrides(&profile);
            if json {
                let values: BTreeMap<&str, SettingValue> = ModelField::ALL
                    .into_iter()
                    .map(|f| (f.key(), settings.resolve(&profile, f)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
                return Ok(());
            }
            for field in ModelField::ALL {
                let marker = if overridden.contains(&field) { "*" } else { " " };
                let value = settings.resolve(&profile, field);
                println!("{marker} {:<20} {}", field.key(), single_line(&value));
            }
        }
        ModelCommand::Get { profile, field } => {
            let profile = open_profile(&profile.profile)?;
            println!("{}", settings.resolve(&profile, field));
        }
        ModelCommand::Set {
            profile,
            field,
            value,
            force,
        } => {
            let profile = open_profile(&profile.profile)?;
            let value = SettingValue::parse_as(field.kind(), &value)
                .with_context(|| format!("invalid value for {field}"))?;
            let outcome = settings.set(&profile, field, value, force);
            let verb = match outcome.action {
                PersistAction::Written => "stored",
                PersistAction::Removed => "reset to default",
                PersistAction::Skipped => "unchanged",
            };
            println!("{field}: {verb}");
        }
        ModelCommand::Restore { profile } => {
            let profile = open_profile(&profile.profile)?;
            settings.restore_model_defaults(&profile);
            println!("restored defaults of {}", profile.id);
        }
        ModelCommand::Erase { profile } => {
            let profile = open_profile(&profile.profile)?;
            settings.erase_model(&profile);
            println!("erased overrides of {}", profile.id);
        }
    }
    Ok(())
}

fn run_app(settings: &Settings, cmd: AppCommand) -> anyhow::Result<()> {
    let app = settings.app();
    match cmd {
        AppCommand::Show { json } => {
            let values: BTreeMap<&str, SettingValue> = AppSetting::ALL
                .into_iter()
                .map(|s| (s.key(), app.value(s)))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for (key, value) in &values {
                    println!("{key:<26} {}", single_line(value));
                }
                println!("{:<26} {}", "forceMetal", app.force_metal());
            }
        }
        AppCommand::Set { setting, value } => {
            let value = SettingValue::parse_as(setting.kind(), &value)
                .with_context(|| format!("invalid value for {setting}"))?;
            let changed = app.set_value(setting, value);
            println!("{setting}: {}", if changed { "stored" } else { "unchanged" });
        }
        AppCommand::Restore { local_docs } => {
            if local_docs {
                app.restore_local_docs_defaults();
            } else {
                app.restore_application_defaults();
            }
        }
    }
    Ok(())
}

fn run_raw(store: &dyn KeyValueStore, cmd: RawCommand) -> anyhow::Result<()> {
    match cmd {
        RawCommand::Get { key } => match store.get(&key) {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("{key} is not set"),
        },
        RawCommand::Remove { key } => store.remove(&key),
    }
    Ok(())
}

/// Escapes newlines so multi-line prompts fit on one row.
fn single_line(value: &SettingValue) -> String {
    value.to_string().replace('\n', "\\n")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_model_set() {
        let cli = Cli::parse_from([
            "prefsctl",
            "model",
            "set",
            "--profile",
            "llama.toml",
            "temperature",
            "0.9",
        ]);

        match cli.command {
            Command::Model(ModelCommand::Set { field, value, force, .. }) => {
                assert_eq!(field, ModelField::Temperature);
                assert_eq!(value, "0.9");
                assert!(!force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_app_setting_key() {
        let cli = Cli::parse_from(["prefsctl", "app", "set", "localdocs/chunkSize", "512"]);

        match cli.command {
            Command::App(AppCommand::Set { setting, .. }) => {
                assert_eq!(setting, AppSetting::LocalDocsChunkSize);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_field() {
        let result = Cli::try_parse_from([
            "prefsctl",
            "model",
            "get",
            "--profile",
            "p.toml",
            "volume",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_single_line_escapes_newlines() {
        assert_eq!(
            single_line(&SettingValue::from("### Human:\n%1")),
            "### Human:\\n%1"
        );
    }
}
