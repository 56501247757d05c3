use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Preferences file name.
pub const PREFS_FILE: &str = "treedeco.json";
/// Default log file name.
pub const LOG_FILE: &str = "treedeco.log";
/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "TREEDECO_CONFIG_DIR";

/// Where treedeco keeps its preferences and log. `None` means "look it up".
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// `--config-dir` if given, else `$TREEDECO_CONFIG_DIR`, else unset.
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Full path of the preferences file `name`. Lookup order is in `resolve_dir`;
/// lookup order; the fallback is `treedeco/` under the user config dir.
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config_root(config).join(name)
}

/// Full path of the log file `name`; falls back to the user data dir.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    data_root(config).join(name)
}

/// Create the preferences and log directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = config_root(config);
    let data_dir = data_root(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }

    // Often the same directory.
    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }

    Ok(())
}

/// A working directory holding treedeco files is used in place.
fn has_local_config_files(dir: &Path) -> bool {
    [PREFS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

/// Explicit dir, then a working directory with treedeco files in it, then
/// `platform/treedeco`, then `.` when the platform dir is unknown.
fn resolve_dir(config: &PathConfig, platform: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir()
        && has_local_config_files(&current_dir)
    {
        return current_dir;
    }

    if let Some(dir) = platform {
        return dir.join("treedeco");
    }

    PathBuf::from(".")
}

fn config_root(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir())
}

fn data_root(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir())
}
