//! Configuration loading and root folder resolution
//!
//! Resolution order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "BREEDLOG_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "breedlog.db";

/// Object storage directory inside the root folder
pub const STORAGE_DIR: &str = "storage";

/// Settings read from `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_audience: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub classifier: ClassifierToml,
}

/// `[classifier]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierToml {
    /// `mock` or `remote`
    pub backend: Option<String>,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
    pub model_version: Option<String>,
}

/// Load the TOML config
///
/// An explicitly named file must exist and parse. Without one, the platform
/// default locations are tried and a missing file yields defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Some(path) => path,
            None => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Root folder: CLI → environment → TOML → platform default
pub fn resolve_root_folder(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Database path for a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Object storage path for a root folder
pub fn storage_path(root_folder: &Path) -> PathBuf {
    root_folder.join(STORAGE_DIR)
}

/// First existing config file among the platform locations
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("breedlog").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/breedlog/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/breedlog (or /var/lib/breedlog for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("breedlog"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/breedlog"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("breedlog"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/breedlog"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("breedlog"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\breedlog"))
    } else {
        PathBuf::from("./breedlog_data")
    }
}
