//! Configuration Management
//!
//! Loads OCI credentials from a `.env` style settings file and the process
//! environment into one validated [`Config`] value.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the working directory
pub const SETTINGS_FILE: &str = ".env";

/// Prefix shared by every configuration variable
pub const ENV_PREFIX: &str = "OCI_CONFIG_";

pub const TENANCY_KEY: &str = "OCI_CONFIG_tenancy_ocid";
pub const USER_KEY: &str = "OCI_CONFIG_user_ocid";
pub const FINGERPRINT_KEY: &str = "OCI_CONFIG_fingerprint";
pub const REGION_KEY: &str = "OCI_CONFIG_region";
pub const PRIVATE_KEY_PATH_KEY: &str = "OCI_CONFIG_private_key_path";
pub const PRIVATE_KEY_FILENAME_KEY: &str = "OCI_CONFIG_private_key_filename";

/// Directory (under the working directory) holding key files named by filename
const KEY_DIR: &str = "config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration values: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("Failed to read settings file {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },
}

/// Credentials and scope for one report run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tenancy_id: String,
    pub user_id: String,
    pub fingerprint: String,
    pub region: String,
    pub private_key_path: PathBuf,
}

impl Config {
    /// Load configuration from the settings file and the process environment.
    /// Environment variables take precedence over the file.
    pub fn load(settings: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;

        let mut vars = match settings {
            Some(path) => read_settings(path)?,
            None => match default_settings_path(&cwd) {
                Some(path) => read_settings(&path)?,
                None => {
                    tracing::warn!("No {} settings file found, using environment only", SETTINGS_FILE);
                    HashMap::new()
                }
            },
        };

        vars.extend(std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)));

        Ok(Self::from_vars(&vars, &cwd)?)
    }

    /// Build and validate a configuration from raw variables.
    /// Relative key paths resolve against `base_dir`.
    pub fn from_vars(vars: &HashMap<String, String>, base_dir: &Path) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        for key in [TENANCY_KEY, USER_KEY, FINGERPRINT_KEY, REGION_KEY] {
            if get(key).is_none() {
                missing.push(key);
            }
        }

        let private_key_path = match (get(PRIVATE_KEY_PATH_KEY), get(PRIVATE_KEY_FILENAME_KEY)) {
            (Some(path), _) => Some(base_dir.join(path)),
            (None, Some(filename)) => Some(base_dir.join(KEY_DIR).join(filename)),
            (None, None) => {
                missing.push(PRIVATE_KEY_FILENAME_KEY);
                None
            }
        };

        let (Some(tenancy_id), Some(user_id), Some(fingerprint), Some(region), Some(private_key_path)) = (
            get(TENANCY_KEY),
            get(USER_KEY),
            get(FINGERPRINT_KEY),
            get(REGION_KEY),
            private_key_path,
        ) else {
            return Err(ConfigError::Missing(missing));
        };

        validate_ocid(TENANCY_KEY, tenancy_id)?;
        validate_ocid(USER_KEY, user_id)?;
        validate_fingerprint(fingerprint)?;
        validate_region(region)?;

        Ok(Self {
            tenancy_id: tenancy_id.to_string(),
            user_id: user_id.to_string(),
            fingerprint: fingerprint.to_lowercase(),
            region: region.to_string(),
            private_key_path,
        })
    }

    /// Override the region (CLI flag)
    pub fn set_region(&mut self, region: &str) -> Result<(), ConfigError> {
        validate_region(region)?;
        self.region = region.to_string();
        Ok(())
    }
}

/// `./.env`, then `<config dir>/toci/.env`
fn default_settings_path(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(SETTINGS_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("toci").join(SETTINGS_FILE))
        .filter(|path| path.is_file())
}

/// Read a settings file without touching the process environment
fn read_settings(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let settings_error = |message: String| ConfigError::Settings {
        path: path.to_path_buf(),
        message,
    };

    let iter = dotenv::from_path_iter(path).map_err(|e| settings_error(e.to_string()))?;

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| settings_error(e.to_string()))?;
        vars.insert(key, value);
    }

    tracing::debug!("Loaded {} settings from {}", vars.len(), path.display());
    Ok(vars)
}

/// OCIDs look like `ocid1.<resource type>.<realm>.[region].<unique id>`
fn validate_ocid(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = value.split('.').collect();
    if !value.starts_with("ocid1.") || parts.len() < 4 || parts[1].is_empty() {
        return Err(ConfigError::Invalid {
            key,
            reason: "expected an OCID of the form ocid1.<type>.<realm>..<id>".to_string(),
        });
    }
    Ok(())
}

/// Key fingerprints are 16 colon-separated hex byte pairs
fn validate_fingerprint(value: &str) -> Result<(), ConfigError> {
    let pairs: Vec<&str> = value.split(':').collect();
    let valid = pairs.len() == 16
        && pairs
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()));

    if !valid {
        return Err(ConfigError::Invalid {
            key: FINGERPRINT_KEY,
            reason: "expected 16 colon-separated hex pairs".to_string(),
        });
    }
    Ok(())
}

/// Region identifiers: lowercase letters, digits and hyphens, e.g. `us-ashburn-1`
fn validate_region(value: &str) -> Result<(), ConfigError> {
    let valid = !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !valid {
        return Err(ConfigError::Invalid {
            key: REGION_KEY,
            reason: format!("'{}' is not a region identifier", value),
        });
    }
    Ok(())
}
