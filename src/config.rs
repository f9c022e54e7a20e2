//! Checklist configuration.
//!
//! Loaded from `~/.checklist/config.toml`. Every key is optional; a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::{DEFAULT_RECIPIENT, SNAPSHOT_SCALE};

/// Checklist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Recipient for `email` when none is given on the command line.
    pub default_recipient: String,

    /// JSON catalog to assess against. The built-in catalog otherwise.
    pub catalog: Option<PathBuf>,

    pub snapshot: SnapshotConfig,

    pub mail: MailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_recipient: DEFAULT_RECIPIENT.to_string(),
            catalog: None,
            snapshot: SnapshotConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

/// How `pdf` renders a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SnapshotConfig {
    /// Program and leading arguments. The output file name is appended and
    /// the rendered form is written to its stdin. Empty means no renderer.
    pub command: Vec<String>,

    pub scale: f32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            scale: SNAPSHOT_SCALE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MailConfig {
    /// Program that opens a `mailto:` URL (e.g. `xdg-open`).
    /// When unset, the URL is printed instead.
    pub opener: Option<String>,
}

impl Config {
    /// Load config from `~/.checklist/config.toml`.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.default_recipient.trim().is_empty() {
            return Err(format!(
                "default-recipient is empty in {}\n\
                 Remove the key or set it to an email address.",
                path.display()
            ));
        }
        if config.snapshot.scale.is_nan() || config.snapshot.scale <= 0.0 {
            return Err(format!(
                "snapshot.scale must be positive in {}",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.checklist/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".checklist").join("config.toml"))
    }
}
