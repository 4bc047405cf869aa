//! src/config.rs
//!
//! Data and media directory configuration.
//!
//! Centralized paths for the JSON data files and the per-entity media folders,
//! persisted in a small `config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Default location of the config file, relative to the working directory.
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding [`CONFIG_FILE`].
pub const CONFIG_ENV: &str = "WIW_CONFIG";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the six entity JSON files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Root of the media tree (portraits, icons, Monster Manual pages).
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("Data")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("Media")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            media_dir: default_media_dir(),
        }
    }
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            media_dir: media_dir.into(),
        }
    }

    /// Resolve which config file to use: explicit argument, then `WIW_CONFIG`,
    /// then `config.json` in the working directory.
    pub fn locate(arg: Option<String>) -> PathBuf {
        arg.or_else(|| std::env::var(CONFIG_ENV).ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load the config, falling back to defaults when the file is absent or
    /// unreadable. A broken config never prevents startup.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("Could not load config: {}", e);
                Self::default()
            }
        }
    }

    /// Strict load.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| WorldError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| WorldError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| WorldError::json(path, e))?;
        fs::write(path, text).map_err(|e| WorldError::io(path, e))
    }

    pub fn data_file(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    pub fn media_root(&self) -> &Path {
        &self.media_dir
    }

    pub fn npc_portraits(&self) -> PathBuf {
        self.media_dir.join("NPCs")
    }

    pub fn spell_icons(&self) -> PathBuf {
        self.media_dir.join("Spells")
    }

    pub fn item_icons(&self) -> PathBuf {
        self.media_dir.join("Items")
    }

    pub fn ability_icons(&self) -> PathBuf {
        self.media_dir.join("Abilities")
    }

    pub fn condition_icons(&self) -> PathBuf {
        self.media_dir.join("Conditions")
    }

    pub fn monster_manual_pages(&self) -> PathBuf {
        self.media_dir.join("MonsterManual")
    }

    pub fn audio_files(&self) -> PathBuf {
        self.media_dir.join("Audio")
    }

    pub fn image_references(&self) -> PathBuf {
        self.media_dir.join("Image References")
    }

    /// Create every media subfolder.
    pub fn ensure_media_dirs(&self) -> Result<()> {
        for dir in [
            self.npc_portraits(),
            self.spell_icons(),
            self.item_icons(),
            self.ability_icons(),
            self.condition_icons(),
            self.monster_manual_pages(),
            self.audio_files(),
            self.image_references(),
        ] {
            fs::create_dir_all(&dir).map_err(|e| WorldError::io(&dir, e))?;
        }
        Ok(())
    }
}
