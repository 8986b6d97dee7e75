use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fetcher::{AudioQuality, DEFAULT_OUTPUT_DIR};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Directory the produced audio file is written to
    pub output_dir: PathBuf,

    /// Audio quality requested from the transcoder
    pub audio_quality: AudioQuality,

    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Ask yt-dlp to embed the source metadata and split "Artist - Title" video titles
    pub embed_source_metadata: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            audio_quality: AudioQuality::default(),
            yt_dlp_path: "yt-dlp".to_string(),
            embed_source_metadata: false,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    ///
    /// An explicit path must point at an existing file. Without one, the
    /// local `config.yaml` is tried first, then the user config directory,
    /// where a default file is written when none exists yet.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Could not write default config: {:#}", e);
            }
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("fetchtag").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.fetch.output_dir.as_os_str().is_empty() {
            anyhow::bail!("fetch.output_dir must not be empty");
        }

        if self.fetch.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("fetch.yt_dlp_path must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Output Directory: {}", self.fetch.output_dir.display());
        println!("  Audio Quality: {}", self.fetch.audio_quality);
        println!("  yt-dlp: {}", self.fetch.yt_dlp_path);
        println!("  Embed Source Metadata: {}", self.fetch.embed_source_metadata);
    }
}
