//! Application configuration

use anyhow::{bail, Context, Result};
use gpuwatch_core::validate_thresholds;
use gpuwatch_sources::{BackendOptions, DRM_ROOT};
use gpuwatch_types::ThresholdConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config format version
pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(DRM_ROOT)
}

/// How events are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable lines through the logger
    #[default]
    Log,
    /// One JSON object per line on stdout
    Json,
}

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Detection and polling tunables
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// DRM class directory scanned for amdgpu cards
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    /// NVML-compatible AMD library used on Windows
    #[serde(default)]
    pub amd_windows_library: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputFormat,
}

impl AppConfig {
    /// Load configuration from the platform config directory.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            log::info!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "gpuwatch", "gpuwatch")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Reject config formats newer than this build and tunables the detector
    /// cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.version > CONFIG_VERSION {
            bail!(
                "Config version {} is newer than supported version {}",
                self.version,
                CONFIG_VERSION
            );
        }
        validate_thresholds(&self.thresholds).context("Invalid thresholds")?;
        Ok(())
    }

    /// Options for backend selection
    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            sysfs_root: self.sysfs_root.clone(),
            amd_windows_library: self.amd_windows_library.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            thresholds: ThresholdConfig::default(),
            sysfs_root: default_sysfs_root(),
            amd_windows_library: None,
            output: OutputFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "thresholds": { "temp_threshold": 85, "poll_interval_ms": 500 },
                "amd_windows_library": "C:\\amd\\nvml_amd.dll",
                "output": "json"
            }"#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.thresholds.temp_threshold, 85);
        assert_eq!(config.thresholds.poll_interval_ms, 500);
        assert_eq!(config.thresholds.persistence, 3);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(
            config.backend_options().amd_windows_library,
            Some(PathBuf::from("C:\\amd\\nvml_amd.dll"))
        );
        assert_eq!(config.backend_options().sysfs_root, PathBuf::from(DRM_ROOT));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }

    #[test]
    fn test_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.thresholds.prev_val = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_newer_version_rejected() {
        let config: AppConfig = serde_json::from_str(r#"{ "version": 2 }"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("version 2"));

        let config: AppConfig = serde_json::from_str(r#"{ "version": 1 }"#).unwrap();
        assert!(config.validate().is_ok());
    }
}
