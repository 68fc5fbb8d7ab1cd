use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Exporter configuration stored at `~/.forms_export/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Table holding submitted forms.
    pub forms_table: String,
    /// SQLite database file; defaults to `~/.forms_export/forms.db`.
    pub database_path: Option<PathBuf>,
    /// Question catalog JSON; defaults to `~/.forms_export/questions.json`.
    pub catalog_path: Option<PathBuf>,
    /// Log directory; defaults to `~/.forms_export/logs/`.
    pub logs_dir: Option<PathBuf>,
    pub log_filter: String,
    /// Rows fetched per storage page during a scan.
    pub scan_page_size: usize,
    /// Offset applied to submission timestamps in the summary report.
    pub report_utc_offset_hours: i32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            forms_table: "forms".into(),
            database_path: None,
            catalog_path: None,
            logs_dir: None,
            log_filter: "info".into(),
            scan_page_size: 100,
            report_utc_offset_hours: -3,
        }
    }
}

impl ExportConfig {
    /// Returns the base config directory: `~/.forms_export/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".forms_export"))
    }

    /// Returns the default config file path: `~/.forms_export/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::base_dir()?.join("forms.db")),
        }
    }

    pub fn resolved_catalog_path(&self) -> Result<PathBuf> {
        match &self.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::base_dir()?.join("questions.json")),
        }
    }

    pub fn resolved_logs_dir(&self) -> Result<PathBuf> {
        match &self.logs_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::base_dir()?.join("logs")),
        }
    }

    /// Loads config from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path, writing defaults when absent.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            config
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            config
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan_page_size == 0 {
            bail!("scan_page_size must be greater than zero");
        }
        if !(-14..=14).contains(&self.report_utc_offset_hours) {
            bail!(
                "report_utc_offset_hours must be within -14..=14, got {}",
                self.report_utc_offset_hours
            );
        }
        if self.forms_table.is_empty() {
            bail!("forms_table must not be empty");
        }
        Ok(())
    }
}
