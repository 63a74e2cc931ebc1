//! Runtime configuration, read from the environment at startup

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default log filter when `BILLED_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the catalog database and stored receipts
    pub data_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
    /// Seeds the stored user as an employee when set
    pub user_email: Option<String>,
    /// JSON array of bills imported into an empty catalog
    pub seed_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = match non_empty("BILLED_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => Self::default_data_dir()?,
        };

        Ok(Self {
            data_dir,
            log_filter: non_empty("BILLED_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            user_email: non_empty("BILLED_USER_EMAIL"),
            seed_path: non_empty("BILLED_SEED").map(PathBuf::from),
        })
    }

    /// Platform data directory:
    /// - Linux: ~/.local/share/billed
    /// - macOS: ~/Library/Application Support/billed
    /// - Windows: %APPDATA%\billed
    fn default_data_dir() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDataDir)?;
        path.push("billed");
        Ok(path)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("billed.db")
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.data_dir.join("receipts")
    }
}
