use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CrmError;
use crate::gateway::http::HttpGateway;
use crate::gateway::RecordGateway;
use crate::services::ReportContext;
use crate::types::Config;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "LEADPULSE_CONFIG";

/// Shared state for one process: configuration, the record gateway and report settings.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<dyn RecordGateway>,
    pub ctx: ReportContext,
}

impl AppState {
    pub fn new(config: Config, gateway: Arc<dyn RecordGateway>) -> Self {
        let ctx = ReportContext::from_config(&config);
        Self {
            config,
            gateway,
            ctx,
        }
    }

    /// State backed by the hosted record store named in `config`.
    pub fn connect(config: Config) -> Result<Self, CrmError> {
        let gateway = HttpGateway::new(&config.gateway)?;
        Ok(Self::new(config, Arc::new(gateway)))
    }

    pub fn gateway(&self) -> &dyn RecordGateway {
        self.gateway.as_ref()
    }
}

/// `$LEADPULSE_CONFIG`, or ~/.leadpulse/config.json
pub fn config_path() -> Result<PathBuf, CrmError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        CrmError::ConfigurationError("Could not find home directory".to_string())
    })?;
    Ok(home.join(".leadpulse").join("config.json"))
}

/// Load configuration from the default location.
pub fn load_config() -> Result<Config, CrmError> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config, CrmError> {
    if !path.exists() {
        return Err(CrmError::ConfigurationError(format!(
            "Config file not found at {}. Create it with: {{ \"gateway\": {{ \"baseUrl\": \"...\", \"projectId\": \"...\" }} }}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        CrmError::ConfigurationError(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write `config` as pretty JSON, creating the parent directory when needed.
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), CrmError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    log::info!("Saved config to {}", path.display());
    Ok(())
}
