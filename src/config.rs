use crate::error::Result;
use config::{Config, ConfigError, Environment, File};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persisted loader settings: boot behaviour, disabled services and log gates
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Start every registered service when the process boots
    #[serde(default = "default_auto_start_on_boot")]
    pub auto_start_on_boot: bool,

    /// Identities of services that must never be started
    #[serde(default)]
    pub disabled_services: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Emit informational messages
    #[serde(default = "default_log_enabled")]
    pub messages: bool,

    /// Emit warnings
    #[serde(default = "default_log_enabled")]
    pub warnings: bool,

    /// Emit errors
    #[serde(default = "default_log_enabled")]
    pub errors: bool,
}

/// Read side of the loader settings, consulted by the orchestrator.
///
/// The orchestrator never writes through this trait; toggling the disabled
/// list is the job of whoever owns the backing store.
pub trait ConfigurationGate: Send + Sync {
    fn auto_start_on_boot(&self) -> bool;

    fn is_disabled(&self, identity: &str) -> bool;

    fn log_messages(&self) -> bool;

    fn log_warnings(&self) -> bool;

    fn log_errors(&self) -> bool;
}

/// Configuration shared between the loader and an inspection surface that
/// edits it while services are running
pub type SharedConfig = Arc<RwLock<LoaderConfig>>;

impl LoaderConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from_file("services.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        if !path.as_ref().exists() {
            warn!(
                "Service settings file {} does not exist, using fallback",
                path_str
            );
        }

        let settings = Config::builder()
            .set_default("auto_start_on_boot", default_auto_start_on_boot())?
            .set_default("disabled_services", Vec::<String>::new())?
            .set_default("logging.messages", default_log_enabled())?
            .set_default("logging.warnings", default_log_enabled())?
            .set_default("logging.errors", default_log_enabled())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // SERVICE_LOADER_AUTO_START_ON_BOOT, SERVICE_LOADER_LOGGING__ERRORS, ...
            .add_source(
                Environment::with_prefix("SERVICE_LOADER")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("disabled_services")
                    .try_parsing(true),
            )
            .build()?;

        let config: LoaderConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Write the configuration back as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), contents)?;
        debug!("Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for identity in &self.disabled_services {
            if identity.trim().is_empty() {
                return Err(ConfigError::Message(
                    "Disabled service identities must not be blank".to_string(),
                ));
            }

            if !seen.insert(identity.as_str()) {
                return Err(ConfigError::Message(format!(
                    "Service {} is listed as disabled more than once",
                    identity
                )));
            }
        }

        Ok(())
    }

    /// Add or remove a service from the disabled list.
    ///
    /// Returns true when the list changed.
    pub fn set_disabled(&mut self, identity: &str, disabled: bool) -> bool {
        let present = self.is_disabled(identity);

        if disabled && !present {
            self.disabled_services.push(identity.to_string());
            true
        } else if !disabled && present {
            self.disabled_services.retain(|entry| entry != identity);
            true
        } else {
            false
        }
    }

    pub fn is_disabled(&self, identity: &str) -> bool {
        self.disabled_services.iter().any(|entry| entry == identity)
    }

    /// Wrap this configuration for live sharing with the loader
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            auto_start_on_boot: default_auto_start_on_boot(),
            disabled_services: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            messages: default_log_enabled(),
            warnings: default_log_enabled(),
            errors: default_log_enabled(),
        }
    }
}

impl ConfigurationGate for LoaderConfig {
    fn auto_start_on_boot(&self) -> bool {
        self.auto_start_on_boot
    }

    fn is_disabled(&self, identity: &str) -> bool {
        LoaderConfig::is_disabled(self, identity)
    }

    fn log_messages(&self) -> bool {
        self.logging.messages
    }

    fn log_warnings(&self) -> bool {
        self.logging.warnings
    }

    fn log_errors(&self) -> bool {
        self.logging.errors
    }
}

impl ConfigurationGate for RwLock<LoaderConfig> {
    fn auto_start_on_boot(&self) -> bool {
        self.read().auto_start_on_boot
    }

    fn is_disabled(&self, identity: &str) -> bool {
        self.read().is_disabled(identity)
    }

    fn log_messages(&self) -> bool {
        self.read().logging.messages
    }

    fn log_warnings(&self) -> bool {
        self.read().logging.warnings
    }

    fn log_errors(&self) -> bool {
        self.read().logging.errors
    }
}

// Default value functions
fn default_auto_start_on_boot() -> bool {
    false
}
fn default_log_enabled() -> bool {
    true
}
