use super::AutomationConfig;
use crate::errors::ConfigError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loads a config from up to three layered files.
///
/// 1. The base config. Without it there is nothing to run, and `load` returns `Ok(None)`.
/// 2. An optional gas config, merged over the base. It may add new names.
/// 3. An optional runtime config, which may only replace names that already exist.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base: PathBuf,
    gas: Option<PathBuf>,
    runtime: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            gas: None,
            runtime: None,
        }
    }

    pub fn with_gas(mut self, path: impl Into<PathBuf>) -> Self {
        self.gas = Some(path.into());
        self
    }

    pub fn with_runtime(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<Option<AutomationConfig>, ConfigError> {
        let Some(mut config) = Self::load_optional(&self.base, "base")? else {
            warn!(
                "Base config {} not available, skipping gas and runtime configs",
                self.base.display()
            );
            return Ok(None);
        };

        if let Some(gas_path) = &self.gas {
            match Self::load_optional(gas_path, "gas")? {
                Some(gas) => config.merge(gas),
                None => warn!("Gas config {} not available", gas_path.display()),
            }
        }

        if let Some(runtime_path) = &self.runtime {
            if let Some(runtime) = Self::load_runtime(runtime_path)? {
                config.override_with(runtime)?;
            }
        }

        Ok(Some(config))
    }

    /// A layer that may be absent: a missing or blank file yields `None`.
    fn load_optional(path: &Path, layer: &str) -> Result<Option<AutomationConfig>, ConfigError> {
        info!("Loading {} config: {}", layer, path.display());
        let Some(data) = read_if_exists(path)? else {
            return Ok(None);
        };
        if data.trim().is_empty() {
            return Ok(None);
        }
        let config = AutomationConfig::from_json_str(&data)?;
        info!("Done loading {} config: {}", layer, path.display());
        Ok(Some(config))
    }

    /// The runtime layer: absent is fine, present but blank is an error.
    fn load_runtime(path: &Path) -> Result<Option<AutomationConfig>, ConfigError> {
        info!("Loading runtime config: {}", path.display());
        let Some(data) = read_if_exists(path)? else {
            info!("Runtime config {} not provided, skip loading", path.display());
            return Ok(None);
        };
        if data.trim().is_empty() {
            return Err(ConfigError::EmptyFile(path.to_path_buf()));
        }
        let config = AutomationConfig::from_json_str(&data)?;
        info!("Done loading runtime config: {}", path.display());
        Ok(Some(config))
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
