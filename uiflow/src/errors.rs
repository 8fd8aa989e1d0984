use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The named mappings of an automation config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigCategory {
    Commands,
    Packages,
    Actions,
    UiElements,
    Workflows,
}

impl ConfigCategory {
    /// The four value mappings held by a `ConfigStore`.
    pub const STORE: [ConfigCategory; 4] = [
        ConfigCategory::Commands,
        ConfigCategory::Packages,
        ConfigCategory::Actions,
        ConfigCategory::UiElements,
    ];

    /// The top-level JSON key of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigCategory::Commands => "COMMANDS",
            ConfigCategory::Packages => "PACKAGES",
            ConfigCategory::Actions => "ACTIONS",
            ConfigCategory::UiElements => "UI_ELEMENTS",
            ConfigCategory::Workflows => "WORKFLOWS",
        }
    }
}

impl fmt::Display for ConfigCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfigCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "COMMANDS" => Ok(ConfigCategory::Commands),
            "PACKAGES" => Ok(ConfigCategory::Packages),
            "ACTIONS" => Ok(ConfigCategory::Actions),
            "UI_ELEMENTS" => Ok(ConfigCategory::UiElements),
            "WORKFLOWS" => Ok(ConfigCategory::Workflows),
            other => Err(ConfigError::UnknownProperties {
                context: "config".to_string(),
                properties: vec![other.to_string()],
            }),
        }
    }
}

/// Errors raised while loading, validating or reading an automation config.
///
/// All of these are fatal: a config that fails validation is never partially used.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config does not have {category} with key {key}")]
    MissingKey {
        category: ConfigCategory,
        key: String,
    },

    #[error("Unknown keys in runtime config for {category}: {}", keys.join(", "))]
    UnknownKeys {
        category: ConfigCategory,
        keys: Vec<String>,
    },

    #[error("Unknown properties [ {} ] for {context}", properties.join(", "))]
    UnknownProperties {
        context: String,
        properties: Vec<String>,
    },

    #[error("Property {property} for {context} is missing or invalid")]
    MissingProperty { context: String, property: String },

    #[error("Invalid UI element: {0}")]
    InvalidSelector(String),

    #[error("Invalid scroll config: {0}")]
    InvalidScrollConfig(String),

    #[error("Invalid workflow task: {0}")]
    InvalidTask(String),

    #[error("Invalid value {value:?} for {context}: {reason}")]
    InvalidValue {
        context: String,
        value: String,
        reason: String,
    },

    #[error("Unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {0} is empty")]
    EmptyFile(PathBuf),

    #[error("Config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("UI element not found: {0}")]
    MissingUiElement(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Condition not met: {0}")]
    ConditionNotMet(String),

    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Task {task} with type {task_type} in workflow {workflow} failed: {source}")]
    TaskFailed {
        task: String,
        task_type: String,
        workflow: String,
        #[source]
        source: Box<AutomationError>,
    },
}

impl AutomationError {
    /// True when the failure (or the failure it wraps) is a missing UI element.
    pub fn is_missing_ui_element(&self) -> bool {
        match self {
            AutomationError::MissingUiElement(_) => true,
            AutomationError::TaskFailed { source, .. } => source.is_missing_ui_element(),
            _ => false,
        }
    }
}
