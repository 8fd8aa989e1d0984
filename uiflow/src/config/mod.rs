//! The automation config: named commands, packages, actions, UI elements and workflows.
//!
//! A config is parsed once, strictly (see [`AutomationConfig::from_json_str`]), optionally
//! layered with further configs through [`AutomationConfig::merge`] and
//! [`AutomationConfig::override_with`], and read-only afterwards.

mod loader;
mod parse;

pub use loader::ConfigLoader;

use crate::errors::{ConfigCategory, ConfigError};
use crate::selector::{Selector, SelectorDescriptor};
use crate::task::WorkflowTask;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A value read from the store by category and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue<'a> {
    Text(&'a str),
    Element(&'a SelectorDescriptor),
}

impl fmt::Display for ConfigValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(text) => f.write_str(text),
            ConfigValue::Element(element) => write!(f, "{element}"),
        }
    }
}

/// Validated mappings from symbolic names to config values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigStore {
    #[serde(rename = "COMMANDS")]
    commands: BTreeMap<String, String>,
    #[serde(rename = "PACKAGES")]
    packages: BTreeMap<String, String>,
    #[serde(rename = "ACTIONS")]
    actions: BTreeMap<String, String>,
    #[serde(rename = "UI_ELEMENTS")]
    ui_elements: BTreeMap<String, SelectorDescriptor>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_command(&mut self, name: impl Into<String>, command: impl Into<String>) {
        self.commands.insert(name.into(), command.into());
    }

    pub fn insert_package(&mut self, name: impl Into<String>, package: impl Into<String>) {
        self.packages.insert(name.into(), package.into());
    }

    pub fn insert_action(&mut self, name: impl Into<String>, action: impl Into<String>) {
        self.actions.insert(name.into(), action.into());
    }

    pub fn insert_ui_element(&mut self, name: impl Into<String>, element: SelectorDescriptor) {
        self.ui_elements.insert(name.into(), element);
    }

    /// Look a value up by category.
    ///
    /// `ConfigCategory::Workflows` is not part of the store and always misses.
    pub fn get(
        &self,
        category: ConfigCategory,
        name: &str,
    ) -> Result<ConfigValue<'_>, ConfigError> {
        let value = match category {
            ConfigCategory::Commands => self.commands.get(name).map(|v| ConfigValue::Text(v)),
            ConfigCategory::Packages => self.packages.get(name).map(|v| ConfigValue::Text(v)),
            ConfigCategory::Actions => self.actions.get(name).map(|v| ConfigValue::Text(v)),
            ConfigCategory::UiElements => self.ui_elements.get(name).map(ConfigValue::Element),
            ConfigCategory::Workflows => None,
        };
        value.ok_or_else(|| missing(category, name))
    }

    pub fn command(&self, name: &str) -> Result<&str, ConfigError> {
        text(&self.commands, ConfigCategory::Commands, name)
    }

    pub fn package(&self, name: &str) -> Result<&str, ConfigError> {
        text(&self.packages, ConfigCategory::Packages, name)
    }

    pub fn action(&self, name: &str) -> Result<&str, ConfigError> {
        text(&self.actions, ConfigCategory::Actions, name)
    }

    pub fn ui_element(&self, name: &str) -> Result<&SelectorDescriptor, ConfigError> {
        self.ui_elements
            .get(name)
            .ok_or_else(|| missing(ConfigCategory::UiElements, name))
    }

    /// The named UI element as a platform query.
    pub fn selector(&self, name: &str) -> Result<Selector, ConfigError> {
        self.ui_element(name).map(SelectorDescriptor::to_query)
    }

    /// Names defined in `category`, in sorted order.
    pub fn keys(&self, category: ConfigCategory) -> Vec<&str> {
        match category {
            ConfigCategory::Commands => self.commands.keys().map(String::as_str).collect(),
            ConfigCategory::Packages => self.packages.keys().map(String::as_str).collect(),
            ConfigCategory::Actions => self.actions.keys().map(String::as_str).collect(),
            ConfigCategory::UiElements => self.ui_elements.keys().map(String::as_str).collect(),
            ConfigCategory::Workflows => Vec::new(),
        }
    }

    pub fn len(&self, category: ConfigCategory) -> usize {
        match category {
            ConfigCategory::Commands => self.commands.len(),
            ConfigCategory::Packages => self.packages.len(),
            ConfigCategory::Actions => self.actions.len(),
            ConfigCategory::UiElements => self.ui_elements.len(),
            ConfigCategory::Workflows => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        ConfigCategory::STORE.iter().all(|c| self.len(*c) == 0)
    }

    /// Fail if `other` defines a key this store does not have.
    fn check_override(&self, other: &ConfigStore) -> Result<(), ConfigError> {
        unknown_keys(&self.commands, &other.commands, ConfigCategory::Commands)?;
        unknown_keys(&self.packages, &other.packages, ConfigCategory::Packages)?;
        unknown_keys(&self.actions, &other.actions, ConfigCategory::Actions)?;
        unknown_keys(&self.ui_elements, &other.ui_elements, ConfigCategory::UiElements)
    }

    /// Replace values of existing keys with the ones from `other`.
    ///
    /// Every category is checked before anything is written, so on error the store is
    /// unchanged.
    pub fn override_with(&mut self, other: ConfigStore) -> Result<(), ConfigError> {
        self.check_override(&other)?;
        self.merge(other);
        Ok(())
    }

    /// Take every value from `other`, adding keys this store does not have yet.
    pub fn merge(&mut self, other: ConfigStore) {
        self.commands.extend(other.commands);
        self.packages.extend(other.packages);
        self.actions.extend(other.actions);
        self.ui_elements.extend(other.ui_elements);
    }
}

fn missing(category: ConfigCategory, name: &str) -> ConfigError {
    ConfigError::MissingKey {
        category,
        key: name.to_string(),
    }
}

fn text<'a>(
    map: &'a BTreeMap<String, String>,
    category: ConfigCategory,
    name: &str,
) -> Result<&'a str, ConfigError> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| missing(category, name))
}

fn unknown_keys<T>(
    current: &BTreeMap<String, T>,
    new: &BTreeMap<String, T>,
    category: ConfigCategory,
) -> Result<(), ConfigError> {
    let keys: Vec<String> = new
        .keys()
        .filter(|key| !current.contains_key(*key))
        .cloned()
        .collect();
    if keys.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::UnknownKeys { category, keys })
    }
}

/// A named, ordered list of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "TASKS")]
    pub tasks: Vec<WorkflowTask>,
}

/// A complete automation config: the value store plus its workflows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationConfig {
    pub store: ConfigStore,
    pub workflows: BTreeMap<String, Workflow>,
}

impl AutomationConfig {
    /// Parse and validate a config document.
    ///
    /// Unknown keys anywhere in the document are rejected, listing every one found.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        parse::parse_config(value)
    }

    pub fn workflow(&self, name: &str) -> Result<&Workflow, ConfigError> {
        self.workflows
            .get(name)
            .ok_or_else(|| missing(ConfigCategory::Workflows, name))
    }

    pub fn insert_workflow(&mut self, workflow: Workflow) {
        self.workflows.insert(workflow.name.clone(), workflow);
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty() && self.workflows.is_empty()
    }

    /// Strict layering: `other` may only replace names that already exist, in the store
    /// and in the workflows. Nothing is written unless every category passes.
    pub fn override_with(&mut self, other: AutomationConfig) -> Result<(), ConfigError> {
        self.store.check_override(&other.store)?;
        unknown_keys(&self.workflows, &other.workflows, ConfigCategory::Workflows)?;
        self.merge(other);
        Ok(())
    }

    /// Lenient layering: values from `other` win and new names are added.
    pub fn merge(&mut self, other: AutomationConfig) {
        self.store.merge(other.store);
        self.workflows.extend(other.workflows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ConfigStore {
        let mut store = ConfigStore::new();
        store.insert_command("OPEN_SETTINGS", "am start -a android.settings.SETTINGS");
        store.insert_package("SETTINGS", "com.android.car.settings");
        store.insert_action("SCROLL_DIRECTION", "VERTICAL");
        store.insert_ui_element(
            "SETTINGS_LIST",
            SelectorDescriptor::resource_id("com.android.car.settings", "list").unwrap(),
        );
        store
    }

    #[test]
    fn get_missing_action_names_key_and_category() {
        let err = base().get(ConfigCategory::Actions, "UNKNOWN").unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::MissingKey { category: ConfigCategory::Actions, key } if key == "UNKNOWN"
        ));
        let message = err.to_string();
        assert!(message.contains("ACTIONS") && message.contains("UNKNOWN"), "{message}");
    }

    #[test]
    fn typed_getters() {
        let store = base();
        assert_eq!(store.package("SETTINGS").unwrap(), "com.android.car.settings");
        assert_eq!(
            store.get(ConfigCategory::Commands, "OPEN_SETTINGS").unwrap(),
            ConfigValue::Text("am start -a android.settings.SETTINGS")
        );
        assert_eq!(
            store.selector("SETTINGS_LIST").unwrap(),
            Selector::ResourceId {
                package: "com.android.car.settings".into(),
                id: "list".into(),
            }
        );
        assert!(store.ui_element("OPEN_SETTINGS").is_err());
    }

    #[test]
    fn override_replaces_existing_values() {
        let mut store = base();
        let mut runtime = ConfigStore::new();
        runtime.insert_package("SETTINGS", "com.android.settings");
        store.override_with(runtime).unwrap();
        assert_eq!(store.package("SETTINGS").unwrap(), "com.android.settings");
    }

    #[test]
    fn override_with_unknown_key_leaves_store_untouched() {
        let mut store = base();
        let before = store.clone();

        let mut runtime = ConfigStore::new();
        runtime.insert_command("OPEN_SETTINGS", "am start -n com.example/.Main");
        runtime.insert_action("NEW_ACTION", "HORIZONTAL");
        runtime.insert_action("OTHER_ACTION", "VERTICAL");

        let err = store.override_with(runtime).unwrap_err();
        match err {
            ConfigError::UnknownKeys { category, keys } => {
                assert_eq!(category, ConfigCategory::Actions);
                assert_eq!(keys, vec!["NEW_ACTION".to_string(), "OTHER_ACTION".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(store, before);
    }

    #[test]
    fn merge_adds_new_keys() {
        let mut store = base();
        let mut gas = ConfigStore::new();
        gas.insert_package("MAPS", "com.google.android.apps.maps");
        store.merge(gas);
        assert_eq!(store.len(ConfigCategory::Packages), 2);
    }

    #[test]
    fn missing_workflow_is_reported_in_workflows() {
        let config = AutomationConfig::default();
        let err = config.workflow("OPEN_BLUETOOTH").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingKey { category: ConfigCategory::Workflows, .. }
        ));
    }

    #[test]
    fn workflow_override_is_strict() {
        let mut config = AutomationConfig {
            store: base(),
            ..Default::default()
        };
        let mut runtime = AutomationConfig::default();
        runtime.insert_workflow(Workflow {
            name: "NEW_FLOW".into(),
            tasks: Vec::new(),
        });
        let err = config.override_with(runtime).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownKeys { category: ConfigCategory::Workflows, .. }
        ));
        assert!(config.workflows.is_empty());
    }
}
