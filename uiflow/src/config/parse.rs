//! Strict conversion of a JSON document into an [`AutomationConfig`].
//!
//! Every object is checked against the keys it may carry before any of its values are
//! read, and every value is trimmed and must be non-empty.

use super::{AutomationConfig, ConfigStore, Workflow};
use crate::errors::{ConfigCategory, ConfigError};
use crate::scroll::{ScrollAction, ScrollDescriptor, ScrollDirection};
use crate::selector::{SelectorDescriptor, SelectorKind};
use crate::task::{TaskAction, TaskType, WorkflowTask};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const CONFIG_KEYS: &[&str] = &["COMMANDS", "PACKAGES", "ACTIONS", "UI_ELEMENTS", "WORKFLOWS"];
const UI_ELEMENT_KEYS: &[&str] = &["TYPE", "VALUE", "PACKAGE"];
const TASK_KEYS: &[&str] = &["NAME", "TYPE", "CONFIG", "REPEAT_COUNT", "SCROLL_CONFIG"];
const TASK_CONFIG_KEYS: &[&str] = &["TEXT", "UI_ELEMENT"];
const SCROLL_KEYS: &[&str] = &[
    "SCROLL_ACTION",
    "SCROLL_DIRECTION",
    "SCROLL_FORWARD",
    "SCROLL_BACKWARD",
    "SCROLL_ELEMENT",
    "SCROLL_MARGIN",
    "SCROLL_WAIT_TIME",
];

pub(super) fn parse_config(value: &Value) -> Result<AutomationConfig, ConfigError> {
    let root = as_object(value, "config")?;
    check_keys(root, CONFIG_KEYS, "config")?;

    let mut store = ConfigStore::new();
    for category in ConfigCategory::STORE {
        let Some(section) = section(root, category)? else {
            continue;
        };
        for (name, value) in entries(section, category)? {
            let context = format!("{category}.{name}");
            match category {
                ConfigCategory::Commands => store.insert_command(name, text(value, &context)?),
                ConfigCategory::Packages => store.insert_package(name, text(value, &context)?),
                ConfigCategory::Actions => store.insert_action(name, text(value, &context)?),
                ConfigCategory::UiElements => {
                    store.insert_ui_element(name, ui_element(value, &context)?)
                }
                ConfigCategory::Workflows => {}
            }
        }
    }

    let mut workflows = BTreeMap::new();
    if let Some(section) = section(root, ConfigCategory::Workflows)? {
        for (name, value) in entries(section, ConfigCategory::Workflows)? {
            let context = format!("WORKFLOWS.{name}");
            let Value::Array(items) = value else {
                return Err(invalid(&context, value, "a workflow must be an array of tasks"));
            };
            let tasks = items
                .iter()
                .enumerate()
                .map(|(index, item)| workflow_task(item, &format!("{context}[{index}]")))
                .collect::<Result<Vec<_>, _>>()?;
            workflows.insert(name.clone(), Workflow { name, tasks });
        }
    }

    Ok(AutomationConfig { store, workflows })
}

fn invalid(context: &str, value: &Value, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        context: context.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| invalid(context, value, "expected a JSON object"))
}

/// Reject every key of `object` that is not in `allowed`.
fn check_keys(
    object: &Map<String, Value>,
    allowed: &[&str],
    context: &str,
) -> Result<(), ConfigError> {
    let unknown: Vec<String> = object
        .keys()
        .map(|key| key.trim())
        .filter(|key| !allowed.contains(key))
        .map(str::to_string)
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::UnknownProperties {
            context: context.to_string(),
            properties: unknown,
        })
    }
}

/// Look a key up, tolerating surrounding whitespace in the document's key.
fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .get(key)
        .or_else(|| {
            object
                .iter()
                .find(|(k, _)| k.trim() == key)
                .map(|(_, v)| v)
        })
        .filter(|v| !v.is_null())
}

fn section(
    root: &Map<String, Value>,
    category: ConfigCategory,
) -> Result<Option<&Map<String, Value>>, ConfigError> {
    field(root, category.as_str())
        .map(|value| as_object(value, category.as_str()))
        .transpose()
}

/// Entries of a category map with trimmed, non-empty, unique names.
fn entries(
    section: &Map<String, Value>,
    category: ConfigCategory,
) -> Result<Vec<(String, &Value)>, ConfigError> {
    let mut seen = BTreeMap::new();
    for (raw, value) in section {
        let name = raw.trim();
        if name.is_empty() {
            return Err(invalid(category.as_str(), value, "entry names must not be empty"));
        }
        if seen.insert(name.to_string(), value).is_some() {
            return Err(ConfigError::InvalidValue {
                context: category.to_string(),
                value: raw.clone(),
                reason: "name is defined more than once".to_string(),
            });
        }
    }
    Ok(seen.into_iter().collect())
}

fn text(value: &Value, context: &str) -> Result<String, ConfigError> {
    match value.as_str().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(invalid(context, value, "expected a non-empty string")),
    }
}

fn required_text(
    object: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<String, ConfigError> {
    let value = field(object, key).ok_or_else(|| ConfigError::MissingProperty {
        context: context.to_string(),
        property: key.to_string(),
    })?;
    text(value, &format!("{context}.{key}"))
}

fn optional_text(
    object: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<String>, ConfigError> {
    field(object, key)
        .map(|value| text(value, &format!("{context}.{key}")))
        .transpose()
}

fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<&'a Value, ConfigError> {
    field(object, key).ok_or_else(|| ConfigError::MissingProperty {
        context: context.to_string(),
        property: key.to_string(),
    })
}

fn ui_element(value: &Value, context: &str) -> Result<SelectorDescriptor, ConfigError> {
    let object = as_object(value, context)?;
    check_keys(object, UI_ELEMENT_KEYS, context)?;
    let kind: SelectorKind = required_text(object, "TYPE", context)?.parse()?;
    let value = required_text(object, "VALUE", context)?;
    // Blank packages are left to the descriptor, which knows whether the kind needs one.
    let package = match field(object, "PACKAGE") {
        None => None,
        Some(Value::String(package)) => Some(package.as_str()),
        Some(other) => {
            return Err(invalid(
                &format!("{context}.PACKAGE"),
                other,
                "expected a string",
            ))
        }
    };
    SelectorDescriptor::new(kind, &value, package)
}

/// A non-negative integer, written either as a JSON number or as a string such as `"10"`.
fn integer_field<T: std::str::FromStr>(
    object: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = field(object, key) else {
        return Ok(None);
    };
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    };
    raw.parse::<T>().map(Some).map_err(|_| {
        ConfigError::InvalidScrollConfig(format!(
            "{key} {raw} for {context} is not a non-negative integer"
        ))
    })
}

fn scroll_descriptor(value: &Value, context: &str) -> Result<ScrollDescriptor, ConfigError> {
    let object = as_object(value, context)?;
    check_keys(object, SCROLL_KEYS, context)?;

    let action = match required_text(object, "SCROLL_ACTION", context)?.as_str() {
        "USE_BUTTON" => ScrollAction::UseButton {
            forward: ui_element(
                required(object, "SCROLL_FORWARD", context)?,
                &format!("{context}.SCROLL_FORWARD"),
            )?,
            backward: ui_element(
                required(object, "SCROLL_BACKWARD", context)?,
                &format!("{context}.SCROLL_BACKWARD"),
            )?,
        },
        "USE_GESTURE" => ScrollAction::UseGesture {
            direction: required_text(object, "SCROLL_DIRECTION", context)?
                .parse::<ScrollDirection>()?,
            element: ui_element(
                required(object, "SCROLL_ELEMENT", context)?,
                &format!("{context}.SCROLL_ELEMENT"),
            )?,
        },
        other => {
            return Err(ConfigError::InvalidScrollConfig(format!(
                "scroll action {other} for {context} is not supported"
            )))
        }
    };

    let mut descriptor = ScrollDescriptor::new(action);
    if let Some(margin) = integer_field::<u32>(object, "SCROLL_MARGIN", context)? {
        descriptor = descriptor.with_margin(margin);
    }
    if let Some(wait) = integer_field::<u64>(object, "SCROLL_WAIT_TIME", context)? {
        descriptor = descriptor.with_wait_secs(wait);
    }
    Ok(descriptor)
}

fn repeat_count(object: &Map<String, Value>, context: &str) -> Result<u32, ConfigError> {
    let Some(value) = field(object, "REPEAT_COUNT") else {
        return Ok(0);
    };
    let count = match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    count.ok_or_else(|| {
        invalid(
            &format!("{context}.REPEAT_COUNT"),
            value,
            "expected a non-negative integer",
        )
    })
}

fn workflow_task(value: &Value, context: &str) -> Result<WorkflowTask, ConfigError> {
    let object = as_object(value, context)?;
    check_keys(object, TASK_KEYS, context)?;

    let name = required_text(object, "NAME", context)?;
    let context = format!("{context} ({name})");
    let task_type: TaskType = required_text(object, "TYPE", &context)?.parse()?;

    let config = as_object(required(object, "CONFIG", &context)?, &context)?;
    let config_context = format!("{context}.CONFIG");
    check_keys(config, TASK_CONFIG_KEYS, &config_context)?;
    let text = optional_text(config, "TEXT", &config_context)?;
    let element = field(config, "UI_ELEMENT")
        .map(|value| ui_element(value, &format!("{config_context}.UI_ELEMENT")))
        .transpose()?;

    let scroll = field(object, "SCROLL_CONFIG")
        .map(|value| scroll_descriptor(value, &format!("{context}.SCROLL_CONFIG")))
        .transpose()?;

    let action = TaskAction::from_payload(task_type, text, element, scroll)
        .map_err(|e| match e {
            ConfigError::InvalidTask(reason) => {
                ConfigError::InvalidTask(format!("{context}: {reason}"))
            }
            other => other,
        })?;
    Ok(WorkflowTask::new(name, action).with_repeat_count(repeat_count(object, &context)?))
}
