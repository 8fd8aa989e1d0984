//! Workflow tasks: one typed step of a workflow and the payload it carries.

use crate::errors::ConfigError;
use crate::scroll::ScrollDescriptor;
use crate::selector::SelectorDescriptor;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The type tag of a workflow task, as written in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Command,
    HasPackageInForeground,
    HasUiElementInForeground,
    Click,
    ClickIfExist,
    LongClick,
    Press,
    LongPress,
    ScrollToFindAndClick,
    ScrollToFindAndClickIfExist,
    WaitMs,
}

impl TaskType {
    pub const ALL: [TaskType; 11] = [
        TaskType::Command,
        TaskType::HasPackageInForeground,
        TaskType::HasUiElementInForeground,
        TaskType::Click,
        TaskType::ClickIfExist,
        TaskType::LongClick,
        TaskType::Press,
        TaskType::LongPress,
        TaskType::ScrollToFindAndClick,
        TaskType::ScrollToFindAndClickIfExist,
        TaskType::WaitMs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Command => "COMMAND",
            TaskType::HasPackageInForeground => "HAS_PACKAGE_IN_FOREGROUND",
            TaskType::HasUiElementInForeground => "HAS_UI_ELEMENT_IN_FOREGROUND",
            TaskType::Click => "CLICK",
            TaskType::ClickIfExist => "CLICK_IF_EXIST",
            TaskType::LongClick => "LONG_CLICK",
            TaskType::Press => "PRESS",
            TaskType::LongPress => "LONG_PRESS",
            TaskType::ScrollToFindAndClick => "SCROLL_TO_FIND_AND_CLICK",
            TaskType::ScrollToFindAndClickIfExist => "SCROLL_TO_FIND_AND_CLICK_IF_EXIST",
            TaskType::WaitMs => "WAIT_MS",
        }
    }

    /// Types whose payload is `CONFIG.TEXT`.
    pub fn takes_text(&self) -> bool {
        matches!(
            self,
            TaskType::Command
                | TaskType::HasPackageInForeground
                | TaskType::Press
                | TaskType::LongPress
                | TaskType::WaitMs
        )
    }

    pub fn takes_scroll(&self) -> bool {
        matches!(
            self,
            TaskType::ScrollToFindAndClick | TaskType::ScrollToFindAndClickIfExist
        )
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidTask(format!("task type {s} is not supported")))
    }
}

/// What a task does, together with exactly the payload it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Command {
        command: String,
    },
    HasPackageInForeground {
        package: String,
    },
    HasUiElementInForeground {
        element: SelectorDescriptor,
    },
    /// `optional` tasks do nothing when the element is absent.
    Click {
        element: SelectorDescriptor,
        optional: bool,
    },
    LongClick {
        element: SelectorDescriptor,
    },
    Press {
        key: String,
    },
    LongPress {
        key: String,
    },
    ScrollToFindAndClick {
        element: SelectorDescriptor,
        scroll: ScrollDescriptor,
        optional: bool,
    },
    /// Number of seconds, parsed when the task runs.
    Wait {
        seconds: String,
    },
}

impl TaskAction {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskAction::Command { .. } => TaskType::Command,
            TaskAction::HasPackageInForeground { .. } => TaskType::HasPackageInForeground,
            TaskAction::HasUiElementInForeground { .. } => TaskType::HasUiElementInForeground,
            TaskAction::Click {
                optional: false, ..
            } => TaskType::Click,
            TaskAction::Click { optional: true, .. } => TaskType::ClickIfExist,
            TaskAction::LongClick { .. } => TaskType::LongClick,
            TaskAction::Press { .. } => TaskType::Press,
            TaskAction::LongPress { .. } => TaskType::LongPress,
            TaskAction::ScrollToFindAndClick {
                optional: false, ..
            } => TaskType::ScrollToFindAndClick,
            TaskAction::ScrollToFindAndClick { optional: true, .. } => {
                TaskType::ScrollToFindAndClickIfExist
            }
            TaskAction::Wait { .. } => TaskType::WaitMs,
        }
    }

    /// Build the action for `task_type` from the loosely shaped config payload.
    ///
    /// Fails unless the payload is exactly what the type needs: text tasks take no
    /// element, element tasks take no text, and only scroll tasks take a scroll config.
    pub fn from_payload(
        task_type: TaskType,
        text: Option<String>,
        element: Option<SelectorDescriptor>,
        scroll: Option<ScrollDescriptor>,
    ) -> Result<Self, ConfigError> {
        let text = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());

        if task_type.takes_text() {
            if element.is_some() {
                return Err(ConfigError::InvalidTask(format!(
                    "{task_type} task takes CONFIG.TEXT, not CONFIG.UI_ELEMENT"
                )));
            }
        } else if text.is_some() {
            return Err(ConfigError::InvalidTask(format!(
                "{task_type} task takes CONFIG.UI_ELEMENT, not CONFIG.TEXT"
            )));
        }
        if !task_type.takes_scroll() && scroll.is_some() {
            return Err(ConfigError::InvalidTask(format!(
                "{task_type} task does not accept SCROLL_CONFIG"
            )));
        }

        let missing = |what: &str| {
            ConfigError::InvalidTask(format!("{task_type} task requires {what}"))
        };

        let action = match task_type {
            TaskType::Command => TaskAction::Command {
                command: text.ok_or_else(|| missing("CONFIG.TEXT"))?,
            },
            TaskType::HasPackageInForeground => TaskAction::HasPackageInForeground {
                package: text.ok_or_else(|| missing("CONFIG.TEXT"))?,
            },
            TaskType::Press => TaskAction::Press {
                key: text.ok_or_else(|| missing("CONFIG.TEXT"))?,
            },
            TaskType::LongPress => TaskAction::LongPress {
                key: text.ok_or_else(|| missing("CONFIG.TEXT"))?,
            },
            TaskType::WaitMs => TaskAction::Wait {
                seconds: text.ok_or_else(|| missing("CONFIG.TEXT"))?,
            },
            TaskType::HasUiElementInForeground => TaskAction::HasUiElementInForeground {
                element: element.ok_or_else(|| missing("CONFIG.UI_ELEMENT"))?,
            },
            TaskType::Click | TaskType::ClickIfExist => TaskAction::Click {
                element: element.ok_or_else(|| missing("CONFIG.UI_ELEMENT"))?,
                optional: task_type == TaskType::ClickIfExist,
            },
            TaskType::LongClick => TaskAction::LongClick {
                element: element.ok_or_else(|| missing("CONFIG.UI_ELEMENT"))?,
            },
            TaskType::ScrollToFindAndClick | TaskType::ScrollToFindAndClickIfExist => {
                TaskAction::ScrollToFindAndClick {
                    element: element.ok_or_else(|| missing("CONFIG.UI_ELEMENT"))?,
                    scroll: scroll.ok_or_else(|| missing("SCROLL_CONFIG"))?,
                    optional: task_type == TaskType::ScrollToFindAndClickIfExist,
                }
            }
        };
        Ok(action)
    }

    /// The text payload, for types that carry one.
    pub fn text(&self) -> Option<&str> {
        match self {
            TaskAction::Command { command } => Some(command),
            TaskAction::HasPackageInForeground { package } => Some(package),
            TaskAction::Press { key } | TaskAction::LongPress { key } => Some(key),
            TaskAction::Wait { seconds } => Some(seconds),
            _ => None,
        }
    }

    /// The element payload, for types that carry one.
    pub fn element(&self) -> Option<&SelectorDescriptor> {
        match self {
            TaskAction::HasUiElementInForeground { element }
            | TaskAction::Click { element, .. }
            | TaskAction::LongClick { element }
            | TaskAction::ScrollToFindAndClick { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn scroll(&self) -> Option<&ScrollDescriptor> {
        match self {
            TaskAction::ScrollToFindAndClick { scroll, .. } => Some(scroll),
            _ => None,
        }
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTask {
    pub name: String,
    pub action: TaskAction,
    /// Extra executions after the first one.
    pub repeat_count: u32,
}

impl WorkflowTask {
    pub fn new(name: impl Into<String>, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            action,
            repeat_count: 0,
        }
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.action.task_type()
    }
}

#[derive(Serialize)]
struct TaskPayload<'a> {
    #[serde(rename = "TEXT", skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(rename = "UI_ELEMENT", skip_serializing_if = "Option::is_none")]
    element: Option<&'a SelectorDescriptor>,
}

/// Serializes back into the config document shape.
impl Serialize for WorkflowTask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("NAME", &self.name)?;
        map.serialize_entry("TYPE", self.task_type().as_str())?;
        map.serialize_entry(
            "CONFIG",
            &TaskPayload {
                text: self.action.text(),
                element: self.action.element(),
            },
        )?;
        map.serialize_entry("REPEAT_COUNT", &self.repeat_count)?;
        if let Some(scroll) = self.action.scroll() {
            map.serialize_entry("SCROLL_CONFIG", scroll)?;
        }
        map.end()
    }
}
