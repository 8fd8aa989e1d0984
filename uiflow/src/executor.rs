//! Runs workflow tasks against a device.

use crate::config::AutomationConfig;
use crate::errors::AutomationError;
use crate::keys::Key;
use crate::scroll::{ScrollDescriptor, ScrollSearch};
use crate::selector::SelectorDescriptor;
use crate::task::{TaskAction, WorkflowTask};
use crate::{Device, UIElement};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Knobs for the task loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Pause after every iteration of a task, including the last one.
    pub iteration_delay: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            iteration_delay: Duration::from_secs(1),
        }
    }
}

/// Interprets workflow tasks on the calling thread.
#[derive(Clone)]
pub struct WorkflowExecutor {
    device: Device,
    scroll: ScrollSearch,
    options: ExecutorOptions,
}

impl WorkflowExecutor {
    pub fn new(device: Device) -> Self {
        Self {
            scroll: ScrollSearch::new(device.clone()),
            device,
            options: ExecutorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the scroll search, e.g. to change its step limit.
    pub fn with_scroll_search(mut self, scroll: ScrollSearch) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Run every task of the named workflow in order, stopping at the first failure.
    #[instrument(skip(self, config))]
    pub fn execute_workflow(
        &self,
        config: &AutomationConfig,
        workflow: &str,
    ) -> Result<(), AutomationError> {
        let definition = config.workflow(workflow)?;
        info!(tasks = definition.tasks.len(), "Executing workflow");
        for task in &definition.tasks {
            self.execute_task(task, workflow)?;
        }
        info!("Workflow completed");
        Ok(())
    }

    /// Run `task` once plus `repeat_count` more times.
    ///
    /// Any failure aborts the remaining iterations and is returned wrapped in
    /// [`AutomationError::TaskFailed`].
    #[instrument(skip(self, task), fields(task = %task.name, task_type = %task.task_type()))]
    pub fn execute_task(&self, task: &WorkflowTask, workflow: &str) -> Result<(), AutomationError> {
        info!(repeat_count = task.repeat_count, "Executing task");
        for iteration in 0..=task.repeat_count {
            debug!(iteration, "Running task iteration");
            self.dispatch(&task.action)
                .map_err(|source| AutomationError::TaskFailed {
                    task: task.name.clone(),
                    task_type: task.task_type().to_string(),
                    workflow: workflow.to_string(),
                    source: Box::new(source),
                })?;
            self.device.wait(self.options.iteration_delay);
        }
        info!("Task completed");
        Ok(())
    }

    fn dispatch(&self, action: &TaskAction) -> Result<(), AutomationError> {
        match action {
            TaskAction::Command { command } => {
                let output = self.device.run_shell_command(command)?;
                debug!(%output, "Command output");
                Ok(())
            }
            TaskAction::HasPackageInForeground { package } => {
                if self.device.has_package_in_foreground(package)? {
                    Ok(())
                } else {
                    Err(AutomationError::ConditionNotMet(format!(
                        "package {package} is not in foreground"
                    )))
                }
            }
            TaskAction::HasUiElementInForeground { element } => {
                if self.device.has_element(&element.to_query())? {
                    Ok(())
                } else {
                    Err(AutomationError::MissingUiElement(format!(
                        "{element} is not in foreground"
                    )))
                }
            }
            TaskAction::Click { element, optional } => self.click(element, *optional),
            TaskAction::LongClick { element } => {
                let target = self.require(element)?;
                self.device.long_click(&target)
            }
            TaskAction::ScrollToFindAndClick {
                element,
                scroll,
                optional,
            } => self.scroll_to_find_and_click(element, scroll, *optional),
            TaskAction::Press { key } => self.press(Key::parse(key)?),
            TaskAction::LongPress { key } => self.long_press(Key::parse(key)?),
            TaskAction::Wait { seconds } => {
                let seconds = seconds.trim().parse::<u64>().map_err(|_| {
                    AutomationError::InvalidValue(format!(
                        "wait time {seconds} is not a non-negative number of seconds"
                    ))
                })?;
                debug!(seconds, "Waiting");
                self.device.wait_seconds(seconds);
                Ok(())
            }
        }
    }

    fn require(&self, element: &SelectorDescriptor) -> Result<UIElement, AutomationError> {
        self.device
            .find(&element.to_query())?
            .ok_or_else(|| AutomationError::MissingUiElement(element.to_string()))
    }

    fn click(&self, element: &SelectorDescriptor, optional: bool) -> Result<(), AutomationError> {
        match self.device.find(&element.to_query())? {
            Some(target) => self.device.click_and_wait(&target),
            None if optional => {
                warn!("Optional element {} not found, skipping click", element);
                Ok(())
            }
            None => Err(AutomationError::MissingUiElement(element.to_string())),
        }
    }

    fn scroll_to_find_and_click(
        &self,
        element: &SelectorDescriptor,
        scroll: &ScrollDescriptor,
        optional: bool,
    ) -> Result<(), AutomationError> {
        let query = element.to_query();
        let found = match self.device.find(&query)? {
            Some(target) => Some(target),
            None => self
                .scroll
                .scroll_and_find(scroll, &query, &format!("find {element}"))?,
        };
        match found {
            Some(target) => self.device.click_and_wait(&target),
            None if optional => {
                warn!(
                    "Optional element {} not found after scrolling, skipping click",
                    element
                );
                Ok(())
            }
            None => Err(AutomationError::MissingUiElement(format!(
                "{element} not found after scrolling"
            ))),
        }
    }

    fn press(&self, key: Key) -> Result<(), AutomationError> {
        match key {
            Key::Code(code) => self.device.press_key_code(code),
            Key::Power => self.device.press_power(),
            Key::Home => self.device.press_home(),
            Key::Back => self.device.press_back(),
            Key::WakeUp => self.device.wake_up(),
            Key::ScreenCenter => Err(AutomationError::UnsupportedOperation(format!(
                "press is not supported for {key}"
            ))),
        }
    }

    fn long_press(&self, key: Key) -> Result<(), AutomationError> {
        match key {
            Key::Code(code) => self.device.long_press_key(code),
            Key::Power => self.device.long_press_power(),
            Key::ScreenCenter => self.device.long_press_screen_center(),
            Key::Home | Key::Back | Key::WakeUp => Err(AutomationError::UnsupportedOperation(
                format!("long press is not supported for {key}"),
            )),
        }
    }
}
