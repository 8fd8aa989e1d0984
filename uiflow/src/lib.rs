//! Configuration-driven UI workflow automation
//!
//! Workflows are declared in a JSON config as ordered lists of typed tasks (click,
//! scroll-to-find, press a key, run a shell command, ...) that refer to UI elements by
//! symbolic name. This crate validates such configs strictly and interprets the tasks
//! against a device reached through the [`DeviceEngine`] trait.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub mod config;
pub mod element;
pub mod errors;
pub mod executor;
pub mod keys;
pub mod locator;
pub mod platforms;
pub mod scroll;
pub mod selector;
pub mod task;
#[cfg(test)]
mod tests;

pub use config::{AutomationConfig, ConfigLoader, ConfigStore, ConfigValue, Workflow};
pub use element::{Bounds, UIElement};
pub use errors::{AutomationError, ConfigCategory, ConfigError};
pub use executor::{ExecutorOptions, WorkflowExecutor};
pub use keys::Key;
pub use locator::Locator;
pub use platforms::{DeviceEngine, Direction};
pub use scroll::{ScrollAction, ScrollDescriptor, ScrollDirection, ScrollSearch};
pub use selector::{Pattern, Selector, SelectorDescriptor, SelectorKind};
pub use task::{TaskAction, TaskType, WorkflowTask};

/// Time given to the UI to settle after a click or key injection.
pub const SHORT_UI_RESPONSE_WAIT: Duration = Duration::from_secs(1);

/// The main entry point for driving a device
#[derive(Clone)]
pub struct Device {
    engine: Arc<dyn DeviceEngine>,
    find_timeout: Duration,
    settle_delay: Duration,
}

impl Device {
    pub fn new(engine: Arc<dyn DeviceEngine>) -> Self {
        Self {
            engine,
            find_timeout: locator::DEFAULT_LOCATOR_TIMEOUT,
            settle_delay: SHORT_UI_RESPONSE_WAIT,
        }
    }

    /// How long `find` waits for an element to appear.
    pub fn with_find_timeout(mut self, timeout: Duration) -> Self {
        self.find_timeout = timeout;
        self
    }

    /// How long to wait after a click or key injection before returning.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn engine(&self) -> &Arc<dyn DeviceEngine> {
        &self.engine
    }

    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.engine.clone(), selector.into()).set_default_timeout(self.find_timeout)
    }

    /// Wait for the first element matching `selector`.
    pub fn find(&self, selector: &Selector) -> Result<Option<UIElement>, AutomationError> {
        self.locator(selector.clone()).first(None)
    }

    pub fn find_all(&self, selector: &Selector) -> Result<Vec<UIElement>, AutomationError> {
        self.locator(selector.clone()).all(None)
    }

    /// Find a descendant of `root` matching `selector`.
    pub fn find_within(
        &self,
        root: &UIElement,
        selector: &Selector,
    ) -> Result<Option<UIElement>, AutomationError> {
        self.locator(selector.clone())
            .within(root.clone())
            .first(None)
    }

    /// Whether `selector` matches an element on the current screen, without waiting.
    pub fn has_element(&self, selector: &Selector) -> Result<bool, AutomationError> {
        self.locator(selector.clone()).exists()
    }

    #[instrument(skip(self, element), fields(element = %element))]
    pub fn click_and_wait(&self, element: &UIElement) -> Result<(), AutomationError> {
        self.engine.click(element)?;
        self.engine.wait(self.settle_delay);
        Ok(())
    }

    #[instrument(skip(self, element), fields(element = %element))]
    pub fn long_click(&self, element: &UIElement) -> Result<(), AutomationError> {
        if !element.long_clickable {
            return Err(AutomationError::UnsupportedOperation(format!(
                "element {element} is not long clickable"
            )));
        }
        self.engine.long_click(element)?;
        self.engine.wait(self.settle_delay);
        Ok(())
    }

    pub fn press_key_code(&self, key_code: u32) -> Result<(), AutomationError> {
        debug!(key_code, "Pressing key");
        self.engine.press_key(key_code)
    }

    /// Long press a key through the input shell command.
    pub fn long_press_key(&self, key_code: u32) -> Result<(), AutomationError> {
        self.engine
            .run_shell_command(&format!("input keyevent --longpress {key_code}"))?;
        self.engine.wait(self.settle_delay);
        Ok(())
    }

    pub fn press_power(&self) -> Result<(), AutomationError> {
        self.press_key_code(keys::KEYCODE_POWER)
    }

    pub fn long_press_power(&self) -> Result<(), AutomationError> {
        self.long_press_key(keys::KEYCODE_POWER)
    }

    pub fn press_home(&self) -> Result<(), AutomationError> {
        self.press_key_code(keys::KEYCODE_HOME)
    }

    pub fn press_back(&self) -> Result<(), AutomationError> {
        self.press_key_code(keys::KEYCODE_BACK)
    }

    pub fn wake_up(&self) -> Result<(), AutomationError> {
        self.engine.wake_up()
    }

    /// Hold a touch at the centre of the screen.
    ///
    /// Simulated with a zero-length swipe, since a tap cannot carry a duration.
    pub fn long_press_screen_center(&self) -> Result<(), AutomationError> {
        let (x, y) = self.engine.screen_bounds()?.center();
        self.engine.run_shell_command(&format!(
            "input swipe {x} {y} {x} {y} {}",
            keys::LONG_PRESS_DURATION_MS
        ))?;
        self.engine.wait(self.settle_delay);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn run_shell_command(&self, command: &str) -> Result<String, AutomationError> {
        if command.trim().is_empty() {
            return Err(AutomationError::InvalidValue(
                "shell command is empty".to_string(),
            ));
        }
        let output = self.engine.run_shell_command(command)?;
        debug!(output_len = output.len(), "Shell command finished");
        Ok(output)
    }

    pub fn has_package_in_foreground(&self, package: &str) -> Result<bool, AutomationError> {
        if package.trim().is_empty() {
            return Err(AutomationError::InvalidValue(
                "package name is empty".to_string(),
            ));
        }
        self.engine.is_package_foreground(package)
    }

    pub fn wait(&self, duration: Duration) {
        self.engine.wait(duration);
    }

    pub fn wait_seconds(&self, seconds: u64) {
        self.engine.wait(Duration::from_secs(seconds));
    }

    /// Snapshot of the current UI hierarchy.
    pub fn hierarchy(&self) -> Result<String, AutomationError> {
        self.engine.dump_hierarchy()
    }
}
