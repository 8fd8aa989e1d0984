
use crate::{AutomationError, Bounds, DeviceEngine, Direction, Selector, UIElement};
use std::sync::Mutex;
use std::time::Duration;

// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_test_writer()
        .try_init();
}

/// A static screen that records what was done to it.
#[derive(Default)]
pub struct RecordingEngine {
    pub elements: Vec<UIElement>,
    pub log: Mutex<Vec<String>>,
    pub waits: Mutex<Vec<Duration>>,
    pub lookups: Mutex<Vec<(String, Option<Duration>)>>,
}

impl RecordingEngine {
    pub fn with_elements(elements: Vec<UIElement>) -> Self {
        Self {
            elements,
            ..Default::default()
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl DeviceEngine for RecordingEngine {
    fn find_element(
        &self,
        selector: &Selector,
        root: Option<&UIElement>,
        timeout: Option<Duration>,
    ) -> Result<Option<UIElement>, AutomationError> {
        Ok(self.find_elements(selector, root, timeout)?.into_iter().next())
    }

    fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&UIElement>,
        timeout: Option<Duration>,
    ) -> Result<Vec<UIElement>, AutomationError> {
        self.lookups
            .lock()
            .unwrap()
            .push((selector.to_string(), timeout));
        Ok(self
            .elements
            .iter()
            .filter(|e| root.map_or(true, |r| r.handle != e.handle))
            .filter(|e| selector.matches(e))
            .cloned()
            .collect())
    }

    fn click(&self, element: &UIElement) -> Result<(), AutomationError> {
        self.record(format!("click {}", element.handle));
        Ok(())
    }

    fn long_click(&self, element: &UIElement) -> Result<(), AutomationError> {
        self.record(format!("long_click {}", element.handle));
        Ok(())
    }

    fn scroll(
        &self,
        element: &UIElement,
        direction: Direction,
        margin_px: u32,
    ) -> Result<(), AutomationError> {
        self.record(format!("scroll {} {direction} {margin_px}", element.handle));
        Ok(())
    }

    fn run_shell_command(&self, command: &str) -> Result<String, AutomationError> {
        self.record(format!("shell {command}"));
        Ok("ok".to_string())
    }

    fn press_key(&self, key_code: u32) -> Result<(), AutomationError> {
        self.record(format!("key {key_code}"));
        Ok(())
    }

    fn wake_up(&self) -> Result<(), AutomationError> {
        self.record("wake_up".to_string());
        Ok(())
    }

    fn is_package_foreground(&self, package: &str) -> Result<bool, AutomationError> {
        Ok(package == "com.android.car.settings")
    }

    fn screen_bounds(&self) -> Result<Bounds, AutomationError> {
        Ok(Bounds::new(0, 0, 800, 480))
    }

    fn dump_hierarchy(&self) -> Result<String, AutomationError> {
        Ok(self.log().join("\n"))
    }

    fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
