use crate::{AutomationError, Bounds, Selector, UIElement};
use std::fmt;
use std::time::Duration;

/// Direction of a scroll gesture on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(s)
    }
}

/// The capabilities a device binding must provide for workflows to run against it.
///
/// Every method is blocking. Lookups that accept a timeout poll until a match shows up
/// or the timeout elapses; an expired timeout is reported as `Ok(None)` / an empty list,
/// never as an error. Errors are reserved for failures of the binding itself.
pub trait DeviceEngine: Send + Sync {
    /// Find the first element matching a selector, optionally inside `root`.
    fn find_element(
        &self,
        selector: &Selector,
        root: Option<&UIElement>,
        timeout: Option<Duration>,
    ) -> Result<Option<UIElement>, AutomationError>;

    /// Find all elements matching a selector, optionally inside `root`.
    fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&UIElement>,
        timeout: Option<Duration>,
    ) -> Result<Vec<UIElement>, AutomationError>;

    fn click(&self, element: &UIElement) -> Result<(), AutomationError>;

    fn long_click(&self, element: &UIElement) -> Result<(), AutomationError>;

    /// Perform one page-sized scroll gesture on a scrollable element.
    ///
    /// `margin_px` is kept clear on every edge of the element so the gesture does not
    /// start on system bars or neighbouring views.
    fn scroll(
        &self,
        element: &UIElement,
        direction: Direction,
        margin_px: u32,
    ) -> Result<(), AutomationError>;

    /// Run a shell command on the device and return its standard output.
    fn run_shell_command(&self, command: &str) -> Result<String, AutomationError>;

    /// Inject a key event by its platform key code.
    fn press_key(&self, key_code: u32) -> Result<(), AutomationError>;

    fn wake_up(&self) -> Result<(), AutomationError>;

    /// Whether the root window currently belongs to `package`.
    fn is_package_foreground(&self, package: &str) -> Result<bool, AutomationError>;

    fn screen_bounds(&self) -> Result<Bounds, AutomationError>;

    /// Serialized dump of the current UI hierarchy.
    ///
    /// Two dumps compare equal iff nothing visible changed between them.
    fn dump_hierarchy(&self) -> Result<String, AutomationError>;

    /// Block the calling thread. Engines driving a simulated clock override this.
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
