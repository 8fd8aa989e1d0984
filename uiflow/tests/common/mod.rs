//! A scripted in-memory device for driving workflows in tests.
//!
//! The screen shows a window of `page_size` items from a list, plus some fixed elements
//! (scroll buttons, the list container and anything added by a test). Every primitive
//! the engine performs is recorded so tests can count clicks, swipes and key presses.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uiflow::{
    AutomationError, Bounds, Device, DeviceEngine, Direction, Selector, UIElement,
};

pub const APP_PACKAGE: &str = "com.android.car.settings";
pub const LIST_HANDLE: &str = "list";
pub const INNER_LIST_HANDLE: &str = "list_inner";
pub const FORWARD_BUTTON: &str = "page_down";
pub const BACKWARD_BUTTON: &str = "page_up";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Click(String),
    LongClick(String),
    Scroll(String, Direction),
    Shell(String),
    Key(u32),
    WakeUp,
}

struct State {
    items: Vec<UIElement>,
    offset: usize,
    page_size: usize,
    fixed: Vec<UIElement>,
    list_scrollable: bool,
    foreground: String,
    calls: Vec<Call>,
    waits: Vec<Duration>,
    /// Fail every call of the primitive whose click count reaches this number.
    fail_click_at: Option<usize>,
}

pub struct FakeDevice {
    state: Mutex<State>,
    real_time: bool,
}

impl FakeDevice {
    /// A settings list with `count` rows labelled `Item 0`, `Item 1`, ...
    pub fn with_items(count: usize, page_size: usize) -> Self {
        let items = (0..count)
            .map(|i| {
                UIElement::new(format!("item-{i}"))
                    .with_resource_id(APP_PACKAGE, "title")
                    .with_text(format!("Item {i}"))
                    .clickable(true)
                    .long_clickable(true)
            })
            .collect();
        Self {
            state: Mutex::new(State {
                items,
                offset: 0,
                page_size,
                fixed: Vec::new(),
                list_scrollable: true,
                foreground: APP_PACKAGE.to_string(),
                calls: Vec::new(),
                waits: Vec::new(),
                fail_click_at: None,
            }),
            real_time: false,
        }
    }

    /// Sleep for real on `wait` instead of only recording it.
    pub fn real_time(mut self) -> Self {
        self.real_time = true;
        self
    }

    /// Make the list container itself non-scrollable, with a scrollable child.
    pub fn with_nested_scroll_container(self) -> Self {
        self.state().list_scrollable = false;
        self
    }

    pub fn with_fixed(self, element: UIElement) -> Self {
        self.state().fixed.push(element);
        self
    }

    pub fn fail_click_at(self, nth: usize) -> Self {
        self.state().fail_click_at = Some(nth);
        self
    }

    pub fn into_device(self) -> (Arc<FakeDevice>, Device) {
        let fake = Arc::new(self);
        let device = Device::new(fake.clone())
            .with_find_timeout(Duration::from_millis(10))
            .with_settle_delay(Duration::from_millis(0));
        (fake, device)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_foreground(&self, package: &str) {
        self.state().foreground = package.to_string();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Click(handle) => Some(handle),
                _ => None,
            })
            .collect()
    }

    pub fn scrolls(&self) -> Vec<Direction> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Scroll(_, direction) => Some(direction),
                _ => None,
            })
            .collect()
    }

    pub fn keys(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Key(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    pub fn shell_commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Shell(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.state().waits.clone()
    }

    pub fn offset(&self) -> usize {
        self.state().offset
    }

    pub fn set_offset(&self, offset: usize) {
        self.state().offset = offset;
    }
}

impl State {
    fn can_move_forward(&self) -> bool {
        self.offset + self.page_size < self.items.len()
    }

    fn can_move_backward(&self) -> bool {
        self.offset > 0
    }

    fn move_by(&mut self, forward: bool) {
        if forward && self.can_move_forward() {
            self.offset += 1;
        } else if !forward && self.can_move_backward() {
            self.offset -= 1;
        }
    }

    fn container(&self) -> UIElement {
        UIElement::new(LIST_HANDLE)
            .with_resource_id(APP_PACKAGE, "recycler_view")
            .with_class("androidx.recyclerview.widget.RecyclerView")
            .scrollable(self.list_scrollable)
    }

    fn inner_container(&self) -> UIElement {
        UIElement::new(INNER_LIST_HANDLE)
            .with_class("android.widget.ScrollView")
            .scrollable(true)
    }

    fn buttons(&self) -> Vec<UIElement> {
        vec![
            UIElement::new(FORWARD_BUTTON)
                .with_description("Scroll down")
                .clickable(true)
                .enabled(self.can_move_forward()),
            UIElement::new(BACKWARD_BUTTON)
                .with_description("Scroll up")
                .clickable(true)
                .enabled(self.can_move_backward()),
        ]
    }

    fn page(&self) -> Vec<UIElement> {
        self.items
            .iter()
            .skip(self.offset)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    fn visible(&self) -> Vec<UIElement> {
        let mut elements = vec![self.container()];
        if !self.list_scrollable {
            elements.push(self.inner_container());
        }
        elements.extend(self.buttons());
        elements.extend(self.fixed.iter().cloned());
        elements.extend(self.page());
        elements
    }

    fn descendants(&self, root: &UIElement) -> Vec<UIElement> {
        match root.handle.as_str() {
            LIST_HANDLE if !self.list_scrollable => {
                let mut elements = vec![self.inner_container()];
                elements.extend(self.page());
                elements
            }
            LIST_HANDLE | INNER_LIST_HANDLE => self.page(),
            _ => Vec::new(),
        }
    }

    fn search(&self, selector: &Selector, root: Option<&UIElement>) -> Vec<UIElement> {
        let candidates = match root {
            Some(root) => self.descendants(root),
            None => self.visible(),
        };
        candidates
            .into_iter()
            .filter(|element| selector.matches(element))
            .collect()
    }
}

impl DeviceEngine for FakeDevice {
    fn find_element(
        &self,
        selector: &Selector,
        root: Option<&UIElement>,
        _timeout: Option<Duration>,
    ) -> Result<Option<UIElement>, AutomationError> {
        Ok(self.state().search(selector, root).into_iter().next())
    }

    fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&UIElement>,
        _timeout: Option<Duration>,
    ) -> Result<Vec<UIElement>, AutomationError> {
        Ok(self.state().search(selector, root))
    }

    fn click(&self, element: &UIElement) -> Result<(), AutomationError> {
        let mut state = self.state();
        state.calls.push(Call::Click(element.handle.clone()));
        let clicks = state
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Click(_)))
            .count();
        if state.fail_click_at.is_some_and(|nth| clicks >= nth) {
            return Err(AutomationError::PlatformError(format!(
                "click {clicks} rejected"
            )));
        }
        match element.handle.as_str() {
            FORWARD_BUTTON => state.move_by(true),
            BACKWARD_BUTTON => state.move_by(false),
            _ => {}
        }
        Ok(())
    }

    fn long_click(&self, element: &UIElement) -> Result<(), AutomationError> {
        self.state()
            .calls
            .push(Call::LongClick(element.handle.clone()));
        Ok(())
    }

    fn scroll(
        &self,
        element: &UIElement,
        direction: Direction,
        _margin_px: u32,
    ) -> Result<(), AutomationError> {
        let mut state = self.state();
        state
            .calls
            .push(Call::Scroll(element.handle.clone(), direction));
        state.move_by(matches!(direction, Direction::Down | Direction::Right));
        Ok(())
    }

    fn run_shell_command(&self, command: &str) -> Result<String, AutomationError> {
        self.state().calls.push(Call::Shell(command.to_string()));
        Ok(String::new())
    }

    fn press_key(&self, key_code: u32) -> Result<(), AutomationError> {
        self.state().calls.push(Call::Key(key_code));
        Ok(())
    }

    fn wake_up(&self) -> Result<(), AutomationError> {
        self.state().calls.push(Call::WakeUp);
        Ok(())
    }

    fn is_package_foreground(&self, package: &str) -> Result<bool, AutomationError> {
        Ok(self.state().foreground == package)
    }

    fn screen_bounds(&self) -> Result<Bounds, AutomationError> {
        Ok(Bounds::new(0, 0, 1080, 1920))
    }

    fn dump_hierarchy(&self) -> Result<String, AutomationError> {
        let state = self.state();
        let handles: Vec<String> = state
            .visible()
            .iter()
            .map(|e| format!("{}[enabled={}]", e.handle, e.enabled))
            .collect();
        Ok(handles.join("\n"))
    }

    fn wait(&self, duration: Duration) {
        self.state().waits.push(duration);
        if self.real_time {
            std::thread::sleep(duration);
        }
    }
}

/// Shared tracing setup; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .with_test_writer()
        .try_init();
}
