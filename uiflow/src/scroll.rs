//! Scroll descriptors and the scroll-until-found search built on them.

use crate::errors::{AutomationError, ConfigError};
use crate::platforms::Direction;
use crate::selector::{Selector, SelectorDescriptor};
use crate::{Device, UIElement};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

/// Upper bound on scroll steps taken by one search.
pub const DEFAULT_MAX_SCROLL_COUNT: usize = 100;
pub const DEFAULT_SCROLL_MARGIN_PX: u32 = 10;
pub const DEFAULT_SCROLL_WAIT_SECS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrollDirection {
    Vertical,
    Horizontal,
}

impl ScrollDirection {
    /// Direction of a swipe that reveals later content.
    pub fn forward(&self) -> Direction {
        match self {
            ScrollDirection::Vertical => Direction::Down,
            ScrollDirection::Horizontal => Direction::Right,
        }
    }

    pub fn backward(&self) -> Direction {
        match self {
            ScrollDirection::Vertical => Direction::Up,
            ScrollDirection::Horizontal => Direction::Left,
        }
    }
}

impl FromStr for ScrollDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "VERTICAL" => Ok(ScrollDirection::Vertical),
            "HORIZONTAL" => Ok(ScrollDirection::Horizontal),
            other => Err(ConfigError::InvalidScrollConfig(format!(
                "scroll direction {other} is not supported"
            ))),
        }
    }
}

/// How one scroll step is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "SCROLL_ACTION")]
pub enum ScrollAction {
    /// Click dedicated forward and backward buttons.
    #[serde(rename = "USE_BUTTON")]
    UseButton {
        #[serde(rename = "SCROLL_FORWARD")]
        forward: SelectorDescriptor,
        #[serde(rename = "SCROLL_BACKWARD")]
        backward: SelectorDescriptor,
    },
    /// Swipe on a scrollable container.
    #[serde(rename = "USE_GESTURE")]
    UseGesture {
        #[serde(rename = "SCROLL_DIRECTION")]
        direction: ScrollDirection,
        #[serde(rename = "SCROLL_ELEMENT")]
        element: SelectorDescriptor,
    },
}

fn as_text<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollDescriptor {
    #[serde(flatten)]
    pub action: ScrollAction,
    /// Pixels kept clear on each edge of the container during a swipe.
    #[serde(rename = "SCROLL_MARGIN", serialize_with = "as_text")]
    pub margin_px: u32,
    /// Seconds to let the UI settle after each step.
    #[serde(rename = "SCROLL_WAIT_TIME", serialize_with = "as_text")]
    pub wait_secs: u64,
}

impl ScrollDescriptor {
    pub fn new(action: ScrollAction) -> Self {
        Self {
            action,
            margin_px: DEFAULT_SCROLL_MARGIN_PX,
            wait_secs: DEFAULT_SCROLL_WAIT_SECS,
        }
    }

    pub fn with_margin(mut self, margin_px: u32) -> Self {
        self.margin_px = margin_px;
        self
    }

    pub fn with_wait_secs(mut self, wait_secs: u64) -> Self {
        self.wait_secs = wait_secs;
        self
    }
}

/// Scrolls containers step by step, detecting the end of content by comparing hierarchy
/// dumps taken before and after each step.
#[derive(Clone)]
pub struct ScrollSearch {
    device: Device,
    max_scroll_count: usize,
}

impl ScrollSearch {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            max_scroll_count: DEFAULT_MAX_SCROLL_COUNT,
        }
    }

    pub fn with_max_scroll_count(mut self, max_scroll_count: usize) -> Self {
        self.max_scroll_count = max_scroll_count;
        self
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// One step towards later content. Returns whether anything on screen changed.
    pub fn scroll_forward(
        &self,
        scroll: &ScrollDescriptor,
        description: &str,
    ) -> Result<bool, AutomationError> {
        self.step(scroll, true, description)
    }

    /// One step towards earlier content. Returns whether anything on screen changed.
    pub fn scroll_backward(
        &self,
        scroll: &ScrollDescriptor,
        description: &str,
    ) -> Result<bool, AutomationError> {
        self.step(scroll, false, description)
    }

    /// Rewind to the beginning, then scroll forward until `target` shows up or the content
    /// stops moving.
    ///
    /// A target that is already on screen is returned without scrolling.
    #[instrument(skip(self, scroll), fields(target = %target))]
    pub fn scroll_and_find(
        &self,
        scroll: &ScrollDescriptor,
        target: &Selector,
        description: &str,
    ) -> Result<Option<UIElement>, AutomationError> {
        if let Some(found) = self.device.find(target)? {
            return Ok(Some(found));
        }
        self.scroll_until_stopped(scroll, false, description)?;
        if let Some(found) = self.device.find(target)? {
            debug!("Found {} after rewinding {}", target, description);
            return Ok(Some(found));
        }
        for step in 1..=self.max_scroll_count {
            let moved = self.scroll_forward(scroll, description)?;
            if let Some(found) = self.device.find(target)? {
                debug!(step, "Found {} after scrolling", target);
                return Ok(Some(found));
            }
            if !moved {
                debug!(step, "Reached the end of {} without finding {}", description, target);
                return Ok(None);
            }
        }
        debug!(
            "Gave up looking for {} after {} scroll steps",
            target, self.max_scroll_count
        );
        Ok(None)
    }

    pub fn scroll_and_check_if_exists(
        &self,
        scroll: &ScrollDescriptor,
        target: &Selector,
        description: &str,
    ) -> Result<bool, AutomationError> {
        Ok(self.scroll_and_find(scroll, target, description)?.is_some())
    }

    #[instrument(skip(self, scroll))]
    pub fn scroll_to_beginning(
        &self,
        scroll: &ScrollDescriptor,
        description: &str,
    ) -> Result<(), AutomationError> {
        self.scroll_until_stopped(scroll, false, description)
    }

    #[instrument(skip(self, scroll))]
    pub fn scroll_to_end(
        &self,
        scroll: &ScrollDescriptor,
        description: &str,
    ) -> Result<(), AutomationError> {
        self.scroll_until_stopped(scroll, true, description)
    }

    fn scroll_until_stopped(
        &self,
        scroll: &ScrollDescriptor,
        forward: bool,
        description: &str,
    ) -> Result<(), AutomationError> {
        for step in 1..=self.max_scroll_count {
            if !self.step(scroll, forward, description)? {
                debug!(step, forward, "Scrolling stopped moving");
                return Ok(());
            }
        }
        Ok(())
    }

    fn step(
        &self,
        scroll: &ScrollDescriptor,
        forward: bool,
        description: &str,
    ) -> Result<bool, AutomationError> {
        let before = self.device.hierarchy()?;
        match &scroll.action {
            ScrollAction::UseButton {
                forward: forward_button,
                backward: backward_button,
            } => {
                let button = if forward { forward_button } else { backward_button };
                let Some(element) = self.device.find(&button.to_query())? else {
                    return Err(AutomationError::MissingUiElement(format!(
                        "unable to find scroll button {button} to {description}"
                    )));
                };
                if !element.enabled {
                    debug!("Scroll button {} is disabled", button);
                    return Ok(false);
                }
                self.device.engine().click(&element)?;
            }
            ScrollAction::UseGesture { direction, element } => {
                let container = self.scroll_container(element, description)?;
                let direction = if forward {
                    direction.forward()
                } else {
                    direction.backward()
                };
                debug!(%direction, container = %container, "Swiping");
                self.device
                    .engine()
                    .scroll(&container, direction, scroll.margin_px)?;
            }
        }
        self.device.wait(Duration::from_secs(scroll.wait_secs));
        let after = self.device.hierarchy()?;
        Ok(before != after)
    }

    /// The configured container, or its first scrollable descendant when the container
    /// itself cannot scroll.
    fn scroll_container(
        &self,
        element: &SelectorDescriptor,
        description: &str,
    ) -> Result<UIElement, AutomationError> {
        let Some(container) = self.device.find(&element.to_query())? else {
            return Err(AutomationError::MissingUiElement(format!(
                "unable to find scroll container {element} to {description}"
            )));
        };
        if container.scrollable {
            return Ok(container);
        }
        self.device
            .find_within(&container, &Selector::Scrollable(true))?
            .ok_or_else(|| {
                AutomationError::MissingUiElement(format!(
                    "scroll container {element} has no scrollable content to {description}"
                ))
            })
    }
}
