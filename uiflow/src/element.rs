use serde::{Deserialize, Serialize};
use std::fmt;

/// Screen rectangle of an element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// A snapshot of an on-screen UI element as reported by a `DeviceEngine`.
///
/// The `handle` is opaque to the engine user; engines use it to find the live
/// node again when an action (click, scroll) is performed on this element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UIElement {
    pub handle: String,
    /// Fully qualified resource name, e.g. `com.android.settings:id/title`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub bounds: Bounds,
    pub enabled: bool,
    pub scrollable: bool,
    pub clickable: bool,
    pub long_clickable: bool,
}

impl UIElement {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_resource_id(mut self, package: &str, id: &str) -> Self {
        self.resource_id = Some(format!("{package}:id/{id}"));
        self.package = Some(package.to_string());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn scrollable(mut self, scrollable: bool) -> Self {
        self.scrollable = scrollable;
        self
    }

    pub fn clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn long_clickable(mut self, long_clickable: bool) -> Self {
        self.long_clickable = long_clickable;
        self
    }

    /// Get a display name for this element
    pub fn display_name(&self) -> String {
        self.text
            .clone()
            .or_else(|| self.description.clone())
            .or_else(|| self.resource_id.clone())
            .unwrap_or_else(|| self.handle.clone())
    }
}

impl fmt::Display for UIElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
