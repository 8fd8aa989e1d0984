//! Key vocabulary understood by `PRESS` and `LONG_PRESS` tasks.

use crate::errors::AutomationError;
use std::fmt;

pub const KEYCODE_HOME: u32 = 3;
pub const KEYCODE_BACK: u32 = 4;
pub const KEYCODE_POWER: u32 = 26;

/// How long a long press on the screen centre is held.
pub const LONG_PRESS_DURATION_MS: u64 = 5000;

/// A key named by a press task, resolved from its text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A raw platform key code, e.g. `"5"`.
    Code(u32),
    Power,
    Home,
    Back,
    ScreenCenter,
    WakeUp,
}

impl Key {
    /// Resolve a task payload into a key.
    ///
    /// Integers are key codes and must be non-negative; anything else has to be one of
    /// the symbolic names.
    pub fn parse(text: &str) -> Result<Self, AutomationError> {
        let text = text.trim();
        if let Ok(code) = text.parse::<i64>() {
            return u32::try_from(code).map(Key::Code).map_err(|_| {
                AutomationError::InvalidValue(format!(
                    "key code {text} is negative or out of range"
                ))
            });
        }
        match text {
            "POWER" => Ok(Key::Power),
            "HOME" => Ok(Key::Home),
            "BACK" => Ok(Key::Back),
            "SCREEN_CENTER" => Ok(Key::ScreenCenter),
            "WAKE_UP" => Ok(Key::WakeUp),
            other => Err(AutomationError::UnsupportedOperation(format!(
                "key {other} is not supported"
            ))),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Code(code) => write!(f, "{code}"),
            Key::Power => f.write_str("POWER"),
            Key::Home => f.write_str("HOME"),
            Key::Back => f.write_str("BACK"),
            Key::ScreenCenter => f.write_str("SCREEN_CENTER"),
            Key::WakeUp => f.write_str("WAKE_UP"),
        }
    }
}
