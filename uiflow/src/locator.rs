use tracing::{debug, instrument};

use crate::element::UIElement;
use crate::errors::AutomationError;
use crate::platforms::DeviceEngine;
use crate::selector::Selector;
use std::sync::Arc;
use std::time::Duration;

// Default timeout if none is specified on the locator itself
pub const DEFAULT_LOCATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle for finding UI elements matching one selector.
///
/// Lookups that time out resolve to "not found" rather than to an error.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn DeviceEngine>,
    selector: Selector,
    timeout: Duration, // Default timeout for this locator instance
    root: Option<UIElement>,
}

impl Locator {
    /// Create a new locator with the given selector
    pub(crate) fn new(engine: Arc<dyn DeviceEngine>, selector: Selector) -> Self {
        Self {
            engine,
            selector,
            timeout: DEFAULT_LOCATOR_TIMEOUT,
            root: None,
        }
    }

    /// Set a default timeout for waiting operations on this locator instance.
    pub fn set_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restrict the search to descendants of `element`.
    pub fn within(mut self, element: UIElement) -> Self {
        self.root = Some(element);
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Wait up to the timeout (or the locator default) for the first match.
    #[instrument(level = "debug", skip(self, timeout), fields(selector = %self.selector))]
    pub fn first(&self, timeout: Option<Duration>) -> Result<Option<UIElement>, AutomationError> {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        let found = self.engine.find_element(
            &self.selector,
            self.root.as_ref(),
            Some(effective_timeout),
        )?;
        if found.is_none() {
            debug!(
                "No element matched {} within {:?}",
                self.selector, effective_timeout
            );
        }
        Ok(found)
    }

    /// Get all elements matching this locator, waiting up to the specified timeout.
    pub fn all(&self, timeout: Option<Duration>) -> Result<Vec<UIElement>, AutomationError> {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        self.engine
            .find_elements(&self.selector, self.root.as_ref(), Some(effective_timeout))
    }

    /// Check the current screen only, without waiting.
    pub fn exists(&self) -> Result<bool, AutomationError> {
        Ok(self
            .engine
            .find_element(&self.selector, self.root.as_ref(), None)?
            .is_some())
    }

    pub fn selector_string(&self) -> String {
        self.selector.to_string()
    }
}
