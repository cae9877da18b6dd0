//! Error types reported by the browser driver

use thiserror::Error;

/// Failures surfaced by a [`crate::WebDriverPort`] implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Locator matched nothing where exactly one element was required
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// Element reference no longer backs a node in the DOM
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Explicit wait gave up
    #[error("Wait timeout: {0}")]
    Timeout(String),

    /// Injected script threw or returned garbage
    #[error("Script error: {0}")]
    Script(String),

    /// Transport or protocol failure talking to the driver
    #[error("Driver I/O error: {0}")]
    Io(String),
}

impl DriverError {
    /// True when the element handle was invalidated by a DOM mutation
    pub fn is_stale(&self) -> bool {
        matches!(self, DriverError::StaleElement(_))
    }

    /// Check if a wait loop may poll again after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::NoSuchElement(_))
    }
}
