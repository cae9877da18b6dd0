//! Driver port
//!
//! One implementation wraps one browser session. The engine drives it
//! strictly sequentially, so implementations never see two calls in flight
//! for the same session.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    errors::DriverError,
    types::{ElementHandle, KeyInput, Locator, ScriptArg},
};

/// Capability-style interface of the external browser-automation driver
#[async_trait]
pub trait WebDriverPort: Send + Sync {
    /// Locate every element matching `locator`, optionally inside `scope`.
    ///
    /// Zero matches is `Ok(vec![])`, not an error.
    async fn find_elements(
        &self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Clear an editable element through the driver's native clear action
    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Send literal text or a key chord to an element
    async fn send_keys(&self, element: &ElementHandle, keys: &KeyInput)
        -> Result<(), DriverError>;

    /// Read an attribute (or reflected property such as `value`)
    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Lower- or upper-case tag name as reported by the driver
    async fn tag_name(&self, element: &ElementHandle) -> Result<String, DriverError>;

    /// Checked/selected state of checkboxes, radios and options
    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    /// Enabled flag; fails with a stale error once the node is detached
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    /// Rendered visibility
    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    /// Serialized outer HTML of an element
    async fn outer_html(&self, element: &ElementHandle) -> Result<String, DriverError>;

    /// Execute a synchronous script in the page
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> Result<serde_json::Value, DriverError>;
}

/// Suspend the current session for `duration`
pub async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
