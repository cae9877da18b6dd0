//! Resolution of scoped locators through the driver port

use action_primitives::{DriverError, ElementHandle, WebDriverPort};
use tracing::debug;

use crate::types::ScopedLocator;

/// Locate every element matching `target` within its scope.
pub async fn resolve_all(
    driver: &dyn WebDriverPort,
    target: &ScopedLocator,
) -> Result<Vec<ElementHandle>, DriverError> {
    let found = driver
        .find_elements(target.parent(), target.locator())
        .await?;
    debug!(target = %target, matches = found.len(), "resolved scoped locator");
    Ok(found)
}
