//! Explicit waits
//!
//! Both waits poll the driver until the condition holds or the timeout
//! elapses. They are the only operations in the workspace with timeout
//! semantics.

use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::{
    errors::DriverError,
    primitives::WebDriverPort,
    types::{ElementHandle, Locator},
};

/// Polling parameters for explicit waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Poll until `locator` matches at least one element.
pub async fn wait_until_located(
    driver: &dyn WebDriverPort,
    scope: Option<&ElementHandle>,
    locator: &Locator,
    options: WaitOptions,
) -> Result<Vec<ElementHandle>, DriverError> {
    debug!(
        locator = %locator,
        timeout_ms = options.timeout.as_millis() as u64,
        "waiting for element to be located"
    );

    let poll = async {
        loop {
            match driver.find_elements(scope, locator).await {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(err) if err.is_retryable() => {}
                Err(err) => return Err(err),
            }
            sleep(options.poll_interval).await;
        }
    };

    match timeout(options.timeout, poll).await {
        Ok(result) => result,
        Err(_) => {
            warn!(locator = %locator, "element not located before timeout");
            Err(DriverError::Timeout(format!(
                "{} not located after {}ms",
                locator,
                options.timeout.as_millis()
            )))
        }
    }
}

/// Poll until `element` reports itself displayed.
pub async fn wait_until_visible(
    driver: &dyn WebDriverPort,
    element: &ElementHandle,
    options: WaitOptions,
) -> Result<(), DriverError> {
    debug!(element = %element, "waiting for element to become visible");

    let poll = async {
        loop {
            if driver.is_displayed(element).await? {
                return Ok(());
            }
            sleep(options.poll_interval).await;
        }
    };

    match timeout(options.timeout, poll).await {
        Ok(result) => result,
        Err(_) => {
            warn!(element = %element, "element not visible before timeout");
            Err(DriverError::Timeout(format!(
                "{} not visible after {}ms",
                element,
                options.timeout.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeyInput, ScriptArg};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Reveals an element after a fixed number of polls.
    struct SlowPage {
        polls_until_ready: Mutex<u32>,
    }

    impl SlowPage {
        fn new(polls: u32) -> Self {
            Self {
                polls_until_ready: Mutex::new(polls),
            }
        }

        fn tick(&self) -> bool {
            let mut remaining = self.polls_until_ready.lock();
            if *remaining == 0 {
                true
            } else {
                *remaining -= 1;
                false
            }
        }
    }

    fn unsupported<T>() -> Result<T, DriverError> {
        Err(DriverError::Io("unsupported in test".into()))
    }

    #[async_trait]
    impl WebDriverPort for SlowPage {
        async fn find_elements(
            &self,
            _scope: Option<&ElementHandle>,
            _locator: &Locator,
        ) -> Result<Vec<ElementHandle>, DriverError> {
            if self.tick() {
                Ok(vec![ElementHandle::new("late")])
            } else {
                Ok(Vec::new())
            }
        }

        async fn click(&self, _element: &ElementHandle) -> Result<(), DriverError> {
            unsupported()
        }

        async fn clear(&self, _element: &ElementHandle) -> Result<(), DriverError> {
            unsupported()
        }

        async fn send_keys(
            &self,
            _element: &ElementHandle,
            _keys: &KeyInput,
        ) -> Result<(), DriverError> {
            unsupported()
        }

        async fn attribute(
            &self,
            _element: &ElementHandle,
            _name: &str,
        ) -> Result<Option<String>, DriverError> {
            unsupported()
        }

        async fn tag_name(&self, _element: &ElementHandle) -> Result<String, DriverError> {
            unsupported()
        }

        async fn is_selected(&self, _element: &ElementHandle) -> Result<bool, DriverError> {
            unsupported()
        }

        async fn is_enabled(&self, _element: &ElementHandle) -> Result<bool, DriverError> {
            unsupported()
        }

        async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError> {
            if element.id() == "gone" {
                return Err(DriverError::StaleElement(element.to_string()));
            }
            Ok(self.tick())
        }

        async fn outer_html(&self, _element: &ElementHandle) -> Result<String, DriverError> {
            unsupported()
        }

        async fn execute_script(
            &self,
            _script: &str,
            _args: Vec<ScriptArg>,
        ) -> Result<serde_json::Value, DriverError> {
            unsupported()
        }
    }

    fn options() -> WaitOptions {
        WaitOptions::new(Duration::from_millis(1_000), Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn located_after_a_few_polls() {
        let page = SlowPage::new(3);
        let found = wait_until_located(&page, None, &Locator::name("q"), options())
            .await
            .unwrap();
        assert_eq!(found, vec![ElementHandle::new("late")]);
    }

    #[tokio::test(start_paused = true)]
    async fn located_times_out() {
        let page = SlowPage::new(u32::MAX);
        let err = wait_until_located(&page, None, &Locator::name("q"), options())
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout(_)));
        assert!(err.to_string().contains("name:q"));
    }

    #[tokio::test(start_paused = true)]
    async fn visible_propagates_stale() {
        let page = SlowPage::new(0);
        let err = wait_until_visible(&page, &ElementHandle::new("gone"), options())
            .await
            .unwrap_err();
        assert!(err.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn visible_after_polls() {
        let page = SlowPage::new(2);
        wait_until_visible(&page, &ElementHandle::new("x"), options())
            .await
            .unwrap();
    }
}
