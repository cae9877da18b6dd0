//! Form sessions
//!
//! A [`FormRobot`] binds one driver handle to its own error logger and fill
//! policy. Every form filled through the same robot shares the logger, so a
//! failure surfacing through several nested pipelines is logged in full once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use action_primitives::{
    self as primitives, DriverError, ElementHandle, Locator, WaitOptions, WebDriverPort,
};
use soulform_core_types::SessionId;
use soulform_observe::{ErrorLogger, LoggerRegistry};
use tool_fill_form::{
    FieldSpec, FillError, FillOpt, FillPolicy, FormFillEngine, FormHandle, SubmitTarget,
};
use tracing::{debug, info};

use crate::config::{BrowserKind, ConfigError, SoulformConfig};

pub struct FormRobot {
    session_id: SessionId,
    browser: BrowserKind,
    driver: Arc<dyn WebDriverPort>,
    engine: FormFillEngine,
    /// Registry holding this session's logger; the entry goes when the robot drops
    registry: Option<Arc<LoggerRegistry>>,
}

impl FormRobot {
    /// Open a session with a private logger.
    ///
    /// Fails fast when the configured browser is not supported.
    pub fn new(
        driver: Arc<dyn WebDriverPort>,
        config: &SoulformConfig,
    ) -> Result<Self, ConfigError> {
        let session_id = SessionId::new();
        let logger = Arc::new(ErrorLogger::new(session_id.to_string()));
        Self::assemble(driver, config, session_id, logger)
    }

    /// Open a session whose logger is registered under the session id.
    ///
    /// The registry entry lives as long as the robot.
    pub fn in_registry(
        driver: Arc<dyn WebDriverPort>,
        config: &SoulformConfig,
        registry: &Arc<LoggerRegistry>,
    ) -> Result<Self, ConfigError> {
        // Validate before the registry grows an entry for a session that never opens.
        config.browser_kind()?;
        let session_id = SessionId::new();
        let logger = registry.for_tag(&session_id.to_string());
        let mut robot = Self::assemble(driver, config, session_id, logger)?;
        robot.registry = Some(Arc::clone(registry));
        Ok(robot)
    }

    fn assemble(
        driver: Arc<dyn WebDriverPort>,
        config: &SoulformConfig,
        session_id: SessionId,
        logger: Arc<ErrorLogger>,
    ) -> Result<Self, ConfigError> {
        let browser = config.browser_kind()?;
        let engine =
            FormFillEngine::new(Arc::clone(&driver), config.fill.clone()).with_logger(logger);
        info!(session = %session_id, browser = %browser, "form session opened");
        Ok(Self {
            session_id,
            browser,
            driver,
            engine,
            registry: None,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn browser(&self) -> BrowserKind {
        self.browser
    }

    pub fn policy(&self) -> &FillPolicy {
        self.engine.policy()
    }

    pub fn logger(&self) -> &Arc<ErrorLogger> {
        self.engine.logger()
    }

    pub fn driver(&self) -> &Arc<dyn WebDriverPort> {
        &self.driver
    }

    pub async fn fill_form(
        &self,
        fields: Vec<FieldSpec>,
        form: &Locator,
        submit: SubmitTarget,
        opt: FillOpt,
    ) -> Result<FormHandle, FillError> {
        self.engine.fill_form(fields, form, submit, opt).await
    }

    pub async fn fill_field(&self, field: FieldSpec) -> Result<(), FillError> {
        self.engine.fill_field(field).await
    }

    pub async fn read_form_values<I, S>(
        &self,
        form: &Locator,
        names: I,
        use_id: bool,
    ) -> Result<HashMap<String, String>, FillError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.engine.read_form_values(form, names, use_id).await
    }

    /// Poll for `locator` with the session's locate timeout.
    pub async fn wait_until_located(
        &self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        self.wait_until_located_with(scope, locator, self.policy().wait_options()).await
    }

    pub async fn wait_until_located_with(
        &self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
        options: WaitOptions,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        primitives::wait_until_located(self.driver.as_ref(), scope, locator, options).await
    }

    pub async fn wait_until_visible(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.wait_until_visible_with(element, self.policy().wait_options()).await
    }

    pub async fn wait_until_visible_with(
        &self,
        element: &ElementHandle,
        options: WaitOptions,
    ) -> Result<(), DriverError> {
        primitives::wait_until_visible(self.driver.as_ref(), element, options).await
    }

    pub async fn sleep(&self, duration: Duration) {
        primitives::sleep(duration).await
    }
}

impl Drop for FormRobot {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take() {
            registry.remove(&self.session_id.to_string());
            debug!(session = %self.session_id, "session logger released");
        }
    }
}
