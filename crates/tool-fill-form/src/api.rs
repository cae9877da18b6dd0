use std::collections::HashMap;
use std::sync::Arc;

use action_flow::for_each_sequential;
use action_locator::ScopedLocator;
use action_primitives::{sleep, wait_until_located, ElementHandle, Locator, WebDriverPort};
use soulform_observe::ErrorLogger;
use tracing::{debug, info, instrument};

use crate::errors::FillError;
use crate::hooks;
use crate::model::{FieldSpec, FillOpt, FormHandle, SubmitTarget};
use crate::policy::FillPolicy;
use crate::runner::{self, FillDeps};

/// Fills forms on one driver session, one field at a time
pub struct FormFillEngine {
    deps: FillDeps,
}

impl FormFillEngine {
    pub fn new(driver: Arc<dyn WebDriverPort>, policy: FillPolicy) -> Self {
        Self {
            deps: FillDeps {
                driver,
                policy,
                logger: Arc::new(ErrorLogger::new("form-fill")),
            },
        }
    }

    /// Report failures through `logger` instead of a private one
    pub fn with_logger(mut self, logger: Arc<ErrorLogger>) -> Self {
        self.deps.logger = logger;
        self
    }

    pub fn policy(&self) -> &FillPolicy {
        &self.deps.policy
    }

    pub fn logger(&self) -> &Arc<ErrorLogger> {
        &self.deps.logger
    }

    /// Fill every field inside `form` in order, then submit.
    ///
    /// The first failing field ends the fill; later fields are not touched.
    #[instrument(skip_all, fields(form = %form, fields = fields.len()))]
    pub async fn fill_form(
        &self,
        fields: Vec<FieldSpec>,
        form: &Locator,
        submit: SubmitTarget,
        opt: FillOpt,
    ) -> Result<FormHandle, FillError> {
        info!("filling form");
        let root = self.locate_form(form).await?;
        let total = fields.len();

        for_each_sequential(fields, |field| {
            runner::fill_field(&self.deps, field, Some(root.clone()))
        })
        .await?;

        if let Some(after_fill) = opt.after_fill {
            let form_root = root.clone();
            hooks::invoke("after_fill_form", move || after_fill(form_root)).await?;
        }

        sleep(opt.delay.unwrap_or_else(|| self.deps.policy.submit_delay())).await;

        let submitted = match submit {
            SubmitTarget::None => false,
            SubmitTarget::Action(action) => {
                let form_root = root.clone();
                hooks::invoke("submit", move || action(form_root)).await?;
                true
            }
            SubmitTarget::Locator(locator) => {
                let scoped = ScopedLocator::for_target(locator, None, Some(&root));
                let button = wait_until_located(
                    self.deps.driver.as_ref(),
                    scoped.parent(),
                    scoped.locator(),
                    self.deps.policy.wait_options(),
                )
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| FillError::ElementNotFound {
                    target: scoped.to_string(),
                })?;
                debug!(submit = %button, "clicking submit");
                self.deps.driver.click(&button).await?;
                true
            }
        };

        info!(fields = total, submitted, "form filled");
        Ok(FormHandle {
            form: root,
            submitted,
        })
    }

    /// Fill one field resolved against the whole document or its own parent.
    pub async fn fill_field(&self, field: FieldSpec) -> Result<(), FillError> {
        runner::fill_field(&self.deps, field, None).await
    }

    /// Read the current `value` of named (or id'd) fields inside `form`.
    #[instrument(skip_all, fields(form = %form, use_id = use_id))]
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
        let root = self.locate_form(form).await?;
        let driver = self.deps.driver.as_ref();
        let mut values = HashMap::new();

        for name in names {
            let name = name.as_ref();
            let locator = if use_id {
                Locator::id(name)
            } else {
                Locator::name(name)
            };
            let element = driver
                .find_elements(Some(&root), &locator)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| FillError::ElementNotFound {
                    target: format!("{locator} within {root}"),
                })?;
            let value = driver.attribute(&element, "value").await?.unwrap_or_default();
            values.insert(name.to_string(), value);
        }

        debug!(count = values.len(), "read form values");
        Ok(values)
    }

    async fn locate_form(&self, form: &Locator) -> Result<ElementHandle, FillError> {
        wait_until_located(
            self.deps.driver.as_ref(),
            None,
            form,
            self.deps.policy.wait_options(),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| FillError::ElementNotFound {
            target: form.to_string(),
        })
    }
}
