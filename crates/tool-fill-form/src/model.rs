use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use action_primitives::{ElementHandle, Locator, WebDriverPort};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::classify::InputKind;

/// Error type caller hooks may return
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by a caller hook
pub type HookFuture<T> = BoxFuture<'static, Result<T, HookError>>;

/// Hook run against one matched element
pub type ElementHook = Arc<dyn Fn(FillCtx) -> HookFuture<()> + Send + Sync>;

/// Hook deciding whether the caller filled the element itself
pub type CanFillHook = Arc<dyn Fn(FillCtx) -> HookFuture<bool> + Send + Sync>;

/// Value transformation applied before any element is touched
pub type Converter = Arc<dyn Fn(&FieldValue) -> FieldValue + Send + Sync>;

/// Completion hook of a whole field
pub type DoneHook = Arc<dyn Fn(FieldSummary) -> HookFuture<()> + Send + Sync>;

/// Form-level hook receiving the form root
pub type FormHook = Arc<dyn Fn(ElementHandle) -> HookFuture<()> + Send + Sync>;

/// Value to put into a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Bool(flag) => flag.to_string(),
        }
    }

    /// Desired checked state; text counts as checked for `true`, `on`, `yes`, `1`
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(flag) => *flag,
            FieldValue::Text(text) => {
                let text = text.trim();
                ["true", "on", "yes", "1"]
                    .iter()
                    .any(|truthy| text.eq_ignore_ascii_case(truthy))
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{text:?}"),
            FieldValue::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Scope a field target is resolved in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParent {
    /// Already located element
    Element(ElementHandle),

    /// Located when the field starts, relative to the form root
    Locator(Locator),
}

/// Everything a hook gets to see about the element being filled
#[derive(Clone)]
pub struct FillCtx {
    pub driver: Arc<dyn WebDriverPort>,
    pub element: ElementHandle,
    pub kind: InputKind,
    pub value: FieldValue,
}

impl fmt::Debug for FillCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillCtx")
            .field("element", &self.element)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .finish()
    }
}

/// Handed to the `done` hook after a field completed
#[derive(Debug, Clone)]
pub struct FieldSummary {
    pub target: Locator,
    pub elements: Vec<ElementHandle>,
    pub value: FieldValue,
}

/// Optional caller hooks; absent hooks are skipped
#[derive(Clone, Default)]
pub struct FieldHooks {
    pub converter: Option<Converter>,
    pub pre_fill: Option<ElementHook>,
    pub can_fill: Option<CanFillHook>,
    pub on_fill: Option<ElementHook>,
    pub after_fill: Option<ElementHook>,
    pub done: Option<DoneHook>,
}

fn element_hook<F, Fut>(hook: F) -> ElementHook
where
    F: Fn(FillCtx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HookError>> + Send + 'static,
{
    Arc::new(move |ctx| -> HookFuture<()> { Box::pin(hook(ctx)) })
}

impl FieldHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(&FieldValue) -> FieldValue + Send + Sync + 'static,
    {
        self.converter = Some(Arc::new(converter));
        self
    }

    /// Side effects before filling; cannot change the flow
    pub fn pre_fill<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FillCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.pre_fill = Some(element_hook(hook));
        self
    }

    /// Returning `true` means the caller filled the element
    pub fn can_fill<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FillCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, HookError>> + Send + 'static,
    {
        self.can_fill = Some(Arc::new(move |ctx| -> HookFuture<bool> {
            Box::pin(hook(ctx))
        }));
        self
    }

    /// Replaces the built-in strategy
    pub fn on_fill<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FillCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_fill = Some(element_hook(hook));
        self
    }

    pub fn after_fill<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FillCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.after_fill = Some(element_hook(hook));
        self
    }

    pub fn done<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(FieldSummary) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.done = Some(Arc::new(move |summary| -> HookFuture<()> {
            Box::pin(hook(summary))
        }));
        self
    }
}

impl fmt::Debug for FieldHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHooks")
            .field("converter", &self.converter.is_some())
            .field("pre_fill", &self.pre_fill.is_some())
            .field("can_fill", &self.can_fill.is_some())
            .field("on_fill", &self.on_fill.is_some())
            .field("after_fill", &self.after_fill.is_some())
            .field("done", &self.done.is_some())
            .finish()
    }
}

/// One field to fill
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub parent: Option<FieldParent>,
    pub target: Locator,
    pub value: FieldValue,
    /// Zero matches is fine; the field is skipped
    pub optional: bool,
    /// Clear with select-all + delete instead of the native clear action
    pub clear_using_key: bool,
    pub hooks: FieldHooks,
}

impl FieldSpec {
    pub fn new(target: Locator, value: impl Into<FieldValue>) -> Self {
        Self {
            parent: None,
            target,
            value: value.into(),
            optional: false,
            clear_using_key: false,
            hooks: FieldHooks::default(),
        }
    }

    pub fn within(mut self, parent: ElementHandle) -> Self {
        self.parent = Some(FieldParent::Element(parent));
        self
    }

    pub fn within_locator(mut self, parent: Locator) -> Self {
        self.parent = Some(FieldParent::Locator(parent));
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn clear_using_key(mut self) -> Self {
        self.clear_using_key = true;
        self
    }

    pub fn with_hooks(mut self, hooks: FieldHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// How a form is submitted once every field is filled
#[derive(Clone, Default)]
pub enum SubmitTarget {
    /// Resolve with the form itself
    #[default]
    None,

    /// Click the element located here, relative to the form
    Locator(Locator),

    /// Run a caller action with the form root
    Action(FormHook),
}

impl fmt::Debug for SubmitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitTarget::None => f.write_str("None"),
            SubmitTarget::Locator(locator) => f.debug_tuple("Locator").field(locator).finish(),
            SubmitTarget::Action(_) => f.write_str("Action"),
        }
    }
}

impl SubmitTarget {
    pub fn action<F, Fut>(action: F) -> Self
    where
        F: Fn(ElementHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        SubmitTarget::Action(Arc::new(move |form| -> HookFuture<()> {
            Box::pin(action(form))
        }))
    }
}

/// Form-level options
#[derive(Clone, Default)]
pub struct FillOpt {
    /// Runs after the last field, before the delay
    pub after_fill: Option<FormHook>,

    /// Pause before submitting; falls back to the policy's delay
    pub delay: Option<Duration>,
}

impl FillOpt {
    pub fn after_fill<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ElementHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.after_fill = Some(Arc::new(move |form| -> HookFuture<()> {
            Box::pin(hook(form))
        }));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl fmt::Debug for FillOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillOpt")
            .field("after_fill", &self.after_fill.is_some())
            .field("delay", &self.delay)
            .finish()
    }
}

/// Result of a completed form fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormHandle {
    pub form: ElementHandle,
    pub submitted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_values_map_to_checked_state() {
        assert!(FieldValue::from("on").as_bool());
        assert!(FieldValue::from(" TRUE ").as_bool());
        assert!(!FieldValue::from("off").as_bool());
        assert!(!FieldValue::from("").as_bool());
        assert_eq!(FieldValue::from(true).as_text(), "true");
    }

    #[test]
    fn field_value_accepts_bool_or_string() {
        let flag: FieldValue = serde_yaml::from_str("true").unwrap();
        assert_eq!(flag, FieldValue::Bool(true));
        let text: FieldValue = serde_yaml::from_str("\"a@b.com\"").unwrap();
        assert_eq!(text, FieldValue::Text("a@b.com".into()));
    }

    #[test]
    fn builder_sets_flags() {
        let spec = FieldSpec::new(Locator::name("email"), "a@b.com")
            .optional()
            .clear_using_key()
            .within(ElementHandle::new("fieldset"));
        assert!(spec.optional);
        assert!(spec.clear_using_key);
        assert_eq!(
            spec.parent,
            Some(FieldParent::Element(ElementHandle::new("fieldset")))
        );
    }
}
