//! Core data types for driver primitives

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator strategy understood by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    /// CSS selector
    Css,

    /// XPath expression
    #[serde(rename = "xpath")]
    XPath,

    /// `id` attribute
    Id,

    /// `name` attribute
    Name,

    /// Element tag name
    TagName,

    /// Exact anchor text
    LinkText,
}

impl By {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            By::Css => "css",
            By::XPath => "xpath",
            By::Id => "id",
            By::Name => "name",
            By::TagName => "tag",
            By::LinkText => "link",
        }
    }
}

/// Strategy + value pair identifying DOM element(s)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub by: By,
    pub value: String,
}

impl Locator {
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Self {
            by,
            value: value.into(),
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(By::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(By::XPath, value)
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(By::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(By::Name, value)
    }

    pub fn tag_name(value: impl Into<String>) -> Self {
        Self::new(By::TagName, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(By::LinkText, value)
    }

    /// Absolute XPath expressions ignore any scope element.
    ///
    /// Every other locator is resolved relative to a parent when one is
    /// available.
    pub fn is_absolute(&self) -> bool {
        match self.by {
            By::XPath => {
                let trimmed = self.value.trim_start();
                trimmed.starts_with('/') || trimmed.starts_with("(/")
            }
            _ => false,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.by.name(), self.value)
    }
}

/// Opaque reference to a live DOM element owned by the driver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Non-text keys that can take part in a chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Control,
    Meta,
    Shift,
    Delete,
    Backspace,
    Enter,
    Tab,
    Char(char),
}

/// Input delivered through the driver's native key-send action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// Literal text, typed as-is
    Text(String),

    /// Keys pressed together and released in reverse order
    Chord(Vec<Key>),
}

impl KeyInput {
    pub fn text(value: impl Into<String>) -> Self {
        KeyInput::Text(value.into())
    }

    /// Ctrl+A
    pub fn select_all() -> Self {
        KeyInput::Chord(vec![Key::Control, Key::Char('a')])
    }

    pub fn delete() -> Self {
        KeyInput::Chord(vec![Key::Delete])
    }
}

/// Argument handed to an injected script as `arguments[n]`
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    Element(ElementHandle),
    Value(serde_json::Value),
}

impl From<ElementHandle> for ScriptArg {
    fn from(handle: ElementHandle) -> Self {
        ScriptArg::Element(handle)
    }
}

impl From<&str> for ScriptArg {
    fn from(value: &str) -> Self {
        ScriptArg::Value(serde_json::Value::String(value.to_string()))
    }
}
