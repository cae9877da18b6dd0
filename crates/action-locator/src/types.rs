//! Core types for scoped element location

use action_primitives::{ElementHandle, Locator};
use std::fmt;

/// Locator with an optional parent element scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedLocator {
    /// Resolved against the whole document
    Plain(Locator),

    /// Resolved inside `parent`
    Scoped {
        parent: ElementHandle,
        locator: Locator,
    },
}

impl ScopedLocator {
    /// Pick the scope for a field target.
    ///
    /// An explicit parent always wins. Without one, relative targets are
    /// scoped to the form root and absolute XPath stays document-wide.
    pub fn for_target(
        locator: Locator,
        parent: Option<ElementHandle>,
        root: Option<&ElementHandle>,
    ) -> Self {
        match (parent, root) {
            (Some(parent), _) => ScopedLocator::Scoped { parent, locator },
            (None, Some(root)) if !locator.is_absolute() => ScopedLocator::Scoped {
                parent: root.clone(),
                locator,
            },
            _ => ScopedLocator::Plain(locator),
        }
    }

    pub fn locator(&self) -> &Locator {
        match self {
            ScopedLocator::Plain(locator) => locator,
            ScopedLocator::Scoped { locator, .. } => locator,
        }
    }

    pub fn parent(&self) -> Option<&ElementHandle> {
        match self {
            ScopedLocator::Plain(_) => None,
            ScopedLocator::Scoped { parent, .. } => Some(parent),
        }
    }
}

impl From<Locator> for ScopedLocator {
    fn from(locator: Locator) -> Self {
        ScopedLocator::Plain(locator)
    }
}

impl fmt::Display for ScopedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopedLocator::Plain(locator) => write!(f, "{}", locator),
            ScopedLocator::Scoped { parent, locator } => write!(f, "{} within {}", locator, parent),
        }
    }
}
