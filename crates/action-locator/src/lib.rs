//! Scoped locators
//!
//! A field target is either a plain locator or a locator resolved inside a
//! parent element. The form engine picks the scope once, when the field
//! pipeline starts, and resolves through [`resolve_all`].

mod resolver;
mod types;

pub use resolver::resolve_all;
pub use types::ScopedLocator;
