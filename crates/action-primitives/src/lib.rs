//! Browser driver port
//!
//! The form engine never talks to a browser directly. Everything it needs from
//! the automation driver is expressed here:
//! - element locate (optionally scoped to a parent element)
//! - element interaction: click, clear, send-keys, attribute and state reads
//! - script execution for value injection and synthetic events
//! - explicit waits that poll until located/visible or time out

pub mod errors;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
