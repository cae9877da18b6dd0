//! Soulform
//!
//! Configuration, logging bootstrap and form sessions on top of the
//! workspace crates.

pub mod config;
pub mod logging;
pub mod session;

pub use config::{load_config, BrowserKind, ConfigError, LoadedConfig, SoulformConfig};
pub use logging::init_logging;
pub use session::FormRobot;

pub use action_flow as flow;
pub use action_primitives as primitives;
pub use soulform_observe as observe;
pub use tool_fill_form as fill;
