pub mod app;
pub mod classify;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod plan;
pub mod truncate;
