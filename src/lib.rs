pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod display;
pub mod document;
pub mod input;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod session;

pub use core::error::{ConfigError, GaussError, LoadError, StateError};
