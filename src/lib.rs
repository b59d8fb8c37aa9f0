pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod help;
pub mod logging;
pub mod plugin;
pub mod state;
