pub mod app_config;
pub mod cli;
pub mod common;
pub mod config_loader;
pub mod core;
pub mod errors;
pub mod operations;
pub mod shinobi;
pub mod shinobi_config;
pub mod ui;
