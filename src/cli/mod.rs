//! CLI command handlers

pub mod commands;

pub use commands::{apply, classify, rules, sheets, ApplyOptions};
