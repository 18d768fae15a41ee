//! Support code for the `mimir` command-line tool.

pub mod config;

pub use config::{ModelSettings, Settings};
