//! fm-cli: config file loading and path helpers for the facemap binary.

pub mod config;
pub mod paths;

pub use config::*;
pub use paths::*;
