//! # durafill common library
//!
//! Shared code for the durafill workspace:
//! - Error type used by configuration loading
//! - TOML configuration and logging settings
//! - Static table of named input profiles

pub mod config;
pub mod error;
pub mod profiles;

pub use error::{Error, Result};
pub use profiles::Profile;
