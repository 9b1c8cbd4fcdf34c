#![doc = "Common types shared across the profsource workspace."]

pub mod config;
pub mod error;

pub use config::*;
pub use error::*;
