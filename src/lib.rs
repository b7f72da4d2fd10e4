pub mod aggregate;
pub mod changelog;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod matcher;
pub mod record;
pub mod release;
pub mod ui;
pub mod version;

pub use error::{ChangeflowError, Result};
