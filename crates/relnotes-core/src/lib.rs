//! relnotes Core - Shared foundations for changelog synthesis
//!
//! This crate provides the error taxonomy, configuration and small shared
//! types used by the host client, the changelog pipeline and the CLI.

pub mod cancel;
pub mod config;
pub mod error;
pub mod types;

pub use cancel::CancelFlag;
pub use error::{ChangelogError, ConfigError, RelnotesError, Result};
pub use types::Category;
