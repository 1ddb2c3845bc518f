pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{AnecdotesClient, ConfluenceClient, DryRunPageStore};
pub use config::{cli::LocalStorage, SyncConfig};
pub use core::{SyncEngine, SyncOptions, SyncOutcome};
pub use utils::error::{Result, SyncError};

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, LogFormat};
