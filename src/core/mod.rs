pub mod aggregate;
pub mod engine;
pub mod merge;
pub mod sanitize;

pub use crate::domain::model::{ControlEnrichment, GroupedControls};
pub use crate::domain::ports::{ControlSource, PageStore, Storage};
pub use crate::utils::error::Result;
pub use engine::{SyncEngine, SyncOptions, SyncOutcome};
