// Adapters layer: concrete implementations of the domain ports (HTTP clients, dry-run store).

pub mod anecdotes;
pub mod confluence;
pub mod dry_run;

pub use anecdotes::AnecdotesClient;
pub use confluence::ConfluenceClient;
pub use dry_run::DryRunPageStore;
