//! Immutable data types: repositories, client options and progress values.

pub mod options;
pub mod progress;
pub mod repo;

pub use options::{DEFAULT_ENDPOINT, HubOptions, TransferMode};
pub use progress::{
    AggregateProgress, FILE_WEIGHT, ProgressCallback, TransferCallback, TransferProgress,
};
pub use repo::{ParseRepoKindError, RepoKind, Repository};
