//! Pure transformations: status classification, glob selection, layout and
//! progress aggregation.

mod aggregate;
mod filter;
mod layout;
mod status;

pub use aggregate::ProgressAggregator;
pub use filter::select;
pub use layout::{REVISION, file_url, local_path, metadata_url, repo_root, whoami_url};
pub use status::classify;
