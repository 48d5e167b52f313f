//! I/O: HTTP access, repository resolution, file transfer and snapshots.

pub mod http;
pub mod identity;
pub mod mock;

mod fetcher;
mod resolver;
pub(crate) mod snapshot;
mod transport;

pub use fetcher::FileFetcher;
pub use http::{BoxStream, HttpClient, HttpResponse, StreamResponse};
pub use resolver::{RepoResolver, parse_siblings};
pub use snapshot::IntoPatterns;
pub use transport::{Transport, bearer_headers};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
