//! Repository snapshot retrieval.
//!
//! Resolves a remote repository to its file list, narrows it with glob
//! patterns and materializes the selection under
//! `{download_base}/{kind}/{id}/`, reporting one aggregate progress signal.
//!
//! # Architecture
//!
//! - [`data`] - Repositories, options and progress values
//! - [`core`] - Pure transformations: status classification, glob selection,
//!   layout and progress aggregation
//! - [`effects`] - HTTP access behind the [`HttpClient`] trait, plus the
//!   resolver, fetcher and snapshot loop built on it
//!
//! Files already present locally are never requested again, so a failed
//! snapshot can be resumed by calling it again.

pub mod config;
pub mod core;
pub mod data;
pub mod effects;

mod client;
mod error;

pub use client::HubClient;
pub use config::Config;
pub use data::{
    AggregateProgress, DEFAULT_ENDPOINT, FILE_WEIGHT, HubOptions, ProgressCallback, RepoKind,
    Repository, TransferCallback, TransferMode, TransferProgress,
};
pub use effects::{FileFetcher, HttpClient, IntoPatterns, RepoResolver, Transport};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{Error, Result};
