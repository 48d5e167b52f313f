pub mod app;
pub mod config;
pub mod ls;
pub mod snapshot;
pub mod whoami;
