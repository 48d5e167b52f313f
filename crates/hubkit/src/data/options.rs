use std::fmt;
use std::path::{Path, PathBuf};

/// Public endpoint used when no override is configured.
pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

pub const ENDPOINT_ENV: &str = "HF_ENDPOINT";
pub const TOKEN_ENV: &str = "HF_TOKEN";
pub const DOWNLOAD_BASE_ENV: &str = "HUBKIT_DOWNLOAD_BASE";

/// How a single file transfer is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// The transfer runs inside the awaiting task. Dropping the future stops it.
    #[default]
    Foreground,

    /// The transfer is spawned onto the tokio runtime and runs to completion
    /// even if the awaiting caller goes away.
    Background,
}

/// Configuration carried by a [`HubClient`](crate::HubClient).
///
/// # Examples
///
/// ```
/// use hubkit::{HubOptions, TransferMode};
///
/// let options = HubOptions::default()
///     .endpoint("https://hub.example.com")
///     .download_base("/tmp/hub")
///     .token("hf_xxx")
///     .transfer_mode(TransferMode::Background);
/// assert_eq!(options.endpoint, "https://hub.example.com");
/// ```
#[derive(Clone)]
pub struct HubOptions {
    /// API base, without a trailing slash.
    pub endpoint: String,

    /// Root under which repositories are materialized.
    pub download_base: PathBuf,

    /// Bearer token attached to every request when present.
    pub token: Option<String>,

    pub transfer_mode: TransferMode,
}

impl fmt::Debug for HubOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubOptions")
            .field("endpoint", &self.endpoint)
            .field("download_base", &self.download_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("transfer_mode", &self.transfer_mode)
            .finish()
    }
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            download_base: default_download_base(),
            token: None,
            transfer_mode: TransferMode::default(),
        }
    }
}

impl HubOptions {
    /// Defaults overridden by `HF_ENDPOINT`, `HF_TOKEN` and
    /// `HUBKIT_DOWNLOAD_BASE` when they are set and non-empty.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(endpoint) = non_empty_env(ENDPOINT_ENV) {
            options = options.endpoint(endpoint);
        }
        if let Some(token) = non_empty_env(TOKEN_ENV) {
            options = options.token(token);
        }
        if let Some(base) = non_empty_env(DOWNLOAD_BASE_ENV) {
            options = options.download_base(base);
        }
        options
    }

    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn download_base(mut self, base: impl AsRef<Path>) -> Self {
        self.download_base = base.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn maybe_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn transfer_mode(mut self, mode: TransferMode) -> Self {
        self.transfer_mode = mode;
        self
    }
}

/// `~/Documents/huggingface`, or a relative `huggingface` directory when the
/// home directory cannot be determined.
pub fn default_download_base() -> PathBuf {
    match home::home_dir() {
        Some(home) => home.join("Documents").join("huggingface"),
        None => PathBuf::from("huggingface"),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
