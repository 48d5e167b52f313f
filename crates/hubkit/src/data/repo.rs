use std::fmt;
use std::str::FromStr;

/// The kind of a remote repository.
///
/// The kind selects both the metadata endpoint (`/api/{kind}/...`) and the
/// directory the repository is materialized under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepoKind {
    #[default]
    Models,
    Datasets,
    Spaces,
}

impl RepoKind {
    /// Plural path segment used by the API and by the local layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoKind::Models => "models",
            RepoKind::Datasets => "datasets",
            RepoKind::Spaces => "spaces",
        }
    }

    /// Segment inserted in file download URLs.
    ///
    /// Model repositories are addressed without a kind segment.
    pub fn url_segment(&self) -> Option<&'static str> {
        match self {
            RepoKind::Models => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown repository kind: {0}")]
pub struct ParseRepoKindError(pub String);

impl FromStr for RepoKind {
    type Err = ParseRepoKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" | "models" => Ok(RepoKind::Models),
            "dataset" | "datasets" => Ok(RepoKind::Datasets),
            "space" | "spaces" => Ok(RepoKind::Spaces),
            _ => Err(ParseRepoKindError(s.to_string())),
        }
    }
}

/// A remote repository, identified as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub id: String,
    pub kind: RepoKind,
}

impl Repository {
    pub fn new(id: impl Into<String>, kind: RepoKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn model(id: impl Into<String>) -> Self {
        Self::new(id, RepoKind::Models)
    }

    pub fn dataset(id: impl Into<String>) -> Self {
        Self::new(id, RepoKind::Datasets)
    }

    pub fn space(id: impl Into<String>) -> Self {
        Self::new(id, RepoKind::Spaces)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

impl From<&str> for Repository {
    fn from(id: &str) -> Self {
        Self::model(id)
    }
}

impl From<String> for Repository {
    fn from(id: String) -> Self {
        Self::model(id)
    }
}

impl From<&Repository> for Repository {
    fn from(repo: &Repository) -> Self {
        repo.clone()
    }
}
