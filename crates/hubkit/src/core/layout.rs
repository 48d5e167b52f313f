//! Deterministic URL and local path construction.

use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::data::Repository;
use crate::error::{Error, Result};

/// Revision every file URL is resolved against.
pub const REVISION: &str = "main";

/// Bytes escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `{endpoint}/api/{kind}/{id}`
pub fn metadata_url(endpoint: &str, repo: &Repository) -> String {
    format!("{endpoint}/api/{}/{}", repo.kind.as_str(), encode_path(&repo.id))
}

/// `{endpoint}/[{kind}/]{id}/resolve/main/{filename}`
///
/// The kind segment is omitted for model repositories. Every `/`-separated
/// piece of `id` and `filename` is percent-encoded.
pub fn file_url(endpoint: &str, repo: &Repository, filename: &str) -> String {
    let id = encode_path(&repo.id);
    let filename = encode_path(filename);
    match repo.kind.url_segment() {
        Some(segment) => format!("{endpoint}/{segment}/{id}/resolve/{REVISION}/{filename}"),
        None => format!("{endpoint}/{id}/resolve/{REVISION}/{filename}"),
    }
}

/// `{endpoint}/api/whoami-v2`
pub fn whoami_url(endpoint: &str) -> String {
    format!("{endpoint}/api/whoami-v2")
}

/// `{base}/{kind}/{id}`
///
/// Fails with [`Error::InvalidPath`] when `id` would leave that directory.
pub fn repo_root(base: &Path, repo: &Repository) -> Result<PathBuf> {
    join_relative(base.join(repo.kind.as_str()), &repo.id)
}

/// `{base}/{kind}/{id}/{filename}`
///
/// Fails with [`Error::InvalidPath`] when `id` or `filename` would leave the
/// repository root.
pub fn local_path(base: &Path, repo: &Repository, filename: &str) -> Result<PathBuf> {
    join_relative(repo_root(base, repo)?, filename)
}

fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .map(|piece| utf8_percent_encode(piece, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

// Remote names always use `/`; split so the local path uses native separators.
// Each piece must be exactly one normal component: no `.`, `..`, root or
// drive prefix.
fn join_relative(mut path: PathBuf, relative: &str) -> Result<PathBuf> {
    let mut pieces = relative.split('/').filter(|c| !c.is_empty()).peekable();
    if pieces.peek().is_none() {
        return Err(Error::InvalidPath(relative.to_string()));
    }

    for piece in pieces {
        let mut components = Path::new(piece).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => path.push(piece),
            _ => return Err(Error::InvalidPath(relative.to_string())),
        }
    }
    Ok(path)
}
