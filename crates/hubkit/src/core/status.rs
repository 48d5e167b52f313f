use crate::error::{Error, Result};

/// Classify an HTTP status code.
///
/// - `200..=299` succeeds,
/// - `400..=499` maps to [`Error::AuthorizationRequired`],
/// - any other valid status maps to [`Error::HttpStatus`],
/// - a code outside `100..=599` is not an HTTP status at all and maps to
///   [`Error::UnexpectedError`].
pub fn classify(status: u16) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        400..=499 => Err(Error::AuthorizationRequired),
        100..=599 => Err(Error::HttpStatus(status)),
        _ => Err(Error::UnexpectedError),
    }
}
