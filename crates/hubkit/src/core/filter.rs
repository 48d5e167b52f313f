use std::collections::HashSet;

use glob::Pattern;

use crate::error::{Error, Result};

/// Reduce `names` to those matching at least one of `patterns`.
///
/// With no patterns the input is returned unfiltered and in order. Otherwise
/// the result is the de-duplicated union of every pattern's matches. The
/// returned order follows the input but callers should treat it as a set.
pub fn select<S: AsRef<str>>(names: &[String], patterns: &[S]) -> Result<Vec<String>> {
    if patterns.is_empty() {
        return Ok(names.to_vec());
    }

    let compiled = patterns
        .iter()
        .map(|p| compile(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let selected = names
        .iter()
        .filter(|name| compiled.iter().any(|pattern| pattern.matches(name)))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect();

    Ok(selected)
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
