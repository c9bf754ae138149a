//! Resolve `../`-relative paths during development
//!
//! Paths are written relative to the crate's `src/` directory, e.g.
//! `../data/int_rates.csv`. The same string is also tried one level up
//! (`./data/int_rates.csv`) so it works from either layout.

use std::path::{Path, PathBuf};

use crate::error::{CalcError, Result};

/// Resolve `rel` against the crate's `src/` directory
pub fn fp(rel: &str) -> Result<PathBuf> {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    resolve_dev_path(&base, rel, true)
}

/// Resolve `rel` (which must start with `../`) against `base`
///
/// With `ambiguous_err`, a path existing at both candidate locations is an
/// error rather than preferring the `../` one.
pub fn resolve_dev_path(base: &Path, rel: &str, ambiguous_err: bool) -> Result<PathBuf> {
    let rel = rel.replace('\\', "/");
    let Some(rest) = rel.strip_prefix("../") else {
        return Err(CalcError::InvalidPath(format!("{} does not start with ../", rel)));
    };

    let parent = base.join(&rel);
    let same_level = base.join(format!("./{}", rest));

    let parent_exists = parent.exists();
    let same_exists = same_level.exists();

    if ambiguous_err && parent_exists && same_exists {
        return Err(CalcError::AmbiguousPath {
            first: parent.canonicalize()?,
            second: same_level.canonicalize()?,
        });
    }

    if parent_exists {
        Ok(parent.canonicalize()?)
    } else if same_exists {
        Ok(same_level.canonicalize()?)
    } else {
        Err(CalcError::InvalidPath(format!("{} not found from {}", rel, base.display())))
    }
}
