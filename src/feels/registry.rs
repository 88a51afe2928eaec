//! Known owners, read from the shared users file (one user name per line).

use crate::error::Result;
use crate::paths::Owner;
use crate::store::StorageBackend;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Owners listed in `users_file`, homes under `home_root`.
///
/// Blank lines and repeated names are ignored; a missing file means no owners.
pub fn load_owners<B: StorageBackend>(
    backend: &B,
    users_file: &Path,
    home_root: &Path,
) -> Result<Vec<Owner>> {
    let Some(text) = backend.read_to_string(users_file)? else {
        debug!("no users file at {}", users_file.display());
        return Ok(Vec::new());
    };

    let mut seen = BTreeSet::new();
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|name| is_user_name(name))
        .filter(|name| seen.insert(name.to_string()))
        .map(|name| Owner::new(name, home_root.join(name)))
        .collect())
}

fn is_user_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\0']) && name != "." && name != ".."
}
