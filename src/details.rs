//! Optional per-file detail query (hard link count and file id).

use crate::sys;
use crate::types::{Details, Entry};
use std::path::Path;
use tracing::trace;

/// Query extended metadata for `path`, swallowing failures.
pub(crate) fn fetch_details(path: &Path) -> Option<Details> {
    match sys::query_details(path) {
        Ok(details) => Some(details),
        Err(err) => {
            trace!(path = %path.display(), error = %err, "detail query failed");
            None
        }
    }
}

/// Attach details to `entry`; on failure the optional fields stay unset.
pub(crate) fn with_details(entry: Entry) -> Entry {
    let details = fetch_details(entry.path());
    entry.with_details(details)
}
