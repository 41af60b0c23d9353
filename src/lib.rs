//! # turbowalk
//!
//! Fast recursive directory walking built on bulk directory-enumeration
//! system calls.
//!
//! Each directory is read with a primitive that returns many entries per
//! call (`getdents64` on Linux, `getattrlistbulk` on macOS), and results are
//! streamed to the caller in batches from a dedicated worker thread.
//!
//! ## Example
//!
//! ```no_run
//! use turbowalk::{walk, WalkOptions};
//!
//! let options = WalkOptions {
//!     terminators: true,
//!     ..Default::default()
//! };
//!
//! let handle = walk(
//!     "/srv/mods",
//!     |batch| {
//!         for entry in batch {
//!             if entry.is_terminator() {
//!                 println!("finished {}", entry.path().display());
//!             }
//!         }
//!     },
//!     |result| {
//!         if let Err(err) = result {
//!             eprintln!("walk failed: {err}");
//!         }
//!     },
//!     options,
//! )
//! .unwrap();
//! handle.join().unwrap();
//! ```
//!
//! ## Delivery guarantees
//!
//! - Every batch except possibly the last holds exactly `threshold` entries.
//! - A directory's children are delivered before anything below them.
//! - With terminators enabled, the terminator for a directory arrives after
//!   every entry of its subtree.
//! - Directories that cannot be read are silently treated as empty.
//! - The completion callback runs exactly once.
//!
//! ## Platform Support
//!
//! Linux, Android and macOS use their native bulk primitives. Other
//! platforms wrap `std::fs::read_dir` with the same contract.

mod builder;
mod details;
mod entry_points;
mod enumerator;
mod error;
mod sink;
mod sys;
mod types;
mod walker;
mod worker;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
mod ffi;
#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
mod handle;
#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
mod parser;

pub use builder::Walker;
pub use enumerator::BulkEnumerator;
pub use error::Error;
pub use types::{
    filetime_to_unix, Attributes, Entry, WalkOptions, DEFAULT_BUFFER_SIZE, DEFAULT_THRESHOLD,
    MIN_BUFFER_SIZE, TICKS_PER_SECOND, WINDOWS_TO_UNIX_EPOCH_TICKS,
};
pub use worker::{BatchStream, WalkHandle};

use std::path::Path;

/// Walk `base_path` on a worker thread.
///
/// `on_batch` receives the entries in order, in batches of
/// `options.threshold` (the last may be shorter). `on_complete` is called
/// exactly once when the walk ends, with `Err` only for fatal failures.
///
/// Returns `Err` only if the worker thread could not be spawned; neither
/// callback is invoked in that case.
pub fn walk<P, B, C>(
    base_path: P,
    on_batch: B,
    on_complete: C,
    options: WalkOptions,
) -> Result<WalkHandle, Error>
where
    P: AsRef<Path>,
    B: FnMut(Vec<Entry>) + Send + 'static,
    C: FnOnce(Result<(), Error>) + Send + 'static,
{
    Walker::new(base_path)
        .options(options)
        .spawn(on_batch, on_complete)
}

/// Walk `base_path` on the calling thread and collect every entry.
///
/// Convenient for small trees; large walks should prefer [`walk`] or
/// [`Walker::stream`].
pub fn walk_collect<P: AsRef<Path>>(base_path: P, options: WalkOptions) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();
    Walker::new(base_path)
        .options(options)
        .run(|batch| entries.extend(batch))?;
    Ok(entries)
}
