//! Builder pattern API for walks.
//!
//! Provides a fluent interface for configuring and starting a walk.

use crate::error::Error;
use crate::types::{Entry, WalkOptions};
use crate::walker;
use crate::worker::{self, BatchStream, WalkHandle};
use std::path::{Path, PathBuf};

/// Builder for configuring walks.
///
/// # Example
///
/// ```no_run
/// use turbowalk::Walker;
///
/// let handle = Walker::new("/srv/games/skyrim/Data")
///     .threshold(512)
///     .terminators(true)
///     .skip_hidden(false)
///     .spawn(
///         |batch| println!("{} entries", batch.len()),
///         |result| println!("done: {result:?}"),
///     )?;
/// handle.join()?;
/// # Ok::<(), turbowalk::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    options: WalkOptions,
}

impl Walker {
    /// Create a walker rooted at `root` with default options.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            options: WalkOptions::default(),
        }
    }

    /// Number of entries per delivered batch.
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.options.threshold = threshold;
        self
    }

    /// Emit a terminator entry after each directory's subtree.
    pub fn terminators(mut self, enabled: bool) -> Self {
        self.options.terminators = enabled;
        self
    }

    /// Fetch hard link count and file id for every entry.
    ///
    /// This costs one extra open and stat per entry.
    pub fn details(mut self, enabled: bool) -> Self {
        self.options.details = enabled;
        self
    }

    /// Descend into child directories. Default is `true`.
    pub fn recurse(mut self, enabled: bool) -> Self {
        self.options.recurse = enabled;
        self
    }

    /// Skip hidden entries and their subtrees. Default is `true`.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.options.skip_hidden = skip;
        self
    }

    /// Skip symlinks / reparse points. Default is `false`.
    pub fn skip_links(mut self, skip: bool) -> Self {
        self.options.skip_links = skip;
        self
    }

    /// Set the bulk enumeration buffer size.
    ///
    /// Larger buffers result in fewer syscalls but use more memory.
    /// Default is 64KB; values below 1KB are raised to 1KB.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options.buffer_size = size;
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the walk on the calling thread.
    ///
    /// Returns once every batch has been delivered.
    pub fn run<F>(self, on_batch: F) -> Result<(), Error>
    where
        F: FnMut(Vec<Entry>),
    {
        walker::walk_tree(&self.root, &self.options, on_batch)
    }

    /// Run the walk on a dedicated worker thread.
    ///
    /// `on_batch` is called on the worker for every batch; `on_complete` is
    /// called exactly once afterwards with the terminal result. Returns an
    /// error only if the worker could not be started, in which case neither
    /// callback runs.
    pub fn spawn<B, C>(self, on_batch: B, on_complete: C) -> Result<WalkHandle, Error>
    where
        B: FnMut(Vec<Entry>) + Send + 'static,
        C: FnOnce(Result<(), Error>) + Send + 'static,
    {
        worker::spawn(self.root, self.options, on_batch, on_complete)
    }

    /// Run the walk on a worker and receive batches through a bounded channel.
    ///
    /// The worker blocks once `capacity` batches are waiting, so a slow
    /// consumer throttles the walk instead of buffering the whole tree.
    pub fn stream(self, capacity: usize) -> Result<BatchStream, Error> {
        worker::stream(self.root, self.options, capacity)
    }
}
