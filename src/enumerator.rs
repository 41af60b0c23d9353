//! Batched enumeration of a single directory.
//!
//! [`BulkEnumerator`] owns one open directory handle and one bulk buffer.
//! Every call to [`next_batch`](BulkEnumerator::next_batch) issues exactly
//! one bulk system call, so the number of calls per directory is roughly
//! `total record bytes / buffer size` instead of one per entry.

use crate::entry_points::entry_points;
use crate::error::Error;
use crate::sys::{self, RawEntry};
use crate::types::{Attributes, Entry, DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
use globset::GlobMatcher;
use std::path::{Path, PathBuf};

/// Batched reader for the direct children of one directory.
///
/// "." and ".." are never produced. The handle is released when the
/// enumerator is dropped.
///
/// # Example
///
/// ```no_run
/// use turbowalk::BulkEnumerator;
///
/// let mut listing = BulkEnumerator::open("/var/log")?.skip_hidden(false);
/// while let Some(batch) = listing.next_batch()? {
///     for entry in batch {
///         println!("{} ({} bytes)", entry.path().display(), entry.size());
///     }
/// }
/// # Ok::<(), turbowalk::Error>(())
/// ```
pub struct BulkEnumerator {
    dir: PathBuf,
    raw: sys::RawDir,
    buffer: Vec<u8>,
    records: Vec<RawEntry>,
    pattern: Option<GlobMatcher>,
    skip_hidden: bool,
    skip_links: bool,
    exhausted: bool,
}

impl BulkEnumerator {
    /// Open `dir` with a default-sized buffer.
    ///
    /// Hidden entries are skipped unless [`skip_hidden(false)`](Self::skip_hidden)
    /// is set.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        Self::with_buffer(dir, vec![0u8; DEFAULT_BUFFER_SIZE])
    }

    /// Open `dir`, reusing `buffer` for the bulk calls.
    ///
    /// Buffers shorter than 1 KiB are grown. Use [`into_buffer`](Self::into_buffer)
    /// to get it back.
    pub fn with_buffer<P: AsRef<Path>>(dir: P, buffer: Vec<u8>) -> Result<Self, Error> {
        Self::open_reusing(dir.as_ref(), buffer).map_err(|(err, _)| err)
    }

    /// Like [`with_buffer`](Self::with_buffer), but hands the buffer back
    /// when the directory cannot be opened.
    pub(crate) fn open_reusing(dir: &Path, mut buffer: Vec<u8>) -> Result<Self, (Error, Vec<u8>)> {
        let entry_points = match entry_points() {
            Ok(entry_points) => entry_points,
            Err(err) => return Err((err, buffer)),
        };
        let dir = dir.to_path_buf();
        let raw = match sys::RawDir::open(&dir, entry_points) {
            Ok(raw) => raw,
            Err(err) => return Err((Error::Open(err), buffer)),
        };

        if buffer.len() < MIN_BUFFER_SIZE {
            buffer.resize(MIN_BUFFER_SIZE, 0);
        }

        Ok(Self {
            dir,
            raw,
            buffer,
            records: Vec::new(),
            pattern: None,
            skip_hidden: true,
            skip_links: false,
            exhausted: false,
        })
    }

    /// Drop entries carrying the hidden attribute.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Drop symlinks / reparse points.
    pub fn skip_links(mut self, skip: bool) -> Self {
        self.skip_links = skip;
        self
    }

    /// Only produce entries whose name matches `pattern`.
    pub fn pattern(mut self, pattern: GlobMatcher) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// The directory being enumerated.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Issue one bulk call and return the entries it produced.
    ///
    /// A returned batch may be empty when every record was filtered out.
    /// Returns `Ok(None)` once the directory is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<Vec<Entry>>, Error> {
        if self.exhausted {
            return Ok(None);
        }

        #[cfg(test)]
        failpoint::check(&self.dir)?;

        self.records.clear();
        if !self.raw.read_batch(&mut self.buffer, &mut self.records)? {
            self.exhausted = true;
            return Ok(None);
        }

        let mut rejected = Attributes::empty();
        if self.skip_hidden {
            rejected |= Attributes::HIDDEN;
        }
        if self.skip_links {
            rejected |= Attributes::REPARSE_POINT;
        }

        let batch = self
            .records
            .drain(..)
            .filter(|record| !record.attributes.intersects(rejected))
            .filter(|record| {
                self.pattern
                    .as_ref()
                    .map_or(true, |pattern| pattern.is_match(&record.name))
            })
            .map(|record| {
                Entry::new(
                    self.dir.join(&record.name),
                    record.attributes,
                    record.size,
                    record.mtime,
                )
            })
            .collect();

        Ok(Some(batch))
    }

    /// Release the directory handle and return the bulk buffer.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// Test hook that makes enumeration of chosen directories fail fatally.
#[cfg(test)]
pub(crate) mod failpoint {
    use crate::error::Error;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    static CORRUPT_DIRS: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

    /// Report a corrupt bulk buffer whenever `dir` is read.
    pub(crate) fn corrupt(dir: &Path) {
        if let Ok(mut dirs) = CORRUPT_DIRS.lock() {
            dirs.push(dir.to_path_buf());
        }
    }

    pub(super) fn check(dir: &Path) -> Result<(), Error> {
        let corrupt = CORRUPT_DIRS
            .lock()
            .map(|dirs| dirs.iter().any(|d| d == dir))
            .unwrap_or(false);
        if corrupt {
            return Err(Error::Parse(format!("corrupt record in {}", dir.display())));
        }
        Ok(())
    }
}
