//! Depth-first traversal engine.
//!
//! Directories are visited in pre-order: a directory's children are all
//! appended to the sink before any child directory is entered. With
//! terminators enabled, a directory's terminator is appended in post-order,
//! after everything in its subtree.
//!
//! Recursion uses an explicit stack of [`Frame`]s instead of the call stack.
//! Child directories waiting to be visited live in one shared arena
//! (`pending`); a frame only stores the index range of its own children.
//! The directory handle is closed before any child is visited.

use crate::details;
use crate::enumerator::BulkEnumerator;
use crate::entry_points::entry_points;
use crate::error::Error;
use crate::sink::StreamingSink;
use crate::types::{normalize_path, Entry, WalkOptions};
use std::mem;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// One directory on the traversal stack.
struct Frame {
    dir: PathBuf,
    /// Index in `pending` of this directory's first child directory.
    first: usize,
    /// Next child to visit.
    next: usize,
    /// One past this directory's last child directory.
    end: usize,
}

/// Counters reported when a walk finishes.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WalkSummary {
    pub directories: u64,
    pub unreadable: u64,
    pub entries: u64,
    pub batches: u64,
}

struct Traversal<'o, F>
where
    F: FnMut(Vec<Entry>),
{
    options: &'o WalkOptions,
    sink: StreamingSink<F>,
    buffer: Vec<u8>,
    pending: Vec<PathBuf>,
    stack: Vec<Frame>,
    summary: WalkSummary,
}

impl<'o, F> Traversal<'o, F>
where
    F: FnMut(Vec<Entry>),
{
    fn run(mut self, root: PathBuf) -> Result<WalkSummary, Error> {
        let frame = self.visit(root)?;
        self.stack.push(frame);

        loop {
            let next = match self.stack.last_mut() {
                Some(frame) if frame.next < frame.end => {
                    frame.next += 1;
                    Some(mem::take(&mut self.pending[frame.next - 1]))
                }
                Some(_) => None,
                None => break,
            };

            match next {
                Some(child) => {
                    let frame = self.visit(child)?;
                    self.stack.push(frame);
                }
                None => self.complete(),
            }
        }

        let (batches, entries) = self.sink.finish();
        self.summary.batches = batches;
        self.summary.entries = entries;
        Ok(self.summary)
    }

    /// Enumerate `dir`, append its children and queue its subdirectories.
    fn visit(&mut self, dir: PathBuf) -> Result<Frame, Error> {
        self.summary.directories += 1;
        let first = self.pending.len();

        if let Err(err) = self.enumerate(&dir) {
            if err.is_fatal() {
                return Err(err);
            }
            self.summary.unreadable += 1;
            debug!(path = %dir.display(), error = %err, "directory unreadable, treating as empty");
        }

        Ok(Frame {
            dir,
            first,
            next: first,
            end: self.pending.len(),
        })
    }

    fn enumerate(&mut self, dir: &Path) -> Result<(), Error> {
        let buffer = mem::take(&mut self.buffer);
        let mut listing = match BulkEnumerator::open_reusing(dir, buffer) {
            Ok(listing) => listing
                .skip_hidden(self.options.skip_hidden)
                .skip_links(self.options.skip_links),
            Err((err, buffer)) => {
                self.buffer = buffer;
                return Err(err);
            }
        };

        let result = self.drain(&mut listing);
        self.buffer = listing.into_buffer();
        result
    }

    fn drain(&mut self, listing: &mut BulkEnumerator) -> Result<(), Error> {
        while let Some(batch) = listing.next_batch()? {
            for entry in batch {
                let entry = if self.options.details {
                    details::with_details(entry)
                } else {
                    entry
                };

                if self.options.recurse && entry.is_directory() {
                    self.pending.push(entry.path().to_path_buf());
                }
                self.sink.push(entry);
            }
        }
        Ok(())
    }

    /// Pop the finished frame, release its arena slots and emit its terminator.
    fn complete(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.pending.truncate(frame.first);
            if self.options.terminators {
                self.sink.push(Entry::terminator(frame.dir));
            }
        }
    }
}

/// Walk `base` on the current thread, handing batches to `on_batch`.
pub(crate) fn walk_tree<F>(base: &Path, options: &WalkOptions, on_batch: F) -> Result<(), Error>
where
    F: FnMut(Vec<Entry>),
{
    let started = Instant::now();
    entry_points()?;

    let root = normalize_path(base);
    debug!(root = %root.display(), ?options, "starting walk");

    let traversal = Traversal {
        options,
        sink: StreamingSink::new(options.effective_threshold(), on_batch),
        buffer: vec![0u8; options.effective_buffer_size()],
        pending: Vec::new(),
        stack: Vec::new(),
        summary: WalkSummary::default(),
    };
    let summary = traversal.run(root)?;

    debug!(
        directories = summary.directories,
        unreadable = summary.unreadable,
        entries = summary.entries,
        batches = summary.batches,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "walk finished"
    );
    Ok(())
}
