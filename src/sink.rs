//! Threshold-based batching of produced entries.

use crate::types::Entry;
use std::mem;

/// Append-only buffer that hands full batches to a callback.
///
/// Every batch delivered before [`finish`](Self::finish) holds exactly
/// `threshold` entries; the final one holds the remainder and is skipped
/// when empty.
pub(crate) struct StreamingSink<F>
where
    F: FnMut(Vec<Entry>),
{
    buffer: Vec<Entry>,
    threshold: usize,
    on_batch: F,
    batches: u64,
    entries: u64,
}

impl<F> StreamingSink<F>
where
    F: FnMut(Vec<Entry>),
{
    pub(crate) fn new(threshold: usize, on_batch: F) -> Self {
        let threshold = threshold.max(1);
        Self {
            buffer: Vec::with_capacity(threshold),
            threshold,
            on_batch,
            batches: 0,
            entries: 0,
        }
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.buffer.push(entry);
        self.entries += 1;
        if self.buffer.len() >= self.threshold {
            self.flush();
        }
    }

    /// Flush whatever is left. Returns `(batches, entries)` delivered.
    pub(crate) fn finish(mut self) -> (u64, u64) {
        if !self.buffer.is_empty() {
            self.flush();
        }
        (self.batches, self.entries)
    }

    fn flush(&mut self) {
        let batch = mem::replace(&mut self.buffer, Vec::with_capacity(self.threshold));
        self.batches += 1;
        (self.on_batch)(batch);
    }
}
