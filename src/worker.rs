//! Worker thread and delivery surfaces.
//!
//! A walk runs start to finish on one dedicated thread. Batches reach the
//! caller either through a callback invoked on that thread or through a
//! bounded channel ([`BatchStream`]). There is no way to cancel a walk.

use crate::error::Error;
use crate::types::{Entry, WalkOptions};
use crate::walker;
use crossbeam_channel::{bounded, Receiver};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tracing::warn;

const WORKER_NAME: &str = "turbowalk";

/// Handle to a walk running on its worker thread.
#[derive(Debug)]
pub struct WalkHandle {
    thread: JoinHandle<()>,
}

impl WalkHandle {
    /// Whether the worker has finished, completion callback included.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the worker exits.
    ///
    /// The walk result itself goes to the completion callback; this only
    /// fails if the completion callback panicked.
    pub fn join(self) -> Result<(), Error> {
        self.thread
            .join()
            .map_err(|payload| Error::Panicked(panic_message(payload.as_ref())))
    }
}

pub(crate) fn spawn<B, C>(
    root: PathBuf,
    options: WalkOptions,
    mut on_batch: B,
    on_complete: C,
) -> Result<WalkHandle, Error>
where
    B: FnMut(Vec<Entry>) + Send + 'static,
    C: FnOnce(Result<(), Error>) + Send + 'static,
{
    let thread = thread::Builder::new()
        .name(WORKER_NAME.into())
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                walker::walk_tree(&root, &options, &mut on_batch)
            }))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                warn!(root = %root.display(), panic = %message, "walk aborted by panic");
                Err(Error::Panicked(message))
            });
            on_complete(outcome);
        })
        .map_err(Error::Spawn)?;

    Ok(WalkHandle { thread })
}

enum WalkEvent {
    Batch(Vec<Entry>),
    Complete(Result<(), Error>),
}

/// Iterator over the batches of a walk running on a worker thread.
///
/// Yields `Ok(batch)` for every batch in order. A fatal failure is yielded
/// once as `Err`, after which the iterator ends. Dropping the stream early
/// does not stop the worker; its remaining batches are discarded.
///
/// # Example
///
/// ```no_run
/// use turbowalk::Walker;
///
/// let mut files = 0;
/// for batch in Walker::new("/usr/share").stream(4)? {
///     files += batch?.iter().filter(|e| !e.is_directory()).count();
/// }
/// println!("{files} files");
/// # Ok::<(), turbowalk::Error>(())
/// ```
pub struct BatchStream {
    events: Receiver<WalkEvent>,
    handle: Option<WalkHandle>,
}

impl BatchStream {
    /// Wait for the worker thread to exit after the stream has ended.
    pub fn join(mut self) -> Result<(), Error> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Iterator for BatchStream {
    type Item = Result<Vec<Entry>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.events.recv() {
            Ok(WalkEvent::Batch(batch)) => Some(Ok(batch)),
            Ok(WalkEvent::Complete(Err(err))) => Some(Err(err)),
            Ok(WalkEvent::Complete(Ok(()))) | Err(_) => None,
        }
    }
}

pub(crate) fn stream(root: PathBuf, options: WalkOptions, capacity: usize) -> Result<BatchStream, Error> {
    let (tx, events) = bounded(capacity);
    let batch_tx = tx.clone();

    let handle = spawn(
        root,
        options,
        move |batch| {
            // A dropped receiver only means nobody is listening any more.
            let _ = batch_tx.send(WalkEvent::Batch(batch));
        },
        move |result| {
            let _ = tx.send(WalkEvent::Complete(result));
        },
    )?;

    Ok(BatchStream {
        events,
        handle: Some(handle),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
