//! Fallback back-end over `std::fs::read_dir`.
//!
//! There is no batched primitive here, so each `read_batch` call pulls a
//! bounded group of entries from the sequential iterator. Ordering and the
//! exhaustion contract are the same as the native back-ends.

use super::{entry_size, RawEntry};
use crate::entry_points::EntryPoints;
use crate::error::Error;
use crate::types::{Attributes, Details};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;

/// Rough size of one native record, used to turn the buffer size into an
/// entry count per call.
const APPROX_RECORD_SIZE: usize = 64;

pub(crate) struct RawDir {
    entries: fs::ReadDir,
}

impl RawDir {
    pub(crate) fn open(path: &Path, _entry_points: &EntryPoints) -> io::Result<Self> {
        Ok(Self {
            entries: fs::read_dir(path)?,
        })
    }

    pub(crate) fn read_batch(
        &mut self,
        buffer: &mut [u8],
        out: &mut Vec<RawEntry>,
    ) -> Result<bool, Error> {
        let limit = (buffer.len() / APPROX_RECORD_SIZE).max(1);
        let mut produced = false;

        for item in self.entries.by_ref().take(limit) {
            produced = true;
            let entry = item.map_err(Error::Syscall)?;

            // DirEntry::metadata does not traverse links.
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    trace!(path = %entry.path().display(), error = %err, "entry vanished before stat");
                    continue;
                }
            };

            let name = entry.file_name();
            let (attributes, mtime) = describe(&name, &metadata);
            out.push(RawEntry {
                size: entry_size(attributes, metadata.len()),
                name,
                attributes,
                mtime,
            });
        }

        Ok(produced)
    }
}

#[cfg(windows)]
fn describe(_name: &OsStr, metadata: &fs::Metadata) -> (Attributes, i64) {
    use std::os::windows::fs::MetadataExt;

    let attributes =
        Attributes::from_bits_truncate(metadata.file_attributes()).difference(Attributes::TERMINATOR);
    (attributes, crate::types::filetime_to_unix(metadata.last_write_time()))
}

#[cfg(unix)]
fn describe(name: &OsStr, metadata: &fs::Metadata) -> (Attributes, i64) {
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::MetadataExt;

    (super::unix_attributes(metadata.mode(), name.as_bytes()), metadata.mtime())
}

#[cfg(not(any(unix, windows)))]
fn describe(_name: &OsStr, metadata: &fs::Metadata) -> (Attributes, i64) {
    let mut attributes = Attributes::empty();
    if metadata.file_type().is_dir() {
        attributes |= Attributes::DIRECTORY;
    }
    if metadata.file_type().is_symlink() {
        attributes |= Attributes::REPARSE_POINT;
    }
    if metadata.permissions().readonly() {
        attributes |= Attributes::READONLY;
    }

    let mtime = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |since| since.as_secs() as i64);
    (attributes, mtime)
}

#[cfg(unix)]
pub(crate) fn query_details(path: &Path) -> io::Result<Details> {
    use std::os::unix::fs::MetadataExt;

    let metadata = fs::symlink_metadata(path)?;
    Ok(Details {
        link_count: metadata.nlink(),
        id: metadata.ino(),
    })
}

#[cfg(not(unix))]
pub(crate) fn query_details(_path: &Path) -> io::Result<Details> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "link count and file id are not exposed on this platform",
    ))
}
