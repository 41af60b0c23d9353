//! Platform back-ends for the bulk directory enumeration primitive.
//!
//! Each back-end exposes the same two items:
//!
//! - `RawDir`: an open directory. `read_batch` issues exactly one bulk
//!   call, decodes every record it returned into `RawEntry` values and
//!   reports `false` once the directory is exhausted.
//! - `query_details`: the secondary per-file metadata query.

use crate::types::Attributes;
use std::ffi::OsString;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) use self::linux::{query_details, RawDir};

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub(crate) use self::macos::{query_details, RawDir};

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
mod portable;
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
pub(crate) use self::portable::{query_details, RawDir};

/// One decoded record, before it is turned into an [`Entry`](crate::Entry).
#[derive(Debug)]
pub(crate) struct RawEntry {
    pub name: OsString,
    pub attributes: Attributes,
    pub size: u64,
    pub mtime: i64,
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
pub(crate) fn is_dot_entry(name: &[u8]) -> bool {
    name == b"." || name == b".."
}

/// Map a Unix mode and file name onto the attribute bits.
///
/// Dot-files count as hidden. Links are never treated as directories.
#[cfg(unix)]
pub(crate) fn unix_attributes(mode: u32, name: &[u8]) -> Attributes {
    let mut attributes = Attributes::empty();

    let file_type = mode & libc::S_IFMT as u32;
    if file_type == libc::S_IFDIR as u32 {
        attributes |= Attributes::DIRECTORY;
    } else if file_type == libc::S_IFLNK as u32 {
        attributes |= Attributes::REPARSE_POINT;
    }

    if name.first() == Some(&b'.') {
        attributes |= Attributes::HIDDEN;
    }
    if mode & 0o222 == 0 {
        attributes |= Attributes::READONLY;
    }

    attributes
}

/// Directories report a size of zero.
pub(crate) fn entry_size(attributes: Attributes, size: u64) -> u64 {
    if attributes.contains(Attributes::DIRECTORY) {
        0
    } else {
        size
    }
}
