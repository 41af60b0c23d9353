//! Linux back-end: `getdents64` plus one `fstatat` per record.

use super::{entry_size, is_dot_entry, unix_attributes, RawEntry};
use crate::entry_points::EntryPoints;
use crate::error::Error;
use crate::ffi;
use crate::handle::ScopedFd;
use crate::parser::{DirentParser, DirentRecord};
use crate::types::{Attributes, Details};
use std::ffi::OsStr;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::trace;

/// An open directory read with `getdents64`.
pub(crate) struct RawDir {
    fd: ScopedFd,
    getdents: ffi::GetdentsFn,
}

impl RawDir {
    pub(crate) fn open(path: &Path, entry_points: &EntryPoints) -> io::Result<Self> {
        Ok(Self {
            fd: ScopedFd::open_dir(path)?,
            getdents: entry_points.getdents64,
        })
    }

    /// Issue one `getdents64` call and decode its records into `out`.
    ///
    /// Returns `Ok(false)` once the directory is exhausted.
    pub(crate) fn read_batch(
        &mut self,
        buffer: &mut [u8],
        out: &mut Vec<RawEntry>,
    ) -> Result<bool, Error> {
        let filled = loop {
            let result = unsafe {
                (self.getdents)(self.fd.raw(), buffer.as_mut_ptr().cast(), buffer.len())
            };
            if result >= 0 {
                break result as usize;
            }

            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EINTR) {
                return Err(Error::Syscall(err));
            }
        };

        if filled == 0 {
            return Ok(false);
        }

        let mut parser = DirentParser::new(&buffer[..filled]);
        while let Some(record) = parser.next_record() {
            let record = record?;
            let bytes = record.name.to_bytes();
            if is_dot_entry(bytes) {
                continue;
            }

            let entry = match self.fd.stat_child(record.name) {
                Ok(st) => {
                    let attributes = unix_attributes(st.st_mode as u32, bytes);
                    RawEntry {
                        name: OsStr::from_bytes(bytes).to_os_string(),
                        attributes,
                        size: entry_size(attributes, st.st_size as u64),
                        mtime: st.st_mtime as i64,
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    trace!(name = %String::from_utf8_lossy(bytes), "entry vanished before stat");
                    continue;
                }
                // Listable but not searchable: keep what the record itself says.
                Err(err) => {
                    trace!(name = %String::from_utf8_lossy(bytes), error = %err, "stat failed, using listed type");
                    listed_entry(&record)
                }
            };
            out.push(entry);
        }

        Ok(true)
    }
}

/// Build an entry from the record alone, with no size or mtime.
fn listed_entry(record: &DirentRecord<'_>) -> RawEntry {
    let bytes = record.name.to_bytes();
    RawEntry {
        name: OsStr::from_bytes(bytes).to_os_string(),
        attributes: listed_attributes(record.d_type, bytes),
        size: 0,
        mtime: 0,
    }
}

fn listed_attributes(d_type: u8, name: &[u8]) -> Attributes {
    let mut attributes = match d_type {
        libc::DT_DIR => Attributes::DIRECTORY,
        libc::DT_LNK => Attributes::REPARSE_POINT,
        _ => Attributes::empty(),
    };
    if name.first() == Some(&b'.') {
        attributes |= Attributes::HIDDEN;
    }
    attributes
}

/// Open `path` itself (never its link target) and `fstat` it.
pub(crate) fn query_details(path: &Path) -> io::Result<Details> {
    let fd = ScopedFd::open(path, libc::O_PATH | libc::O_NOFOLLOW)?;
    let st = fd.stat()?;
    Ok(Details {
        link_count: st.st_nlink as u64,
        id: st.st_ino as u64,
    })
}
