//! macOS back-end: `getattrlistbulk`.

use super::{entry_size, is_dot_entry, RawEntry};
use crate::entry_points::EntryPoints;
use crate::error::Error;
use crate::ffi;
use crate::handle::ScopedFd;
use crate::parser::{AttrBufferParser, AttrRecord};
use crate::types::{Attributes, Details};
use std::ffi::OsStr;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// An open directory read with `getattrlistbulk`.
pub(crate) struct RawDir {
    fd: ScopedFd,
    getattrlistbulk: ffi::GetattrlistbulkFn,
}

impl RawDir {
    pub(crate) fn open(path: &Path, entry_points: &EntryPoints) -> io::Result<Self> {
        Ok(Self {
            fd: ScopedFd::open_dir(path)?,
            getattrlistbulk: entry_points.getattrlistbulk,
        })
    }

    /// Issue one `getattrlistbulk` call and decode its records into `out`.
    ///
    /// Returns `Ok(false)` once the directory is exhausted.
    pub(crate) fn read_batch(
        &mut self,
        buffer: &mut [u8],
        out: &mut Vec<RawEntry>,
    ) -> Result<bool, Error> {
        let mut attrlist = ffi::walk_attrlist();
        let options = ffi::FsOptions::PACK_INVAL_ATTRS | ffi::FsOptions::NOFOLLOW;

        let count = loop {
            let result = unsafe {
                (self.getattrlistbulk)(
                    self.fd.raw(),
                    &mut attrlist,
                    buffer.as_mut_ptr().cast(),
                    buffer.len(),
                    options.bits(),
                )
            };
            if result >= 0 {
                break result as usize;
            }

            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EINTR) {
                return Err(Error::Syscall(err));
            }
        };

        if count == 0 {
            return Ok(false);
        }

        let mut parser = AttrBufferParser::new(buffer, count);
        while let Some(record) = parser.next_record() {
            let record = record?;
            if is_dot_entry(record.name) {
                continue;
            }
            out.push(raw_entry(&record));
        }

        Ok(true)
    }
}

fn raw_entry(record: &AttrRecord<'_>) -> RawEntry {
    let mut attributes = Attributes::empty();
    match record.object_type {
        Some(ffi::VDIR) => attributes |= Attributes::DIRECTORY,
        Some(ffi::VLNK) => attributes |= Attributes::REPARSE_POINT,
        _ => {}
    }

    let flagged_hidden = record.flags.is_some_and(|flags| flags & ffi::UF_HIDDEN != 0);
    if flagged_hidden || record.name.first() == Some(&b'.') {
        attributes |= Attributes::HIDDEN;
    }

    RawEntry {
        name: OsStr::from_bytes(record.name).to_os_string(),
        attributes,
        size: entry_size(attributes, record.size.unwrap_or(0)),
        mtime: record.mtime.unwrap_or(0),
    }
}

/// Open `path` for metadata only (links are not followed) and `fstat` it.
pub(crate) fn query_details(path: &Path) -> io::Result<Details> {
    let fd = ScopedFd::open(path, ffi::O_EVTONLY | ffi::O_SYMLINK | libc::O_NONBLOCK)?;
    let st = fd.stat()?;
    Ok(Details {
        link_count: u64::from(st.st_nlink),
        id: st.st_ino,
    })
}
