//! Buffer parsing for bulk directory enumeration results.
//!
//! Both kernels fill the caller's buffer with back-to-back variable-length
//! records. Parsers here only walk offsets and bounds-check every read;
//! they never trust a length field without checking it against the buffer.
//!
//! # Linux (`getdents64`)
//!
//! ```text
//! +------------------+
//! | d_ino    (u64)   |  offset 0
//! | d_off    (i64)   |  offset 8
//! | d_reclen (u16)   |  offset 16, total length of this record
//! | d_type   (u8)    |  offset 18
//! | d_name           |  offset 19, NUL terminated, padded to d_reclen
//! +------------------+
//! ```
//!
//! # macOS (`getattrlistbulk`)
//!
//! ```text
//! +------------------+
//! | length (u32)     |  Total length of this entry
//! +------------------+
//! | attribute_set    |  Which attributes are present (20 bytes)
//! +------------------+
//! | fixed attrs      |  Fixed-size attributes in order
//! +------------------+
//! | variable data    |  Name bytes, located by an attrreference
//! +------------------+
//! ```

use crate::error::ParseError;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) use self::dirent::{DirentParser, DirentRecord};
#[cfg(target_os = "macos")]
pub(crate) use self::attr::{AttrBufferParser, AttrRecord};

fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N], ParseError> {
    let end = offset.checked_add(N).ok_or(ParseError::UnexpectedEnd)?;
    buffer
        .get(offset..end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ParseError::UnexpectedEnd)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn read_u16(buffer: &[u8], offset: usize) -> Result<u16, ParseError> {
    read_array(buffer, offset).map(u16::from_ne_bytes)
}

#[cfg(target_os = "macos")]
fn read_u32(buffer: &[u8], offset: usize) -> Result<u32, ParseError> {
    read_array(buffer, offset).map(u32::from_ne_bytes)
}

#[cfg(target_os = "macos")]
fn read_i32(buffer: &[u8], offset: usize) -> Result<i32, ParseError> {
    read_array(buffer, offset).map(i32::from_ne_bytes)
}

#[cfg(target_os = "macos")]
fn read_u64(buffer: &[u8], offset: usize) -> Result<u64, ParseError> {
    read_array(buffer, offset).map(u64::from_ne_bytes)
}

#[cfg(target_os = "macos")]
fn read_i64(buffer: &[u8], offset: usize) -> Result<i64, ParseError> {
    read_array(buffer, offset).map(i64::from_ne_bytes)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod dirent {
    use super::*;
    use crate::ffi::{D_NAME, D_RECLEN, D_TYPE};
    use std::ffi::CStr;

    /// One `linux_dirent64` record.
    #[derive(Debug, PartialEq, Eq)]
    pub(crate) struct DirentRecord<'a> {
        pub name: &'a CStr,
        /// `DT_*` file type, `DT_UNKNOWN` on filesystems that do not fill it.
        pub d_type: u8,
    }

    /// Parser for a `getdents64` result buffer.
    ///
    /// After the first error the parser is exhausted.
    pub(crate) struct DirentParser<'a> {
        buffer: &'a [u8],
        offset: usize,
    }

    impl<'a> DirentParser<'a> {
        /// `buffer` must hold exactly the bytes the kernel reported as filled.
        pub fn new(buffer: &'a [u8]) -> Self {
            Self { buffer, offset: 0 }
        }

        pub fn next_record(&mut self) -> Option<Result<DirentRecord<'a>, ParseError>> {
            if self.offset >= self.buffer.len() {
                return None;
            }

            let result = self.parse_record();
            if result.is_err() {
                self.offset = self.buffer.len();
            }
            Some(result)
        }

        fn parse_record(&mut self) -> Result<DirentRecord<'a>, ParseError> {
            let start = self.offset;
            let reclen = usize::from(read_u16(self.buffer, start + D_RECLEN)?);

            if reclen <= D_NAME {
                return Err(ParseError::InvalidRecordLength);
            }

            let end = start + reclen;
            if end > self.buffer.len() {
                return Err(ParseError::BufferTooSmall);
            }

            let name = CStr::from_bytes_until_nul(&self.buffer[start + D_NAME..end])
                .map_err(|_| ParseError::UnterminatedName)?;

            self.offset = end;
            Ok(DirentRecord {
                name,
                d_type: self.buffer[start + D_TYPE],
            })
        }
    }

}

#[cfg(target_os = "macos")]
mod attr {
    use super::*;
    use crate::ffi;

    /// Decoded fixed attributes of one `getattrlistbulk` record.
    ///
    /// Field order matches [`ffi::walk_attrlist`]: name, object type,
    /// modification time, flags, then total size.
    #[derive(Debug)]
    pub(crate) struct AttrRecord<'a> {
        pub name: &'a [u8],
        pub object_type: Option<u32>,
        pub mtime: Option<i64>,
        pub flags: Option<u32>,
        pub size: Option<u64>,
    }

    /// Parser for a `getattrlistbulk` result buffer holding `count` records.
    pub(crate) struct AttrBufferParser<'a> {
        buffer: &'a [u8],
        offset: usize,
        remaining: usize,
    }

    impl<'a> AttrBufferParser<'a> {
        pub fn new(buffer: &'a [u8], count: usize) -> Self {
            Self {
                buffer,
                offset: 0,
                remaining: count,
            }
        }

        /// Returns `None` once `count` records were read or after an error.
        pub fn next_record(&mut self) -> Option<Result<AttrRecord<'a>, ParseError>> {
            if self.remaining == 0 {
                return None;
            }

            let result = self.parse_record();
            self.remaining = if result.is_ok() { self.remaining - 1 } else { 0 };
            Some(result)
        }

        fn parse_record(&mut self) -> Result<AttrRecord<'a>, ParseError> {
            let start = self.offset;
            let length = read_u32(self.buffer, start)? as usize;
            if length == 0 {
                return Err(ParseError::InvalidRecordLength);
            }
            let end = start + length;
            if end > self.buffer.len() {
                return Err(ParseError::BufferTooSmall);
            }
            let record = &self.buffer[..end];

            let mut offset = start + 4;
            let returned = self.read_attribute_set(offset)?;
            offset += std::mem::size_of::<ffi::attribute_set>();

            // With FSOPT_PACK_INVAL_ATTRS every requested attribute occupies
            // its slot; the returned bitmap only says which ones are valid.
            let common = ffi::CommonAttr::from_bits_truncate(returned.commonattr);
            let file = ffi::FileAttr::from_bits_truncate(returned.fileattr);

            if !common.contains(ffi::CommonAttr::NAME) {
                return Err(ParseError::InvalidOffset);
            }
            let name = parse_attrreference(record, offset, start)?;
            offset += 8;

            let object_type = read_u32(record, offset)?;
            offset += 4;

            // timespec: tv_sec (i64) + tv_nsec (i64) on 64-bit
            let mtime = read_i64(record, offset)?;
            offset += 16;

            let flags = read_u32(record, offset)?;
            offset += 4;

            let size = read_u64(record, offset).ok();

            self.offset = end;
            Ok(AttrRecord {
                name,
                object_type: common.contains(ffi::CommonAttr::OBJTYPE).then_some(object_type),
                mtime: common.contains(ffi::CommonAttr::MODTIME).then_some(mtime),
                flags: common.contains(ffi::CommonAttr::FLAGS).then_some(flags),
                size: size.filter(|_| file.contains(ffi::FileAttr::TOTALSIZE)),
            })
        }

        fn read_attribute_set(&self, offset: usize) -> Result<ffi::attribute_set, ParseError> {
            Ok(ffi::attribute_set {
                commonattr: read_u32(self.buffer, offset)?,
                volattr: read_u32(self.buffer, offset + 4)?,
                dirattr: read_u32(self.buffer, offset + 8)?,
                fileattr: read_u32(self.buffer, offset + 12)?,
                forkattr: read_u32(self.buffer, offset + 16)?,
            })
        }
    }

    /// Resolve an attrreference (offset i32 + length u32) to the name bytes,
    /// which must lie inside the record. The offset is relative to the
    /// attrreference itself. A trailing NUL is stripped.
    fn parse_attrreference(
        record: &[u8],
        ref_offset: usize,
        record_start: usize,
    ) -> Result<&[u8], ParseError> {
        let data_offset = read_i32(record, ref_offset)?;
        let data_length = read_u32(record, ref_offset + 4)? as usize;

        let name_start = (ref_offset as i64 + i64::from(data_offset)) as usize;
        let name_end = name_start
            .checked_add(data_length)
            .ok_or(ParseError::InvalidOffset)?;

        if name_start < record_start || name_end > record.len() {
            return Err(ParseError::InvalidOffset);
        }

        let bytes = &record[name_start..name_end];
        Ok(match bytes.iter().position(|&b| b == 0) {
            Some(nul) => &bytes[..nul],
            None => bytes,
        })
    }

}
