//! FFI declarations for the bulk directory enumeration primitives.
//!
//! Reference: `linux_dirent64` in getdents(2), /usr/include/sys/attr.h on macOS.
//!
//! # Safety
//!
//! All FFI functions in this module are unsafe. The safe wrappers
//! live in the `sys` back-ends.

#![allow(non_camel_case_types)]

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) use self::linux::*;
#[cfg(target_os = "macos")]
pub(crate) use self::macos::*;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux {
    /// Signature shared by glibc's `getdents64` and the raw syscall shim.
    pub(crate) type GetdentsFn =
        unsafe extern "C" fn(libc::c_int, *mut libc::c_void, libc::size_t) -> libc::ssize_t;

    // Byte offsets into a `linux_dirent64` record.
    pub(crate) const D_RECLEN: usize = 16;
    pub(crate) const D_TYPE: usize = 18;
    pub(crate) const D_NAME: usize = 19;

    /// Used when libc does not export a `getdents64` wrapper (glibc < 2.30,
    /// static musl).
    pub(crate) unsafe extern "C" fn raw_getdents64(
        fd: libc::c_int,
        buf: *mut libc::c_void,
        len: libc::size_t,
    ) -> libc::ssize_t {
        libc::syscall(libc::SYS_getdents64, fd, buf, len) as libc::ssize_t
    }

}

#[cfg(target_os = "macos")]
mod macos {
    #![allow(dead_code)]

    use bitflags::bitflags;

    /// Attribute list structure for getattrlistbulk
    #[repr(C)]
    pub struct attrlist {
        pub bitmapcount: u16,
        pub reserved: u16,
        pub commonattr: u32,
        pub volattr: u32,
        pub dirattr: u32,
        pub fileattr: u32,
        pub forkattr: u32,
    }

    /// Returned attribute set - indicates which attributes were actually returned
    #[repr(C)]
    pub struct attribute_set {
        pub commonattr: u32,
        pub volattr: u32,
        pub dirattr: u32,
        pub fileattr: u32,
        pub forkattr: u32,
    }

    pub const ATTR_BIT_MAP_COUNT: u16 = 5;

    /// `fsobj_type_t` values from sys/vnode.h.
    pub const VDIR: u32 = 2;
    pub const VLNK: u32 = 5;

    /// BSD `UF_HIDDEN` file flag.
    pub const UF_HIDDEN: u32 = 0x0000_8000;

    /// Open for metadata only; needs no read permission.
    pub const O_EVTONLY: libc::c_int = 0x0000_8000;
    /// Open the link itself instead of its target.
    pub const O_SYMLINK: libc::c_int = 0x0020_0000;

    bitflags! {
        /// Common attributes (commonattr field)
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct CommonAttr: u32 {
            const RETURNED_ATTRS = 0x80000000;
            const NAME = 0x00000001;
            const OBJTYPE = 0x00000008;
            const MODTIME = 0x00000400;
            const FLAGS = 0x00040000;
        }

        /// File-specific attributes (fileattr field)
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct FileAttr: u32 {
            const TOTALSIZE = 0x00000002;
        }

        /// Options for getattrlistbulk
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct FsOptions: u64 {
            const NOFOLLOW = 0x00000001;
            const PACK_INVAL_ATTRS = 0x00000008;
        }
    }

    /// Signature of `getattrlistbulk(2)`, resolved at runtime.
    pub(crate) type GetattrlistbulkFn = unsafe extern "C" fn(
        libc::c_int,
        *mut attrlist,
        *mut libc::c_void,
        libc::size_t,
        u64,
    ) -> libc::c_int;

    /// The attribute list every walk requests.
    pub(crate) fn walk_attrlist() -> attrlist {
        let common = CommonAttr::RETURNED_ATTRS
            | CommonAttr::NAME
            | CommonAttr::OBJTYPE
            | CommonAttr::MODTIME
            | CommonAttr::FLAGS;

        attrlist {
            bitmapcount: ATTR_BIT_MAP_COUNT,
            reserved: 0,
            commonattr: common.bits(),
            volattr: 0,
            dirattr: 0,
            fileattr: FileAttr::TOTALSIZE.bits(),
            forkattr: 0,
        }
    }
}
