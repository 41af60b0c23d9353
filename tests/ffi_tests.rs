//! FFI layout tests for the bulk enumeration primitives.
//!
//! The record parsers walk raw byte offsets, so these tests pin the
//! layouts they assume against the system definitions.

#[cfg(any(target_os = "linux", target_os = "android"))]
mod dirent_layout {
    use std::mem::{offset_of, size_of, size_of_val};

    /// Verify the fixed header of linux_dirent64 (19 bytes before d_name)
    #[test]
    fn test_dirent64_header() {
        assert_eq!(offset_of!(libc::dirent64, d_ino), 0);
        assert_eq!(offset_of!(libc::dirent64, d_off), 8);
        assert_eq!(offset_of!(libc::dirent64, d_reclen), 16);
        assert_eq!(offset_of!(libc::dirent64, d_type), 18);
        assert_eq!(offset_of!(libc::dirent64, d_name), 19);
    }

    /// Verify d_reclen is a u16, as the parser reads it
    #[test]
    fn test_dirent64_reclen_width() {
        let entry: libc::dirent64 = unsafe { std::mem::zeroed() };
        assert_eq!(size_of_val(&entry.d_reclen), size_of::<u16>());
    }

    /// Verify the getdents64 syscall number is available
    #[test]
    fn test_getdents64_syscall_number() {
        assert!(libc::SYS_getdents64 > 0);
    }
}

#[cfg(target_os = "macos")]
mod ffi_validation {
    use std::mem::size_of;

    /// Verify attrlist struct size matches C definition (24 bytes)
    #[test]
    fn test_attrlist_size() {
        #[repr(C)]
        struct AttrlistCheck {
            bitmapcount: u16,
            reserved: u16,
            commonattr: u32,
            volattr: u32,
            dirattr: u32,
            fileattr: u32,
            forkattr: u32,
        }
        assert_eq!(size_of::<AttrlistCheck>(), 24);
    }

    /// Verify attribute_set struct size matches C definition (20 bytes)
    #[test]
    fn test_attribute_set_size() {
        #[repr(C)]
        struct AttributeSetCheck {
            commonattr: u32,
            volattr: u32,
            dirattr: u32,
            fileattr: u32,
            forkattr: u32,
        }
        assert_eq!(size_of::<AttributeSetCheck>(), 20);
    }

    /// Verify the common attribute bits the walker requests are distinct
    /// and ordered the way the record parser reads them
    #[test]
    fn test_common_attr_order() {
        const ATTR_CMN_NAME: u32 = 0x00000001;
        const ATTR_CMN_OBJTYPE: u32 = 0x00000008;
        const ATTR_CMN_MODTIME: u32 = 0x00000400;
        const ATTR_CMN_FLAGS: u32 = 0x00040000;

        assert!(ATTR_CMN_NAME < ATTR_CMN_OBJTYPE);
        assert!(ATTR_CMN_OBJTYPE < ATTR_CMN_MODTIME);
        assert!(ATTR_CMN_MODTIME < ATTR_CMN_FLAGS);
        let all = ATTR_CMN_NAME | ATTR_CMN_OBJTYPE | ATTR_CMN_MODTIME | ATTR_CMN_FLAGS;
        assert_eq!(all.count_ones(), 4, "flags should not overlap");
    }

    /// Verify timespec struct size on 64-bit (16 bytes)
    #[test]
    fn test_timespec_size() {
        assert_eq!(size_of::<libc::timespec>(), 16);
    }
}
