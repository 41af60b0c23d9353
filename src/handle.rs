//! Scoped file descriptors.
//!
//! Every descriptor the walker opens is owned by a [`ScopedFd`], which
//! closes it on drop. No descriptor outlives the query it was opened for.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

/// Owned descriptor, closed when dropped.
#[derive(Debug)]
pub(crate) struct ScopedFd(RawFd);

impl ScopedFd {
    /// Open `path` with the given `open(2)` flags. `O_CLOEXEC` is always added.
    pub(crate) fn open(path: &Path, flags: libc::c_int) -> io::Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte")
        })?;

        let fd = unsafe { libc::open(c_path.as_ptr(), flags | libc::O_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self(fd))
    }

    /// Open a directory for enumeration.
    pub(crate) fn open_dir(path: &Path) -> io::Result<Self> {
        Self::open(path, libc::O_RDONLY | libc::O_DIRECTORY)
    }

    pub(crate) fn raw(&self) -> RawFd {
        self.0
    }

    /// `fstat` the descriptor.
    pub(crate) fn stat(&self) -> io::Result<libc::stat> {
        let mut st = std::mem::MaybeUninit::<libc::stat>::uninit();
        let rc = unsafe { libc::fstat(self.0, st.as_mut_ptr()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { st.assume_init() })
    }

    /// `fstatat` a child of this directory without following links.
    pub(crate) fn stat_child(&self, name: &std::ffi::CStr) -> io::Result<libc::stat> {
        let mut st = std::mem::MaybeUninit::<libc::stat>::uninit();
        let rc = unsafe {
            libc::fstatat(self.0, name.as_ptr(), st.as_mut_ptr(), libc::AT_SYMLINK_NOFOLLOW)
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { st.assume_init() })
    }
}

impl Drop for ScopedFd {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.0);
        }
    }
}
