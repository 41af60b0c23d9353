//! Process-wide OS entry points, resolved once on first use.
//!
//! The bulk enumeration primitive is looked up at runtime rather than
//! linked, so a missing symbol surfaces as [`Error::EntryPoint`] instead of
//! a load failure.

use crate::error::Error;
use std::sync::OnceLock;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
use crate::ffi;

/// Resolved function pointers for the current platform.
#[derive(Clone, Copy)]
pub(crate) struct EntryPoints {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub getdents64: ffi::GetdentsFn,
    #[cfg(target_os = "macos")]
    pub getattrlistbulk: ffi::GetattrlistbulkFn,
}

static ENTRY_POINTS: OnceLock<Result<EntryPoints, &'static str>> = OnceLock::new();

/// Return the entry points, resolving them on the first call.
pub(crate) fn entry_points() -> Result<&'static EntryPoints, Error> {
    ENTRY_POINTS
        .get_or_init(resolve)
        .as_ref()
        .map_err(|&symbol| Error::EntryPoint { symbol })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn resolve() -> Result<EntryPoints, &'static str> {
    let getdents64 = match lookup(c"getdents64") {
        // SAFETY: glibc and bionic export getdents64 with exactly this signature.
        Some(sym) => unsafe { std::mem::transmute::<*mut libc::c_void, ffi::GetdentsFn>(sym) },
        None => ffi::raw_getdents64,
    };
    Ok(EntryPoints { getdents64 })
}

#[cfg(target_os = "macos")]
fn resolve() -> Result<EntryPoints, &'static str> {
    let sym = lookup(c"getattrlistbulk").ok_or("getattrlistbulk")?;
    // SAFETY: libSystem exports getattrlistbulk with exactly this signature.
    let getattrlistbulk =
        unsafe { std::mem::transmute::<*mut libc::c_void, ffi::GetattrlistbulkFn>(sym) };
    Ok(EntryPoints { getattrlistbulk })
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
fn resolve() -> Result<EntryPoints, &'static str> {
    Ok(EntryPoints {})
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
fn lookup(symbol: &std::ffi::CStr) -> Option<*mut libc::c_void> {
    let sym = unsafe { libc::dlsym(libc::RTLD_DEFAULT, symbol.as_ptr()) };
    (!sym.is_null()).then_some(sym)
}
