//! Public types: the [`Entry`] record, its [`Attributes`] and the
//! [`WalkOptions`] configuration.

use bitflags::bitflags;
use std::path::{Path, PathBuf};

/// 100ns ticks between the Windows epoch (1601-01-01) and the Unix epoch.
pub const WINDOWS_TO_UNIX_EPOCH_TICKS: u64 = 0x019D_B1DE_D53E_8000;

/// 100ns ticks per second.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Convert a native 100ns-tick timestamp (FILETIME) to Unix seconds.
///
/// # Example
///
/// ```
/// // 2020-01-01T00:00:00Z
/// assert_eq!(turbowalk::filetime_to_unix(132_223_104_000_000_000), 1_577_836_800);
/// ```
pub fn filetime_to_unix(ticks: u64) -> i64 {
    let since_unix = i128::from(ticks) - i128::from(WINDOWS_TO_UNIX_EPOCH_TICKS);
    since_unix.div_euclid(i128::from(TICKS_PER_SECOND)) as i64
}

bitflags! {
    /// Attribute bits of an [`Entry`].
    ///
    /// Values follow the Windows `FILE_ATTRIBUTE_*` constants on every
    /// platform, with the high bit reserved for terminators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u32 {
        const READONLY = 0x0000_0001;
        const HIDDEN = 0x0000_0002;
        const DIRECTORY = 0x0000_0010;
        const REPARSE_POINT = 0x0000_0400;
        /// Synthetic marker: the subtree of `path` is complete.
        const TERMINATOR = 0x8000_0000;
    }
}

/// One filesystem object produced by a walk.
///
/// Entries are immutable; ownership moves to the batch callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: PathBuf,
    attributes: Attributes,
    size: u64,
    mtime: i64,
    link_count: Option<u64>,
    id: Option<u64>,
}

impl Entry {
    pub(crate) fn new(path: PathBuf, attributes: Attributes, size: u64, mtime: i64) -> Self {
        Self {
            path,
            attributes,
            size,
            mtime,
            link_count: None,
            id: None,
        }
    }

    /// Marker for a directory whose subtree has been fully delivered.
    pub(crate) fn terminator(path: PathBuf) -> Self {
        Self::new(path, Attributes::TERMINATOR, 0, 0)
    }

    pub(crate) fn with_details(mut self, details: Option<Details>) -> Self {
        if let Some(details) = details {
            self.link_count = Some(details.link_count);
            self.id = Some(details.id);
        }
        self
    }

    /// Absolute path of the object.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the entry, keeping only its path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }

    pub fn attributes(&self) -> Attributes {
        self.attributes
    }

    /// Size in bytes. Zero for directories and terminators.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last write time in seconds since the Unix epoch.
    pub fn mtime(&self) -> i64 {
        self.mtime
    }

    /// Hard link count. Only set when details were requested and the
    /// secondary query succeeded.
    pub fn link_count(&self) -> Option<u64> {
        self.link_count
    }

    /// Platform-unique file id (inode / file index). Same availability as
    /// [`link_count`](Self::link_count).
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn is_directory(&self) -> bool {
        self.attributes.contains(Attributes::DIRECTORY)
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.contains(Attributes::HIDDEN)
    }

    pub fn is_reparse_point(&self) -> bool {
        self.attributes.contains(Attributes::REPARSE_POINT)
    }

    pub fn is_terminator(&self) -> bool {
        self.attributes.contains(Attributes::TERMINATOR)
    }
}

/// Extended metadata from the detail query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Details {
    pub link_count: u64,
    pub id: u64,
}

/// Default number of entries per delivered batch.
pub const DEFAULT_THRESHOLD: usize = 1024;

/// Default size of the bulk enumeration buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest bulk buffer the enumerator will use.
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Walk configuration.
///
/// # Example
///
/// ```
/// use turbowalk::WalkOptions;
///
/// let options = WalkOptions {
///     terminators: true,
///     skip_hidden: false,
///     ..Default::default()
/// };
/// assert_eq!(options.threshold, 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Batch size that triggers a flush. `0` behaves like `1`.
    pub threshold: usize,
    /// Emit a terminator entry once a directory's subtree is complete.
    pub terminators: bool,
    /// Query link count and file id for every entry.
    pub details: bool,
    /// Descend into child directories.
    pub recurse: bool,
    /// Drop hidden entries from output and recursion.
    pub skip_hidden: bool,
    /// Drop symlinks / reparse points from output and recursion.
    pub skip_links: bool,
    /// Byte size of the bulk enumeration buffer.
    pub buffer_size: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            terminators: false,
            details: false,
            recurse: true,
            skip_hidden: true,
            skip_links: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl WalkOptions {
    pub(crate) fn effective_threshold(&self) -> usize {
        self.threshold.max(1)
    }

    pub(crate) fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(MIN_BUFFER_SIZE)
    }
}

/// Make `path` absolute and drop `.` components and trailing separators.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute.components().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filetime_2020() {
        let ticks = WINDOWS_TO_UNIX_EPOCH_TICKS + 1_577_836_800 * TICKS_PER_SECOND;
        assert_eq!(ticks, 132_223_104_000_000_000);
        assert_eq!(filetime_to_unix(ticks), 1_577_836_800);
    }

    #[test]
    fn test_filetime_epoch_and_truncation() {
        assert_eq!(filetime_to_unix(WINDOWS_TO_UNIX_EPOCH_TICKS), 0);
        assert_eq!(filetime_to_unix(WINDOWS_TO_UNIX_EPOCH_TICKS + TICKS_PER_SECOND - 1), 0);
        assert_eq!(filetime_to_unix(WINDOWS_TO_UNIX_EPOCH_TICKS - 1), -1);
        assert_eq!(filetime_to_unix(0), -11_644_473_600);
    }

    #[test]
    fn test_default_options() {
        let options = WalkOptions::default();
        assert_eq!(options.threshold, 1024);
        assert!(!options.terminators);
        assert!(!options.details);
        assert!(options.recurse);
        assert!(options.skip_hidden);
        assert!(!options.skip_links);
    }

    #[test]
    fn test_effective_limits() {
        let options = WalkOptions {
            threshold: 0,
            buffer_size: 16,
            ..Default::default()
        };
        assert_eq!(options.effective_threshold(), 1);
        assert_eq!(options.effective_buffer_size(), MIN_BUFFER_SIZE);
    }

    #[test]
    fn test_terminator_carries_only_path() {
        let entry = Entry::terminator(PathBuf::from("/data/mods"));
        assert!(entry.is_terminator());
        assert!(!entry.is_directory());
        assert_eq!(entry.attributes(), Attributes::TERMINATOR);
        assert_eq!(entry.size(), 0);
        assert_eq!(entry.mtime(), 0);
        assert_eq!(entry.link_count(), None);
        assert_eq!(entry.id(), None);
    }

    #[test]
    fn test_details_attach() {
        let entry = Entry::new(PathBuf::from("/a"), Attributes::empty(), 3, 7)
            .with_details(Some(Details { link_count: 2, id: 99 }));
        assert_eq!(entry.link_count(), Some(2));
        assert_eq!(entry.id(), Some(99));

        let bare = Entry::new(PathBuf::from("/a"), Attributes::empty(), 3, 7).with_details(None);
        assert_eq!(bare.link_count(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/tmp/./a/")), PathBuf::from("/tmp/a"));
        assert_eq!(normalize_path(Path::new("/")), PathBuf::from("/"));
        assert!(normalize_path(Path::new("relative")).is_absolute());
    }
}
