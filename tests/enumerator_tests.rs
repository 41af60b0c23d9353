//! Integration tests for single-directory bulk enumeration.

use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;
use turbowalk::{BulkEnumerator, Entry, Error, MIN_BUFFER_SIZE};

fn names(entries: &[Entry]) -> BTreeSet<String> {
    entries
        .iter()
        .map(|e| {
            e.path()
                .file_name()
                .expect("file name")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

fn drain(mut listing: BulkEnumerator) -> (usize, Vec<Entry>) {
    let mut calls = 0;
    let mut entries = Vec::new();
    while let Some(batch) = listing.next_batch().expect("next batch") {
        calls += 1;
        entries.extend(batch);
    }
    (calls, entries)
}

#[test]
fn test_open_missing_directory() {
    let dir = tempdir().expect("create temp dir");
    let err = BulkEnumerator::open(dir.path().join("missing"))
        .err()
        .expect("open should fail");
    assert!(matches!(err, Error::Open(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_open_regular_file() {
    let dir = tempdir().expect("create temp dir");
    let file = dir.path().join("plain.txt");
    fs::write(&file, "text").expect("write file");

    let err = BulkEnumerator::open(&file).err().expect("open should fail");
    assert!(matches!(err, Error::Open(_)));
}

#[test]
fn test_small_buffer_needs_several_calls() {
    let dir = tempdir().expect("create temp dir");
    for i in 0..200 {
        let name = format!("textures_landscape_tundra_variant_{i:03}.dds");
        fs::write(dir.path().join(name), "").expect("write file");
    }

    let listing =
        BulkEnumerator::with_buffer(dir.path(), vec![0u8; MIN_BUFFER_SIZE]).expect("open");
    let (calls, entries) = drain(listing);

    assert_eq!(entries.len(), 200);
    assert!(calls > 1, "expected several bulk calls, got {calls}");
    assert_eq!(names(&entries).len(), 200);
}

#[test]
fn test_dot_entries_never_returned() {
    let dir = tempdir().expect("create temp dir");
    fs::create_dir(dir.path().join("sub")).expect("create dir");

    let listing = BulkEnumerator::open(dir.path())
        .expect("open")
        .skip_hidden(false);
    let (_, entries) = drain(listing);

    assert_eq!(names(&entries), BTreeSet::from(["sub".to_string()]));
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().expect("create temp dir");
    let (_, entries) = drain(BulkEnumerator::open(dir.path()).expect("open"));
    assert!(entries.is_empty());
}

#[cfg(unix)]
#[test]
fn test_hidden_filtering() {
    let dir = tempdir().expect("create temp dir");
    fs::write(dir.path().join("visible.esp"), "").expect("write file");
    fs::write(dir.path().join(".hidden.esp"), "").expect("write file");

    let (_, entries) = drain(BulkEnumerator::open(dir.path()).expect("open"));
    assert_eq!(names(&entries), BTreeSet::from(["visible.esp".to_string()]));

    let listing = BulkEnumerator::open(dir.path())
        .expect("open")
        .skip_hidden(false);
    let (_, entries) = drain(listing);
    assert_eq!(entries.len(), 2);
    let hidden = entries
        .iter()
        .find(|e| e.path().ends_with(".hidden.esp"))
        .expect("hidden entry");
    assert!(hidden.is_hidden());
}

#[test]
fn test_pattern_filters_names() {
    let dir = tempdir().expect("create temp dir");
    for name in ["Skyrim.esm", "Update.esm", "MyMod.esp", "Other.esp", "readme.txt"] {
        fs::write(dir.path().join(name), "").expect("write file");
    }
    fs::create_dir(dir.path().join("meshes.esp")).expect("create dir");

    let matcher = globset::Glob::new("*.esp")
        .expect("valid glob")
        .compile_matcher();
    let listing = BulkEnumerator::open(dir.path())
        .expect("open")
        .pattern(matcher);
    let (_, entries) = drain(listing);

    assert_eq!(
        names(&entries),
        BTreeSet::from([
            "MyMod.esp".to_string(),
            "Other.esp".to_string(),
            "meshes.esp".to_string()
        ])
    );
    let directory = entries
        .iter()
        .find(|e| e.path().ends_with("meshes.esp"))
        .expect("directory");
    assert!(directory.is_directory());
}

#[test]
fn test_entries_are_joined_to_dir() {
    let dir = tempdir().expect("create temp dir");
    fs::write(dir.path().join("data.bin"), vec![0u8; 4096]).expect("write file");

    let listing = BulkEnumerator::open(dir.path()).expect("open");
    assert_eq!(listing.dir(), dir.path());
    let (_, entries) = drain(listing);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path(), dir.path().join("data.bin"));
    assert_eq!(entries[0].size(), 4096);
    assert!(entries[0].mtime() > 0);
    assert!(!entries[0].is_terminator());
}

#[cfg(unix)]
#[test]
fn test_skip_links() {
    let dir = tempdir().expect("create temp dir");
    fs::write(dir.path().join("target.txt"), "x").expect("write file");
    std::os::unix::fs::symlink(dir.path().join("target.txt"), dir.path().join("link.txt"))
        .expect("symlink");

    let (_, entries) = drain(BulkEnumerator::open(dir.path()).expect("open"));
    assert_eq!(entries.len(), 2);

    let listing = BulkEnumerator::open(dir.path())
        .expect("open")
        .skip_links(true);
    let (_, entries) = drain(listing);
    assert_eq!(names(&entries), BTreeSet::from(["target.txt".to_string()]));
}
