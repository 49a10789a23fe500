use dupscan::duplicates::{is_under_root, DuplicateFinder, DuplicateIndex, FinderError};
use dupscan::scanner::Hasher;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Create `primary` and `secondary` trees under one temp dir.
///
/// Paths are canonical because diff results are reported that way.
fn two_roots() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let primary = base.join("A");
    let secondary = base.join("B");
    fs::create_dir(&primary).unwrap();
    fs::create_dir(&secondary).unwrap();
    (dir, primary, secondary)
}

#[test]
fn test_secondary_copy_is_deletable() {
    let (_dir, a, b) = two_roots();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(b.join("z"), b"foo").unwrap();

    let (deletable, summary) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert_eq!(deletable, vec![b.join("z")]);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_different_content_reports_nothing() {
    let (_dir, a, b) = two_roots();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(b.join("z"), b"bar").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert!(deletable.is_empty());
}

#[test]
fn test_secondary_only_duplicates_not_reported() {
    let (_dir, a, b) = two_roots();
    fs::write(a.join("x"), b"primary only").unwrap();
    fs::write(b.join("z1"), b"secondary twin").unwrap();
    fs::write(b.join("z2"), b"secondary twin").unwrap();

    let (deletable, summary) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert!(deletable.is_empty());
    assert_eq!(summary.duplicate_groups, 1);
}

#[test]
fn test_primary_duplicates_never_deletable() {
    let (_dir, a, b) = two_roots();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(a.join("y"), b"foo").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert!(deletable.is_empty());
}

#[test]
fn test_all_secondary_copies_listed() {
    let (_dir, a, b) = two_roots();
    fs::create_dir_all(b.join("nested/deep")).unwrap();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(b.join("z"), b"foo").unwrap();
    fs::write(b.join("nested/deep/w"), b"foo").unwrap();
    fs::write(b.join("nested/other"), b"unrelated").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert_eq!(deletable, vec![b.join("nested/deep/w"), b.join("z")]);
}

#[test]
fn test_empty_primary_yields_no_candidates() {
    let (_dir, a, b) = two_roots();
    fs::write(b.join("z1"), b"foo").unwrap();
    fs::write(b.join("z2"), b"foo").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert!(deletable.is_empty());
}

#[test]
fn test_sibling_with_shared_prefix_is_not_primary() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("photos");
    let b = dir.path().join("photos2");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    fs::write(b.join("z"), b"foo").unwrap();
    fs::write(b.join("w"), b"foo").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();

    assert!(deletable.is_empty());
}

#[test]
fn test_deletable_paths_outside_primary_and_share_content() {
    let (_dir, a, b) = two_roots();
    for i in 0..12 {
        fs::write(a.join(format!("a{i}")), format!("{}", i % 5)).unwrap();
        fs::write(b.join(format!("b{i}")), format!("{}", i % 7)).unwrap();
    }

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &b)
        .unwrap();
    assert!(!deletable.is_empty());

    let hasher = Hasher::new();
    let primary_index = DuplicateIndex::new();
    for entry in fs::read_dir(&a).unwrap() {
        let path = entry.unwrap().path();
        primary_index.insert(hasher.full_hash(&path).unwrap(), path);
    }

    for path in &deletable {
        assert!(!is_under_root(path, &a), "{} is under primary", path.display());
        let hash = hasher.full_hash(path).unwrap();
        assert!(
            primary_index.paths(&hash).is_some(),
            "{} has no primary counterpart",
            path.display()
        );
    }
}

#[test]
fn test_secondary_inside_primary_rejected() {
    let (_dir, a, _b) = two_roots();
    let inner = a.join("inner");
    fs::create_dir(&inner).unwrap();

    let finder = DuplicateFinder::with_defaults();
    for (p, s) in [(&a, &a), (&a, &inner)] {
        match finder.find_deletable(p, s) {
            Err(FinderError::OverlappingRoots { .. }) => {}
            other => panic!("Expected OverlappingRoots, got {:?}", other),
        }
    }
}

#[test]
fn test_secondary_containing_primary_reports_outside_copies() {
    let (_dir, a, b) = two_roots();
    let data = a.parent().unwrap().to_path_buf();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(a.join("y"), b"foo").unwrap();
    fs::write(data.join("other"), b"foo").unwrap();
    fs::write(b.join("z"), b"foo").unwrap();
    fs::write(b.join("q"), b"bar").unwrap();

    let (deletable, summary) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &data)
        .unwrap();

    assert_eq!(deletable, vec![b.join("z"), data.join("other")]);
    // Primary files are hashed once even though the secondary walk reaches them.
    assert_eq!(summary.total_files, 5);
}

#[test]
fn test_secondary_with_parent_components_is_resolved() {
    let (_dir, a, b) = two_roots();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(b.join("z"), b"foo").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&a, &a.join("..").join("B"))
        .unwrap();

    assert_eq!(deletable, vec![b.join("z")]);
}

#[test]
fn test_primary_with_parent_components_is_resolved() {
    let (_dir, a, b) = two_roots();
    fs::create_dir(b.join("sub")).unwrap();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(b.join("z"), b"foo").unwrap();

    let (deletable, _) = DuplicateFinder::with_defaults()
        .find_deletable(&b.join("sub").join("..").join("..").join("A"), &b)
        .unwrap();

    assert_eq!(deletable, vec![b.join("z")]);
}

#[test]
fn test_missing_secondary_rejected() {
    let (_dir, a, b) = two_roots();
    let missing = b.join("nope");

    match DuplicateFinder::with_defaults().find_deletable(&a, &missing) {
        Err(FinderError::PathNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected PathNotFound, got {:?}", other),
    }
}
