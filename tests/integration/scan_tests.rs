use dupscan::duplicates::{CoordinatorConfig, DuplicateFinder};
use dupscan::scanner::{hash_to_hex, HashAlgorithm, Hasher};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

const FOO_SHA256: &str = "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae";

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_empty_nested_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
    fs::create_dir_all(dir.path().join("d")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.directories_scanned, 5);
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_two_foo_files_form_one_group() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"foo").unwrap();
    fs::write(dir.path().join("y"), b"foo").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].hash_hex(), FOO_SHA256);
    assert_eq!(
        groups[0].paths,
        vec![dir.path().join("x"), dir.path().join("y")]
    );
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    for (name, content) in [("a.txt", "content a"), ("b.txt", "content b"), ("c.txt", "content c")] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir").join("deeper");
    fs::create_dir_all(&sub).unwrap();

    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(sub.join("b.txt"), b"dup").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.directories_scanned, 3);
}

#[test]
fn test_scan_multiple_groups() {
    let dir = tempdir().unwrap();
    for name in ["1a", "1b", "1c"] {
        fs::write(dir.path().join(name), b"group1").unwrap();
    }
    for name in ["2a", "2b"] {
        fs::write(dir.path().join(name), b"group2").unwrap();
    }
    fs::write(dir.path().join("solo"), b"unique").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let sizes: BTreeSet<usize> = groups.iter().map(|g| g.len()).collect();
    assert_eq!(groups.len(), 2);
    assert_eq!(sizes, BTreeSet::from([2, 3]));
    assert_eq!(summary.duplicate_files, 3);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1")).unwrap();
    File::create(dir.path().join("empty2")).unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_same_name_different_content_not_grouped() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a/report.txt"), b"version one").unwrap();
    fs::write(dir.path().join("b/report.txt"), b"version two").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn test_every_file_recorded_exactly_once() {
    let dir = tempdir().unwrap();
    let mut expected = Vec::new();
    for d in 0..6 {
        let sub = dir.path().join(format!("d{d}"));
        fs::create_dir(&sub).unwrap();
        for f in 0..10 {
            let path = sub.join(format!("f{f}"));
            fs::write(&path, format!("{}", f % 3)).unwrap();
            expected.push(path);
        }
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // Every file shares content with others, so every file is in a group.
    let mut seen: Vec<PathBuf> = groups.iter().flat_map(|g| g.paths.clone()).collect();
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected);
    assert_eq!(summary.total_files, 60);
    assert_eq!(groups.len(), 3);
}

#[test]
fn test_repeated_runs_give_same_groups() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("f{i}")), format!("{}", i % 4)).unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_single_worker_pools() {
    let dir = tempdir().unwrap();
    for d in 0..4 {
        let sub = dir.path().join(format!("d{d}"));
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("same"), b"shared").unwrap();
    }

    let config = CoordinatorConfig::default()
        .with_scan_concurrency(1)
        .with_hash_concurrency(1);
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
}

#[test]
fn test_blake3_digest_in_groups() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"foo").unwrap();
    fs::write(dir.path().join("y"), b"foo").unwrap();

    let hasher = Hasher::new().with_algorithm(HashAlgorithm::Blake3);
    let config = CoordinatorConfig::default().with_hasher(hasher);
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].hash_hex(), hash_to_hex(blake3::hash(b"foo").as_bytes()));
}

#[test]
#[cfg(unix)]
fn test_symlinks_are_skipped() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real"), b"content").unwrap();
    symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}
