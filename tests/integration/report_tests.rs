use dupscan::config::Config;
use dupscan::error::ExitCode;
use std::fs;
use tempfile::tempdir;

const FOO_SHA256: &str = "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae";

fn report(dir: &std::path::Path, compare: Option<&std::path::Path>) -> String {
    let mut out = Vec::new();
    let code = dupscan::run_report(dir, compare, &Config::default(), &mut out).unwrap();
    assert_eq!(code, ExitCode::Success);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_single_root_report_format() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("A");
    fs::create_dir(&a).unwrap();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(a.join("y"), b"foo").unwrap();
    fs::write(a.join("z"), b"not foo").unwrap();

    let expected = format!(
        "key:{}\n    {}\n    {}\n",
        FOO_SHA256,
        a.join("x").display(),
        a.join("y").display()
    );
    assert_eq!(report(&a, None), expected);
}

#[test]
fn test_single_root_report_is_stable() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        fs::write(dir.path().join(format!("f{i:02}")), format!("{}", i % 6)).unwrap();
    }

    let first = report(dir.path(), None);
    assert_eq!(first.lines().filter(|l| l.starts_with("key:")).count(), 6);
    assert_eq!(first, report(dir.path(), None));
}

#[test]
fn test_diff_report_prints_bare_paths() {
    let dir = tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let a = base.join("A");
    let b = base.join("B");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    fs::write(a.join("x"), b"foo").unwrap();
    fs::write(b.join("z"), b"foo").unwrap();
    fs::write(b.join("q"), b"bar").unwrap();

    assert_eq!(report(&a, Some(b.as_path())), format!("{}\n", b.join("z").display()));
}

#[test]
fn test_empty_tree_prints_nothing() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("A");
    let b = dir.path().join("B");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();

    assert_eq!(report(&a, None), "");
    assert_eq!(report(&a, Some(b.as_path())), "");
}
