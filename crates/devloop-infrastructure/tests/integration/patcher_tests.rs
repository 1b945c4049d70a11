//! Atomic source patcher tests

use std::fs;

use devloop_domain::error::Error;
use devloop_domain::ports::SourcePatcher;
use devloop_domain::value_objects::ReplacementSet;
use devloop_infrastructure::adapters::AtomicSourcePatcher;
use tempfile::TempDir;

const SOURCE: &str = "pub fn greeting() -> &'static str {\n    return \"howdy\";\n}\n\npub fn farewell() -> &'static str {\n    return \"bye\";\n}\n";

fn source_file() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("customer_service.rs");
    fs::write(&file, SOURCE).unwrap();
    (dir, file)
}

fn entries(dir: &TempDir) -> usize {
    fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn test_present_searches_are_all_replaced() {
    let (dir, file) = source_file();
    let set = ReplacementSet::new()
        .replace("return \"howdy\"", "return \"modified\"")
        .replace("return \"bye\"", "return \"later\"");

    AtomicSourcePatcher::new()
        .apply_replacements(&file, &set)
        .unwrap();

    let patched = fs::read_to_string(&file).unwrap();
    assert!(patched.contains("return \"modified\""));
    assert!(patched.contains("return \"later\""));
    assert!(!patched.contains("howdy"));
    assert!(!patched.contains("bye"));
    assert_eq!(entries(&dir), 1, "temp file left behind");
}

#[test]
fn test_missing_search_leaves_file_byte_identical() {
    let (dir, file) = source_file();
    let before = fs::read(&file).unwrap();
    let set = ReplacementSet::new()
        .replace("return \"howdy\"", "return \"modified\"")
        .replace("return \"hola\"", "return \"x\"");

    let err = AtomicSourcePatcher::new()
        .apply_replacements(&file, &set)
        .unwrap_err();

    match err {
        Error::MissingSubstring { search, file: f } => {
            assert_eq!(search, "return \"hola\"");
            assert_eq!(f, file);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read(&file).unwrap(), before);
    assert_eq!(entries(&dir), 1);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = AtomicSourcePatcher::new()
        .apply_replacements(&dir.path().join("absent.rs"), &ReplacementSet::single("a", "b"))
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_invalid_utf8_is_rejected_untouched() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("binary.rs");
    fs::write(&file, b"howdy \xff\xfe").unwrap();

    let err = AtomicSourcePatcher::new()
        .apply_replacements(&file, &ReplacementSet::single("howdy", "modified"))
        .unwrap_err();
    assert!(err.to_string().contains("not valid UTF-8"));
    assert_eq!(fs::read(&file).unwrap(), b"howdy \xff\xfe");
}

#[cfg(unix)]
#[test]
fn test_permissions_are_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, file) = source_file();
    fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).unwrap();

    AtomicSourcePatcher::new()
        .apply_replacements(&file, &ReplacementSet::single("howdy", "modified"))
        .unwrap();

    let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
