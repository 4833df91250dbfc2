//! File-level parsing: stem tagging, error wrapping and write-back.

use std::path::Path;

use markup::{Operator, ParseError, parse_file};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write fixture");
    path
}

#[test]
fn file_stem_becomes_root_tag() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "units.txt",
        "archer = {\n    hit_points = 8\n}\n",
    );

    let root = parse_file(&path).unwrap();

    assert_eq!(root.tag, "units");
    assert_eq!(
        root.child("archer").unwrap().property_value("hit_points"),
        Some("8")
    );
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let error = parse_file(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(error, ParseError::FileNotFound { .. }));
    assert_eq!(error.error_code(), "MARKUP_FILE_NOT_FOUND");
}

#[test]
fn line_errors_are_wrapped_with_the_path() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "broken.txt", "a = {\n    b = 1\n}\n}\n");

    let error = parse_file(&path).unwrap_err();

    let ParseError::File { path: reported, source } = &error else {
        panic!("expected file wrapper, got {error:?}");
    };
    assert_eq!(reported, &path);
    assert!(matches!(
        **source,
        ParseError::UnexpectedClosingBrace { line: 4 }
    ));
    assert_eq!(error.line(), Some(4));
}

#[test]
fn written_file_parses_back_identically() {
    let dir = TempDir::new().unwrap();
    let original = write(
        dir.path(),
        "triggers.txt",
        "t = {\n    conditions = { score >= 3 }\n    effects += { gold += 5 }\n    only_once = yes\n}\n",
    );
    let tree = parse_file(&original).unwrap();

    let copy = dir.path().join("triggers_copy.txt");
    tree.write_to_file(&copy).unwrap();
    let reparsed = parse_file(&copy).unwrap();

    assert_eq!(tree.elements, reparsed.elements);
    assert_eq!(
        reparsed
            .child("t")
            .unwrap()
            .child("effects")
            .unwrap()
            .operator,
        Operator::Addition
    );
}
