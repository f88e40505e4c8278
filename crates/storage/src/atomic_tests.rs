use super::*;
use serde::Deserialize;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Doc {
    n: u32,
}

#[test]
fn writes_and_overwrites_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");

    write_json_atomic(&path, &Doc { n: 1 }).unwrap();
    let read: Doc = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read, Doc { n: 1 });

    write_json_atomic(&path, &Doc { n: 2 }).unwrap();
    let read: Doc = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read, Doc { n: 2 });
}

#[test]
fn does_not_leave_temp_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    write_json_atomic(&path, &Doc { n: 1 }).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the target file should remain");
}
