// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.json");
    write_atomic(&path, b"[1,2,3]").unwrap();
    let v: Vec<i32> = read_json_or_default(&path);
    assert_eq!(v, vec![1, 2, 3]);
}

#[test]
fn missing_file_is_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let v: Vec<i32> = read_json_or_default(&path);
    assert!(v.is_empty());
}

#[test]
fn corrupt_file_is_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.json");
    std::fs::write(&path, b"not json at all").unwrap();
    let v: Vec<i32> = read_json_or_default(&path);
    assert!(v.is_empty());
}
