use assert_cmd::Command;
use assert_fs::fixture::PathChild;
use predicates::prelude::predicate;
use sqindex::areas::index_store::IndexStore;
use sqindex::artifacts::index::IndexKind;
use sqindex::artifacts::index::raw_offset::RawOffset;

mod common;

#[test]
fn inspect_lists_every_segment() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("040000.win32.index");
    common::write_index(index_path.path(), IndexKind::Index)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("inspect")
        .arg(index_path.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("archive 040000 (index), 4 files"))
        .stdout(predicate::str::contains("segment 0: files"))
        .stdout(predicate::str::contains("segment 3: folders"))
        .stdout(predicate::str::contains("intact"));

    Ok(())
}

#[test]
fn resolve_prints_decoded_location() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("0a0000.win32.index2");
    common::write_index(index_path.path(), IndexKind::Index2)?;

    let expected = format!("{}: {}", common::PATHS[2], RawOffset::new(0x30));
    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("resolve")
        .arg(index_path.path())
        .arg(common::PATHS[2])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));

    Ok(())
}

#[test]
fn resolve_missing_path_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("0a0000.win32.index2");
    common::write_index(index_path.path(), IndexKind::Index2)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("resolve")
        .arg(index_path.path())
        .arg("exd/missing.exh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not indexed in 0a0000"));

    Ok(())
}

#[test]
fn set_offset_rewrites_index() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("040000.win32.index");
    common::write_index(index_path.path(), IndexKind::Index)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("set-offset")
        .arg(index_path.path())
        .arg(common::PATHS[0])
        .arg("0x1000")
        .assert()
        .success()
        .stdout(predicate::str::contains("0x80 -> 0x8000"));

    let index = IndexStore::open(index_path.path(), None)?.load()?;
    index.verify()?;
    pretty_assertions::assert_eq!(index.data_offset(common::PATHS[0]), Some(0x1000));

    Ok(())
}

#[test]
fn set_offset_dry_run_leaves_file_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("040000.win32.index");
    let original = common::write_index(index_path.path(), IndexKind::Index)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("set-offset")
        .arg(index_path.path())
        .arg("chara/equipment/e0200/e0200.imc")
        .arg("4096")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("0x0 -> 0x8000"))
        .stdout(predicate::str::contains("dry run"));

    let after = std::fs::read(index_path.path())?;
    assert_index_eq!(&after, &original);

    Ok(())
}

#[test]
fn set_offset_to_current_value_is_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("0a0000.win32.index2");
    let original = common::write_index(index_path.path(), IndexKind::Index2)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("set-offset")
        .arg(index_path.path())
        .arg(common::PATHS[1])
        .arg("0x20")
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));

    let after = std::fs::read(index_path.path())?;
    assert_index_eq!(&after, &original);

    Ok(())
}

#[test]
fn set_offset_rejects_garbage_offset() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("0a0000.win32.index2");
    common::write_index(index_path.path(), IndexKind::Index2)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("set-offset")
        .arg(index_path.path())
        .arg(common::PATHS[1])
        .arg("0xZZ")
        .assert()
        .failure();

    Ok(())
}

#[test]
fn verify_accepts_written_index() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("040000.win32.index");
    common::write_index(index_path.path(), IndexKind::Index)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("verify")
        .arg(index_path.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));

    Ok(())
}

#[test]
fn verify_detects_corrupted_header() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("040000.win32.index");
    let mut bytes = common::write_index(index_path.path(), IndexKind::Index)?;
    bytes[0x40] ^= 0xFF;
    std::fs::write(index_path.path(), &bytes)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("verify")
        .arg(index_path.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("header checksum does not match"));

    Ok(())
}

#[test]
fn explicit_kind_overrides_extension() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let index_path = dir.child("backup.bin");
    common::write_index(index_path.path(), IndexKind::Index2)?;

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("--kind")
        .arg("index2")
        .arg("resolve")
        .arg(index_path.path())
        .arg(common::PATHS[3])
        .assert()
        .success();

    let mut sut = Command::cargo_bin("sqindex")?;
    sut.arg("inspect").arg(index_path.path()).assert().failure();

    Ok(())
}
