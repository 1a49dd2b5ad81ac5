use std::fs;
use std::path::Path;
use std::process::Command;

use image::{Rgb, RgbImage};

const BIN: &str = env!("CARGO_BIN_EXE_retro-ipa");

const DAT: &str = r#"<?xml version="1.0"?>
<datafile>
    <header><name>NEC - PC Engine - TurboGrafx-16</name></header>
    <game name="Bonk&apos;s Adventure">
        <rom name="Bonk's Adventure.pce" crc="ABCDEF12"/>
    </game>
    <game name="Galaga '90">
        <rom name="Galaga '90.pce" crc="1a8393c6"/>
    </game>
</datafile>"#;

fn setup(dat: &str) -> (tempfile::TempDir, [std::path::PathBuf; 3]) {
    let root = tempfile::tempdir().unwrap();
    let catalog = root.path().join("pce.dat");
    let input = root.path().join("covers");
    let output = root.path().join("out");
    fs::write(&catalog, dat).unwrap();
    fs::create_dir(&input).unwrap();
    fs::create_dir(&output).unwrap();
    (root, [catalog, input, output])
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_wrong_argument_count_exits_1() {
    let status = Command::new(BIN).status().unwrap();
    assert_eq!(status.code(), Some(1));

    let status = Command::new(BIN).args(["a.dat", "in"]).status().unwrap();
    assert_eq!(status.code(), Some(1));

    let status = Command::new(BIN)
        .args(["a.dat", "in", "out", "extra"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_help_exits_0() {
    let output = Command::new(BIN).arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_catalog_mode_writes_checksum_file() {
    let (_root, [catalog, input, output]) = setup(DAT);
    RgbImage::from_pixel(330, 330, Rgb([200, 100, 50]))
        .save(input.join("Bonks_Adventure.png"))
        .unwrap();

    let status = Command::new(BIN)
        .args([&catalog, &input, &output])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));

    let bytes = fs::read(output.join("ABCDEF12.bin")).unwrap();
    assert_eq!(&bytes[..4], &[32, b'I', b'P', b'A']);
    assert_eq!(&bytes[4..8], &[165, 0, 165, 0]);
    assert_eq!(bytes.len(), 8 + 165 * 165 * 4);
    assert_eq!(file_count(&output), 1);
}

#[test]
fn test_filename_mode() {
    let (_root, [catalog, input, output]) = setup(DAT);
    RgbImage::from_pixel(20, 40, Rgb([1, 2, 3]))
        .save(input.join("Galaga '90 (USA).png"))
        .unwrap();

    let status = Command::new(BIN)
        .args([catalog.as_os_str(), input.as_os_str(), output.as_os_str()])
        .args(["--mode", "filename", "--jobs", "1", "--quiet"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));
    assert!(output.join("1a8393c6.bin").exists());
}

#[test]
fn test_no_match_still_exits_0() {
    let (_root, [catalog, input, output]) = setup(DAT);
    RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]))
        .save(input.join("Unknown Game.png"))
        .unwrap();

    let status = Command::new(BIN)
        .args([&catalog, &input, &output])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));
    assert_eq!(file_count(&output), 0);
}

#[test]
fn test_malformed_catalog_exits_nonzero() {
    let (_root, [catalog, input, output]) = setup("<datafile><header>");
    RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]))
        .save(input.join("Bonks_Adventure.png"))
        .unwrap();

    let status = Command::new(BIN)
        .args([&catalog, &input, &output])
        .status()
        .unwrap();
    assert_ne!(status.code(), Some(0));
    assert_eq!(file_count(&output), 0);
}

#[test]
fn test_missing_output_dir_exits_nonzero() {
    let (_root, [catalog, input, output]) = setup(DAT);
    let missing = output.join("missing");
    let status = Command::new(BIN)
        .args([&catalog, &input, &missing])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!missing.exists());
}
