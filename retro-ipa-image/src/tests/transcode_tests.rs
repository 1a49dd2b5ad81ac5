use std::fs;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use super::*;
use crate::ipa::{HEADER_LEN, IpaHeader, encode_ipa};

#[test]
fn test_scaled_size_truncates() {
    // 330 * 165 / 200 = 272.25
    let size = scaled_size(330, 200, 165).unwrap();
    assert_eq!(size, Dimensions { width: 272, height: 165 });

    // 49 * 165 / 49 is exactly 165, no float drift
    assert_eq!(scaled_size(49, 49, 165).unwrap().width, 165);
}

#[test]
fn test_scaled_size_property() {
    for (w, h) in [(1, 1), (100, 300), (640, 480), (3, 7), (1000, 999), (512, 165)] {
        let size = scaled_size(w, h, 165).unwrap();
        assert_eq!(size.height, 165);
        assert_eq!(size.width as u64, w as u64 * 165 / h as u64, "{w}x{h}");
    }
}

#[test]
fn test_scaled_size_custom_height() {
    assert_eq!(scaled_size(200, 100, 50).unwrap(), Dimensions { width: 100, height: 50 });
}

#[test]
fn test_scaled_size_rejects_degenerate() {
    assert!(scaled_size(0, 10, 165).is_err());
    assert!(scaled_size(10, 0, 165).is_err());
    assert!(scaled_size(10, 10, 0).is_err());
    // 1 * 165 / 1000 truncates to zero
    assert!(scaled_size(1, 1000, 165).is_err());
    // Too wide for a 16-bit header
    assert!(scaled_size(100_000, 10, 165).is_err());
}

#[test]
fn test_header_bytes() {
    let header = IpaHeader::new(0x0110, 165);
    assert_eq!(header.to_bytes(), [32, b'I', b'P', b'A', 0x10, 0x01, 165, 0]);
    assert_eq!(IpaHeader::parse(&header.to_bytes()).unwrap(), header);
    assert_eq!(header.file_len(), 8 + 0x0110 * 165 * 4);
}

#[test]
fn test_header_parse_rejects_bad_input() {
    assert!(IpaHeader::parse(&[32, b'I', b'P']).is_err());
    assert!(IpaHeader::parse(&[32, b'P', b'N', b'G', 1, 0, 1, 0]).is_err());
}

#[test]
fn test_encode_swaps_red_and_blue() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    img.put_pixel(1, 0, Rgba([1, 2, 3, 4]));

    let mut out = Vec::new();
    encode_ipa(&img, &mut out).unwrap();

    assert_eq!(out.len(), HEADER_LEN + 2 * 4);
    assert_eq!(&out[..HEADER_LEN], &[32, b'I', b'P', b'A', 2, 0, 1, 0]);
    assert_eq!(&out[8..12], &[0, 0, 255, 255]);
    assert_eq!(&out[12..16], &[3, 2, 1, 4]);
}

#[test]
fn test_encode_row_major() {
    let mut img = RgbaImage::new(2, 2);
    img.put_pixel(0, 0, Rgba([0, 0, 1, 0]));
    img.put_pixel(1, 0, Rgba([0, 0, 2, 0]));
    img.put_pixel(0, 1, Rgba([0, 0, 3, 0]));
    img.put_pixel(1, 1, Rgba([0, 0, 4, 0]));

    let mut out = Vec::new();
    encode_ipa(&img, &mut out).unwrap();
    let blues: Vec<u8> = out[HEADER_LEN..].chunks(4).map(|q| q[0]).collect();
    assert_eq!(blues, vec![1, 2, 3, 4]);
}

#[test]
fn test_resize_adds_opaque_alpha() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([0, 255, 0])));
    let resized = resize_to_height(&img, 10).unwrap();
    assert_eq!(resized.dimensions(), (20, 10));
    for px in resized.pixels() {
        assert_eq!(px.0[0], 0);
        assert!(px.0[1] >= 254);
        assert_eq!(px.0[2], 0);
        assert!(px.0[3] >= 254);
    }
}

#[test]
fn test_transcode_file_red_png() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("red.png");
    let out = dir.path().join("ABCDEF12.bin");
    RgbaImage::from_pixel(330, 200, Rgba([255, 0, 0, 255]))
        .save(&src)
        .unwrap();

    let size = transcode_file(&src, &out, &TranscodeOptions::default()).unwrap();
    assert_eq!(size, Dimensions { width: 272, height: 165 });

    let bytes = fs::read(&out).unwrap();
    let header = IpaHeader::parse(&bytes).unwrap();
    assert_eq!(header.bits_per_pixel, 32);
    assert_eq!((header.width, header.height), (272, 165));
    assert_eq!(bytes.len() as u64, header.file_len());
    assert_eq!(bytes.len(), 8 + 272 * 165 * 4);

    for quad in bytes[HEADER_LEN..].chunks(4) {
        assert_eq!(quad[0], 0, "blue");
        assert_eq!(quad[1], 0, "green");
        assert!(quad[2] >= 254, "red");
        assert!(quad[3] >= 254, "alpha");
    }
}

#[test]
fn test_transcode_overwrites_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("cover.png");
    let out = dir.path().join("out.bin");
    RgbImage::from_pixel(20, 10, Rgb([9, 9, 9])).save(&src).unwrap();
    fs::write(&out, b"stale contents").unwrap();

    transcode_file(&src, &out, &TranscodeOptions { target_height: 5 }).unwrap();
    let bytes = fs::read(&out).unwrap();
    assert_eq!(bytes.len(), 8 + 10 * 5 * 4);
}

#[cfg(unix)]
#[test]
fn test_output_mode_matches_plain_create() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain");
    fs::write(&plain, b"x").unwrap();
    let out = dir.path().join("out.bin");
    write_ipa_file(&RgbaImage::new(1, 1), &out).unwrap();

    let mode = |p: &std::path::Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&out), mode(&plain));
}

#[test]
fn test_transcode_undecodable_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("broken.png");
    let out = dir.path().join("out.bin");
    fs::write(&src, b"definitely not an image").unwrap();

    let err = transcode_file(&src, &out, &TranscodeOptions::default()).unwrap_err();
    assert!(matches!(err, TranscodeError::Image(_)));
    assert!(!out.exists());

    // No temp files left behind either
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_transcode_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let err = transcode_file(
        &dir.path().join("missing.png"),
        &dir.path().join("out.bin"),
        &TranscodeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TranscodeError::Io(_)));
}
