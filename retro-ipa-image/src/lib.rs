//! IPA container encoding for front-end cover art.
//!
//! An IPA file is an 8-byte header followed by raw BGRA pixels:
//!
//! ```text
//! offset  size  field
//! 0       1     bits per pixel (always 32)
//! 1       3     magic "IPA"
//! 4       2     width, little-endian
//! 6       2     height, little-endian
//! 8       w*h*4 pixels, row-major, B G R A
//! ```

pub mod error;
pub mod ipa;
pub mod transcode;

pub use error::TranscodeError;
pub use ipa::{IpaHeader, encode_ipa};
pub use transcode::{
    DEFAULT_TARGET_HEIGHT, Dimensions, TranscodeOptions, resize_to_height, scaled_size,
    transcode_file, write_ipa_file,
};
