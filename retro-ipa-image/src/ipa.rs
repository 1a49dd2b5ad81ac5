use std::io::Write;

use image::RgbaImage;

use crate::TranscodeError;

/// Magic bytes following the bits-per-pixel field.
pub const IPA_MAGIC: [u8; 3] = *b"IPA";

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 8;

/// Every IPA file stores 4 bytes per pixel.
pub const BITS_PER_PIXEL: u8 = 32;

/// The fixed 8-byte IPA header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpaHeader {
    pub bits_per_pixel: u8,
    pub width: u16,
    pub height: u16,
}

impl IpaHeader {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            bits_per_pixel: BITS_PER_PIXEL,
            width,
            height,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let w = self.width.to_le_bytes();
        let h = self.height.to_le_bytes();
        [
            self.bits_per_pixel,
            IPA_MAGIC[0],
            IPA_MAGIC[1],
            IPA_MAGIC[2],
            w[0],
            w[1],
            h[0],
            h[1],
        ]
    }

    /// Parse the header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, TranscodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(TranscodeError::invalid_header(format!(
                "expected {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[1..4] != IPA_MAGIC {
            return Err(TranscodeError::invalid_header("bad magic"));
        }
        Ok(Self {
            bits_per_pixel: bytes[0],
            width: u16::from_le_bytes([bytes[4], bytes[5]]),
            height: u16::from_le_bytes([bytes[6], bytes[7]]),
        })
    }

    /// Total size of a file with this header.
    pub fn file_len(&self) -> u64 {
        HEADER_LEN as u64 + self.width as u64 * self.height as u64 * 4
    }
}

/// Stream an RGBA image to `out` as an IPA container.
///
/// Pixels are written one row at a time with red and blue swapped.
pub fn encode_ipa<W: Write>(img: &RgbaImage, mut out: W) -> Result<(), TranscodeError> {
    let (width, height) = img.dimensions();
    let header = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => IpaHeader::new(w, h),
        _ => {
            return Err(TranscodeError::invalid_dimensions(format!(
                "{width}x{height} does not fit a 16-bit header"
            )));
        }
    };
    out.write_all(&header.to_bytes())?;

    let mut row = Vec::with_capacity(width as usize * 4);
    for pixels in img.rows() {
        row.clear();
        for px in pixels {
            let [r, g, b, a] = px.0;
            row.extend_from_slice(&[b, g, r, a]);
        }
        out.write_all(&row)?;
    }
    out.flush()?;
    Ok(())
}
