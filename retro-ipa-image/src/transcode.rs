use std::io::{BufWriter, Write};
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbaImage};

use crate::TranscodeError;
use crate::ipa::{IpaHeader, encode_ipa};

/// Cover height expected by the front-end.
pub const DEFAULT_TARGET_HEIGHT: u16 = 165;

/// Options controlling image conversion.
#[derive(Debug, Clone, Copy)]
pub struct TranscodeOptions {
    /// Output height in pixels; width follows the source aspect ratio
    pub target_height: u16,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            target_height: DEFAULT_TARGET_HEIGHT,
        }
    }
}

/// Size of a converted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

/// Compute the output size for a `width`x`height` source.
///
/// Width is `width * target_height / height`, truncated toward zero.
pub fn scaled_size(width: u32, height: u32, target_height: u16) -> Result<Dimensions, TranscodeError> {
    if width == 0 || height == 0 {
        return Err(TranscodeError::invalid_dimensions(format!(
            "source image is {width}x{height}"
        )));
    }
    if target_height == 0 {
        return Err(TranscodeError::invalid_dimensions("target height is 0"));
    }

    let scaled = width as u64 * target_height as u64 / height as u64;
    match u16::try_from(scaled) {
        Ok(0) => Err(TranscodeError::invalid_dimensions(format!(
            "{width}x{height} scales to zero width"
        ))),
        Ok(w) => Ok(Dimensions {
            width: w,
            height: target_height,
        }),
        Err(_) => Err(TranscodeError::invalid_dimensions(format!(
            "{width}x{height} scales to {scaled} pixels wide"
        ))),
    }
}

/// Resize to `target_height`, keeping the aspect ratio, as RGBA8.
///
/// Sources without alpha come out fully opaque.
pub fn resize_to_height(img: &DynamicImage, target_height: u16) -> Result<RgbaImage, TranscodeError> {
    let size = scaled_size(img.width(), img.height(), target_height)?;
    let rgba = img.to_rgba8();
    Ok(imageops::resize(
        &rgba,
        size.width.into(),
        size.height.into(),
        FilterType::CatmullRom,
    ))
}

/// Write `img` to `out` as an IPA file.
///
/// The data goes to a temporary file next to `out` which is then renamed
/// over it, so a failed write never leaves a truncated file behind.
pub fn write_ipa_file(img: &RgbaImage, out: &Path) -> Result<(), TranscodeError> {
    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".ipa-").suffix(".tmp");
    // Same mode a plain create would get; the umask still applies
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode_ipa(img, &mut writer)?;
        writer.flush()?;
    }
    tmp.persist(out).map_err(|e| e.error)?;
    Ok(())
}

/// Decode `src`, resize it and write it to `out` as an IPA file.
pub fn transcode_file(
    src: &Path,
    out: &Path,
    options: &TranscodeOptions,
) -> Result<Dimensions, TranscodeError> {
    let img = ImageReader::open(src)?.with_guessed_format()?.decode()?;
    log::debug!(
        "Decoded {} ({}x{})",
        src.display(),
        img.width(),
        img.height()
    );

    let resized = resize_to_height(&img, options.target_height)?;
    write_ipa_file(&resized, out)?;

    // resize_to_height guarantees both sides fit in u16
    let header = IpaHeader::new(resized.width() as u16, resized.height() as u16);
    log::debug!("Wrote {} ({} bytes)", out.display(), header.file_len());
    Ok(Dimensions {
        width: header.width,
        height: header.height,
    })
}

#[cfg(test)]
#[path = "tests/transcode_tests.rs"]
mod tests;
