use anyhow::{Result, bail};
use image::ImageFormat;

/// Receipt image encodings accepted for OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Sniff the encoding from the leading bytes. Anything but PNG/JPEG is rejected.
    pub fn detect(bytes: &[u8]) -> Result<ImageKind> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => Ok(ImageKind::Png),
            Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
            Ok(other) => bail!("unsupported receipt image format {other:?} (expected PNG or JPEG)"),
            Err(_) => bail!("unrecognized receipt image (expected PNG or JPEG)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

    #[test]
    fn test_detect_png_and_jpeg() {
        assert_eq!(ImageKind::detect(PNG_MAGIC).unwrap(), ImageKind::Png);
        assert_eq!(ImageKind::detect(JPEG_MAGIC).unwrap(), ImageKind::Jpeg);
    }

    #[test]
    fn test_reject_other_input() {
        assert!(ImageKind::detect(b"%PDF-1.7\n").is_err());
        assert!(ImageKind::detect(b"").is_err());
        assert!(ImageKind::detect(b"GIF89a\x01\0\x01\0").is_err());
    }
}
