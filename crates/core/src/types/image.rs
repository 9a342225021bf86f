//! Validation for uploaded images.
//!
//! Every image field (category, sub-category, product, product gallery and
//! user avatar) shares the same rules: at most 1 MiB, and the bytes must
//! start with a known image signature.

const MAX_IMAGE_MB: u64 = 1;

/// Maximum upload size in bytes.
pub const MAX_IMAGE_BYTES: u64 = MAX_IMAGE_MB * 1024 * 1024;

/// Errors that can occur when validating an upload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The upload has no content.
    #[error("The submitted file is empty.")]
    Empty,
    /// The upload is larger than [`MAX_IMAGE_BYTES`].
    #[error("Max size of file is {} MB", MAX_IMAGE_MB)]
    TooLarge {
        /// Size of the rejected upload in bytes.
        size_bytes: u64,
    },
    /// The bytes are not a recognised image format.
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    UnsupportedFormat,
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of a file.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12
            && bytes.starts_with(b"RIFF")
            && bytes.get(8..12) == Some(b"WEBP".as_slice())
        {
            Some(Self::Webp)
        } else {
            None
        }
    }

    /// File extension used when storing the upload.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Check an upload against the size limit and detect its format.
///
/// The size check runs first so an oversized file always gets the size
/// message, whatever its content.
///
/// # Errors
///
/// Returns [`ImageError`] if the file is empty, larger than 1 MiB, or not a
/// PNG, JPEG, GIF or WebP image.
pub fn validate_image(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    let size_bytes = bytes.len() as u64;
    if size_bytes == 0 {
        return Err(ImageError::Empty);
    }
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge { size_bytes });
    }
    ImageFormat::sniff(bytes).ok_or(ImageError::UnsupportedFormat)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png_of_len(len: usize) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(len, 0);
        bytes
    }

    #[test]
    fn test_accepts_exactly_one_megabyte() {
        let bytes = png_of_len(1024 * 1024);
        assert_eq!(validate_image(&bytes), Ok(ImageFormat::Png));
    }

    #[test]
    fn test_rejects_one_byte_over() {
        let bytes = png_of_len(1024 * 1024 + 1);
        let err = validate_image(&bytes).unwrap_err();
        assert_eq!(
            err,
            ImageError::TooLarge {
                size_bytes: 1_048_577
            }
        );
        assert_eq!(err.to_string(), "Max size of file is 1 MB");
    }

    #[test]
    fn test_oversized_non_image_reports_size() {
        let bytes = vec![b'x'; 2 * 1024 * 1024];
        assert!(matches!(
            validate_image(&bytes),
            Err(ImageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_rejects_empty_and_unknown() {
        assert_eq!(validate_image(&[]), Err(ImageError::Empty));
        assert_eq!(
            validate_image(b"plain text"),
            Err(ImageError::UnsupportedFormat)
        );
    }

    #[test]
    fn test_extension() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Webp.extension(), "webp");
    }
}
