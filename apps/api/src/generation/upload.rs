//! Upload intake: validates garment photos and extracts catalog metadata from file names.

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use image::imageops::FilterType;
use thiserror::Error;
use tracing::{debug, info};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "heic", "heif"];
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
/// Longest edge sent to the model. Larger photos are downscaled and re-encoded as PNG.
pub const MAX_DIMENSION: u32 = 2048;

/// Words that show up in the type slot of a file name but only describe the shot.
const POSITION_WORDS: &[&str] = &["front", "back", "frente", "costas"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Filename is required for file {0}")]
    MissingFilename(usize),

    #[error("Unsupported file type: {0}. Use PNG, JPG, JPEG, WEBP, HEIC or HEIF.")]
    UnsupportedExtension(String),

    #[error("File {0} is empty")]
    Empty(String),

    #[error("File {name} is {size} bytes, limit is {limit}")]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("Invalid image file: {0} is not a PNG, JPEG, WEBP or HEIF image")]
    InvalidImage(String),

    #[error("Invalid image file: {name} could not be decoded ({reason})")]
    Corrupt { name: String, reason: String },

    #[error("Failed to re-encode {name}: {reason}")]
    Reencode { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Heic,
    Heif,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Heic => "image/heic",
            Self::Heif => "image/heif",
        }
    }

    /// Decoder for the format. HEIC/HEIF have none and are passed through as uploaded.
    fn codec(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::WebP => Some(image::ImageFormat::WebP),
            Self::Heic | Self::Heif => None,
        }
    }

    /// Detects the format from the file header, ignoring the extension.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        if data.len() >= 12 && &data[4..8] == b"ftyp" {
            return match &data[8..12] {
                b"heic" | b"heix" | b"hevc" | b"hevx" => Some(Self::Heic),
                b"mif1" | b"msf1" | b"heim" | b"heis" => Some(Self::Heif),
                _ => None,
            };
        }
        None
    }
}

/// A garment photo that passed validation, kept in upload order.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub format: ImageFormat,
    pub data: Bytes,
}

impl UploadedImage {
    /// Checks name, size and header, then decodes the image to prove it is intact.
    /// CPU-bound: async callers run it under `spawn_blocking`.
    pub fn validate(
        index: usize,
        filename: Option<String>,
        data: Bytes,
    ) -> Result<Self, UploadError> {
        let filename = filename
            .filter(|f| !f.trim().is_empty())
            .ok_or(UploadError::MissingFilename(index))?;

        let extension = Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedExtension(format!(".{extension}")));
        }

        if data.is_empty() {
            return Err(UploadError::Empty(filename));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                name: filename,
                size: data.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let format =
            ImageFormat::from_magic_bytes(&data).ok_or_else(|| UploadError::InvalidImage(filename.clone()))?;

        Self {
            filename,
            format,
            data,
        }
        .normalize()
    }

    /// Fully decodes the image and downscales it when its longest edge exceeds
    /// `MAX_DIMENSION`. Photos within the limit keep their original bytes.
    fn normalize(self) -> Result<Self, UploadError> {
        let Some(codec) = self.format.codec() else {
            debug!("{} is HEIF; sending it without decoding", self.filename);
            return Ok(self);
        };

        let decoded = image::load_from_memory_with_format(&self.data, codec).map_err(|e| {
            UploadError::Corrupt {
                name: self.filename.clone(),
                reason: e.to_string(),
            }
        })?;

        let (width, height) = (decoded.width(), decoded.height());
        if width.max(height) <= MAX_DIMENSION {
            return Ok(self);
        }

        let resized = decoded.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle);
        let mut out = Cursor::new(Vec::new());
        resized
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| UploadError::Reencode {
                name: self.filename.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Downscaled {} from {width}x{height} to {}x{}",
            self.filename,
            resized.width(),
            resized.height()
        );

        Ok(Self {
            filename: self.filename,
            format: ImageFormat::Png,
            data: Bytes::from(out.into_inner()),
        })
    }
}

/// Catalog metadata encoded in a photo's file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameMetadata {
    pub garment_number: Option<String>,
    pub garment_type: Option<String>,
}

/// Parses `<number>_<type>_<rest>.<ext>`, e.g. `47_pantalon_20251229-195429.HEIC`.
///
/// `12_front_2025.HEIC` yields a number but no type. A name without a leading
/// number yields nothing.
pub fn extract_metadata_from_filename(filename: &str) -> FilenameMetadata {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let digits_end = stem
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(stem.len());
    if digits_end == 0 {
        return FilenameMetadata::default();
    }

    let garment_number = Some(stem[..digits_end].to_string());
    let garment_type = stem[digits_end..]
        .strip_prefix('_')
        .and_then(|rest| rest.split('_').next())
        .filter(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .filter(|word| !POSITION_WORDS.contains(&word.as_str()));

    FilenameMetadata {
        garment_number,
        garment_type,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::png;
    use super::*;

    /// Valid PNG signature followed by the start of an IHDR chunk and nothing else.
    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    fn meta(number: Option<&str>, kind: Option<&str>) -> FilenameMetadata {
        FilenameMetadata {
            garment_number: number.map(str::to_string),
            garment_type: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_extract_number_and_type() {
        assert_eq!(
            extract_metadata_from_filename("47_pantalon_20251229-195429.HEIC"),
            meta(Some("47"), Some("pantalon"))
        );
        assert_eq!(
            extract_metadata_from_filename("42_saia_20251229.HEIC"),
            meta(Some("42"), Some("saia"))
        );
        assert_eq!(
            extract_metadata_from_filename("100_vestidofesta_front_20251229.HEIC"),
            meta(Some("100"), Some("vestidofesta"))
        );
    }

    #[test]
    fn test_type_at_end_of_stem() {
        assert_eq!(
            extract_metadata_from_filename("7_Écharpe.png"),
            meta(Some("7"), Some("écharpe"))
        );
    }

    #[test]
    fn test_position_words_are_not_types() {
        assert_eq!(
            extract_metadata_from_filename("12_front_20251229.HEIC"),
            meta(Some("12"), None)
        );
        assert_eq!(
            extract_metadata_from_filename("33_costas_20251229.HEIC"),
            meta(Some("33"), None)
        );
    }

    #[test]
    fn test_number_only() {
        assert_eq!(
            extract_metadata_from_filename("55-photo.jpg"),
            meta(Some("55"), None)
        );
        assert_eq!(
            extract_metadata_from_filename("9_2025.jpg"),
            meta(Some("9"), None)
        );
    }

    #[test]
    fn test_no_leading_number() {
        assert_eq!(
            extract_metadata_from_filename("IMG_1234.jpg"),
            FilenameMetadata::default()
        );
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"\x00\x00\x00\x18ftypheic\x00\x00"),
            Some(ImageFormat::Heic)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"\x00\x00\x00\x18ftypmif1\x00\x00"),
            Some(ImageFormat::Heif)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"not an image"), None);
        assert_eq!(ImageFormat::from_magic_bytes(&[]), None);
    }

    #[test]
    fn test_validate_accepts_png() {
        let bytes = Bytes::from(png(16, 12));
        let image = UploadedImage::validate(0, Some("1_saia.PNG".into()), bytes.clone()).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.filename, "1_saia.PNG");
        assert_eq!(image.data, bytes);
    }

    #[test]
    fn test_validate_rejects_truncated_png() {
        let err = UploadedImage::validate(0, Some("1_saia.png".into()), Bytes::from_static(PNG_HEADER))
            .unwrap_err();
        assert!(matches!(err, UploadError::Corrupt { ref name, .. } if name == "1_saia.png"));
        assert!(err.to_string().starts_with("Invalid image file"));

        // Signature, IHDR and the IDAT chunk header, but no pixel data.
        let mut cut = png(64, 64);
        cut.truncate(8 + 25 + 8);
        assert!(matches!(
            UploadedImage::validate(0, Some("2_saia.png".into()), Bytes::from(cut)),
            Err(UploadError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_validate_downscales_oversized_image() {
        let image =
            UploadedImage::validate(0, Some("3_vestido.png".into()), Bytes::from(png(2560, 1280)))
                .unwrap();
        assert_eq!(image.format, ImageFormat::Png);

        let decoded = image::load_from_memory(&image.data).unwrap();
        assert_eq!(decoded.width(), MAX_DIMENSION);
        assert_eq!(decoded.height(), MAX_DIMENSION / 2);
    }

    #[test]
    fn test_validate_passes_heic_through() {
        let data = Bytes::from_static(b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00");
        let image = UploadedImage::validate(0, Some("4_saia.HEIC".into()), data.clone()).unwrap();
        assert_eq!(image.format, ImageFormat::Heic);
        assert_eq!(image.data, data);
    }

    #[test]
    fn test_validate_rejects_bad_extension() {
        let err = UploadedImage::validate(0, Some("notes.txt".into()), Bytes::from_static(b"x"))
            .unwrap_err();
        assert_eq!(err, UploadError::UnsupportedExtension(".txt".into()));
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_validate_rejects_missing_filename() {
        let err = UploadedImage::validate(2, None, Bytes::from(png(2, 2))).unwrap_err();
        assert_eq!(err, UploadError::MissingFilename(2));
    }

    #[test]
    fn test_validate_rejects_disguised_file() {
        let err = UploadedImage::validate(0, Some("photo.jpg".into()), Bytes::from_static(b"hello"))
            .unwrap_err();
        assert_eq!(err, UploadError::InvalidImage("photo.jpg".into()));
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized() {
        assert_eq!(
            UploadedImage::validate(0, Some("a.png".into()), Bytes::new()).unwrap_err(),
            UploadError::Empty("a.png".into())
        );
        let big = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]);
        assert!(matches!(
            UploadedImage::validate(0, Some("a.png".into()), big),
            Err(UploadError::TooLarge { .. })
        ));
    }
}
