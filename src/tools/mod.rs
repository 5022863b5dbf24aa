/// Tool pipelines
///
/// Each submodule implements one conversion tool as an async pipeline:
/// it validates the staged selection, calls exactly one codec/library
/// collaborator, and produces a single `ProcessedArtifact`. CPU-bound
/// codec work runs on the blocking thread pool so the UI stays responsive.
pub mod compress;
pub mod convert;
pub mod dimensions;
pub mod enhance;
pub mod gif;
pub mod pdf;
pub mod resize;
pub mod video;
pub mod watermark;

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::selection::StagedFile;

/// Identifies one tool section. Each tool owns its own staged file list,
/// options panel and result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    ImageCompressor,
    ImageConverter,
    ImageResizer,
    Watermark,
    ImageEnhancer,
    GifMaker,
    PdfCompressor,
    VideoCompressor,
    VideoConverter,
    VideoTrimmer,
}

impl ToolId {
    /// Every tool, in the order they appear in the navigation bar.
    pub const ALL: [ToolId; 10] = [
        ToolId::ImageCompressor,
        ToolId::ImageConverter,
        ToolId::ImageResizer,
        ToolId::Watermark,
        ToolId::ImageEnhancer,
        ToolId::GifMaker,
        ToolId::PdfCompressor,
        ToolId::VideoCompressor,
        ToolId::VideoConverter,
        ToolId::VideoTrimmer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolId::ImageCompressor => "Image Compressor",
            ToolId::ImageConverter => "Image Converter",
            ToolId::ImageResizer => "Image Resizer",
            ToolId::Watermark => "Watermark",
            ToolId::ImageEnhancer => "Image Enhancer",
            ToolId::GifMaker => "GIF Maker",
            ToolId::PdfCompressor => "PDF Compressor",
            ToolId::VideoCompressor => "Video Compressor",
            ToolId::VideoConverter => "Video Converter",
            ToolId::VideoTrimmer => "Video Trimmer",
        }
    }

    /// Whether this tool stages more than one file at a time.
    /// Only the GIF maker batches multiple inputs (its frames).
    pub fn allows_multiple(&self) -> bool {
        matches!(self, ToolId::GifMaker)
    }
}

/// The byte output of one completed pipeline run, plus the name and MIME
/// type used by the download affordance. Held until the next run of the
/// same tool or a section switch; never cached beyond that.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

/// Advisory progress reporting for long-running pipelines (GIF rendering,
/// video transcoding). Completion ratios are monotonically non-decreasing;
/// there is no other ordering guarantee and no completion semantics.
pub type ProgressFn = Arc<dyn Fn(f32) + Send + Sync>;

/// A progress callback that discards every update.
pub fn no_progress() -> ProgressFn {
    Arc::new(|_| {})
}

/// File name without its final extension: "photo.old.png" -> "photo.old".
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => name,
    }
}

/// Lowercased extension of a file name, if any.
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Guess a MIME type from a file name. Used when staging picked files.
pub fn mime_for(name: &str) -> String {
    let mime = match extension(name).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

/// Require a non-empty selection and return its first file.
/// Single-file pipelines all start here.
pub fn single_input(selection: &[StagedFile]) -> ToolboxResult<&StagedFile> {
    selection
        .first()
        .ok_or_else(|| ToolboxError::invalid("no file selected"))
}

/// Decode staged image bytes, mapping codec failures to collaborator errors.
pub fn decode_image(file: &StagedFile) -> ToolboxResult<DynamicImage> {
    image::load_from_memory(&file.bytes)
        .map_err(|e| ToolboxError::collaborator(format!("failed to decode {}: {}", file.name, e)))
}

/// The image format a staged file was encoded in, judged by extension.
/// Falls back to PNG for anything we cannot re-encode (the "keep the
/// original type" tools need a writable format).
pub fn source_format(name: &str) -> ImageFormat {
    match extension(name).as_deref() {
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        Some("webp") => ImageFormat::WebP,
        Some("bmp") => ImageFormat::Bmp,
        _ => ImageFormat::Png,
    }
}

/// Encode an image into the given format, converting the pixel layout
/// where the encoder demands it (JPEG has no alpha channel).
pub fn encode_image(img: &DynamicImage, format: ImageFormat) -> ToolboxResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    let result = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut cursor, format)
    } else {
        img.write_to(&mut cursor, format)
    };
    result.map_err(|e| ToolboxError::collaborator(format!("failed to encode image: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_last_extension_only() {
        assert_eq!(base_name("photo.png"), "photo");
        assert_eq!(base_name("photo.old.png"), "photo.old");
        assert_eq!(base_name("noext"), "noext");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_for("b.pdf"), "application/pdf");
        assert_eq!(mime_for("c.unknown"), "application/octet-stream");
    }

    #[test]
    fn test_jpeg_encoding_drops_alpha() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([10, 20, 30, 128]),
        ));
        let bytes = encode_image(&img, ImageFormat::Jpeg).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }
}
