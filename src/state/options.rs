/// Per-tool option values.
///
/// Every tool keeps its last-used options in one `ToolSettings` struct,
/// serialized to JSON in the user's config directory so they survive a
/// restart. A missing or unreadable settings file silently falls back to
/// the defaults; persistence is a convenience, never a requirement.
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::tools::watermark::WatermarkPosition;

/// Image compressor: JPEG quality, 0-100. Output is always JPEG.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self { quality: 80 }
    }
}

/// Output formats offered by the image converter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Webp];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Webp => "WebP",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    pub format: OutputFormat,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
        }
    }
}

/// Image resizer: optional target dimensions plus the aspect-ratio lock.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub lock_aspect_ratio: bool,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            lock_aspect_ratio: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkKind {
    Text,
    Image,
}

impl fmt::Display for WatermarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WatermarkKind::Text => "Text",
            WatermarkKind::Image => "Image",
        })
    }
}

/// Watermark tool options. Text and image watermarks keep separate
/// opacity values, matching the original controls; only the fields for
/// the selected kind are read by the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WatermarkOptions {
    pub kind: WatermarkKind,
    pub position: WatermarkPosition,
    pub text: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Text colour as a "#rrggbb" hex string.
    pub color: String,
    /// 0.0 (invisible) to 1.0 (opaque).
    pub text_opacity: f32,
    pub image_path: Option<PathBuf>,
    pub image_opacity: f32,
    /// Multiplier applied to the overlay image's own dimensions.
    pub image_scale: f32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::Text,
            position: WatermarkPosition::BottomRight,
            text: String::from("© media-toolbox"),
            font_size: 36,
            color: String::from("#ffffff"),
            text_opacity: 0.5,
            image_path: None,
            image_opacity: 0.5,
            image_scale: 0.5,
        }
    }
}

/// Image enhancer: brightness/contrast/saturation as percentages,
/// 0-200 with 100 meaning "unchanged".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EnhanceOptions {
    pub brightness: u32,
    pub contrast: u32,
    pub saturation: u32,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
        }
    }
}

impl EnhanceOptions {
    /// All sliders at 100 % means the pipeline is a pixel-exact no-op.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// GIF maker: per-frame delay and encoder quality (lower = better,
/// slower; the same convention as the original encoder's knob).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GifOptions {
    pub delay_ms: u32,
    pub quality: u8,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            delay_ms: 200,
            quality: 10,
        }
    }
}

/// PDF compression level. Treated as an opaque knob for the PDF
/// library's save step; no encoder settings are inferred from it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfLevel {
    Low,
    Medium,
    High,
}

impl PdfLevel {
    pub const ALL: [PdfLevel; 3] = [PdfLevel::Low, PdfLevel::Medium, PdfLevel::High];
}

impl fmt::Display for PdfLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PdfLevel::Low => "Low",
            PdfLevel::Medium => "Medium",
            PdfLevel::High => "High",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PdfOptions {
    pub level: PdfLevel,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            level: PdfLevel::Medium,
        }
    }
}

/// Video compressor: a scale-filter resolution and a target bitrate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoCompressOptions {
    /// ffmpeg scale filter argument, "width:height".
    pub resolution: String,
    /// Target video bitrate in Mbit/s.
    pub bitrate_mbps: u32,
}

impl VideoCompressOptions {
    pub const RESOLUTIONS: [&'static str; 3] = ["1920:1080", "1280:720", "854:480"];
}

impl Default for VideoCompressOptions {
    fn default() -> Self {
        Self {
            resolution: String::from("1280:720"),
            bitrate_mbps: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Webm,
    Avi,
    Mov,
}

impl VideoFormat {
    pub const ALL: [VideoFormat; 4] = [
        VideoFormat::Mp4,
        VideoFormat::Webm,
        VideoFormat::Avi,
        VideoFormat::Mov,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Webm => "webm",
            VideoFormat::Avi => "avi",
            VideoFormat::Mov => "mov",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Webm => "video/webm",
            VideoFormat::Avi => "video/x-msvideo",
            VideoFormat::Mov => "video/quicktime",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VideoFormat::Mp4 => "MP4",
            VideoFormat::Webm => "WebM",
            VideoFormat::Avi => "AVI",
            VideoFormat::Mov => "MOV",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VideoConvertOptions {
    pub format: VideoFormat,
}

impl Default for VideoConvertOptions {
    fn default() -> Self {
        Self {
            format: VideoFormat::Mp4,
        }
    }
}

/// Video trimmer: start/end timestamps in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrimOptions {
    pub start: f64,
    pub end: f64,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 10.0,
        }
    }
}

/// Last-used options for every tool, persisted as one JSON document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ToolSettings {
    pub compress: CompressOptions,
    pub convert: ConvertOptions,
    pub resize: ResizeOptions,
    pub watermark: WatermarkOptions,
    pub enhance: EnhanceOptions,
    pub gif: GifOptions,
    pub pdf: PdfOptions,
    pub video_compress: VideoCompressOptions,
    pub video_convert: VideoConvertOptions,
    pub trim: TrimOptions,
}

impl ToolSettings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Where the settings live:
    /// - Linux: ~/.config/media-toolbox/settings.json
    /// - macOS: ~/Library/Application Support/media-toolbox/settings.json
    /// - Windows: %APPDATA%\media-toolbox\settings.json
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("media-toolbox");
        path.push("settings.json");
        Some(path)
    }

    /// Load from disk, falling back to defaults if the file is missing
    /// or unreadable. Corrupt settings are never a user-facing error.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                eprintln!("⚠️  Ignoring unreadable settings file: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Best-effort save; failures are reported on stderr and ignored.
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        match self.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    eprintln!("⚠️  Failed to save settings: {}", e);
                }
            }
            Err(e) => eprintln!("⚠️  Failed to serialize settings: {}", e),
        }
    }
}
