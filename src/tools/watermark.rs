/// Watermarking pipeline.
///
/// Both watermark kinds are reduced to the same shape: build an RGBA
/// overlay (rasterized text, or the user's image scaled), fade it to the
/// requested opacity, compute its placement from the base image's pixel
/// size and the overlay's measured size, then alpha-composite.
use ab_glyph::{FontRef, PxScale};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use serde::{Deserialize, Serialize};

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::{WatermarkKind, WatermarkOptions};
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact};

/// Bundled fallback font for text watermarks.
const FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Pixel inset used by all four corner placements.
const CORNER_INSET: i64 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 5] = [
        WatermarkPosition::TopLeft,
        WatermarkPosition::TopRight,
        WatermarkPosition::BottomLeft,
        WatermarkPosition::BottomRight,
        WatermarkPosition::Center,
    ];
}

impl std::fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WatermarkPosition::TopLeft => "Top left",
            WatermarkPosition::TopRight => "Top right",
            WatermarkPosition::BottomLeft => "Bottom left",
            WatermarkPosition::BottomRight => "Bottom right",
            WatermarkPosition::Center => "Center",
        })
    }
}

/// Top-left corner for an overlay of `overlay_w` x `overlay_h` placed on
/// a base of `base_w` x `base_h`. Corner placements keep a fixed 10-px
/// inset; center is exact. Coordinates may go negative when the overlay
/// is larger than the base; compositing clips.
pub fn placement(
    position: WatermarkPosition,
    base_w: u32,
    base_h: u32,
    overlay_w: u32,
    overlay_h: u32,
) -> (i64, i64) {
    let (bw, bh) = (base_w as i64, base_h as i64);
    let (ow, oh) = (overlay_w as i64, overlay_h as i64);
    match position {
        WatermarkPosition::TopLeft => (CORNER_INSET, CORNER_INSET),
        WatermarkPosition::TopRight => (bw - ow - CORNER_INSET, CORNER_INSET),
        WatermarkPosition::BottomLeft => (CORNER_INSET, bh - oh - CORNER_INSET),
        WatermarkPosition::BottomRight => (bw - ow - CORNER_INSET, bh - oh - CORNER_INSET),
        WatermarkPosition::Center => ((bw - ow) / 2, (bh - oh) / 2),
    }
}

/// Parse a "#rrggbb" colour string.
pub fn parse_hex_color(value: &str) -> ToolboxResult<[u8; 3]> {
    let hex = value.trim().strip_prefix('#').unwrap_or(value.trim());
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ToolboxError::invalid(format!(
            "'{}' is not a #rrggbb colour",
            value
        )));
    }
    let channel = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
    Ok([channel(0..2), channel(2..4), channel(4..6)])
}

pub async fn run(
    selection: Vec<StagedFile>,
    options: WatermarkOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();

    tokio::task::spawn_blocking(move || watermark_blocking(&input, &options))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn watermark_blocking(
    input: &StagedFile,
    options: &WatermarkOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let mut base = tools::decode_image(input)?.to_rgba8();

    let overlay = match options.kind {
        WatermarkKind::Text => text_overlay(options)?,
        WatermarkKind::Image => image_overlay(options)?,
    };

    let (x, y) = placement(
        options.position,
        base.width(),
        base.height(),
        overlay.width(),
        overlay.height(),
    );
    imageops::overlay(&mut base, &overlay, x, y);

    let format = tools::source_format(&input.name);
    let bytes = tools::encode_image(&image::DynamicImage::ImageRgba8(base), format)?;

    Ok(ProcessedArtifact {
        bytes,
        filename: format!("watermarked_{}", input.name),
        mime: input.mime.clone(),
    })
}

/// Rasterize the watermark text into its own RGBA buffer.
fn text_overlay(options: &WatermarkOptions) -> ToolboxResult<RgbaImage> {
    if options.text.trim().is_empty() {
        return Err(ToolboxError::invalid("enter a watermark text"));
    }
    let font = FontRef::try_from_slice(FONT_BYTES)
        .map_err(|e| ToolboxError::collaborator(format!("failed to load bundled font: {}", e)))?;

    let [r, g, b] = parse_hex_color(&options.color)?;
    let scale = PxScale::from(options.font_size.max(1) as f32);
    let (text_w, _) = text_size(scale, &font, &options.text);

    // Line height approximated as 1.2x the font size, the same rule the
    // canvas-based original used for placement.
    let width = (text_w as i64).max(1) as u32;
    let height = ((options.font_size as f32 * 1.2).ceil() as u32).max(1);

    let mut overlay = RgbaImage::new(width, height);
    draw_text_mut(
        &mut overlay,
        Rgba([r, g, b, 255]),
        0,
        0,
        scale,
        &font,
        &options.text,
    );
    fade(&mut overlay, options.text_opacity);
    Ok(overlay)
}

/// Load and scale the user's watermark image.
fn image_overlay(options: &WatermarkOptions) -> ToolboxResult<RgbaImage> {
    let path = options
        .image_path
        .as_ref()
        .ok_or_else(|| ToolboxError::invalid("upload a watermark image"))?;
    let bytes = std::fs::read(path).map_err(|e| {
        ToolboxError::invalid(format!("cannot read watermark image {}: {}", path.display(), e))
    })?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| ToolboxError::collaborator(format!("failed to decode watermark: {}", e)))?;

    let scale = options.image_scale.max(0.01);
    let width = ((img.width() as f32 * scale).round() as u32).max(1);
    let height = ((img.height() as f32 * scale).round() as u32).max(1);

    let mut overlay = img
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();
    fade(&mut overlay, options.image_opacity);
    Ok(overlay)
}

/// Multiply every pixel's alpha by `opacity` (clamped to 0..=1).
fn fade(overlay: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in overlay.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * opacity).round() as u8;
    }
}
