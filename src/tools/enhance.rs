/// Image enhancement pipeline.
///
/// Applies draw-time pixel filters with the same semantics as the CSS
/// `brightness() contrast() saturate()` chain, in that order:
/// - brightness: multiplies each channel;
/// - contrast: scales each channel around mid-grey;
/// - saturate: interpolates between the pixel's luma and its colour.
/// 100 % on every slider is a pixel-exact no-op. Alpha is untouched.
use image::{Rgba, RgbaImage};

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::EnhanceOptions;
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact};

/// Luma coefficients used by the saturate filter (ITU-R BT.709).
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

pub async fn run(
    selection: Vec<StagedFile>,
    options: EnhanceOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();

    tokio::task::spawn_blocking(move || enhance_blocking(&input, options))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn enhance_blocking(
    input: &StagedFile,
    options: EnhanceOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let mut img = tools::decode_image(input)?.to_rgba8();
    apply_filters(&mut img, options);

    let format = tools::source_format(&input.name);
    let bytes = tools::encode_image(&image::DynamicImage::ImageRgba8(img), format)?;

    Ok(ProcessedArtifact {
        bytes,
        filename: format!("enhanced_{}", input.name),
        mime: input.mime.clone(),
    })
}

/// Apply the filter chain in place.
pub fn apply_filters(img: &mut RgbaImage, options: EnhanceOptions) {
    if options.is_identity() {
        return;
    }
    let brightness = options.brightness as f32 / 100.0;
    let contrast = options.contrast as f32 / 100.0;
    let saturation = options.saturation as f32 / 100.0;

    for pixel in img.pixels_mut() {
        *pixel = filter_pixel(*pixel, brightness, contrast, saturation);
    }
}

fn filter_pixel(pixel: Rgba<u8>, brightness: f32, contrast: f32, saturation: f32) -> Rgba<u8> {
    let mut r = pixel.0[0] as f32 / 255.0;
    let mut g = pixel.0[1] as f32 / 255.0;
    let mut b = pixel.0[2] as f32 / 255.0;

    r *= brightness;
    g *= brightness;
    b *= brightness;

    r = (r - 0.5) * contrast + 0.5;
    g = (g - 0.5) * contrast + 0.5;
    b = (b - 0.5) * contrast + 0.5;

    let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
    r = luma + (r - luma) * saturation;
    g = luma + (g - luma) * saturation;
    b = luma + (b - luma) * saturation;

    Rgba([
        to_channel(r),
        to_channel(g),
        to_channel(b),
        pixel.0[3],
    ])
}

fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
