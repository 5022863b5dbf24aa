/// Image compression pipeline.
///
/// Re-encodes the staged image as JPEG at the requested quality. Output
/// is always JPEG regardless of the input container, which is what makes
/// the quality slider meaningful for every input.
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::CompressOptions;
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact};

pub async fn run(
    selection: Vec<StagedFile>,
    options: CompressOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();

    tokio::task::spawn_blocking(move || compress_blocking(&input, options))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn compress_blocking(
    input: &StagedFile,
    options: CompressOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let img = tools::decode_image(input)?;
    let quality = options.quality.clamp(1, 100);

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
    image::DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| ToolboxError::collaborator(format!("failed to compress image: {}", e)))?;

    Ok(ProcessedArtifact {
        bytes,
        filename: format!("compressed_{}.jpeg", tools::base_name(&input.name)),
        mime: "image/jpeg".to_string(),
    })
}

/// Size reduction in percent, as shown in the results panel.
pub fn reduction_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A noisy image, so the JPEG encoder actually has work to do.
    fn noisy_input() -> StagedFile {
        let img = image::RgbImage::from_fn(64, 64, |x, y| {
            image::Rgb([
                (x * 31 % 251) as u8,
                (y * 57 % 239) as u8,
                ((x ^ y) * 13 % 241) as u8,
            ])
        });
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        StagedFile::new("noise.png", bytes)
    }

    #[tokio::test]
    async fn test_empty_selection_is_invalid() {
        let err = run(vec![], CompressOptions::default()).await.unwrap_err();
        assert!(matches!(err, ToolboxError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_low_quality_shrinks_a_noisy_png() {
        let input = noisy_input();
        let original_size = input.size;

        let artifact = run(vec![input], CompressOptions { quality: 10 })
            .await
            .unwrap();

        assert_eq!(artifact.filename, "compressed_noise.jpeg");
        assert_eq!(artifact.mime, "image/jpeg");
        assert!((artifact.bytes.len() as u64) < original_size);

        // The output must decode back as a JPEG of the same dimensions.
        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[tokio::test]
    async fn test_undecodable_bytes_surface_as_collaborator_failure() {
        let garbage = StagedFile::new("broken.png", vec![0xde, 0xad, 0xbe, 0xef]);
        let err = run(vec![garbage], CompressOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolboxError::Collaborator(_)));
    }

    #[test]
    fn test_reduction_percent() {
        assert_eq!(reduction_percent(1000, 250), 75.0);
        assert_eq!(reduction_percent(0, 10), 0.0);
    }
}
