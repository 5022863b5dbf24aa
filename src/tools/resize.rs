/// Image resize pipeline.
///
/// Target dimensions come from the dimension resolver (fit-within-box
/// when the aspect lock is on), get rounded for rasterization, and the
/// result is re-encoded in the source container.
use image::imageops::FilterType;

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::ResizeOptions;
use crate::state::selection::StagedFile;
use crate::tools::{self, dimensions, ProcessedArtifact};

pub async fn run(
    selection: Vec<StagedFile>,
    options: ResizeOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();

    tokio::task::spawn_blocking(move || resize_blocking(&input, options))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn resize_blocking(input: &StagedFile, options: ResizeOptions) -> ToolboxResult<ProcessedArtifact> {
    let img = tools::decode_image(input)?;

    let (width, height) = dimensions::resolve_dimensions(
        img.width() as f64,
        img.height() as f64,
        options.width,
        options.height,
        options.lock_aspect_ratio,
    )?;
    let width = (width.round() as u32).max(1);
    let height = (height.round() as u32).max(1);

    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    let format = tools::source_format(&input.name);
    let bytes = tools::encode_image(&resized, format)?;

    Ok(ProcessedArtifact {
        bytes,
        filename: format!("resized_{}", input.name),
        mime: input.mime.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_input(width: u32, height: u32) -> StagedFile {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([1, 2, 3]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        StagedFile::new("wide.png", bytes)
    }

    #[tokio::test]
    async fn test_locked_resize_by_width() {
        // 1000x500 with target width 250 and the lock on -> 250x125.
        let artifact = run(
            vec![png_input(1000, 500)],
            ResizeOptions {
                width: Some(250.0),
                height: None,
                lock_aspect_ratio: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(artifact.filename, "resized_wide.png");
        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (250, 125));
    }

    #[tokio::test]
    async fn test_unlocked_resize_is_exact() {
        let artifact = run(
            vec![png_input(100, 100)],
            ResizeOptions {
                width: Some(30.0),
                height: Some(70.0),
                lock_aspect_ratio: false,
            },
        )
        .await
        .unwrap();

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 70));
    }

    #[tokio::test]
    async fn test_missing_dimensions_are_invalid_input() {
        let err = run(
            vec![png_input(100, 100)],
            ResizeOptions {
                width: None,
                height: None,
                lock_aspect_ratio: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolboxError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_output_keeps_source_container() {
        let artifact = run(
            vec![png_input(40, 40)],
            ResizeOptions {
                width: Some(20.0),
                height: None,
                lock_aspect_ratio: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(artifact.mime, "image/png");
        assert_eq!(
            image::guess_format(&artifact.bytes).unwrap(),
            image::ImageFormat::Png
        );
    }
}
