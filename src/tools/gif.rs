/// GIF assembly pipeline.
///
/// Turns a batch of staged images into one animated GIF. Frames are
/// sorted by file name before encoding so drag-and-drop order can never
/// silently decide the animation order. Progress is reported once per
/// encoded frame.
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::GifOptions;
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact, ProgressFn};

pub async fn run(
    selection: Vec<StagedFile>,
    options: GifOptions,
    progress: ProgressFn,
) -> ToolboxResult<ProcessedArtifact> {
    if selection.len() < 2 {
        return Err(ToolboxError::invalid(
            "select at least two images to create a GIF",
        ));
    }

    tokio::task::spawn_blocking(move || assemble_blocking(selection, options, progress))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn assemble_blocking(
    mut frames: Vec<StagedFile>,
    options: GifOptions,
    progress: ProgressFn,
) -> ToolboxResult<ProcessedArtifact> {
    frames.sort_by(|a, b| a.name.cmp(&b.name));

    // The encoder's speed knob follows the same convention as the
    // original's quality parameter: lower is better and slower.
    let speed = (options.quality as i32).clamp(1, 30);
    let delay = Delay::from_numer_denom_ms(options.delay_ms.max(10), 1);
    let total = frames.len();

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, speed);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ToolboxError::collaborator(format!("failed to start GIF: {}", e)))?;

        for (index, file) in frames.iter().enumerate() {
            let rgba = tools::decode_image(file)?.to_rgba8();
            encoder
                .encode_frame(Frame::from_parts(rgba, 0, 0, delay))
                .map_err(|e| {
                    ToolboxError::collaborator(format!(
                        "failed to encode frame {}: {}",
                        file.name, e
                    ))
                })?;
            progress((index + 1) as f32 / total as f32);
        }
    }

    Ok(ProcessedArtifact {
        bytes,
        filename: "animated.gif".to_string(),
        mime: "image/gif".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::AnimationDecoder;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn frame(name: &str, color: [u8; 3]) -> StagedFile {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb(color));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        StagedFile::new(name, bytes)
    }

    #[tokio::test]
    async fn test_fewer_than_two_frames_is_invalid() {
        let err = run(
            vec![frame("only.png", [255, 0, 0])],
            GifOptions::default(),
            tools::no_progress(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolboxError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_frames_are_ordered_by_name_not_arrival() {
        // Staged out of order: "b" arrives before "a".
        let artifact = run(
            vec![frame("b.png", [0, 0, 255]), frame("a.png", [255, 0, 0])],
            GifOptions {
                delay_ms: 200,
                quality: 10,
            },
            tools::no_progress(),
        )
        .await
        .unwrap();

        assert_eq!(artifact.filename, "animated.gif");
        assert_eq!(artifact.mime, "image/gif");

        let decoder =
            image::codecs::gif::GifDecoder::new(Cursor::new(&artifact.bytes)).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 2);

        // First frame must be the red "a.png", despite arriving second.
        let first = frames[0].buffer().get_pixel(4, 4);
        assert!(first.0[0] > first.0[2]);

        // Per-frame delay survives (GIF stores centiseconds).
        let (numer, denom) = frames[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 200);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_reaches_one() {
        let seen: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressFn = Arc::new(move |ratio| sink.lock().unwrap().push(ratio));

        run(
            vec![
                frame("1.png", [10, 10, 10]),
                frame("2.png", [20, 20, 20]),
                frame("3.png", [30, 30, 30]),
            ],
            GifOptions::default(),
            progress,
        )
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }
}
