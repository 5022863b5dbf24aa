/// Image format conversion pipeline.
///
/// Decodes the staged image and re-encodes it in the chosen container.
/// Nothing else changes: no resizing, no quality knob.
use image::ImageFormat;

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::{ConvertOptions, OutputFormat};
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact};

pub async fn run(
    selection: Vec<StagedFile>,
    options: ConvertOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();

    tokio::task::spawn_blocking(move || convert_blocking(&input, options))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn convert_blocking(
    input: &StagedFile,
    options: ConvertOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let img = tools::decode_image(input)?;
    let format = match options.format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Webp => ImageFormat::WebP,
    };
    let bytes = tools::encode_image(&img, format)?;

    Ok(ProcessedArtifact {
        bytes,
        filename: format!(
            "{}.{}",
            tools::base_name(&input.name),
            options.format.extension()
        ),
        mime: options.format.mime().to_string(),
    })
}
