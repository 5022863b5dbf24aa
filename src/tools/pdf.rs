/// PDF compression pipeline.
///
/// Loads the staged PDF and re-saves it. The compression level is an
/// opaque knob on the save step, not a promise about specific encoder
/// settings: low re-saves as-is, medium also compresses the content
/// streams, high additionally prunes objects unreachable from the
/// document root and drops empty streams.
use std::io::Cursor;

use lopdf::Document;

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::{PdfLevel, PdfOptions};
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact};

pub async fn run(
    selection: Vec<StagedFile>,
    options: PdfOptions,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();

    tokio::task::spawn_blocking(move || resave_blocking(&input, options))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("task join error: {}", e)))?
}

fn resave_blocking(input: &StagedFile, options: PdfOptions) -> ToolboxResult<ProcessedArtifact> {
    let mut doc = Document::load_mem(&input.bytes)
        .map_err(|e| ToolboxError::collaborator(format!("failed to load PDF: {}", e)))?;

    match options.level {
        PdfLevel::Low => {}
        PdfLevel::Medium => {
            doc.compress();
        }
        PdfLevel::High => {
            doc.delete_zero_length_streams();
            let _ = doc.prune_objects();
            doc.compress();
        }
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut Cursor::new(&mut bytes))
        .map_err(|e| ToolboxError::collaborator(format!("failed to save PDF: {}", e)))?;

    Ok(ProcessedArtifact {
        bytes,
        filename: format!("compressed_{}.pdf", tools::base_name(&input.name)),
        mime: "application/pdf".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// A minimal one-page document with an uncompressed content stream.
    fn sample_pdf() -> StagedFile {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 36.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello, toolbox!")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut Cursor::new(&mut bytes)).unwrap();
        StagedFile::new("report.pdf", bytes)
    }

    #[tokio::test]
    async fn test_resave_produces_a_loadable_pdf() {
        for level in PdfLevel::ALL {
            let artifact = run(vec![sample_pdf()], PdfOptions { level })
                .await
                .unwrap();

            assert_eq!(artifact.filename, "compressed_report.pdf");
            assert_eq!(artifact.mime, "application/pdf");

            let reloaded = Document::load_mem(&artifact.bytes).unwrap();
            assert_eq!(reloaded.get_pages().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_garbage_bytes_surface_as_collaborator_failure() {
        let garbage = StagedFile::new("broken.pdf", b"not a pdf".to_vec());
        let err = run(vec![garbage], PdfOptions::default()).await.unwrap_err();
        assert!(matches!(err, ToolboxError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_empty_selection_is_invalid() {
        let err = run(vec![], PdfOptions::default()).await.unwrap_err();
        assert!(matches!(err, ToolboxError::InvalidInput(_)));
    }
}
