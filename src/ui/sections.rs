/// Per-tool section views.
///
/// Every tool section has the same skeleton: a title, a file picker, the
/// staged-file list, then (once files are staged) the tool's option
/// controls and a run button, then (once a run completed) the results
/// panel. Which panels appear is decided entirely by the selection
/// store's visibility flags.
use iced::widget::{
    button, checkbox, column, container, pick_list, row, scrollable, slider, text, text_input,
    Column,
};
use iced::{Alignment, Element, Length};

use crate::state::options::{
    OutputFormat, PdfLevel, VideoCompressOptions, VideoFormat, WatermarkKind,
};
use crate::state::section::Section;
use crate::tools::watermark::WatermarkPosition;
use crate::tools::{compress, ProcessedArtifact, ToolId};
use crate::ui::compare;
use crate::{MediaToolbox, Message};

/// The home section: one button per tool.
pub fn home() -> Element<'static, Message> {
    let mut buttons = column![].spacing(8).align_x(Alignment::Center);
    for tool in ToolId::ALL {
        buttons = buttons.push(
            button(text(tool.label()).size(16))
                .on_press(Message::Navigate(Section::Tool(tool)))
                .width(Length::Fixed(240.0))
                .padding(10),
        );
    }

    let content = column![
        text("Media Toolbox").size(40),
        text("Convert, compress and touch up files locally.").size(16),
        buttons,
    ]
    .spacing(20)
    .padding(40)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

/// One tool's full section.
pub fn tool_section<'a>(app: &'a MediaToolbox, tool: ToolId) -> Element<'a, Message> {
    let files = app.workspace.selections.list_for(tool);
    let pick_label = if tool.allows_multiple() {
        "Choose images…"
    } else {
        "Choose file…"
    };

    let mut content = column![
        text(tool.label()).size(32),
        button(pick_label)
            .on_press(Message::PickFiles(tool))
            .padding(10),
        text("…or drop files onto the window").size(12),
    ]
    .spacing(16)
    .align_x(Alignment::Center);

    if !files.is_empty() {
        let mut list = column![].spacing(4);
        for (index, file) in files.iter().enumerate() {
            list = list.push(
                row![
                    text(format!("{} ({})", file.name, file.size_mb())).size(14),
                    button(text("Remove").size(12)).on_press(Message::RemoveFile(tool, index)),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            );
        }
        content = content.push(list);
    }

    if app.workspace.selections.options_visible(tool) {
        content = content.push(options(app, tool));

        let run = button(text(if app.busy { "Working…" } else { "Process" }))
            .padding(10)
            .on_press_maybe((!app.busy).then_some(Message::RunTool(tool)));
        content = content.push(run);
    }

    if app.workspace.selections.results_visible(tool) {
        if let Some(artifact) = app.workspace.result_for(tool) {
            content = content.push(results(app, tool, artifact));
        }
    }

    scrollable(
        container(content.padding(24))
            .width(Length::Fill)
            .center_x(Length::Fill),
    )
    .into()
}

/// The option controls for one tool.
fn options<'a>(app: &'a MediaToolbox, tool: ToolId) -> Element<'a, Message> {
    let s = &app.settings;
    let b = &app.buffers;

    let panel: Column<'a, Message> = match tool {
        ToolId::ImageCompressor => column![
            text(format!("Quality: {}", s.compress.quality)).size(14),
            slider(0..=100, s.compress.quality, Message::QualityChanged)
                .width(Length::Fixed(300.0)),
        ],

        ToolId::ImageConverter => column![row![
            text("Output format").size(14),
            pick_list(
                &OutputFormat::ALL[..],
                Some(s.convert.format),
                Message::ConvertFormatPicked
            ),
        ]
        .spacing(12)
        .align_y(Alignment::Center)],

        ToolId::ImageResizer => column![
            row![
                text("Width").size(14),
                text_input("e.g. 800", &b.resize_width)
                    .on_input(Message::ResizeWidthChanged)
                    .width(Length::Fixed(100.0)),
                text("Height").size(14),
                text_input("e.g. 600", &b.resize_height)
                    .on_input(Message::ResizeHeightChanged)
                    .width(Length::Fixed(100.0)),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            checkbox("Lock aspect ratio", s.resize.lock_aspect_ratio)
                .on_toggle(Message::LockAspectToggled),
        ],

        ToolId::Watermark => {
            let w = &s.watermark;
            let mut panel = column![
                row![
                    text("Type").size(14),
                    pick_list(
                        [WatermarkKind::Text, WatermarkKind::Image],
                        Some(w.kind),
                        Message::WatermarkKindPicked
                    ),
                    text("Position").size(14),
                    pick_list(
                        &WatermarkPosition::ALL[..],
                        Some(w.position),
                        Message::WatermarkPositionPicked
                    ),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            ];
            match w.kind {
                WatermarkKind::Text => {
                    panel = panel.push(
                        row![
                            text("Text").size(14),
                            text_input("watermark text", &w.text)
                                .on_input(Message::WatermarkTextChanged)
                                .width(Length::Fixed(220.0)),
                            text("Size").size(14),
                            text_input("36", &b.watermark_font_size)
                                .on_input(Message::WatermarkFontSizeChanged)
                                .width(Length::Fixed(60.0)),
                            text("Colour").size(14),
                            text_input("#ffffff", &w.color)
                                .on_input(Message::WatermarkColorChanged)
                                .width(Length::Fixed(90.0)),
                        ]
                        .spacing(12)
                        .align_y(Alignment::Center),
                    );
                    panel = panel.push(column![
                        text(format!("Opacity: {:.0}%", w.text_opacity * 100.0)).size(14),
                        slider(0.0..=1.0, w.text_opacity, Message::WatermarkOpacityChanged)
                            .step(0.05)
                            .width(Length::Fixed(300.0)),
                    ]);
                }
                WatermarkKind::Image => {
                    let chosen = w
                        .image_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| String::from("no overlay chosen"));
                    panel = panel.push(
                        row![
                            button("Choose overlay…").on_press(Message::PickWatermarkImage),
                            text(chosen).size(14),
                        ]
                        .spacing(12)
                        .align_y(Alignment::Center),
                    );
                    panel = panel.push(column![
                        text(format!("Opacity: {:.0}%", w.image_opacity * 100.0)).size(14),
                        slider(
                            0.0..=1.0,
                            w.image_opacity,
                            Message::WatermarkImageOpacityChanged
                        )
                        .step(0.05)
                        .width(Length::Fixed(300.0)),
                        text(format!("Scale: {:.0}%", w.image_scale * 100.0)).size(14),
                        slider(0.1..=1.0, w.image_scale, Message::WatermarkScaleChanged)
                            .step(0.05)
                            .width(Length::Fixed(300.0)),
                    ]);
                }
            }
            panel
        }

        ToolId::ImageEnhancer => column![
            text(format!("Brightness: {}%", s.enhance.brightness)).size(14),
            slider(0..=200, s.enhance.brightness, Message::BrightnessChanged)
                .width(Length::Fixed(300.0)),
            text(format!("Contrast: {}%", s.enhance.contrast)).size(14),
            slider(0..=200, s.enhance.contrast, Message::ContrastChanged)
                .width(Length::Fixed(300.0)),
            text(format!("Saturation: {}%", s.enhance.saturation)).size(14),
            slider(0..=200, s.enhance.saturation, Message::SaturationChanged)
                .width(Length::Fixed(300.0)),
        ],

        ToolId::GifMaker => column![
            row![
                text("Frame delay (ms)").size(14),
                text_input("200", &b.gif_delay)
                    .on_input(Message::GifDelayChanged)
                    .width(Length::Fixed(80.0)),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            text(format!("Quality: {} (lower is better)", s.gif.quality)).size(14),
            slider(1..=30, s.gif.quality, Message::GifQualityChanged).width(Length::Fixed(300.0)),
        ],

        ToolId::PdfCompressor => column![row![
            text("Compression level").size(14),
            pick_list(&PdfLevel::ALL[..], Some(s.pdf.level), Message::PdfLevelPicked),
        ]
        .spacing(12)
        .align_y(Alignment::Center)],

        ToolId::VideoCompressor => {
            let selected = VideoCompressOptions::RESOLUTIONS
                .iter()
                .find(|r| **r == s.video_compress.resolution)
                .copied();
            column![
                row![
                    text("Resolution").size(14),
                    pick_list(&VideoCompressOptions::RESOLUTIONS[..], selected, |r| {
                        Message::VideoResolutionPicked(r.to_string())
                    }),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
                text(format!("Bitrate: {} Mbit/s", s.video_compress.bitrate_mbps)).size(14),
                slider(
                    1..=10,
                    s.video_compress.bitrate_mbps,
                    Message::VideoBitrateChanged
                )
                .width(Length::Fixed(300.0)),
            ]
        }

        ToolId::VideoConverter => column![row![
            text("Output format").size(14),
            pick_list(
                &VideoFormat::ALL[..],
                Some(s.video_convert.format),
                Message::VideoFormatPicked
            ),
        ]
        .spacing(12)
        .align_y(Alignment::Center)],

        ToolId::VideoTrimmer => column![row![
            text("Start (s)").size(14),
            text_input("0", &b.trim_start)
                .on_input(Message::TrimStartChanged)
                .width(Length::Fixed(80.0)),
            text("End (s)").size(14),
            text_input("10", &b.trim_end)
                .on_input(Message::TrimEndChanged)
                .width(Length::Fixed(80.0)),
        ]
        .spacing(12)
        .align_y(Alignment::Center)],
    };

    container(panel.spacing(8).align_x(Alignment::Center))
        .padding(12)
        .into()
}

/// The results panel: a before/after comparison for the image tools, a
/// preview or summary otherwise, plus the save affordance.
fn results<'a>(
    app: &'a MediaToolbox,
    tool: ToolId,
    artifact: &'a ProcessedArtifact,
) -> Element<'a, Message> {
    let mut panel = column![].spacing(12).align_x(Alignment::Center);

    match tool {
        ToolId::ImageCompressor
        | ToolId::ImageConverter
        | ToolId::ImageResizer
        | ToolId::Watermark
        | ToolId::ImageEnhancer => {
            let before = app.workspace.selections.list_for(tool).first();
            if let (Some(before), Some(state)) = (before, app.workspace.compare_for(tool)) {
                panel = panel.push(compare::view(
                    tool,
                    before.bytes.clone(),
                    artifact.bytes.clone(),
                    state,
                ));
            }
            if tool == ToolId::ImageCompressor {
                if let Some(before) = app.workspace.selections.list_for(tool).first() {
                    let after = artifact.bytes.len() as u64;
                    panel = panel.push(
                        text(format!(
                            "{} → {} ({:.1}% smaller)",
                            before.size_mb(),
                            format_mb(after),
                            compress::reduction_percent(before.size, after),
                        ))
                        .size(14),
                    );
                }
            }
        }

        ToolId::GifMaker => {
            panel = panel.push(
                iced::widget::image(iced::widget::image::Handle::from_bytes(
                    artifact.bytes.clone(),
                ))
                .width(Length::Fixed(320.0)),
            );
        }

        _ => {
            panel = panel.push(
                text(format!(
                    "{} ({})",
                    artifact.filename,
                    format_mb(artifact.bytes.len() as u64)
                ))
                .size(14),
            );
        }
    }

    panel = panel.push(
        button("Save As…")
            .on_press(Message::SaveArtifact(tool))
            .padding(10),
    );

    container(panel).padding(12).into()
}

fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// MIME-ish file dialog filter for a tool's picker.
pub fn picker_filter(tool: ToolId) -> (&'static str, &'static [&'static str]) {
    match tool {
        ToolId::ImageCompressor
        | ToolId::ImageConverter
        | ToolId::ImageResizer
        | ToolId::Watermark
        | ToolId::ImageEnhancer
        | ToolId::GifMaker => ("Images", &["png", "jpg", "jpeg", "webp", "bmp", "gif"]),
        ToolId::PdfCompressor => ("PDF documents", &["pdf"]),
        ToolId::VideoCompressor | ToolId::VideoConverter | ToolId::VideoTrimmer => {
            ("Videos", &["mp4", "webm", "avi", "mov"])
        }
    }
}
