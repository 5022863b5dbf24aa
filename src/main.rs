use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;

mod error;
mod state;
mod tools;
mod ui;

use error::ToolboxError;
use state::options::{
    OutputFormat, PdfLevel, ToolSettings, TrimOptions, VideoFormat, WatermarkKind,
};
use state::section::{Section, Workspace};
use state::selection::StagedFile;
use tools::watermark::WatermarkPosition;
use tools::{ProcessedArtifact, ProgressFn, ToolId};
use ui::compare::CompareEvent;

/// Main application state
pub struct MediaToolbox {
    /// The active section and everything that resets with it
    pub workspace: Workspace,
    /// Last-used options for every tool, persisted between runs
    pub settings: ToolSettings,
    /// Raw text of the numeric inputs, parsed when a pipeline runs
    pub buffers: InputBuffers,
    /// True while a pipeline is in flight; run buttons are disabled
    pub busy: bool,
    /// Status line shown at the bottom of the window
    pub status: String,
}

/// Text-input contents for options that are typed rather than picked.
/// Kept as strings so the user can clear or half-type a number without
/// the value snapping back; parsing happens when the tool runs.
pub struct InputBuffers {
    pub resize_width: String,
    pub resize_height: String,
    pub watermark_font_size: String,
    pub gif_delay: String,
    pub trim_start: String,
    pub trim_end: String,
}

impl InputBuffers {
    fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            resize_width: settings
                .resize
                .width
                .map(|v| v.to_string())
                .unwrap_or_default(),
            resize_height: settings
                .resize
                .height
                .map(|v| v.to_string())
                .unwrap_or_default(),
            watermark_font_size: settings.watermark.font_size.to_string(),
            gif_delay: settings.gif.delay_ms.to_string(),
            trim_start: settings.trim.start.to_string(),
            trim_end: settings.trim.end.to_string(),
        }
    }
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Switch to another section, resetting every tool's transient state
    Navigate(Section),
    /// Open the native file picker for a tool
    PickFiles(ToolId),
    /// A file was dropped onto the window; staged on the active tool
    FileDropped(PathBuf),
    /// Remove one staged file from a tool's list
    RemoveFile(ToolId, usize),
    /// Run the tool's pipeline on its staged files
    RunTool(ToolId),
    /// A pipeline finished, successfully or not, tagged with the
    /// workspace epoch it started under
    ToolFinished(ToolId, u64, Result<ProcessedArtifact, ToolboxError>),
    /// Save the tool's current artifact via the native save dialog
    SaveArtifact(ToolId),
    /// Pointer interaction on a comparison widget
    Compare(ToolId, CompareEvent),

    // Option changes
    QualityChanged(u8),
    ConvertFormatPicked(OutputFormat),
    ResizeWidthChanged(String),
    ResizeHeightChanged(String),
    LockAspectToggled(bool),
    WatermarkKindPicked(WatermarkKind),
    WatermarkPositionPicked(WatermarkPosition),
    WatermarkTextChanged(String),
    WatermarkFontSizeChanged(String),
    WatermarkColorChanged(String),
    WatermarkOpacityChanged(f32),
    PickWatermarkImage,
    WatermarkImageOpacityChanged(f32),
    WatermarkScaleChanged(f32),
    BrightnessChanged(u32),
    ContrastChanged(u32),
    SaturationChanged(u32),
    GifDelayChanged(String),
    GifQualityChanged(u8),
    PdfLevelPicked(PdfLevel),
    VideoResolutionPicked(String),
    VideoBitrateChanged(u32),
    VideoFormatPicked(VideoFormat),
    TrimStartChanged(String),
    TrimEndChanged(String),
}

impl MediaToolbox {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = ToolSettings::load();
        let buffers = InputBuffers::from_settings(&settings);
        println!("🧰 Media Toolbox ready ({} tools)", ToolId::ALL.len());

        (
            MediaToolbox {
                workspace: Workspace::new(),
                settings,
                buffers,
                busy: false,
                status: String::from("Ready."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(section) => {
                self.workspace.activate(section);
                self.status = String::from("Ready.");
                Task::none()
            }

            Message::PickFiles(tool) => {
                let (filter_name, extensions) = ui::sections::picker_filter(tool);
                let dialog = FileDialog::new()
                    .set_title(tool.label())
                    .add_filter(filter_name, extensions);

                let paths: Vec<_> = if tool.allows_multiple() {
                    dialog.pick_files().unwrap_or_default()
                } else {
                    dialog.pick_file().into_iter().collect()
                };

                let mut files = Vec::new();
                for path in paths {
                    match std::fs::read(&path) {
                        Ok(bytes) => {
                            let name = path
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_else(|| String::from("file"));
                            files.push(StagedFile::new(name, bytes));
                        }
                        Err(e) => eprintln!("⚠️  Failed to read {}: {}", path.display(), e),
                    }
                }

                if !files.is_empty() {
                    println!("📁 Staged {} file(s) for {}", files.len(), tool.label());
                    self.workspace
                        .selections
                        .stage(tool, files, tool.allows_multiple());
                }
                Task::none()
            }

            Message::FileDropped(path) => {
                // Drops land on whichever tool section is active; on the
                // home screen they are ignored.
                let Section::Tool(tool) = self.workspace.active() else {
                    return Task::none();
                };
                match std::fs::read(&path) {
                    Ok(bytes) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| String::from("file"));
                        println!("📁 Dropped {} on {}", name, tool.label());

                        // Multi-file tools accumulate drops (each file in
                        // a dropped batch arrives as its own event);
                        // single-file tools replace their selection.
                        let mut files = if tool.allows_multiple() {
                            self.workspace.selections.list_for(tool).to_vec()
                        } else {
                            Vec::new()
                        };
                        files.push(StagedFile::new(name, bytes));
                        self.workspace
                            .selections
                            .stage(tool, files, tool.allows_multiple());
                    }
                    Err(e) => eprintln!("⚠️  Failed to read {}: {}", path.display(), e),
                }
                Task::none()
            }

            Message::RemoveFile(tool, index) => {
                if let Err(e) = self.workspace.selections.remove(tool, index) {
                    eprintln!("⚠️  {}", e);
                }
                Task::none()
            }

            Message::RunTool(tool) => self.run_tool(tool),

            Message::ToolFinished(tool, epoch, result) => {
                self.busy = false;
                if epoch != self.workspace.epoch() {
                    // The user navigated away while this ran; the router
                    // already invalidated everything this result would
                    // attach to, so it must not resurface.
                    println!("🗑️  Discarding stale {} result", tool.label());
                    return Task::none();
                }
                match result {
                    Ok(artifact) => {
                        println!(
                            "✅ {} produced {} ({} bytes)",
                            tool.label(),
                            artifact.filename,
                            artifact.bytes.len()
                        );
                        self.status = format!("✅ {} ready", artifact.filename);
                        self.workspace.set_result(tool, artifact);
                    }
                    Err(e) => {
                        // The previous artifact, if any, stays in place.
                        eprintln!("⚠️  {} failed: {}", tool.label(), e);
                        self.status = format!("⚠️ {}", e);
                    }
                }
                Task::none()
            }

            Message::SaveArtifact(tool) => {
                let Some(artifact) = self.workspace.result_for(tool).cloned() else {
                    return Task::none();
                };
                let chosen = FileDialog::new()
                    .set_file_name(&artifact.filename)
                    .save_file();
                if let Some(path) = chosen {
                    match std::fs::write(&path, &artifact.bytes) {
                        Ok(()) => {
                            println!("💾 Saved {}", path.display());
                            self.status = format!("💾 Saved {}", path.display());
                        }
                        Err(e) => {
                            eprintln!("⚠️  Failed to save {}: {}", path.display(), e);
                            self.status = format!("⚠️ Failed to save: {}", e);
                        }
                    }
                }
                Task::none()
            }

            Message::Compare(tool, event) => {
                if let Some(state) = self.workspace.compare_mut(tool) {
                    match event {
                        CompareEvent::Pressed => state.begin_drag(),
                        CompareEvent::Moved(x) => state.drag_to(x),
                        CompareEvent::Released => state.end_drag(),
                    }
                }
                Task::none()
            }

            Message::PickWatermarkImage => {
                let chosen = FileDialog::new()
                    .set_title("Choose watermark overlay")
                    .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp"])
                    .pick_file();
                if let Some(path) = chosen {
                    self.settings.watermark.image_path = Some(path);
                    self.settings.save();
                }
                Task::none()
            }

            other => {
                self.apply_option(other);
                self.settings.save();
                Task::none()
            }
        }
    }

    /// Kick off one pipeline run. Only one runs at a time; the run
    /// buttons are disabled while `busy` is set.
    fn run_tool(&mut self, tool: ToolId) -> Task<Message> {
        if self.busy {
            return Task::none();
        }
        let selection = self.workspace.selections.list_for(tool).to_vec();
        self.commit_buffers();
        self.settings.save();

        self.busy = true;
        self.status = format!("Processing with {}…", tool.label());
        println!("🚀 {} on {} file(s)", tool.label(), selection.len());

        let progress: ProgressFn = Arc::new(|ratio| println!("⏳ {:.0}%", ratio * 100.0));
        let epoch = self.workspace.epoch();
        let finished = move |result| Message::ToolFinished(tool, epoch, result);

        match tool {
            ToolId::ImageCompressor => {
                let options = self.settings.compress;
                Task::perform(tools::compress::run(selection, options), finished)
            }
            ToolId::ImageConverter => {
                let options = self.settings.convert;
                Task::perform(tools::convert::run(selection, options), finished)
            }
            ToolId::ImageResizer => {
                let options = self.settings.resize;
                Task::perform(tools::resize::run(selection, options), finished)
            }
            ToolId::Watermark => {
                let options = self.settings.watermark.clone();
                Task::perform(tools::watermark::run(selection, options), finished)
            }
            ToolId::ImageEnhancer => {
                let options = self.settings.enhance;
                Task::perform(tools::enhance::run(selection, options), finished)
            }
            ToolId::GifMaker => {
                let options = self.settings.gif;
                Task::perform(tools::gif::run(selection, options, progress), finished)
            }
            ToolId::PdfCompressor => {
                let options = self.settings.pdf;
                Task::perform(tools::pdf::run(selection, options), finished)
            }
            ToolId::VideoCompressor => {
                let options = self.settings.video_compress.clone();
                Task::perform(
                    tools::video::run_compress(selection, options, progress),
                    finished,
                )
            }
            ToolId::VideoConverter => {
                let options = self.settings.video_convert;
                Task::perform(
                    tools::video::run_convert(selection, options, progress),
                    finished,
                )
            }
            ToolId::VideoTrimmer => {
                // Unparseable text becomes NaN, which the trim validation
                // rejects with the same message as a bad range.
                let options = TrimOptions {
                    start: self.buffers.trim_start.trim().parse().unwrap_or(f64::NAN),
                    end: self.buffers.trim_end.trim().parse().unwrap_or(f64::NAN),
                };
                if options.start.is_finite() && options.end.is_finite() {
                    self.settings.trim = options;
                }
                Task::perform(tools::video::run_trim(selection, options, progress), finished)
            }
        }
    }

    /// Parse the typed numeric buffers into the settings they back.
    fn commit_buffers(&mut self) {
        self.settings.resize.width = self.buffers.resize_width.trim().parse().ok();
        self.settings.resize.height = self.buffers.resize_height.trim().parse().ok();
        if let Ok(size) = self.buffers.watermark_font_size.trim().parse() {
            self.settings.watermark.font_size = size;
        }
        if let Ok(delay) = self.buffers.gif_delay.trim().parse() {
            self.settings.gif.delay_ms = delay;
        }
    }

    /// Option-change messages: mutate settings or input buffers.
    fn apply_option(&mut self, message: Message) {
        match message {
            Message::QualityChanged(q) => self.settings.compress.quality = q,
            Message::ConvertFormatPicked(f) => self.settings.convert.format = f,
            Message::ResizeWidthChanged(s) => self.buffers.resize_width = s,
            Message::ResizeHeightChanged(s) => self.buffers.resize_height = s,
            Message::LockAspectToggled(on) => self.settings.resize.lock_aspect_ratio = on,
            Message::WatermarkKindPicked(k) => self.settings.watermark.kind = k,
            Message::WatermarkPositionPicked(p) => self.settings.watermark.position = p,
            Message::WatermarkTextChanged(t) => self.settings.watermark.text = t,
            Message::WatermarkFontSizeChanged(s) => self.buffers.watermark_font_size = s,
            Message::WatermarkColorChanged(c) => self.settings.watermark.color = c,
            Message::WatermarkOpacityChanged(o) => self.settings.watermark.text_opacity = o,
            Message::WatermarkImageOpacityChanged(o) => self.settings.watermark.image_opacity = o,
            Message::WatermarkScaleChanged(s) => self.settings.watermark.image_scale = s,
            Message::BrightnessChanged(v) => self.settings.enhance.brightness = v,
            Message::ContrastChanged(v) => self.settings.enhance.contrast = v,
            Message::SaturationChanged(v) => self.settings.enhance.saturation = v,
            Message::GifDelayChanged(s) => self.buffers.gif_delay = s,
            Message::GifQualityChanged(q) => self.settings.gif.quality = q,
            Message::PdfLevelPicked(l) => self.settings.pdf.level = l,
            Message::VideoResolutionPicked(r) => self.settings.video_compress.resolution = r,
            Message::VideoBitrateChanged(b) => self.settings.video_compress.bitrate_mbps = b,
            Message::VideoFormatPicked(f) => self.settings.video_convert.format = f,
            Message::TrimStartChanged(s) => self.buffers.trim_start = s,
            Message::TrimEndChanged(s) => self.buffers.trim_end = s,
            _ => {}
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut nav = row![button(text("Home").size(14))
            .on_press(Message::Navigate(Section::Home))
            .padding(6)]
        .spacing(6);
        for tool in ToolId::ALL {
            nav = nav.push(
                button(text(tool.label()).size(14))
                    .on_press(Message::Navigate(Section::Tool(tool)))
                    .padding(6),
            );
        }

        let body = match self.workspace.active() {
            Section::Home => ui::sections::home(),
            Section::Tool(tool) => ui::sections::tool_section(self, tool),
        };

        column![
            scrollable(container(nav).padding(8))
                .direction(scrollable::Direction::Horizontal(Default::default())),
            container(body).height(Length::Fill),
            container(text(&self.status).size(14)).padding(8),
        ]
        .spacing(4)
        .into()
    }

    /// Listen for files dropped onto the window; they stage on the
    /// active tool section just like picked ones.
    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Media Toolbox", MediaToolbox::update, MediaToolbox::view)
        .subscription(MediaToolbox::subscription)
        .theme(MediaToolbox::theme)
        .centered()
        .run_with(MediaToolbox::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> MediaToolbox {
        MediaToolbox::new().0
    }

    fn artifact() -> ProcessedArtifact {
        ProcessedArtifact {
            bytes: vec![1, 2, 3],
            filename: "compressed_a.jpeg".into(),
            mime: "image/jpeg".into(),
        }
    }

    #[test]
    fn test_dropped_file_stages_on_the_active_tool() {
        let mut app = app();
        let _ = app.update(Message::Navigate(Section::Tool(ToolId::ImageCompressor)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let _ = app.update(Message::FileDropped(path));
        let list = app.workspace.selections.list_for(ToolId::ImageCompressor);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "photo.png");
        assert!(app.workspace.selections.options_visible(ToolId::ImageCompressor));
    }

    #[test]
    fn test_drop_on_home_is_ignored() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let _ = app.update(Message::FileDropped(path));
        for tool in ToolId::ALL {
            assert!(app.workspace.selections.list_for(tool).is_empty());
        }
    }

    #[test]
    fn test_drops_accumulate_for_the_gif_maker() {
        let mut app = app();
        let _ = app.update(Message::Navigate(Section::Tool(ToolId::GifMaker)));

        let dir = tempfile::tempdir().unwrap();
        for name in ["1.png", "2.png"] {
            let path = dir.path().join(name);
            std::fs::write(&path, [0u8; 4]).unwrap();
            let _ = app.update(Message::FileDropped(path));
        }
        assert_eq!(app.workspace.selections.list_for(ToolId::GifMaker).len(), 2);

        // A single-file tool replaces instead of accumulating.
        let _ = app.update(Message::Navigate(Section::Tool(ToolId::ImageResizer)));
        for name in ["a.png", "b.png"] {
            let path = dir.path().join(name);
            std::fs::write(&path, [0u8; 4]).unwrap();
            let _ = app.update(Message::FileDropped(path));
        }
        let list = app.workspace.selections.list_for(ToolId::ImageResizer);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "b.png");
    }

    #[test]
    fn test_stale_completion_is_discarded_after_navigation() {
        let mut app = app();
        let tool = ToolId::ImageCompressor;
        let _ = app.update(Message::Navigate(Section::Tool(tool)));
        app.workspace
            .selections
            .stage(tool, vec![StagedFile::new("a.png", vec![0; 8])], false);
        let epoch = app.workspace.epoch();
        app.busy = true;

        // Navigating away invalidates everything the run would attach to.
        let _ = app.update(Message::Navigate(Section::Home));
        let _ = app.update(Message::ToolFinished(tool, epoch, Ok(artifact())));

        assert!(!app.busy);
        assert!(app.workspace.result_for(tool).is_none());
        assert!(!app.workspace.selections.results_visible(tool));
    }

    #[test]
    fn test_current_completion_lands() {
        let mut app = app();
        let tool = ToolId::ImageCompressor;
        let _ = app.update(Message::Navigate(Section::Tool(tool)));
        app.workspace
            .selections
            .stage(tool, vec![StagedFile::new("a.png", vec![0; 8])], false);
        let epoch = app.workspace.epoch();

        let _ = app.update(Message::ToolFinished(tool, epoch, Ok(artifact())));
        assert!(app.workspace.result_for(tool).is_some());
        assert!(app.workspace.selections.results_visible(tool));
    }
}
