/// Video pipelines: compress, convert, trim.
///
/// All three delegate to the ffmpeg command-line collaborator, executed
/// against a scratch directory that stands in for the original's
/// in-memory filesystem: staged bytes are written in, one command runs,
/// the output bytes are read back out. The `TempDir` owns the scratch
/// space, so every exit path (success, failure, early validation return)
/// releases it.
///
/// Progress is advisory only: ffmpeg's `time=` stderr lines are parsed
/// against the probed input duration into a non-decreasing ratio.
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::{ToolboxError, ToolboxResult};
use crate::state::options::{TrimOptions, VideoCompressOptions, VideoConvertOptions};
use crate::state::selection::StagedFile;
use crate::tools::{self, ProcessedArtifact, ProgressFn};

/// `-i <in> -vf scale=<res> -b:v <n>M -c:v libx264 -preset medium -crf 28 <out>`
pub fn build_compress_args(
    input: &str,
    output: &str,
    options: &VideoCompressOptions,
) -> Vec<String> {
    vec![
        "-i".into(),
        input.into(),
        "-vf".into(),
        format!("scale={}", options.resolution),
        "-b:v".into(),
        format!("{}M", options.bitrate_mbps),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "medium".into(),
        "-crf".into(),
        "28".into(),
        output.into(),
    ]
}

/// `-i <in> <out>` — the container change is inferred from the output name.
pub fn build_convert_args(input: &str, output: &str) -> Vec<String> {
    vec!["-i".into(), input.into(), output.into()]
}

/// `-i <in> -ss <start> -to <end> -c copy <out>` — stream copy, no
/// re-encoding. Fast, but cuts land on keyframes.
pub fn build_trim_args(input: &str, output: &str, options: &TrimOptions) -> Vec<String> {
    vec![
        "-i".into(),
        input.into(),
        "-ss".into(),
        options.start.to_string(),
        "-to".into(),
        options.end.to_string(),
        "-c".into(),
        "copy".into(),
        output.into(),
    ]
}

/// Scratch output name for one transcode, guaranteed to differ from the
/// staged input name: ffmpeg runs without `-y` and refuses to overwrite
/// an existing file, so a staged input literally named `out.<ext>` must
/// not collide with the output.
pub fn scratch_output_name(input: &str, ext: &str) -> String {
    let candidate = format!("out.{}", ext);
    if candidate == input {
        format!("out_1.{}", ext)
    } else {
        candidate
    }
}

/// Trim timestamps must satisfy `0 <= start < end`.
pub fn validate_trim(options: &TrimOptions) -> ToolboxResult<()> {
    if !options.start.is_finite()
        || !options.end.is_finite()
        || options.start < 0.0
        || options.end <= options.start
    {
        return Err(ToolboxError::invalid(
            "enter valid start and end times (start ≥ 0, end > start)",
        ));
    }
    Ok(())
}

/// Extract the seconds value from an ffmpeg stderr stats line, e.g.
/// `frame= 120 fps= 30 ... time=00:01:23.45 bitrate=...`.
pub fn parse_time_seconds(line: &str) -> Option<f64> {
    let rest = &line[line.find("time=")? + 5..];
    let stamp = rest.split_whitespace().next()?;
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

pub async fn run_compress(
    selection: Vec<StagedFile>,
    options: VideoCompressOptions,
    progress: ProgressFn,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();
    let filename = format!("compressed_{}.mp4", tools::base_name(&input.name));
    let scratch_out = scratch_output_name(&input.name, "mp4");

    let args = build_compress_args(&input.name, &scratch_out, &options);
    let bytes = transcode(&input, &args, &scratch_out, progress, None).await?;

    Ok(ProcessedArtifact {
        bytes,
        filename,
        mime: "video/mp4".to_string(),
    })
}

pub async fn run_convert(
    selection: Vec<StagedFile>,
    options: VideoConvertOptions,
    progress: ProgressFn,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();
    let ext = options.format.extension();
    let filename = format!("{}.{}", tools::base_name(&input.name), ext);
    let scratch_out = scratch_output_name(&input.name, ext);

    let args = build_convert_args(&input.name, &scratch_out);
    let bytes = transcode(&input, &args, &scratch_out, progress, None).await?;

    Ok(ProcessedArtifact {
        bytes,
        filename,
        mime: options.format.mime().to_string(),
    })
}

pub async fn run_trim(
    selection: Vec<StagedFile>,
    options: TrimOptions,
    progress: ProgressFn,
) -> ToolboxResult<ProcessedArtifact> {
    let input = tools::single_input(&selection)?.clone();
    validate_trim(&options)?;
    let filename = format!("trimmed_{}.mp4", tools::base_name(&input.name));
    let scratch_out = scratch_output_name(&input.name, "mp4");

    let args = build_trim_args(&input.name, &scratch_out, &options);
    // The output runs from start to end, so the ratio denominator is the
    // clip length rather than the full input duration.
    let clip_seconds = Some(options.end - options.start);
    let bytes = transcode(&input, &args, &scratch_out, progress, clip_seconds).await?;

    Ok(ProcessedArtifact {
        bytes,
        filename,
        mime: "video/mp4".to_string(),
    })
}

/// Write the staged bytes into a scratch directory, run one ffmpeg
/// command there, stream progress off stderr, and read the output back.
async fn transcode(
    input: &StagedFile,
    args: &[String],
    scratch_out: &str,
    progress: ProgressFn,
    total_seconds: Option<f64>,
) -> ToolboxResult<Vec<u8>> {
    let scratch = tempfile::tempdir()
        .map_err(|e| ToolboxError::collaborator(format!("failed to create scratch dir: {}", e)))?;

    let input_path = scratch.path().join(&input.name);
    tokio::fs::write(&input_path, &input.bytes)
        .await
        .map_err(|e| ToolboxError::collaborator(format!("failed to stage video: {}", e)))?;

    let total_seconds = match total_seconds {
        Some(t) => Some(t),
        None => probe_duration(&input_path).await,
    };

    let mut child = Command::new("ffmpeg")
        .args(args)
        .current_dir(scratch.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ToolboxError::collaborator(format!(
                "could not start ffmpeg (is it installed?): {}",
                e
            ))
        })?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ToolboxError::collaborator("ffmpeg produced no stderr handle"))?;

    // ffmpeg reports its encode position on stderr; keep a short tail of
    // lines for error reporting and turn time= stamps into ratios.
    let mut tail: Vec<String> = Vec::new();
    let mut best_ratio = 0.0_f32;
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let (Some(seconds), Some(total)) = (parse_time_seconds(&line), total_seconds) {
            if total > 0.0 {
                let ratio = (seconds / total).clamp(0.0, 1.0) as f32;
                if ratio > best_ratio {
                    best_ratio = ratio;
                    progress(best_ratio);
                }
            }
        }
        tail.push(line);
        if tail.len() > 20 {
            tail.remove(0);
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| ToolboxError::collaborator(format!("ffmpeg did not exit: {}", e)))?;
    if !status.success() {
        return Err(ToolboxError::collaborator(format!(
            "ffmpeg failed ({}): {}",
            status,
            tail.join("\n")
        )));
    }

    tokio::fs::read(scratch.path().join(scratch_out))
        .await
        .map_err(|e| ToolboxError::collaborator(format!("ffmpeg produced no output: {}", e)))
    // `scratch` drops here on every path, deleting the directory.
}

/// Input duration in seconds via ffprobe; None if the probe fails
/// (progress is then simply not reported).
async fn probe_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_argument_vector() {
        let options = VideoCompressOptions {
            resolution: "1280:720".into(),
            bitrate_mbps: 2,
        };
        let args = build_compress_args("clip.mov", "out.mp4", &options);
        assert_eq!(
            args,
            vec![
                "-i", "clip.mov", "-vf", "scale=1280:720", "-b:v", "2M", "-c:v", "libx264",
                "-preset", "medium", "-crf", "28", "out.mp4",
            ]
        );
    }

    #[test]
    fn test_convert_argument_vector() {
        assert_eq!(
            build_convert_args("clip.avi", "out.webm"),
            vec!["-i", "clip.avi", "out.webm"]
        );
    }

    #[test]
    fn test_trim_argument_vector_uses_stream_copy() {
        let options = TrimOptions {
            start: 1.5,
            end: 10.0,
        };
        let args = build_trim_args("clip.mp4", "out.mp4", &options);
        assert_eq!(
            args,
            vec!["-i", "clip.mp4", "-ss", "1.5", "-to", "10", "-c", "copy", "out.mp4"]
        );
    }

    #[test]
    fn test_scratch_output_never_collides_with_input() {
        assert_eq!(scratch_output_name("clip.mp4", "mp4"), "out.mp4");
        assert_eq!(scratch_output_name("out.mp4", "mp4"), "out_1.mp4");
        assert_eq!(scratch_output_name("out.webm", "webm"), "out_1.webm");
        assert_eq!(scratch_output_name("out.mp4", "webm"), "out.webm");
    }

    #[test]
    fn test_trim_validation() {
        assert!(validate_trim(&TrimOptions { start: 0.0, end: 5.0 }).is_ok());
        assert!(validate_trim(&TrimOptions { start: -1.0, end: 5.0 }).is_err());
        assert!(validate_trim(&TrimOptions { start: 5.0, end: 5.0 }).is_err());
        assert!(validate_trim(&TrimOptions { start: 9.0, end: 2.0 }).is_err());
        assert!(validate_trim(&TrimOptions {
            start: f64::NAN,
            end: 2.0
        })
        .is_err());
    }

    #[test]
    fn test_stderr_time_parsing() {
        let line = "frame=  120 fps= 30 q=28.0 size=256kB time=00:01:23.45 bitrate= 251kbits/s";
        let seconds = parse_time_seconds(line).unwrap();
        assert!((seconds - 83.45).abs() < 1e-9);

        assert_eq!(parse_time_seconds("no timestamp here"), None);
        assert_eq!(parse_time_seconds("time=garbage"), None);
    }

    #[tokio::test]
    async fn test_empty_selection_is_invalid() {
        let err = run_compress(
            vec![],
            VideoCompressOptions::default(),
            tools::no_progress(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolboxError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_bad_trim_range_fails_before_ffmpeg_runs() {
        let staged = StagedFile::new("clip.mp4", vec![0u8; 32]);
        let err = run_trim(
            vec![staged],
            TrimOptions {
                start: 10.0,
                end: 2.0,
            },
            tools::no_progress(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolboxError::InvalidInput(_)));
    }
}
