use crate::encode::formats::{AudioFormat, VideoFormat};
use crate::foundation::core::Fps;
use crate::foundation::error::{WaterfallError, WaterfallResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Inputs for muxing a numbered image sequence with an audio track.
#[derive(Clone, Debug)]
pub struct MuxConfig {
    /// `printf`-style frame pattern, e.g. `images/%04d.png`. Numbering starts at 0.
    pub frames_pattern: PathBuf,
    /// Sequence frame rate.
    pub fps: Fps,
    /// Audio track (any format `ffmpeg` reads).
    pub audio_path: PathBuf,
    /// Output container path.
    pub out_path: PathBuf,
    /// Output container format.
    pub format: VideoFormat,
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn require_ffmpeg(what: &str) -> WaterfallResult<()> {
    if !is_ffmpeg_on_path() {
        return Err(WaterfallError::encode(format!(
            "ffmpeg is required for {what}, but was not found on PATH"
        )));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WaterfallResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| WaterfallError::io(parent, e))?;
    }
    Ok(())
}

/// Transcode the WAVE file `wav_path` into `out_path` as `format`.
pub fn transcode_audio(wav_path: &Path, out_path: &Path, format: AudioFormat) -> WaterfallResult<()> {
    let Some(codec) = format.ffmpeg_codec() else {
        return Err(WaterfallError::validation(
            "transcode_audio called for a format that needs no transcoding",
        ));
    };
    require_ffmpeg("audio transcoding")?;
    ensure_parent_dir(out_path)?;

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-loglevel", "error", "-i"])
        .arg(wav_path)
        .args(["-vn", "-c:a", codec])
        .arg(out_path);
    run(cmd, "audio transcode")
}

/// Mux a frame sequence and an audio track into one video file.
pub fn mux_sequence(cfg: &MuxConfig) -> WaterfallResult<()> {
    require_ffmpeg("video export")?;
    ensure_parent_dir(&cfg.out_path)?;

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-loglevel", "error"])
        .args([
            "-framerate",
            &format!("{}/{}", cfg.fps.num(), cfg.fps.den()),
            "-start_number",
            "0",
            "-i",
        ])
        .arg(&cfg.frames_pattern)
        .arg("-i")
        .arg(&cfg.audio_path)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            cfg.format.video_codec(),
            // yuv420p needs even dimensions.
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            cfg.format.audio_codec(),
        ]);
    if cfg.format == VideoFormat::Mp4 {
        cmd.args(["-movflags", "+faststart"]);
    }
    cmd.arg(&cfg.out_path);
    run(cmd, "video mux")
}

fn run(mut cmd: Command, what: &str) -> WaterfallResult<()> {
    tracing::debug!(?cmd, "running ffmpeg");
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            WaterfallError::encode(format!(
                "failed to spawn ffmpeg for {what} (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WaterfallError::encode(format!(
            "ffmpeg {what} exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}
