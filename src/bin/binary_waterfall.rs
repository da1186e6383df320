use std::path::PathBuf;

use anyhow::Context as _;
use binary_waterfall::{
    AspectPolicy, AudioSettings, Canvas, ExportJob, ExportOutcome, ExportProgress, Fps,
    ImageFormat, Waterfall, WaterfallConfig,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "binary-waterfall", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print what a file looks and sounds like under the current settings.
    Info(InfoArgs),
    /// Export the frame at one timestamp as an image.
    Frame(FrameArgs),
    /// Export every frame as a numbered image sequence.
    Sequence(SequenceArgs),
    /// Export the audio track (MP3/FLAC require `ffmpeg` on PATH).
    Audio(AudioArgs),
    /// Export a video with audio (requires `ffmpeg` on PATH).
    Video(VideoArgs),
}

/// Visualization and audio settings, layered over `--config`.
#[derive(Args, Debug)]
struct SessionArgs {
    /// Source file to visualize.
    input: PathBuf,

    /// JSON settings file; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Channel format, e.g. `bgrx`, `rgb`, `w`.
    #[arg(long)]
    color_format: Option<String>,

    /// Audio channels (1 or 2).
    #[arg(long)]
    channels: Option<u16>,

    /// Bytes per audio sample (1-4).
    #[arg(long)]
    sample_bytes: Option<u16>,

    #[arg(long)]
    sample_rate: Option<u32>,

    /// Volume percent (0-100).
    #[arg(long)]
    volume: Option<u8>,

    /// Keep the first source row at the top of the frame.
    #[arg(long, default_value_t = false)]
    no_flip: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output size as `WxH`; defaults to the visualization size.
    #[arg(long)]
    size: Option<Canvas>,

    /// Preserve the aspect ratio when resizing, padding with black. Needs `--size`.
    #[arg(long, default_value_t = false, requires = "size")]
    letterbox: bool,

    /// Overlay the watermark.
    #[arg(long, default_value_t = false)]
    watermark: bool,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Frame rate, `N` or `N/D`.
    #[arg(long, default_value = "30")]
    fps: Fps,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Frames dispatched per batch.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct InfoArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Frame rate used for the frame count.
    #[arg(long, default_value = "30")]
    fps: Fps,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    session: SessionArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Timestamp in milliseconds.
    #[arg(long, default_value_t = 0)]
    at: u64,

    /// Output image (.png, .jpg, .bmp).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SequenceArgs {
    #[command(flatten)]
    session: SessionArgs,

    #[command(flatten)]
    render: RenderArgs,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Image format of the frames.
    #[arg(long, default_value = "png")]
    format: ImageFormat,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct AudioArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output audio file (.wav, .mp3, .flac).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct VideoArgs {
    #[command(flatten)]
    session: SessionArgs,

    #[command(flatten)]
    render: RenderArgs,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Output video file (.mp4, .mkv, .avi).
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
        Command::Audio(args) => cmd_audio(args),
        Command::Video(args) => cmd_video(args),
    }
}

fn open_session(args: &SessionArgs) -> anyhow::Result<Waterfall> {
    let mut cfg = match &args.config {
        Some(path) => WaterfallConfig::from_path(path)?,
        None => WaterfallConfig::default(),
    };
    if let Some(w) = args.width {
        cfg.width = w;
    }
    if let Some(h) = args.height {
        cfg.height = h;
    }
    if let Some(f) = &args.color_format {
        cfg.color_format = f.clone();
    }
    let AudioSettings {
        channels,
        sample_bytes,
        sample_rate,
        volume,
    } = cfg.audio;
    cfg.audio = AudioSettings {
        channels: args.channels.unwrap_or(channels),
        sample_bytes: args.sample_bytes.unwrap_or(sample_bytes),
        sample_rate: args.sample_rate.unwrap_or(sample_rate),
        volume: args.volume.unwrap_or(volume),
    };
    if args.no_flip {
        cfg.flip_vertical = false;
    }
    cfg.validate()?;

    let mut wf = Waterfall::from_config(&cfg)?;
    wf.open(&args.input)
        .with_context(|| format!("open source '{}'", args.input.display()))?;
    Ok(wf)
}

fn base_job(render: &RenderArgs) -> ExportJob {
    let mut job = ExportJob::default().with_watermark(render.watermark);
    if let Some(size) = render.size {
        let aspect = if render.letterbox {
            AspectPolicy::Letterbox
        } else {
            AspectPolicy::Stretch
        };
        job = job.with_size(size, aspect);
    }
    job
}

fn pipeline_job(render: &RenderArgs, pipeline: &PipelineArgs) -> ExportJob {
    let mut job = base_job(render)
        .with_chunk_size(pipeline.chunk_size)
        .with_progress(log_progress);
    job.fps = pipeline.fps;
    job.threads = pipeline.threads;
    job
}

/// Log roughly every tenth of a phase.
fn log_progress(p: ExportProgress) {
    let step = (p.total / 10).max(1);
    if p.done == p.total || p.done % step == 0 {
        tracing::info!(phase = ?p.phase, done = p.done, total = p.total, "progress");
    }
}

fn report(outcome: ExportOutcome, out: &std::path::Path) {
    let stats = outcome.stats();
    match outcome {
        ExportOutcome::Completed(_) => eprintln!(
            "wrote {} ({} frames)",
            out.display(),
            stats.frames_written
        ),
        ExportOutcome::Cancelled(_) => eprintln!(
            "cancelled after {} of {} frames",
            stats.frames_written, stats.frames_total
        ),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let wf = open_session(&args.session)?;
    let Some(source) = wf.source() else {
        anyhow::bail!("no source loaded");
    };
    let geometry = wf.geometry();
    let spec = wf.color_format();
    let audio = wf.audio_settings();

    println!("source:        {}", source.display_name());
    println!("bytes:         {}", source.total_bytes());
    println!("geometry:      {}x{}", geometry.width, geometry.height);
    println!(
        "color format:  {} ({:?}, {} bytes/pixel)",
        spec,
        spec.mode(),
        spec.color_bytes()
    );
    println!(
        "audio:         {} ch, {} bytes/sample, {} Hz, volume {}",
        audio.channels, audio.sample_bytes, audio.sample_rate, audio.volume
    );
    println!("duration:      {} ms", wf.duration_ms());
    println!(
        "frames:        {} at {} fps",
        wf.exporter().frame_count(args.fps),
        args.fps.as_f64()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let wf = open_session(&args.session)?;
    let job = base_job(&args.render);
    wf.exporter().export_frame(args.at, &args.out, &job)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let wf = open_session(&args.session)?;
    let job = pipeline_job(&args.render, &args.pipeline).with_image_format(args.format);
    let outcome = wf.exporter().export_sequence(&args.out, &job)?;
    report(outcome, &args.out);
    Ok(())
}

fn cmd_audio(args: AudioArgs) -> anyhow::Result<()> {
    let wf = open_session(&args.session)?;
    wf.exporter().export_audio(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let wf = open_session(&args.session)?;
    let job = pipeline_job(&args.render, &args.pipeline);
    let outcome = wf.exporter().export_video(&args.out, &job)?;
    report(outcome, &args.out);
    Ok(())
}
