use super::*;
use crate::audio::container::AudioSettings;
use crate::export::job::{CancelToken, ExportProgress};
use std::sync::Mutex;

fn renderer_for(bytes: &[u8], format: &str, w: u32, h: u32, duration_ms: u64) -> FrameRenderer {
    FrameRenderer::new(
        Some(Arc::from(bytes)),
        duration_ms,
        ColorFormatSpec::parse(format).unwrap(),
        FrameGeometry::new(w, h).unwrap(),
        false,
    )
}

fn audio_for(bytes: &[u8]) -> AudioContainer {
    AudioContainer::build(bytes, AudioSettings::default()).unwrap()
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn renderer_without_source_is_black() {
    let r = FrameRenderer::new(
        None,
        0,
        ColorFormatSpec::default(),
        FrameGeometry::default(),
        true,
    );
    assert_eq!(r.address_at(1234), 0);
    let frame = r.render(1234);
    assert_eq!(frame.data.len(), 48 * 48 * 3);
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn single_row_rgbx_file_fits_one_frame() {
    let bytes: Vec<u8> = (1..=16).collect();
    let r = renderer_for(&bytes, "rgbx", 4, 1, 500);
    assert_eq!(r.address_at(0), 0);
    assert_eq!(r.address_at(250), 0);
    let frame = r.render(0);
    assert_eq!(frame.pixel(0, 0), [1, 2, 3]);
    assert_eq!(frame.pixel(3, 0), [13, 14, 15]);
}

#[test]
fn white_format_is_grayscale() {
    let bytes = [10u8, 20, 30, 40];
    let r = renderer_for(&bytes, "w", 4, 1, 100);
    let frame = r.render(0);
    for (x, &b) in bytes.iter().enumerate() {
        assert_eq!(frame.pixel(x as u32, 0), [b, b, b]);
    }
}

#[test]
fn sequence_file_names_are_zero_padded() {
    assert_eq!(sequence_digits(10), 2);
    assert_eq!(sequence_digits(9), 1);
    assert_eq!(sequence_file_name(7, 3, ImageFormat::Png), "007.png");
    assert_eq!(sequence_file_name(12, 2, ImageFormat::Jpeg), "12.jpg");
}

#[test]
fn export_frame_resizes_and_watermarks() {
    let dir = tempfile::tempdir().unwrap();
    let bytes: Vec<u8> = (0..=255).cycle().take(4096).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "bgrx", 16, 8, audio.duration_ms());
    let exporter = Exporter::new(r, Some(&audio));

    let dest = dir.path().join("nested").join("frame.png");
    let job = ExportJob::default()
        .with_size(Canvas::new(64, 64).unwrap(), AspectPolicy::Letterbox)
        .with_watermark(true);
    exporter.export_frame(0, &dest, &job).unwrap();

    let img = image::open(&dest).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (64, 64));
    // 16x8 letterboxed into 64x64 leaves black bars above and below.
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn export_frame_without_source_writes_black_image() {
    let dir = tempfile::tempdir().unwrap();
    let r = FrameRenderer::new(
        None,
        0,
        ColorFormatSpec::default(),
        FrameGeometry::new(8, 4).unwrap(),
        true,
    );
    let dest = dir.path().join("black.bmp");
    Exporter::new(r, None)
        .export_frame(0, &dest, &ExportJob::default())
        .unwrap();
    let img = image::open(&dest).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (8, 4));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn export_frame_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer_for(&[1, 2, 3, 4], "w", 4, 4, 1);
    let err = Exporter::new(r, None)
        .export_frame(0, &dir.path().join("x.gif"), &ExportJob::default())
        .unwrap_err();
    assert!(matches!(err, WaterfallError::Validation(_)));
}

#[test]
fn sequence_writes_every_frame_with_monotonic_progress() {
    let dir = tempfile::tempdir().unwrap();
    // 320 bytes of 8-bit mono at 32 kHz is 10 ms; 1000 fps gives 10 frames.
    let bytes: Vec<u8> = (0..320).map(|i| i as u8).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "bgrx", 4, 4, audio.duration_ms());
    let exporter = Exporter::new(r, Some(&audio));
    assert_eq!(exporter.frame_count(Fps::new(1000, 1).unwrap()), 10);

    let seen = Arc::new(Mutex::new(Vec::<ExportProgress>::new()));
    let seen_in_sink = Arc::clone(&seen);
    let job = ExportJob::new(Fps::new(1000, 1).unwrap())
        .with_threads(3)
        .with_chunk_size(4)
        .with_progress(move |p: ExportProgress| seen_in_sink.lock().unwrap().push(p));

    let outcome = exporter.export_sequence(dir.path(), &job).unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Completed(ExportStats {
            frames_total: 10,
            frames_written: 10,
        })
    );

    let expected: Vec<String> = (0..10).map(|i| format!("{i:02}.png")).collect();
    assert_eq!(list_dir(dir.path()), expected);

    let seen = seen.lock().unwrap();
    let done: Vec<u64> = seen.iter().map(|p| p.done).collect();
    assert_eq!(done, (0..=10).collect::<Vec<_>>());
    assert!(seen.iter().all(|p| p.phase == ExportPhase::Frames && p.total == 10));
}

#[test]
fn cancelled_sequence_keeps_only_completed_frames() {
    let dir = tempfile::tempdir().unwrap();
    let bytes: Vec<u8> = (0..320).map(|i| i as u8).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "rgb", 4, 4, audio.duration_ms());
    let exporter = Exporter::new(r, Some(&audio));

    let cancel = CancelToken::new();
    let cancel_in_sink = cancel.clone();
    let job = ExportJob::new(Fps::new(1000, 1).unwrap())
        .with_threads(2)
        .with_chunk_size(3)
        .with_cancel(cancel)
        .with_progress(move |p: ExportProgress| {
            if p.done >= 2 {
                cancel_in_sink.cancel();
            }
        });

    let outcome = exporter.export_sequence(dir.path(), &job).unwrap();
    assert!(outcome.is_cancelled());
    // The first batch of three was already dispatched and finishes.
    assert_eq!(outcome.stats().frames_written, 3);
    assert_eq!(list_dir(dir.path()), vec!["00.png", "01.png", "02.png"]);
}

#[test]
fn sequence_requires_a_source() {
    let dir = tempfile::tempdir().unwrap();
    let r = FrameRenderer::new(
        None,
        0,
        ColorFormatSpec::default(),
        FrameGeometry::default(),
        true,
    );
    let err = Exporter::new(r, None)
        .export_sequence(dir.path(), &ExportJob::default())
        .unwrap_err();
    assert!(err.to_string().contains("no source file"));
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert!(build_thread_pool(Some(1)).is_ok());
}

#[test]
fn export_audio_writes_wav_directly() {
    let dir = tempfile::tempdir().unwrap();
    let bytes: Vec<u8> = (0..=255).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "bgrx", 4, 4, audio.duration_ms());
    let dest = dir.path().join("out").join("audio.wav");
    Exporter::new(r, Some(&audio)).export_audio(&dest).unwrap();

    let reader = hound::WavReader::open(&dest).unwrap();
    assert_eq!(reader.spec().sample_rate, 32_000);
    assert_eq!(reader.len(), 256);
}

#[test]
fn cancelled_video_leaves_destination_absent() {
    if !ffmpeg::is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let scratch_root = dir.path().join("scratch");
    let bytes: Vec<u8> = (0..3200).map(|i| (i * 7) as u8).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "bgrx", 8, 8, audio.duration_ms());

    let cancel = CancelToken::new();
    let cancel_in_sink = cancel.clone();
    let job = ExportJob::new(Fps::new(100, 1).unwrap())
        .with_chunk_size(2)
        .with_scratch_root(&scratch_root)
        .with_cancel(cancel)
        .with_progress(move |p: ExportProgress| {
            if p.done >= 1 {
                cancel_in_sink.cancel();
            }
        });

    let dest = dir.path().join("video.mp4");
    let outcome = Exporter::new(r, Some(&audio))
        .export_video(&dest, &job)
        .unwrap();
    assert!(outcome.is_cancelled());
    assert!(!dest.exists());
    assert!(list_dir(&scratch_root).is_empty());
}

#[test]
fn video_cancelled_while_rendering_frames_cleans_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let scratch_root = dir.path().join("scratch");
    let bytes: Vec<u8> = (0..3200).map(|i| (i * 7) as u8).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "bgrx", 8, 8, audio.duration_ms());
    let exporter = Exporter::new(r, Some(&audio));

    let cancel = CancelToken::new();
    let cancel_in_sink = cancel.clone();
    let phases = Arc::new(Mutex::new(Vec::<ExportPhase>::new()));
    let phases_in_sink = Arc::clone(&phases);
    let job = ExportJob::new(Fps::new(100, 1).unwrap())
        .with_chunk_size(2)
        .with_scratch_root(&scratch_root)
        .with_cancel(cancel)
        .with_progress(move |p: ExportProgress| {
            phases_in_sink.lock().unwrap().push(p.phase);
            if p.done >= 1 {
                cancel_in_sink.cancel();
            }
        });

    let total = exporter.frame_count(job.fps);
    assert_eq!(total, 10);
    let dest = dir.path().join("video.mp4");
    let outcome = exporter
        .render_video(&dest, &job, VideoFormat::Mp4, &audio, total)
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(outcome.stats().frames_written, 2);
    assert!(!dest.exists());
    assert!(list_dir(&scratch_root).is_empty());
    assert!(phases.lock().unwrap().iter().all(|&p| p == ExportPhase::Frames));
}

fn ffmpeg_has_encoder(name: &str) -> bool {
    std::process::Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains(name))
        .unwrap_or(false)
}

#[test]
fn video_export_muxes_frames_and_audio() {
    if !ffmpeg::is_ffmpeg_on_path() || !ffmpeg_has_encoder("libx264") {
        eprintln!("skipping: ffmpeg with libx264 not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let scratch_root = dir.path().join("scratch");
    let bytes: Vec<u8> = (0..3200).map(|i| (i * 13) as u8).collect();
    let audio = audio_for(&bytes);
    let r = renderer_for(&bytes, "bgrx", 9, 7, audio.duration_ms());

    let job = ExportJob::new(Fps::new(30, 1).unwrap()).with_scratch_root(&scratch_root);
    let dest = dir.path().join("out.mkv");
    let outcome = Exporter::new(r, Some(&audio))
        .export_video(&dest, &job)
        .unwrap();
    assert_eq!(outcome.stats().frames_written, 3);
    assert!(std::fs::metadata(&dest).unwrap().len() > 0);
    assert!(list_dir(&scratch_root).is_empty());
}
