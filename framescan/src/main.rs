use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ffmpeg_next::util::log::{self as ffmpeg_log, Level as FfmpegLevel};

use framescan::{DEFAULT_IO_BUFFER_SIZE, DecodePipeline, LumaStats, PipelineConfig, scan};

/**
    Decode a media file from memory and scan every video frame.
*/
#[derive(Parser, Debug)]
#[command(name = "framescan")]
#[command(about = "Decode a media file from memory and scan its video frames")]
struct Args {
    /// Media file to scan
    file: PathBuf,

    /// Label attached to log output
    #[arg(short, long, default_value = "framescan")]
    label: String,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    max_frames: Option<u64>,

    /// Size of the demuxer's read window in bytes
    #[arg(long, default_value_t = DEFAULT_IO_BUFFER_SIZE)]
    io_buffer_size: usize,

    /// Brightness a frame must reach to count as a hit
    #[arg(long, default_value = "128")]
    threshold: u8,

    /// Verbosity of FFmpeg's own logging
    #[arg(long, value_enum, default_value = "error")]
    ffmpeg_log: FfmpegLog,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FfmpegLog {
    Quiet,
    Error,
    Warning,
    Info,
    Debug,
}

impl From<FfmpegLog> for FfmpegLevel {
    fn from(level: FfmpegLog) -> Self {
        match level {
            FfmpegLog::Quiet => FfmpegLevel::Quiet,
            FfmpegLog::Error => FfmpegLevel::Error,
            FfmpegLog::Warning => FfmpegLevel::Warning,
            FfmpegLog::Info => FfmpegLevel::Info,
            FfmpegLog::Debug => FfmpegLevel::Debug,
        }
    }
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    let args = Args::parse();

    ffmpeg_next::init().context("failed to initialize FFmpeg")?;
    ffmpeg_log::set_level(args.ffmpeg_log.into());

    let data = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    tracing::info!(
        file = %args.file.display(),
        size_kib = data.len() / 1024,
        "loaded input"
    );

    let config = PipelineConfig::new(args.label).with_io_buffer_size(args.io_buffer_size);
    let mut pipeline =
        DecodePipeline::open(&data, config).context("failed to set up decode pipeline")?;

    let mut detector = LumaStats::new(args.threshold);
    let report = scan(&mut pipeline, &mut detector, args.max_frames).context("decode failed")?;

    println!("Frames:         {}", report.frames);
    println!("Bright frames:  {}", report.primary_total);
    println!("Bright rows:    {}", report.secondary_total);
    match detector.mean_brightness() {
        Some(mean) => println!("Mean luminance: {mean:.1}"),
        None => println!("Mean luminance: n/a"),
    }
    if report.run.stopped_early {
        println!("Stopped early after {} frames", report.frames);
    }

    Ok(())
}
