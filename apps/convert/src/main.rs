use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vk_ffmpeg::{
	convert_to_mp4, extract_midpoint_thumbnail, generate_default_thumbnails, probe,
};

#[derive(Parser, Debug)]
#[command(
	name = "convert-video",
	about = "Remux a video to MP4, then extract its midpoint thumbnail in several sizes"
)]
struct Cli {
	/// Video file to convert
	video: PathBuf,

	/// Remuxed MP4 output
	#[arg(long, default_value = "converted_video.mp4")]
	output: PathBuf,

	/// Full size thumbnail taken from the middle of the converted video
	#[arg(long, default_value = "thumbnail.jpg")]
	thumbnail: PathBuf,

	/// Directory receiving the small, medium and large thumbnails
	#[arg(long, default_value = ".")]
	thumbnails_dir: PathBuf,

	/// Debug logging when RUST_LOG is not set
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
				if cli.verbose {
					"debug".into()
				} else {
					"info,vk_ffmpeg=debug".into()
				}
			}),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	match run(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!(codec_error = is_codec_failure(&e), "{e:#}");
			ExitCode::FAILURE
		}
	}
}

/// Whether the failure came from decoding, scaling or encoding rather than from I/O or input
fn is_codec_failure(e: &anyhow::Error) -> bool {
	e.downcast_ref::<vk_ffmpeg::Error>()
		.is_some_and(vk_ffmpeg::Error::is_codec_error)
}

fn run(cli: &Cli) -> Result<()> {
	let media = probe(&cli.video)
		.with_context(|| format!("Failed to open video '{}'", cli.video.display()))?;
	for stream in &media.streams {
		debug!(
			index = stream.index,
			kind = %stream.kind,
			codec = %stream.codec,
			dimensions = ?stream.dimensions,
			"Input stream",
		);
	}

	let remux = convert_to_mp4(&cli.video, &cli.output).context("Failed to convert video to MP4")?;
	info!(
		output = %cli.output.display(),
		streams = remux.streams,
		packets = remux.packets,
		"Converted video to MP4",
	);

	let thumbnail = extract_midpoint_thumbnail(&cli.output, &cli.thumbnail)
		.context("Failed to extract thumbnail")?;
	info!(
		output = %cli.thumbnail.display(),
		width = thumbnail.dimensions.width,
		height = thumbnail.dimensions.height,
		"Extracted midpoint thumbnail",
	);

	let written = generate_default_thumbnails(&cli.thumbnail, &cli.thumbnails_dir)
		.context("Failed to generate resized thumbnails")?;
	info!(
		thumbnails = ?written,
		"Conversion and thumbnail extraction completed successfully",
	);

	Ok(())
}
