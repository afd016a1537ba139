use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
	name = "resize-image",
	about = "Resize an image to a fixed width, keeping its aspect ratio"
)]
struct Cli {
	/// Image to resize
	#[arg(long, default_value = "input.jpg")]
	input: PathBuf,

	/// Where the resized JPEG is written
	#[arg(long, default_value = "output.jpg")]
	output: PathBuf,

	/// Target width in pixels
	#[arg(long, default_value_t = 250)]
	width: u32,

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
	let dimensions = vk_ffmpeg::resize_image(&cli.input, &cli.output, cli.width)
		.with_context(|| format!("Failed to resize image '{}'", cli.input.display()))?;

	info!(
		output = %cli.output.display(),
		width = dimensions.width,
		height = dimensions.height,
		"Image resized successfully",
	);

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn codec_failures_are_told_apart_through_context() {
		let decode = anyhow::Error::from(vk_ffmpeg::Error::FrameDecode).context("Failed to resize");
		assert!(is_codec_failure(&decode));

		let width = anyhow::Error::from(vk_ffmpeg::Error::InvalidTargetWidth(0))
			.context("Failed to resize");
		assert!(!is_codec_failure(&width));

		assert!(!is_codec_failure(&anyhow::anyhow!("unrelated")));
	}
}
