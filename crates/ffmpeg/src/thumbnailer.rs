use crate::{
	error::Result,
	frame_decoder::FrameDecoder,
	jpeg::{self, DEFAULT_JPEG_QUALITY},
	resizer::{Dimensions, Resizer},
	utils::init,
};

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

/// What [`extract_midpoint_thumbnail`] wrote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailReport {
	pub dimensions: Dimensions,
	/// Presentation time of the captured frame, when the decoder reported one
	pub frame_seconds: Option<f64>,
	/// Position the seek aimed at
	pub midpoint_seconds: f64,
}

/// Writes the frame found at the middle of `video` to `output` as JPEG, at its native
/// resolution.
///
/// The seek goes backward to a keyframe, so the captured frame never lies after the
/// midpoint.
#[instrument(
	skip_all,
	fields(video = %video.as_ref().display(), output = %output.as_ref().display()),
	err
)]
pub fn extract_midpoint_thumbnail(
	video: impl AsRef<Path>,
	output: impl AsRef<Path>,
) -> Result<ThumbnailReport> {
	init();

	let mut decoder = FrameDecoder::new(video.as_ref())?;
	let target = decoder.seek_to_midpoint()?;
	decoder.decode_video_frame()?;

	let (width, height) = decoder.frame_dimensions()?;
	let frame_seconds = decoder.frame_seconds();
	debug!(width, height, ?frame_seconds, "Decoded midpoint frame");

	let frame = decoder.get_scaled_video_frame(width, height)?;
	drop(decoder);

	jpeg::write(&frame, DEFAULT_JPEG_QUALITY, output)?;

	Ok(ThumbnailReport {
		dimensions: Dimensions::new(width, height),
		frame_seconds,
		midpoint_seconds: target.seconds,
	})
}

/// Configuration for a single resized thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailVariantConfig {
	/// Used in the output file name
	pub label: String,
	/// Target width in pixels, height follows the aspect ratio
	pub width: u32,
}

impl ThumbnailVariantConfig {
	pub fn new(label: impl Into<String>, width: u32) -> Self {
		Self {
			label: label.into(),
			width,
		}
	}

	#[must_use]
	pub fn file_name(&self) -> String {
		format!("thumbnail_{}.jpg", self.label)
	}
}

/// Standard thumbnail sizes
pub struct ThumbnailVariants;

impl ThumbnailVariants {
	/// 250px width
	#[must_use]
	pub fn small() -> ThumbnailVariantConfig {
		ThumbnailVariantConfig::new("small", 250)
	}

	/// 350px width
	#[must_use]
	pub fn medium() -> ThumbnailVariantConfig {
		ThumbnailVariantConfig::new("medium", 350)
	}

	/// 650px width
	#[must_use]
	pub fn large() -> ThumbnailVariantConfig {
		ThumbnailVariantConfig::new("large", 650)
	}

	/// Every standard size, smallest first
	#[must_use]
	pub fn defaults() -> Vec<ThumbnailVariantConfig> {
		vec![Self::small(), Self::medium(), Self::large()]
	}
}

/// Resizes `source` once per variant into `output_dir`, in order.
///
/// Stops at the first failure. Files written by earlier variants stay on disk.
#[instrument(
	skip_all,
	fields(source = %source.as_ref().display(), output_dir = %output_dir.as_ref().display())
)]
pub fn generate_resized_thumbnails(
	source: impl AsRef<Path>,
	output_dir: impl AsRef<Path>,
	variants: &[ThumbnailVariantConfig],
) -> Result<Vec<PathBuf>> {
	let (source, output_dir) = (source.as_ref(), output_dir.as_ref());
	let resizer = Resizer::default();

	let mut written = Vec::with_capacity(variants.len());
	for variant in variants {
		let output = output_dir.join(variant.file_name());
		let dimensions = resizer.resize(source, &output, variant.width)?;

		debug!(label = %variant.label, ?dimensions, "Wrote thumbnail variant");
		written.push(output);
	}

	Ok(written)
}

/// [`generate_resized_thumbnails`] with [`ThumbnailVariants::defaults`]
pub fn generate_default_thumbnails(
	source: impl AsRef<Path>,
	output_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
	generate_resized_thumbnails(source, output_dir, &ThumbnailVariants::defaults())
}
