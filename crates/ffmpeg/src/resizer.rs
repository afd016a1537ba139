use crate::{
	error::{Error, Result},
	frame_decoder::FrameDecoder,
	jpeg::{self, DEFAULT_JPEG_QUALITY},
	utils::init,
};

use std::path::Path;

use tracing::{debug, instrument};

/// Width and height of a picture, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
	pub width: u32,
	pub height: u32,
}

impl Dimensions {
	#[must_use]
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	/// Dimensions with the given width and the same aspect ratio.
	///
	/// The height is `target_width * height / width`, truncated.
	pub fn scaled_to_width(self, target_width: u32) -> Result<Self> {
		if target_width == 0 {
			return Err(Error::InvalidTargetWidth(target_width));
		}
		if self.width == 0 || self.height == 0 {
			return Err(Error::InvalidDimensions {
				width: self.width,
				height: self.height,
			});
		}

		let height =
			u32::try_from(u64::from(target_width) * u64::from(self.height) / u64::from(self.width))?;
		if height == 0 {
			return Err(Error::InvalidDimensions {
				width: target_width,
				height,
			});
		}

		Ok(Self::new(target_width, height))
	}
}

/// Aspect ratio preserving resizer writing JPEG files.
#[derive(Debug, Clone)]
pub struct Resizer {
	quality: u8,
}

impl Default for Resizer {
	fn default() -> Self {
		Self {
			quality: DEFAULT_JPEG_QUALITY,
		}
	}
}

impl Resizer {
	/// Creates a `Resizer` encoding at [`DEFAULT_JPEG_QUALITY`]
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Quality must be a value between 1 and 100
	pub fn quality(mut self, quality: u8) -> Result<Self> {
		if !(1..=100).contains(&quality) {
			return Err(Error::InvalidQuality(quality));
		}
		self.quality = quality;
		Ok(self)
	}

	/// Decodes the first frame of `input`, scales it to `target_width` keeping the aspect
	/// ratio and writes it to `output` as JPEG.
	///
	/// Nothing is written unless every previous step succeeded.
	#[instrument(
		skip_all,
		fields(input = %input.as_ref().display(), output = %output.as_ref().display(), target_width = target_width),
		err
	)]
	pub fn resize(
		&self,
		input: impl AsRef<Path>,
		output: impl AsRef<Path>,
		target_width: u32,
	) -> Result<Dimensions> {
		if target_width == 0 {
			return Err(Error::InvalidTargetWidth(target_width));
		}

		init();

		let mut decoder = FrameDecoder::new(input.as_ref())?;
		decoder.decode_video_frame()?;

		let (width, height) = decoder.frame_dimensions()?;
		let target = Dimensions::new(width, height).scaled_to_width(target_width)?;
		debug!(width, height, ?target, "Decoded first frame");

		let frame = decoder.get_scaled_video_frame(target.width, target.height)?;
		drop(decoder);

		jpeg::write(&frame, self.quality, output)?;

		Ok(target)
	}
}

/// [`Resizer::resize`] with the default quality
pub fn resize_image(
	input: impl AsRef<Path>,
	output: impl AsRef<Path>,
	target_width: u32,
) -> Result<Dimensions> {
	Resizer::default().resize(input, output, target_width)
}
