use crate::{
	error::{Error, FileIOError},
	video_frame::VideoFrame,
};

use std::{fs, path::Path};

use image::{codecs::jpeg::JpegEncoder, ColorType};

/// Quality used for every JPEG this crate writes unless configured otherwise
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

pub(crate) fn encode(frame: &VideoFrame, quality: u8) -> Result<Vec<u8>, Error> {
	let expected_len = u64::from(frame.width) * u64::from(frame.height) * 3;
	if frame.width == 0 || frame.height == 0 || u64::try_from(frame.data.len())? != expected_len {
		return Err(Error::InvalidDimensions {
			width: frame.width,
			height: frame.height,
		});
	}

	let mut bytes = Vec::new();

	JpegEncoder::new_with_quality(&mut bytes, quality).encode(
		&frame.data,
		frame.width,
		frame.height,
		ColorType::Rgb8,
	)?;

	Ok(bytes)
}

/// Encodes first and only then creates the output, so a rejected frame leaves no file behind
pub(crate) fn write(frame: &VideoFrame, quality: u8, output: impl AsRef<Path>) -> Result<(), Error> {
	let output = output.as_ref();
	let bytes = encode(frame, quality)?;

	fs::write(output, bytes)
		.map_err(|e| FileIOError::from((output, e, "Failed to write JPEG output")).into())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gradient(width: u32, height: u32) -> VideoFrame {
		let mut data = Vec::with_capacity((width * height * 3) as usize);
		for y in 0..height {
			for x in 0..width {
				data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
			}
		}

		VideoFrame {
			data,
			width,
			height,
		}
	}

	#[test]
	fn encodes_decodable_jpeg() {
		let bytes = encode(&gradient(40, 20), DEFAULT_JPEG_QUALITY).expect("jpeg");

		assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
		let decoded = image::load_from_memory(&bytes).expect("decodable");
		assert_eq!((decoded.width(), decoded.height()), (40, 20));
	}

	#[test]
	fn rejects_short_buffers() {
		let mut frame = gradient(10, 10);
		frame.data.truncate(10);

		assert!(matches!(
			encode(&frame, DEFAULT_JPEG_QUALITY),
			Err(Error::InvalidDimensions {
				width: 10,
				height: 10
			})
		));
	}

	#[test]
	fn unwritable_output_is_io_error() {
		let dir = tempfile::tempdir().expect("tempdir");
		let output = dir.path().join("missing").join("out.jpg");

		let err = write(&gradient(8, 8), DEFAULT_JPEG_QUALITY, &output).expect_err("no parent dir");

		assert!(matches!(err, Error::Io(_)));
		assert!(!output.exists());
	}
}
