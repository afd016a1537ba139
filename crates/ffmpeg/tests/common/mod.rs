#![allow(dead_code)]

use std::{fs, path::Path};

use image::{ImageFormat, RgbImage};

pub mod video;

/// Gradient picture, saved in the format matching the extension of `path`
pub fn write_image(path: &Path, width: u32, height: u32) {
	RgbImage::from_fn(width, height, |x, y| {
		image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
	})
	.save_with_format(
		path,
		ImageFormat::from_path(path).expect("known image extension"),
	)
	.expect("write test image");
}

/// One second of 8 kHz mono silence as 16 bit PCM, a file without any video stream
pub fn write_wav(path: &Path) {
	const SAMPLE_RATE: u32 = 8_000;
	const CHANNELS: u16 = 1;
	const BITS_PER_SAMPLE: u16 = 16;

	let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
	let byte_rate = SAMPLE_RATE * u32::from(block_align);
	let data_len = byte_rate;

	let mut wav = Vec::with_capacity(44 + data_len as usize);
	wav.extend_from_slice(b"RIFF");
	wav.extend_from_slice(&(36 + data_len).to_le_bytes());
	wav.extend_from_slice(b"WAVE");

	wav.extend_from_slice(b"fmt ");
	wav.extend_from_slice(&16u32.to_le_bytes());
	wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
	wav.extend_from_slice(&CHANNELS.to_le_bytes());
	wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
	wav.extend_from_slice(&byte_rate.to_le_bytes());
	wav.extend_from_slice(&block_align.to_le_bytes());
	wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

	wav.extend_from_slice(b"data");
	wav.extend_from_slice(&data_len.to_le_bytes());
	wav.resize(wav.len() + data_len as usize, 0);

	fs::write(path, wav).expect("write test wav");
}

pub fn image_dimensions(path: &Path) -> (u32, u32) {
	image::image_dimensions(path).expect("readable output image")
}
