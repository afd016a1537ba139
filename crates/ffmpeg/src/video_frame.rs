use crate::error::{Error, FFmpegError};

use ffmpeg_sys_next::{
	av_frame_alloc, av_frame_free, av_frame_get_buffer, AVFrame, AVPixelFormat, AV_NOPTS_VALUE,
};

use std::mem;

pub(crate) struct FFmpegFrame(*mut AVFrame);

impl FFmpegFrame {
	pub(crate) fn new() -> Result<Self, FFmpegError> {
		let ptr = unsafe { av_frame_alloc() };
		if ptr.is_null() {
			return Err(FFmpegError::FrameAllocation);
		}
		Ok(Self(ptr))
	}

	/// Allocates a frame together with its own pixel buffer
	pub(crate) fn with_buffer(
		width: u32,
		height: u32,
		pixel_format: AVPixelFormat,
	) -> Result<Self, Error> {
		let mut frame = Self::new()?;
		{
			let raw = frame.as_mut();
			raw.width = i32::try_from(width)?;
			raw.height = i32::try_from(height)?;
			raw.format = pixel_format as i32;
		}

		crate::utils::check_error(
			unsafe { av_frame_get_buffer(frame.as_mut(), 1) },
			"Failed to allocate frame buffer",
		)?;

		Ok(frame)
	}

	pub(crate) fn as_ref(&self) -> &AVFrame {
		unsafe { self.0.as_ref() }.expect("initialized on struct creation")
	}

	pub(crate) fn as_mut(&mut self) -> &mut AVFrame {
		unsafe { self.0.as_mut() }.expect("initialized on struct creation")
	}

	pub(crate) fn best_effort_timestamp(&self) -> Option<i64> {
		let ts = self.as_ref().best_effort_timestamp;
		(ts != AV_NOPTS_VALUE).then_some(ts)
	}

	/// Pixel format the frame's own buffer was decoded into, `None` when unset or unknown
	pub(crate) fn pixel_format(&self) -> Option<AVPixelFormat> {
		let format = self.as_ref().format;
		if (0..AVPixelFormat::AV_PIX_FMT_NB as i32).contains(&format) {
			// SAFETY: `AVPixelFormat` is a `repr(i32)` enum whose variants cover `0..AV_PIX_FMT_NB`
			Some(unsafe { mem::transmute::<i32, AVPixelFormat>(format) })
		} else {
			None
		}
	}
}

impl Drop for FFmpegFrame {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { av_frame_free(&mut self.0) };
			self.0 = std::ptr::null_mut();
		}
	}
}

/// A decoded frame converted to packed RGB24, rows stored without padding.
#[derive(Debug, Clone, Default)]
pub struct VideoFrame {
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
}

impl VideoFrame {
	/// Copies the first plane of an RGB24 frame, dropping any row padding
	pub(crate) fn from_rgb24(frame: &FFmpegFrame) -> Result<Self, Error> {
		let raw = frame.as_ref();
		let width = u32::try_from(raw.width)?;
		let height = u32::try_from(raw.height)?;
		let line_size = usize::try_from(raw.linesize[0])?;
		let row_len = usize::try_from(width)? * 3;

		if raw.data[0].is_null() || line_size < row_len {
			return Err(FFmpegError::NullError.into());
		}

		let rows = usize::try_from(height)?;
		let mut data = Vec::with_capacity(row_len * rows);
		for row in 0..rows {
			data.extend_from_slice(unsafe {
				std::slice::from_raw_parts(raw.data[0].add(row * line_size), row_len)
			});
		}

		Ok(Self {
			data,
			width,
			height,
		})
	}
}
