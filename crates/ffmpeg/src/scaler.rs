use crate::{
	error::{Error, FFmpegError},
	video_frame::{FFmpegFrame, VideoFrame},
};

use std::ptr;

use ffmpeg_sys_next::{
	sws_freeContext, sws_getContext, sws_scale, AVPixelFormat, SwsContext, SWS_BILINEAR,
};

/// Bilinear software scaler producing packed RGB24 output
pub(crate) struct FFmpegScaler {
	ctx: *mut SwsContext,
	width: u32,
	height: u32,
}

impl FFmpegScaler {
	pub(crate) fn new(
		source_width: u32,
		source_height: u32,
		source_format: AVPixelFormat,
		width: u32,
		height: u32,
	) -> Result<Self, Error> {
		if width == 0 || height == 0 {
			return Err(Error::InvalidDimensions { width, height });
		}

		let ctx = unsafe {
			sws_getContext(
				i32::try_from(source_width)?,
				i32::try_from(source_height)?,
				source_format,
				i32::try_from(width)?,
				i32::try_from(height)?,
				AVPixelFormat::AV_PIX_FMT_RGB24,
				SWS_BILINEAR,
				ptr::null_mut(),
				ptr::null_mut(),
				ptr::null(),
			)
		};
		if ctx.is_null() {
			return Err(FFmpegError::ScalerAllocation.into());
		}

		Ok(Self { ctx, width, height })
	}

	pub(crate) fn scale(&mut self, source: &FFmpegFrame) -> Result<VideoFrame, Error> {
		let scaled =
			FFmpegFrame::with_buffer(self.width, self.height, AVPixelFormat::AV_PIX_FMT_RGB24)?;

		let src = source.as_ref();
		let ret = unsafe {
			sws_scale(
				self.ctx,
				src.data.as_ptr().cast(),
				src.linesize.as_ptr(),
				0,
				src.height,
				scaled.as_ref().data.as_ptr(),
				scaled.as_ref().linesize.as_ptr(),
			)
		};
		if ret <= 0 {
			return Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to scale frame".to_string(),
			));
		}

		VideoFrame::from_rgb24(&scaled)
	}
}

impl Drop for FFmpegScaler {
	fn drop(&mut self) {
		if !self.ctx.is_null() {
			unsafe { sws_freeContext(self.ctx) };
			self.ctx = ptr::null_mut();
		}
	}
}
