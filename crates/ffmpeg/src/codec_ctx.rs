use crate::{
	error::{Error, FFmpegError},
	utils::check_error,
};

use std::ptr;

use ffmpeg_sys_next::{
	avcodec_alloc_context3, avcodec_flush_buffers, avcodec_free_context, avcodec_open2,
	avcodec_parameters_to_context, avcodec_receive_frame, avcodec_send_packet, AVCodec,
	AVCodecContext, AVCodecParameters, AVFrame, AVPacket, AVERROR, AVERROR_EOF,
};
use libc::EAGAIN;

/// Outcome of a successful send or receive call on the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodecStatus {
	Ready,
	/// The decoder wants the other side of the exchange first
	Again,
	Eof,
}

pub(crate) struct FFmpegCodecContext(*mut AVCodecContext);

impl FFmpegCodecContext {
	pub(crate) fn new(codec: &AVCodec) -> Result<Self, Error> {
		let ptr = unsafe { avcodec_alloc_context3(codec) };
		if ptr.is_null() {
			Err(FFmpegError::VideoCodecAllocation)?;
		}

		Ok(Self(ptr))
	}

	pub(crate) fn as_mut(&mut self) -> &mut AVCodecContext {
		unsafe { self.0.as_mut() }.expect("initialized on struct creation")
	}

	pub(crate) fn parameters_to_context(
		&mut self,
		codec_params: &AVCodecParameters,
	) -> Result<&mut Self, Error> {
		check_error(
			unsafe { avcodec_parameters_to_context(self.as_mut(), codec_params) },
			"Fail to fill the codec context with codec parameters",
		)?;

		Ok(self)
	}

	pub(crate) fn open2(&mut self, codec: &AVCodec) -> Result<&mut Self, Error> {
		check_error(
			unsafe { avcodec_open2(self.as_mut(), codec, ptr::null_mut()) },
			"Failed to open video codec",
		)?;

		Ok(self)
	}

	pub(crate) fn flush(&mut self) -> &mut Self {
		unsafe { avcodec_flush_buffers(self.as_mut()) };

		self
	}

	pub(crate) fn send_packet(&mut self, packet: *const AVPacket) -> Result<CodecStatus, Error> {
		match unsafe { avcodec_send_packet(self.as_mut(), packet) } {
			AVERROR_EOF => Ok(CodecStatus::Eof),
			ret if ret == AVERROR(EAGAIN) => Ok(CodecStatus::Again),
			ret if ret < 0 => Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to send packet to decoder".to_string(),
			)),
			_ => Ok(CodecStatus::Ready),
		}
	}

	pub(crate) fn receive_frame(&mut self, frame: *mut AVFrame) -> Result<CodecStatus, Error> {
		match unsafe { avcodec_receive_frame(self.as_mut(), frame) } {
			AVERROR_EOF => Ok(CodecStatus::Eof),
			ret if ret == AVERROR(EAGAIN) => Ok(CodecStatus::Again),
			ret if ret < 0 => Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to receive frame from decoder".to_string(),
			)),
			_ => Ok(CodecStatus::Ready),
		}
	}
}

impl Drop for FFmpegCodecContext {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { avcodec_free_context(&mut self.0) };
			self.0 = ptr::null_mut();
		}
	}
}
