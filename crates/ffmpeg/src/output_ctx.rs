use crate::error::{Error, FFmpegError};

use std::{
	ffi::{CStr, CString},
	ptr,
};

use ffmpeg_sys_next::{
	av_interleaved_write_frame, av_write_trailer, avcodec_parameters_copy,
	avformat_alloc_output_context2, avformat_free_context, avformat_new_stream,
	avformat_write_header, avio_closep, avio_open, AVCodecParameters, AVFormatContext, AVPacket,
	AVRational, AVFMT_NOFILE, AVIO_FLAG_WRITE,
};

/// A muxer writing to a file, the file is closed and the context freed on drop
#[derive(Debug)]
pub(crate) struct FFmpegOutputContext {
	data: *mut AVFormatContext,
}

impl FFmpegOutputContext {
	pub(crate) fn create(format_name: &CStr, filename: &CString) -> Result<Self, FFmpegError> {
		let mut ctx = Self {
			data: ptr::null_mut(),
		};

		let ret = unsafe {
			avformat_alloc_output_context2(
				&mut ctx.data,
				ptr::null(),
				format_name.as_ptr(),
				filename.as_ptr(),
			)
		};
		if ret < 0 {
			return Err(FFmpegError::from(ret));
		}
		if ctx.data.is_null() {
			return Err(FFmpegError::FormatContextAllocation);
		}

		Ok(ctx)
	}

	fn as_ref(&self) -> &AVFormatContext {
		unsafe { self.data.as_ref() }.expect("initialized on struct creation")
	}

	fn needs_file(&self) -> bool {
		unsafe { self.as_ref().oformat.as_ref() }
			.is_some_and(|format| format.flags & AVFMT_NOFILE == 0)
	}

	/// Declares a new stream with parameters copied verbatim from `params`, codec tag cleared
	pub(crate) fn add_stream_like(&mut self, params: &AVCodecParameters) -> Result<(), Error> {
		let stream = unsafe { avformat_new_stream(self.data, ptr::null()).as_mut() }
			.ok_or(FFmpegError::StreamAllocation)?;

		let ret = unsafe { avcodec_parameters_copy(stream.codecpar, params) };
		if ret < 0 {
			return Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to copy codec parameters".to_string(),
			));
		}

		// The destination muxer picks its own tag for the codec
		let codecpar = unsafe { stream.codecpar.as_mut() }.ok_or(FFmpegError::NullError)?;
		codecpar.codec_tag = 0;

		Ok(())
	}

	pub(crate) fn open_file(&mut self, filename: &CString) -> Result<(), FFmpegError> {
		if !self.needs_file() {
			return Ok(());
		}

		let ret = unsafe { avio_open(&mut (*self.data).pb, filename.as_ptr(), AVIO_FLAG_WRITE) };
		if ret < 0 {
			Err(FFmpegError::from(ret))
		} else {
			Ok(())
		}
	}

	pub(crate) fn write_header(&mut self) -> Result<(), Error> {
		match unsafe { avformat_write_header(self.data, ptr::null_mut()) } {
			ret if ret < 0 => Err(Error::Write {
				reason: "Could not write output file header",
				source: FFmpegError::from(ret),
			}),
			_ => Ok(()),
		}
	}

	pub(crate) fn stream_count(&self) -> usize {
		usize::try_from(self.as_ref().nb_streams).unwrap_or(0)
	}

	/// Only meaningful after `write_header`, the muxer may adjust it
	pub(crate) fn stream_time_base(&self, index: usize) -> Option<AVRational> {
		if index >= self.stream_count() {
			return None;
		}

		unsafe { (*self.as_ref().streams.add(index)).as_ref() }.map(|stream| stream.time_base)
	}

	pub(crate) fn write_interleaved(&mut self, packet: *mut AVPacket) -> Result<(), Error> {
		match unsafe { av_interleaved_write_frame(self.data, packet) } {
			ret if ret < 0 => Err(Error::Write {
				reason: "Error while writing packet",
				source: FFmpegError::from(ret),
			}),
			_ => Ok(()),
		}
	}

	pub(crate) fn write_trailer(&mut self) -> Result<(), Error> {
		match unsafe { av_write_trailer(self.data) } {
			ret if ret < 0 => Err(Error::Write {
				reason: "Could not write output file trailer",
				source: FFmpegError::from(ret),
			}),
			_ => Ok(()),
		}
	}
}

impl Drop for FFmpegOutputContext {
	fn drop(&mut self) {
		if self.data.is_null() {
			return;
		}

		if self.needs_file() {
			unsafe { avio_closep(&mut (*self.data).pb) };
		}
		unsafe { avformat_free_context(self.data) };
		self.data = ptr::null_mut();
	}
}
