use crate::{
	error::{Error, FFmpegError},
	utils::{check_error, from_path},
};

use std::{
	ffi::{CStr, CString},
	path::Path,
	ptr,
};

use chrono::TimeDelta;
use ffmpeg_sys_next::{
	av_read_frame, av_seek_frame, avformat_close_input, avformat_find_stream_info,
	avformat_open_input, AVFormatContext, AVMediaType, AVPacket, AVStream, AVERROR_EOF,
	AV_NOPTS_VALUE,
};

#[derive(Debug)]
pub(crate) struct FFmpegFormatContext {
	data: *mut AVFormatContext,
}

impl FFmpegFormatContext {
	pub(crate) fn open_file(filename: &CString) -> Result<Self, FFmpegError> {
		let mut ctx = Self {
			data: ptr::null_mut(),
		};

		match unsafe {
			avformat_open_input(
				&mut ctx.data,
				filename.as_ptr(),
				ptr::null(),
				ptr::null_mut(),
			)
		} {
			ret if ret < 0 => Err(FFmpegError::from(ret)),
			_ if ctx.data.is_null() => Err(FFmpegError::NullError),
			_ => Ok(ctx),
		}
	}

	pub(crate) fn as_ref(&self) -> &AVFormatContext {
		unsafe { self.data.as_ref() }.expect("initialized on struct creation")
	}

	pub(crate) fn find_stream_info(&mut self) -> Result<(), FFmpegError> {
		match unsafe { avformat_find_stream_info(self.data, ptr::null_mut()) } {
			ret if ret < 0 => Err(FFmpegError::from(ret)),
			_ => Ok(()),
		}
	}

	/// Opens `path` and probes its streams, both failures reported as [`Error::Open`]
	pub(crate) fn open_and_probe(path: &Path) -> Result<Self, Error> {
		let filename = from_path(path)?;

		let mut ctx = Self::open_file(&filename).map_err(|source| Error::Open {
			path: path.to_path_buf(),
			reason: "Could not open input file",
			source,
		})?;

		ctx.find_stream_info().map_err(|source| Error::Open {
			path: path.to_path_buf(),
			reason: "Could not find stream info",
			source,
		})?;

		Ok(ctx)
	}

	pub(crate) fn format_name(&self) -> Option<String> {
		let format = unsafe { self.as_ref().iformat.as_ref() }?;
		let name = unsafe { format.name.as_ref() }?;

		Some(
			unsafe { CStr::from_ptr(name) }
				.to_string_lossy()
				.into_owned(),
		)
	}

	pub(crate) fn stream_count(&self) -> usize {
		usize::try_from(self.as_ref().nb_streams).unwrap_or(0)
	}

	pub(crate) fn stream(&self, index: usize) -> Option<&AVStream> {
		if index >= self.stream_count() {
			return None;
		}

		unsafe { (*self.as_ref().streams.add(index)).as_ref() }
	}

	pub(crate) fn streams(&self) -> impl Iterator<Item = &AVStream> + '_ {
		(0..self.stream_count()).filter_map(|index| self.stream(index))
	}

	/// First stream carrying video, still images included
	pub(crate) fn find_video_stream(&self) -> Option<&AVStream> {
		self.streams().find(|stream| {
			unsafe { stream.codecpar.as_ref() }
				.is_some_and(|params| params.codec_type == AVMediaType::AVMEDIA_TYPE_VIDEO)
		})
	}

	/// Container duration in `AV_TIME_BASE` units
	pub(crate) fn raw_duration(&self) -> Option<i64> {
		let duration = self.as_ref().duration;
		(duration != AV_NOPTS_VALUE && duration > 0).then_some(duration)
	}

	/// Container start time in `AV_TIME_BASE` units, zero when unknown
	pub(crate) fn start_time(&self) -> i64 {
		match self.as_ref().start_time {
			AV_NOPTS_VALUE => 0,
			start => start,
		}
	}

	pub(crate) fn duration(&self) -> Option<TimeDelta> {
		self.raw_duration().map(TimeDelta::microseconds)
	}

	/// Reads the next packet in container order, `Ok(false)` once the input is exhausted
	pub(crate) fn read_frame(&mut self, packet: *mut AVPacket) -> Result<bool, Error> {
		match unsafe { av_read_frame(self.data, packet) } {
			AVERROR_EOF => Ok(false),
			ret if ret < 0 => Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to read packet".to_string(),
			)),
			_ => Ok(true),
		}
	}

	pub(crate) fn seek(&mut self, stream_index: i32, timestamp: i64, flags: i32) -> Result<(), Error> {
		check_error(
			unsafe { av_seek_frame(self.data, stream_index, timestamp, flags) },
			"Seeking video failed",
		)
	}
}

impl Drop for FFmpegFormatContext {
	fn drop(&mut self) {
		if !self.data.is_null() {
			unsafe { avformat_close_input(&mut self.data) };
			self.data = ptr::null_mut();
		}
	}
}
