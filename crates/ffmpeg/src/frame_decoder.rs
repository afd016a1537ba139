use crate::{
	codec_ctx::{CodecStatus, FFmpegCodecContext},
	error::{Error, FFmpegError},
	format_ctx::FFmpegFormatContext,
	packet::FFmpegPacket,
	scaler::FFmpegScaler,
	video_frame::{FFmpegFrame, VideoFrame},
};

use std::{
	path::{Path, PathBuf},
	ptr,
};

use ffmpeg_sys_next::{
	av_q2d, av_rescale_q, avcodec_find_decoder, AVRational, AVSEEK_FLAG_BACKWARD, AV_TIME_BASE,
	AV_TIME_BASE_Q,
};
use tracing::{debug, trace};

/// Where a midpoint seek asked to land, in seconds and in video stream units
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeekTarget {
	pub seconds: f64,
	pub stream_timestamp: i64,
}

/// Decodes single frames from the first video stream of a media file.
///
/// Holds exactly one decoded frame at a time; every native resource is released on drop.
pub(crate) struct FrameDecoder {
	path: PathBuf,
	format_ctx: FFmpegFormatContext,
	video_stream_index: usize,
	time_base: AVRational,
	codec_ctx: FFmpegCodecContext,
	frame: FFmpegFrame,
	packet: FFmpegPacket,
	draining: bool,
}

impl FrameDecoder {
	pub(crate) fn new(filename: impl AsRef<Path>) -> Result<Self, Error> {
		let path = filename.as_ref();

		let format_ctx = FFmpegFormatContext::open_and_probe(path)?;

		let (video_stream_index, time_base, codec_ctx) = {
			let video_stream = format_ctx
				.find_video_stream()
				.ok_or_else(|| Error::StreamNotFound(path.to_path_buf()))?;

			let codec_params =
				unsafe { video_stream.codecpar.as_ref() }.ok_or(FFmpegError::NullError)?;

			let video_codec = unsafe { avcodec_find_decoder(codec_params.codec_id).as_ref() }
				.ok_or(FFmpegError::DecoderNotFound)?;

			let mut codec_ctx = FFmpegCodecContext::new(video_codec)?;
			codec_ctx.parameters_to_context(codec_params)?;
			codec_ctx.as_mut().workaround_bugs = 1;
			codec_ctx.open2(video_codec)?;

			(
				usize::try_from(video_stream.index)?,
				video_stream.time_base,
				codec_ctx,
			)
		};

		debug!(
			path = %path.display(),
			video_stream_index,
			"Opened video decoder",
		);

		Ok(Self {
			path: path.to_path_buf(),
			format_ctx,
			video_stream_index,
			time_base,
			codec_ctx,
			frame: FFmpegFrame::new()?,
			packet: FFmpegPacket::new()?,
			draining: false,
		})
	}

	/// Decodes forward until one complete frame is available.
	///
	/// The first decoder error aborts; running out of input without a frame is
	/// [`Error::FrameDecode`].
	pub(crate) fn decode_video_frame(&mut self) -> Result<(), Error> {
		loop {
			match self.codec_ctx.receive_frame(self.frame.as_mut())? {
				CodecStatus::Ready => return Ok(()),
				CodecStatus::Eof => return Err(Error::FrameDecode),
				CodecStatus::Again => {}
			}

			if self.draining {
				return Err(Error::FrameDecode);
			}

			if self.find_packet_for_stream()? {
				self.codec_ctx.send_packet(self.packet.as_ptr())?;
			} else {
				trace!("Input exhausted, draining decoder");
				self.draining = true;
				self.codec_ctx.send_packet(ptr::null())?;
			}
		}
	}

	/// Seeks to the keyframe at or before the middle of the container's duration.
	///
	/// Nothing is decoded here, the next [`Self::decode_video_frame`] yields the first
	/// frame after the landing point.
	pub(crate) fn seek_to_midpoint(&mut self) -> Result<SeekTarget, Error> {
		let duration = self.format_ctx.raw_duration().ok_or_else(|| {
			Error::Seek(format!("unknown duration for '{}'", self.path.display()))
		})?;

		let midpoint = self.format_ctx.start_time() + duration / 2;
		let stream_timestamp = unsafe { av_rescale_q(midpoint, AV_TIME_BASE_Q, self.time_base) };

		self.format_ctx
			.seek(
				i32::try_from(self.video_stream_index)?,
				stream_timestamp,
				AVSEEK_FLAG_BACKWARD,
			)
			.map_err(|e| Error::Seek(format!("'{}': {e}", self.path.display())))?;

		self.codec_ctx.flush();
		self.draining = false;

		let seconds = midpoint as f64 / f64::from(AV_TIME_BASE);
		debug!(seconds, stream_timestamp, "Seeked to midpoint");

		Ok(SeekTarget {
			seconds,
			stream_timestamp,
		})
	}

	/// Width and height of the last decoded frame
	pub(crate) fn frame_dimensions(&self) -> Result<(u32, u32), Error> {
		let frame = self.frame.as_ref();
		Ok((u32::try_from(frame.width)?, u32::try_from(frame.height)?))
	}

	/// Presentation time of the last decoded frame, in seconds
	pub(crate) fn frame_seconds(&self) -> Option<f64> {
		self.frame
			.best_effort_timestamp()
			.map(|ts| ts as f64 * unsafe { av_q2d(self.time_base) })
	}

	/// Scales the last decoded frame to `width`x`height` packed RGB24
	pub(crate) fn get_scaled_video_frame(
		&mut self,
		width: u32,
		height: u32,
	) -> Result<VideoFrame, Error> {
		let (source_width, source_height) = self.frame_dimensions()?;
		let source_format = self.frame.pixel_format().ok_or_else(|| {
			Error::FFmpegWithReason(
				FFmpegError::InvalidData,
				"Decoded frame has no known pixel format".to_string(),
			)
		})?;

		let mut scaler = FFmpegScaler::new(
			source_width,
			source_height,
			source_format,
			width,
			height,
		)?;

		scaler.scale(&self.frame)
	}

	fn find_packet_for_stream(&mut self) -> Result<bool, Error> {
		loop {
			self.packet.reset();

			if !self.format_ctx.read_frame(self.packet.as_ptr())? {
				return Ok(false);
			}

			if self.packet.stream_index() == Some(self.video_stream_index) {
				return Ok(true);
			}
		}
	}
}
