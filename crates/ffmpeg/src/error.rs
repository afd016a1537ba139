use std::{
	ffi::c_int,
	fmt::Display,
	num::TryFromIntError,
	path::{Path, PathBuf},
};

use ffmpeg_sys_next::{
	AVERROR_BSF_NOT_FOUND, AVERROR_BUFFER_TOO_SMALL, AVERROR_BUG, AVERROR_BUG2,
	AVERROR_DECODER_NOT_FOUND, AVERROR_DEMUXER_NOT_FOUND, AVERROR_ENCODER_NOT_FOUND, AVERROR_EOF,
	AVERROR_EXIT, AVERROR_EXPERIMENTAL, AVERROR_EXTERNAL, AVERROR_FILTER_NOT_FOUND,
	AVERROR_HTTP_BAD_REQUEST, AVERROR_HTTP_FORBIDDEN, AVERROR_HTTP_NOT_FOUND,
	AVERROR_HTTP_OTHER_4XX, AVERROR_HTTP_SERVER_ERROR, AVERROR_HTTP_UNAUTHORIZED,
	AVERROR_INPUT_CHANGED, AVERROR_INVALIDDATA, AVERROR_MUXER_NOT_FOUND, AVERROR_OPTION_NOT_FOUND,
	AVERROR_OUTPUT_CHANGED, AVERROR_PATCHWELCOME, AVERROR_PROTOCOL_NOT_FOUND,
	AVERROR_STREAM_NOT_FOUND, AVERROR_UNKNOWN, AVUNERROR,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library.
#[derive(Error, Debug)]
pub enum Error {
	#[error("Failed to open '{}': {reason}; {source}", path.display())]
	Open {
		path: PathBuf,
		reason: &'static str,
		#[source]
		source: FFmpegError,
	},
	#[error("No usable video stream found in '{}'", .0.display())]
	StreamNotFound(PathBuf),
	#[error("FFmpeg internal error: {0}")]
	FFmpeg(#[from] FFmpegError),
	#[error("FFmpeg internal error: {0}; Reason: {1}")]
	FFmpegWithReason(FFmpegError, String),
	#[error("Failed to decode video frame")]
	FrameDecode,
	#[error("Failed to seek video: {0}")]
	Seek(String),
	#[error("Failed to write container: {reason}; {source}")]
	Write {
		reason: &'static str,
		#[source]
		source: FFmpegError,
	},
	#[error("Failed to encode JPEG: {0}")]
	Encode(#[from] image::ImageError),
	#[error(transparent)]
	Io(#[from] FileIOError),
	#[error("Path conversion error: Path: {0:#?}")]
	PathConversion(PathBuf),
	#[error("Received an invalid target width: {0}")]
	InvalidTargetWidth(u32),
	#[error("Invalid frame dimensions: {width}x{height}")]
	InvalidDimensions { width: u32, height: u32 },
	#[error("Received an invalid quality, expected range [1, 100], received: {0}")]
	InvalidQuality(u8),
	#[error("Error while casting an integer to another integer type")]
	TryFromInt(#[from] TryFromIntError),
}

impl Error {
	/// Whether this error belongs to the codec family (decoder/encoder/scaler failures).
	#[must_use]
	pub const fn is_codec_error(&self) -> bool {
		matches!(
			self,
			Self::FFmpeg(_) | Self::FFmpegWithReason(..) | Self::FrameDecode | Self::Encode(_)
		)
	}
}

/// File I/O error that includes the path that caused the error
#[derive(Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	pub maybe_context: Option<&'static str>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"file I/O error{}: {}; path: '{}'",
			self.maybe_context
				.map(|ctx| format!(" ({ctx})"))
				.unwrap_or_default(),
			self.source,
			self.path.display()
		)
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error)> for FileIOError {
	fn from((path, source): (P, std::io::Error)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error, &'static str)> for FileIOError {
	fn from((path, source, context): (P, std::io::Error, &'static str)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(context),
		}
	}
}

/// Enum to represent possible errors from FFmpeg library
///
/// Extracted from https://ffmpeg.org/doxygen/trunk/group__lavu__error.html
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FFmpegError {
	#[error("Bitstream filter not found")]
	BitstreamFilterNotFound,
	#[error("Internal bug, also see AVERROR_BUG2")]
	InternalBug,
	#[error("Buffer too small")]
	BufferTooSmall,
	#[error("Decoder not found")]
	DecoderNotFound,
	#[error("Demuxer not found")]
	DemuxerNotFound,
	#[error("Encoder not found")]
	EncoderNotFound,
	#[error("End of file")]
	Eof,
	#[error("Immediate exit was requested; the called function should not be restarted")]
	Exit,
	#[error("Generic error in an external library")]
	External,
	#[error("Filter not found")]
	FilterNotFound,
	#[error("Invalid data found when processing input")]
	InvalidData,
	#[error("Muxer not found")]
	MuxerNotFound,
	#[error("Option not found")]
	OptionNotFound,
	#[error("Not yet implemented in FFmpeg, patches welcome")]
	NotImplemented,
	#[error("Protocol not found")]
	ProtocolNotFound,
	#[error("Stream not found")]
	StreamNotFound,
	#[error("This is semantically identical to AVERROR_BUG it has been introduced in Libav after our AVERROR_BUG and with a modified value")]
	InternalBug2,
	#[error("Unknown error, typically from an external library")]
	Unknown,
	#[error("Requested feature is flagged experimental. Set strict_std_compliance if you really want to use it")]
	Experimental,
	#[error("Input changed between calls. Reconfiguration is required. (can be OR-ed with AVERROR_OUTPUT_CHANGED)")]
	InputChanged,
	#[error("Output changed between calls. Reconfiguration is required. (can be OR-ed with AVERROR_INPUT_CHANGED)")]
	OutputChanged,
	#[error("HTTP Bad Request: 400")]
	HttpBadRequest,
	#[error("HTTP Unauthorized: 401")]
	HttpUnauthorized,
	#[error("HTTP Forbidden: 403")]
	HttpForbidden,
	#[error("HTTP Not Found: 404")]
	HttpNotFound,
	#[error("Other HTTP error: 4xx")]
	HttpOther4xx,
	#[error("HTTP Internal Server Error: 500")]
	HttpServerError,
	#[error("Other OS error, errno = {0}")]
	OtherOSError(c_int),
	#[error("Frame allocation error")]
	FrameAllocation,
	#[error("Packet allocation error")]
	PacketAllocation,
	#[error("Video Codec allocation error")]
	VideoCodecAllocation,
	#[error("Format context allocation error")]
	FormatContextAllocation,
	#[error("Stream allocation error")]
	StreamAllocation,
	#[error("Scaler context allocation error")]
	ScalerAllocation,
	#[error("Pointer is null")]
	NullError,
}

impl From<c_int> for FFmpegError {
	fn from(code: c_int) -> Self {
		match code {
			AVERROR_BSF_NOT_FOUND => Self::BitstreamFilterNotFound,
			AVERROR_BUG => Self::InternalBug,
			AVERROR_BUFFER_TOO_SMALL => Self::BufferTooSmall,
			AVERROR_DECODER_NOT_FOUND => Self::DecoderNotFound,
			AVERROR_DEMUXER_NOT_FOUND => Self::DemuxerNotFound,
			AVERROR_ENCODER_NOT_FOUND => Self::EncoderNotFound,
			AVERROR_EOF => Self::Eof,
			AVERROR_EXIT => Self::Exit,
			AVERROR_EXTERNAL => Self::External,
			AVERROR_FILTER_NOT_FOUND => Self::FilterNotFound,
			AVERROR_INVALIDDATA => Self::InvalidData,
			AVERROR_MUXER_NOT_FOUND => Self::MuxerNotFound,
			AVERROR_OPTION_NOT_FOUND => Self::OptionNotFound,
			AVERROR_PATCHWELCOME => Self::NotImplemented,
			AVERROR_PROTOCOL_NOT_FOUND => Self::ProtocolNotFound,
			AVERROR_STREAM_NOT_FOUND => Self::StreamNotFound,
			AVERROR_BUG2 => Self::InternalBug2,
			AVERROR_UNKNOWN => Self::Unknown,
			AVERROR_EXPERIMENTAL => Self::Experimental,
			AVERROR_INPUT_CHANGED => Self::InputChanged,
			AVERROR_OUTPUT_CHANGED => Self::OutputChanged,
			AVERROR_HTTP_BAD_REQUEST => Self::HttpBadRequest,
			AVERROR_HTTP_UNAUTHORIZED => Self::HttpUnauthorized,
			AVERROR_HTTP_FORBIDDEN => Self::HttpForbidden,
			AVERROR_HTTP_NOT_FOUND => Self::HttpNotFound,
			AVERROR_HTTP_OTHER_4XX => Self::HttpOther4xx,
			AVERROR_HTTP_SERVER_ERROR => Self::HttpServerError,
			other => Self::OtherOSError(AVUNERROR(other)),
		}
	}
}
