use crate::{error::Result, format_ctx::FFmpegFormatContext, utils::init};

use std::{ffi::CStr, fmt, path::Path};

use chrono::TimeDelta;
use ffmpeg_sys_next::{avcodec_get_name, AVMediaType, AVStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
	Video,
	Audio,
	Subtitle,
	Data,
	Attachment,
	Unknown,
}

impl From<AVMediaType> for StreamKind {
	fn from(media_type: AVMediaType) -> Self {
		match media_type {
			AVMediaType::AVMEDIA_TYPE_VIDEO => Self::Video,
			AVMediaType::AVMEDIA_TYPE_AUDIO => Self::Audio,
			AVMediaType::AVMEDIA_TYPE_SUBTITLE => Self::Subtitle,
			AVMediaType::AVMEDIA_TYPE_DATA => Self::Data,
			AVMediaType::AVMEDIA_TYPE_ATTACHMENT => Self::Attachment,
			_ => Self::Unknown,
		}
	}
}

impl fmt::Display for StreamKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Video => "video",
			Self::Audio => "audio",
			Self::Subtitle => "subtitle",
			Self::Data => "data",
			Self::Attachment => "attachment",
			Self::Unknown => "unknown",
		})
	}
}

/// Codec level description of one stream of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
	pub index: usize,
	pub kind: StreamKind,
	pub codec: String,
	/// Time base as `(numerator, denominator)`
	pub time_base: (i32, i32),
	/// Only set for video streams
	pub dimensions: Option<(u32, u32)>,
}

impl StreamInfo {
	fn from_stream(index: usize, stream: &AVStream) -> Option<Self> {
		let params = unsafe { stream.codecpar.as_ref() }?;
		let kind = StreamKind::from(params.codec_type);

		let codec = unsafe { avcodec_get_name(params.codec_id).as_ref() }
			.map(|name| unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
			.unwrap_or_else(|| "unknown".to_string());

		let dimensions = (kind == StreamKind::Video)
			.then(|| Some((u32::try_from(params.width).ok()?, u32::try_from(params.height).ok()?)))
			.flatten();

		Some(Self {
			index,
			kind,
			codec,
			time_base: (stream.time_base.num, stream.time_base.den),
			dimensions,
		})
	}
}

/// What a container holds, as seen by the demuxer
#[derive(Debug, Clone)]
pub struct MediaProbe {
	pub format: Option<String>,
	pub duration: Option<TimeDelta>,
	pub streams: Vec<StreamInfo>,
}

impl MediaProbe {
	#[must_use]
	pub fn first_video_stream(&self) -> Option<&StreamInfo> {
		self.streams
			.iter()
			.find(|stream| stream.kind == StreamKind::Video)
	}
}

/// Opens `path` and lists its streams without decoding anything
pub fn probe(path: impl AsRef<Path>) -> Result<MediaProbe> {
	init();

	let format_ctx = FFmpegFormatContext::open_and_probe(path.as_ref())?;

	Ok(MediaProbe {
		format: format_ctx.format_name(),
		duration: format_ctx.duration(),
		streams: format_ctx
			.streams()
			.enumerate()
			.filter_map(|(index, stream)| StreamInfo::from_stream(index, stream))
			.collect(),
	})
}
