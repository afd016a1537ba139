use crate::{
	error::{Error, FFmpegError, Result},
	format_ctx::FFmpegFormatContext,
	output_ctx::FFmpegOutputContext,
	packet::FFmpegPacket,
	utils::{from_path, init},
};

use std::{ffi::CString, path::Path};

use ffmpeg_sys_next::AVRational;
use tracing::{debug, instrument, trace, warn};

/// Short name of the muxer used by [`convert_to_mp4`]
pub const MP4_FORMAT_NAME: &str = "mp4";

/// What a remux produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemuxReport {
	pub streams: usize,
	pub packets: u64,
}

/// Where the copy loop reads packets from
pub(crate) trait PacketSource {
	/// Fills `packet` with the next packet in container order, `Ok(false)` at end of input
	fn read_packet(&mut self, packet: &mut FFmpegPacket) -> Result<bool>;

	fn time_base(&self, stream_index: usize) -> Option<AVRational>;
}

/// Where the copy loop writes packets to
pub(crate) trait PacketSink {
	fn time_base(&self, stream_index: usize) -> Option<AVRational>;

	fn write_packet(&mut self, packet: &mut FFmpegPacket) -> Result<()>;

	fn finish(&mut self) -> Result<()>;
}

impl PacketSource for FFmpegFormatContext {
	fn read_packet(&mut self, packet: &mut FFmpegPacket) -> Result<bool> {
		self.read_frame(packet.as_ptr())
	}

	fn time_base(&self, stream_index: usize) -> Option<AVRational> {
		self.stream(stream_index).map(|stream| stream.time_base)
	}
}

impl PacketSink for FFmpegOutputContext {
	fn time_base(&self, stream_index: usize) -> Option<AVRational> {
		self.stream_time_base(stream_index)
	}

	fn write_packet(&mut self, packet: &mut FFmpegPacket) -> Result<()> {
		self.write_interleaved(packet.as_ptr())
	}

	fn finish(&mut self) -> Result<()> {
		self.write_trailer()
	}
}

/// Copies every packet from `source` to `sink`, rescaling timestamps per stream.
///
/// The first write failure stops the copy. The sink is finished in every case, so a
/// failed copy still leaves a closed, truncated container behind.
pub(crate) fn copy_packets(
	source: &mut impl PacketSource,
	sink: &mut impl PacketSink,
) -> Result<u64> {
	let mut packet = FFmpegPacket::new()?;
	let mut copied = 0;

	let copy_result = loop {
		packet.reset();

		match source.read_packet(&mut packet) {
			Ok(true) => {}
			Ok(false) => break Ok(()),
			Err(e) => {
				warn!(?e, copied, "Stopped reading input before its end");
				break Ok(());
			}
		}

		let Some(stream_index) = packet.stream_index() else {
			continue;
		};

		let (Some(source_time_base), Some(sink_time_base)) =
			(source.time_base(stream_index), sink.time_base(stream_index))
		else {
			warn!(stream_index, "Skipping packet of unmapped stream");
			continue;
		};

		trace!(stream_index, size = packet.data().len(), "Copying packet");
		packet.rescale_ts(source_time_base, sink_time_base);

		if let Err(e) = sink.write_packet(&mut packet) {
			break Err(e);
		}
		copied += 1;
	};

	let finish_result = sink.finish();

	match (copy_result, finish_result) {
		(Ok(()), Ok(())) => Ok(copied),
		(Ok(()), Err(e)) => Err(e),
		(Err(e), finish_result) => {
			if let Err(finish_error) = finish_result {
				warn!(?finish_error, "Failed to finish output after a write error");
			}
			Err(e)
		}
	}
}

/// Rewraps every stream of a media file into another container without re-encoding.
#[derive(Debug, Clone)]
pub struct Remuxer {
	format: String,
}

impl Default for Remuxer {
	fn default() -> Self {
		Self {
			format: MP4_FORMAT_NAME.to_string(),
		}
	}
}

impl Remuxer {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Muxer short name, as listed by `ffmpeg -muxers`
	#[must_use]
	pub fn format(mut self, format: impl Into<String>) -> Self {
		self.format = format.into();
		self
	}

	#[instrument(
		skip_all,
		fields(input = %input.as_ref().display(), output = %output.as_ref().display(), format = %self.format),
		err
	)]
	pub fn remux(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<RemuxReport> {
		let (input, output) = (input.as_ref(), output.as_ref());

		init();

		let mut input_ctx = FFmpegFormatContext::open_and_probe(input)?;
		let streams = input_ctx.stream_count();
		if streams == 0 {
			return Err(Error::Open {
				path: input.to_path_buf(),
				reason: "Input has no streams",
				source: FFmpegError::StreamNotFound,
			});
		}

		let format = CString::new(self.format.as_str()).map_err(|_| {
			Error::FFmpegWithReason(
				FFmpegError::MuxerNotFound,
				format!("invalid muxer name {:?}", self.format),
			)
		})?;
		let filename = from_path(output)?;

		let mut output_ctx =
			FFmpegOutputContext::create(&format, &filename).map_err(|source| Error::Open {
				path: output.to_path_buf(),
				reason: "Could not create output context",
				source,
			})?;

		for stream in input_ctx.streams() {
			let params = unsafe { stream.codecpar.as_ref() }.ok_or(FFmpegError::NullError)?;
			output_ctx.add_stream_like(params)?;
		}

		output_ctx
			.open_file(&filename)
			.map_err(|source| Error::Open {
				path: output.to_path_buf(),
				reason: "Could not open output file",
				source,
			})?;

		output_ctx.write_header()?;
		debug!(streams, "Wrote output header");

		let packets = copy_packets(&mut input_ctx, &mut output_ctx)?;
		debug!(packets, "Copied packets");

		Ok(RemuxReport { streams, packets })
	}
}

/// [`Remuxer::remux`] into an MP4 container
pub fn convert_to_mp4(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<RemuxReport> {
	Remuxer::default().remux(input, output)
}
