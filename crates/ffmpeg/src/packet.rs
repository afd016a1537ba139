use crate::error::FFmpegError;

use ffmpeg_sys_next::{
	av_packet_alloc, av_packet_free, av_packet_rescale_ts, av_packet_unref, AVPacket, AVRational,
};

pub(crate) struct FFmpegPacket(*mut AVPacket);

impl FFmpegPacket {
	pub(crate) fn new() -> Result<Self, FFmpegError> {
		let ptr = unsafe { av_packet_alloc() };
		if ptr.is_null() {
			return Err(FFmpegError::PacketAllocation);
		}
		Ok(Self(ptr))
	}

	pub(crate) fn as_ptr(&mut self) -> *mut AVPacket {
		self.0
	}

	pub(crate) fn as_ref(&self) -> &AVPacket {
		unsafe { self.0.as_ref() }.expect("initialized on struct creation")
	}

	pub(crate) fn stream_index(&self) -> Option<usize> {
		usize::try_from(self.as_ref().stream_index).ok()
	}

	/// Payload bytes, empty for packets without data
	pub(crate) fn data(&self) -> &[u8] {
		let packet = self.as_ref();
		match usize::try_from(packet.size) {
			Ok(size) if size > 0 && !packet.data.is_null() => unsafe {
				std::slice::from_raw_parts(packet.data, size)
			},
			_ => &[],
		}
	}

	/// Converts pts, dts and duration from `source` units to `destination` units
	pub(crate) fn rescale_ts(&mut self, source: AVRational, destination: AVRational) {
		unsafe { av_packet_rescale_ts(self.0, source, destination) };
	}

	pub(crate) fn reset(&mut self) -> &mut Self {
		unsafe { av_packet_unref(self.0) };
		self
	}
}

impl Drop for FFmpegPacket {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { av_packet_free(&mut self.0) };
			self.0 = std::ptr::null_mut();
		}
	}
}
