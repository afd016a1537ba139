use crate::error::{Error, FFmpegError};

use std::{ffi::CString, path::Path};

use ffmpeg_sys_next::{av_log_set_level, AV_LOG_ERROR};
use once_cell::sync::Lazy;
use tracing::debug;

static FFMPEG_INIT: Lazy<()> = Lazy::new(|| {
	// FFmpeg prints its own diagnostics to stderr, we only want the hard failures there,
	// everything else is reported through our errors
	unsafe { av_log_set_level(AV_LOG_ERROR) };
	debug!("FFmpeg initialized");
});

/// Process wide, one-time FFmpeg setup. Calling it again is a no-op.
pub fn init() {
	Lazy::force(&FFMPEG_INIT);
}

pub(crate) fn check_error(return_code: i32, error_message: &str) -> Result<(), Error> {
	if return_code < 0 {
		Err(Error::FFmpegWithReason(
			FFmpegError::from(return_code),
			error_message.to_string(),
		))
	} else {
		Ok(())
	}
}

pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<CString, Error> {
	let path = path.as_ref();
	let path_str = path
		.to_str()
		.ok_or_else(|| Error::PathConversion(path.to_path_buf()))?;

	CString::new(path_str).map_err(|_| Error::PathConversion(path.to_path_buf()))
}
