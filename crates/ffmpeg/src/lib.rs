#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Image resizing, MP4 remuxing and video thumbnails on top of FFmpeg.
//!
//! Every operation is synchronous and owns the native resources it opens; they are all
//! released when the operation returns, successfully or not.

mod codec_ctx;
mod error;
mod format_ctx;
mod frame_decoder;
mod jpeg;
mod output_ctx;
mod packet;
mod probe;
mod remuxer;
mod resizer;
mod scaler;
mod thumbnailer;
mod utils;
mod video_frame;

pub use error::{Error, FFmpegError, FileIOError, Result};
pub use jpeg::DEFAULT_JPEG_QUALITY;
pub use probe::{probe, MediaProbe, StreamInfo, StreamKind};
pub use remuxer::{convert_to_mp4, RemuxReport, Remuxer, MP4_FORMAT_NAME};
pub use resizer::{resize_image, Dimensions, Resizer};
pub use thumbnailer::{
	extract_midpoint_thumbnail, generate_default_thumbnails, generate_resized_thumbnails,
	ThumbnailReport, ThumbnailVariantConfig, ThumbnailVariants,
};
pub use utils::init;
