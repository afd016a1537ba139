use std::{ffi::CString, path::Path, ptr};

use ffmpeg_sys_next::{
	av_channel_layout_copy, av_channel_layout_default, av_frame_alloc, av_frame_free,
	av_frame_get_buffer, av_frame_make_writable, av_interleaved_write_frame, av_packet_alloc,
	av_packet_free, av_packet_make_writable, av_packet_rescale_ts, av_packet_unref,
	av_read_frame, av_write_trailer, avcodec_alloc_context3, avcodec_find_encoder,
	avcodec_free_context, avcodec_open2, avcodec_parameters_from_context, avcodec_receive_packet,
	avcodec_send_frame, avformat_alloc_output_context2, avformat_close_input,
	avformat_find_stream_info, avformat_free_context, avformat_new_stream, avformat_open_input,
	avformat_write_header, avio_closep, avio_open, AVCodecContext, AVCodecID, AVFormatContext,
	AVFrame, AVPacket, AVPixelFormat, AVRational, AVSampleFormat, AVStream, AVERROR, AVERROR_EOF,
	AVFMT_GLOBALHEADER, AVIO_FLAG_WRITE, AV_CODEC_FLAG_GLOBAL_HEADER, EAGAIN,
};

pub const WIDTH: i32 = 160;
pub const HEIGHT: i32 = 120;
pub const FPS: i32 = 10;
pub const SAMPLE_RATE: i32 = 44_100;

/// Encodes a `seconds` long Matroska file: MPEG-4 video as stream 0, one keyframe per
/// second, and mono AAC audio as stream 1
pub fn write_test_video(path: &Path, seconds: i32) {
	write_video(path, seconds, false);
}

/// Same layout as [`write_test_video`], but every video packet is overwritten with
/// `0xFF` bytes before being muxed. The container opens fine, no frame ever decodes.
pub fn write_corrupt_video(path: &Path, seconds: i32) {
	write_video(path, seconds, true);
}

/// Payloads of every packet in the file, grouped by stream index in demuxing order
pub fn read_payloads(path: &Path) -> Vec<Vec<Vec<u8>>> {
	let filename = CString::new(path.to_str().expect("utf-8 path")).expect("no NUL in path");

	unsafe {
		let mut format_ctx: *mut AVFormatContext = ptr::null_mut();
		assert!(
			avformat_open_input(
				&mut format_ctx,
				filename.as_ptr(),
				ptr::null(),
				ptr::null_mut()
			) >= 0
		);
		assert!(avformat_find_stream_info(format_ctx, ptr::null_mut()) >= 0);

		let mut payloads = vec![Vec::new(); (*format_ctx).nb_streams as usize];

		let mut packet = av_packet_alloc();
		assert!(!packet.is_null());
		while av_read_frame(format_ctx, packet) >= 0 {
			let data = if (*packet).data.is_null() {
				Vec::new()
			} else {
				std::slice::from_raw_parts((*packet).data, (*packet).size as usize).to_vec()
			};
			payloads[(*packet).stream_index as usize].push(data);
			av_packet_unref(packet);
		}

		av_packet_free(&mut packet);
		avformat_close_input(&mut format_ctx);

		payloads
	}
}

fn write_video(path: &Path, seconds: i32, corrupt_video: bool) {
	let filename = CString::new(path.to_str().expect("utf-8 path")).expect("no NUL in path");
	let format = CString::new("matroska").expect("static name");

	unsafe {
		let mut format_ctx: *mut AVFormatContext = ptr::null_mut();
		assert!(
			avformat_alloc_output_context2(
				&mut format_ctx,
				ptr::null(),
				format.as_ptr(),
				filename.as_ptr()
			) >= 0
		);
		let global_header = (*(*format_ctx).oformat).flags & AVFMT_GLOBALHEADER != 0;

		let (mut video, video_stream) = open_video_encoder(format_ctx, global_header);
		let (mut audio, audio_stream) = open_audio_encoder(format_ctx, global_header);

		assert!(avio_open(&mut (*format_ctx).pb, filename.as_ptr(), AVIO_FLAG_WRITE) >= 0);
		assert!(avformat_write_header(format_ctx, ptr::null_mut()) >= 0);

		let mut picture = av_frame_alloc();
		assert!(!picture.is_null());
		(*picture).format = AVPixelFormat::AV_PIX_FMT_YUV420P as i32;
		(*picture).width = WIDTH;
		(*picture).height = HEIGHT;
		assert!(av_frame_get_buffer(picture, 0) >= 0);

		let mut samples = av_frame_alloc();
		assert!(!samples.is_null());
		(*samples).format = AVSampleFormat::AV_SAMPLE_FMT_FLTP as i32;
		(*samples).sample_rate = SAMPLE_RATE;
		(*samples).nb_samples = (*audio).frame_size;
		assert!(av_channel_layout_copy(&mut (*samples).ch_layout, &(*audio).ch_layout) >= 0);
		assert!(av_frame_get_buffer(samples, 0) >= 0);

		let mut packet = av_packet_alloc();
		assert!(!packet.is_null());

		let mut audio_pts = 0_i64;
		for index in 0..seconds * FPS {
			assert!(av_frame_make_writable(picture) >= 0);
			fill_picture(&mut *picture, index);
			(*picture).pts = i64::from(index);

			assert!(avcodec_send_frame(video, picture) >= 0);
			write_packets(format_ctx, video, video_stream, packet, corrupt_video);

			// Audio catches up with the end of the frame just sent
			let frame_end = i64::from(index + 1) * i64::from(SAMPLE_RATE / FPS);
			while audio_pts < frame_end {
				assert!(av_frame_make_writable(samples) >= 0);
				fill_samples(&mut *samples, audio_pts);
				(*samples).pts = audio_pts;
				audio_pts += i64::from((*samples).nb_samples);

				assert!(avcodec_send_frame(audio, samples) >= 0);
				write_packets(format_ctx, audio, audio_stream, packet, false);
			}
		}

		assert!(avcodec_send_frame(video, ptr::null()) >= 0);
		write_packets(format_ctx, video, video_stream, packet, corrupt_video);
		assert!(avcodec_send_frame(audio, ptr::null()) >= 0);
		write_packets(format_ctx, audio, audio_stream, packet, false);

		assert!(av_write_trailer(format_ctx) >= 0);

		av_frame_free(&mut picture);
		av_frame_free(&mut samples);
		av_packet_free(&mut packet);
		avcodec_free_context(&mut video);
		avcodec_free_context(&mut audio);
		avio_closep(&mut (*format_ctx).pb);
		avformat_free_context(format_ctx);
	}
}

unsafe fn open_video_encoder(
	format_ctx: *mut AVFormatContext,
	global_header: bool,
) -> (*mut AVCodecContext, *mut AVStream) {
	let codec = avcodec_find_encoder(AVCodecID::AV_CODEC_ID_MPEG4);
	assert!(!codec.is_null(), "mpeg4 encoder must be available");

	let stream = avformat_new_stream(format_ctx, ptr::null());
	assert!(!stream.is_null());

	let encoder = avcodec_alloc_context3(codec);
	assert!(!encoder.is_null());
	(*encoder).width = WIDTH;
	(*encoder).height = HEIGHT;
	(*encoder).pix_fmt = AVPixelFormat::AV_PIX_FMT_YUV420P;
	(*encoder).time_base = AVRational { num: 1, den: FPS };
	(*encoder).framerate = AVRational { num: FPS, den: 1 };
	(*encoder).gop_size = FPS;
	(*encoder).max_b_frames = 0;
	if global_header {
		(*encoder).flags |= AV_CODEC_FLAG_GLOBAL_HEADER as i32;
	}

	assert!(avcodec_open2(encoder, codec, ptr::null_mut()) >= 0);
	assert!(avcodec_parameters_from_context((*stream).codecpar, encoder) >= 0);
	(*stream).time_base = (*encoder).time_base;

	(encoder, stream)
}

unsafe fn open_audio_encoder(
	format_ctx: *mut AVFormatContext,
	global_header: bool,
) -> (*mut AVCodecContext, *mut AVStream) {
	let codec = avcodec_find_encoder(AVCodecID::AV_CODEC_ID_AAC);
	assert!(!codec.is_null(), "aac encoder must be available");

	let stream = avformat_new_stream(format_ctx, ptr::null());
	assert!(!stream.is_null());

	let encoder = avcodec_alloc_context3(codec);
	assert!(!encoder.is_null());
	(*encoder).sample_fmt = AVSampleFormat::AV_SAMPLE_FMT_FLTP;
	(*encoder).sample_rate = SAMPLE_RATE;
	(*encoder).bit_rate = 64_000;
	(*encoder).time_base = AVRational {
		num: 1,
		den: SAMPLE_RATE,
	};
	av_channel_layout_default(&mut (*encoder).ch_layout, 1);
	if global_header {
		(*encoder).flags |= AV_CODEC_FLAG_GLOBAL_HEADER as i32;
	}

	assert!(avcodec_open2(encoder, codec, ptr::null_mut()) >= 0);
	assert!((*encoder).frame_size > 0);
	assert!(avcodec_parameters_from_context((*stream).codecpar, encoder) >= 0);
	(*stream).time_base = (*encoder).time_base;

	(encoder, stream)
}

/// Moving luma gradient over flat chroma
unsafe fn fill_picture(frame: &mut AVFrame, index: i32) {
	let (width, height) = (WIDTH as usize, HEIGHT as usize);

	let luma_stride = frame.linesize[0] as usize;
	for y in 0..height {
		for x in 0..width {
			*frame.data[0].add(y * luma_stride + x) = ((x + y + index as usize * 3) % 256) as u8;
		}
	}

	for plane in 1..3 {
		let stride = frame.linesize[plane] as usize;
		for y in 0..height / 2 {
			for x in 0..width / 2 {
				*frame.data[plane].add(y * stride + x) = 128;
			}
		}
	}
}

/// 440 Hz tone, continuous across frames
unsafe fn fill_samples(frame: &mut AVFrame, first_sample: i64) {
	let samples =
		std::slice::from_raw_parts_mut(frame.data[0].cast::<f32>(), frame.nb_samples as usize);
	for (offset, sample) in samples.iter_mut().enumerate() {
		let t = (first_sample + offset as i64) as f32 / SAMPLE_RATE as f32;
		*sample = 0.2 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
	}
}

unsafe fn write_packets(
	format_ctx: *mut AVFormatContext,
	encoder: *mut AVCodecContext,
	stream: *mut AVStream,
	packet: *mut AVPacket,
	corrupt: bool,
) {
	loop {
		let ret = avcodec_receive_packet(encoder, packet);
		if ret == AVERROR(EAGAIN) || ret == AVERROR_EOF {
			break;
		}
		assert!(ret >= 0, "encoding failed: {ret}");

		if corrupt {
			assert!(av_packet_make_writable(packet) >= 0);
			std::slice::from_raw_parts_mut((*packet).data, (*packet).size as usize).fill(0xFF);
		}

		av_packet_rescale_ts(packet, (*encoder).time_base, (*stream).time_base);
		(*packet).stream_index = (*stream).index;
		assert!(av_interleaved_write_frame(format_ctx, packet) >= 0);
	}
}
