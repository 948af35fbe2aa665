//! Safe wrappers around FFmpeg FFI calls.
//!
//! Every function in this module is `pub` and **safe** to call.  All `unsafe`
//! blocks are contained here with explicit safety arguments.  Callers outside
//! this module should never need to write `unsafe` for routine FFmpeg access.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;

// ── Codec-parameter field accessors ─────────────────────────────────────────

/// Read `sample_rate` from an `AVCodecParameters` struct.
///
/// `ffmpeg-next` does not expose this field through a safe accessor.
pub fn codec_params_sample_rate(params: &ffmpeg::codec::parameters::Parameters) -> u32 {
    // SAFETY: `params.as_ptr()` returns a valid non-null pointer for the
    // lifetime of `params`.  `sample_rate` is a plain i32 field with no
    // ownership semantics.
    unsafe { (*params.as_ptr()).sample_rate.max(0) as u32 }
}

/// Read `ch_layout.nb_channels` from an `AVCodecParameters` struct.
pub fn codec_params_channels(params: &ffmpeg::codec::parameters::Parameters) -> u16 {
    // SAFETY: same as `codec_params_sample_rate`.
    unsafe { (*params.as_ptr()).ch_layout.nb_channels.max(0) as u16 }
}

/// Read `bit_rate` from an `AVCodecParameters` struct.
pub fn codec_params_bit_rate(params: &ffmpeg::codec::parameters::Parameters) -> u64 {
    unsafe { (*params.as_ptr()).bit_rate.max(0) as u64 }
}

/// Allocate a fresh `AVCodecParameters`, copy the encoder context into it,
/// and return it as a safe `ffmpeg::codec::Parameters`.
///
/// Used to hand the opened encoder's settings to the output stream.
pub fn encoder_codec_parameters(
    encoder: &ffmpeg::codec::encoder::Audio,
) -> ffmpeg::codec::Parameters {
    use std::ops::Deref;
    use std::rc::Rc;
    let ctx: &ffmpeg::codec::Context = encoder.deref();
    // SAFETY: `avcodec_parameters_alloc` returns a valid pointer or null
    // (only under OOM, which is unrecoverable).
    // `avcodec_parameters_from_context` copies fields from a valid, open
    // encoder context.
    unsafe {
        let params = ffmpeg::ffi::avcodec_parameters_alloc();
        ffmpeg::ffi::avcodec_parameters_from_context(params, ctx.as_ptr());
        ffmpeg::codec::Parameters::wrap(params, None::<Rc<dyn std::any::Any>>)
    }
}

// ── Codec lookup ─────────────────────────────────────────────────────────────

/// Returns `true` if a decoder is registered for `codec_id`.
pub fn decoder_exists(codec_id: ffmpeg::codec::Id) -> bool {
    // SAFETY: `avcodec_find_decoder` reads a global read-only registry after
    // `ffmpeg::init()`.  The returned pointer is only null-checked.
    let ptr = unsafe { ffmpeg::ffi::avcodec_find_decoder(codec_id.into()) };
    !ptr.is_null()
}

/// The first sample format an audio encoder advertises.
///
/// Encoders that publish no list (rare; some wrappers) get packed S16.
pub fn first_sample_format(codec: &ffmpeg::codec::Codec) -> Sample {
    codec
        .audio()
        .ok()
        .and_then(|audio| audio.formats())
        .and_then(|mut formats| formats.next())
        .unwrap_or(crate::pcm::TARGET_SAMPLE_FORMAT)
}

/// Channel layout to assume when a stream reports only a channel count.
pub fn default_layout(channels: u16) -> ChannelLayout {
    match channels {
        0 | 1 => ChannelLayout::MONO,
        2 => ChannelLayout::STEREO,
        n => ChannelLayout::default(n as i32),
    }
}

// ── Resampler sizing ─────────────────────────────────────────────────────────

/// Upper bound on the samples `swr_convert` will produce for `in_samples`
/// more input, counting what the resampler already buffers.
///
/// `ffmpeg-next`'s `Context::run` sizes its output frame to the *input*
/// sample count, which truncates when upsampling. Callers use this to
/// pre-allocate the output frame instead.
pub fn resampler_out_samples(
    context: &mut ffmpeg::software::resampling::Context,
    in_samples: usize,
) -> usize {
    // SAFETY: `as_mut_ptr` is valid for the lifetime of `context`, which is
    // an initialized SwrContext. `swr_get_out_samples` only reads its state.
    let n = unsafe { ffmpeg::ffi::swr_get_out_samples(context.as_mut_ptr(), in_samples as i32) };
    n.max(0) as usize
}

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Fill an `AVCodecParameters` with a raw video description.
///
/// Lets test fixtures add a video stream without a video encoder.
#[cfg(test)]
pub fn codec_params_set_video_for_test(
    params: &mut ffmpeg::codec::parameters::Parameters,
    width: i32,
    height: i32,
) {
    // SAFETY: `params.as_mut_ptr()` is valid for the lifetime of `params`.
    // These are plain scalar fields with no ownership semantics.  This
    // function is only compiled in test builds.
    unsafe {
        let p = params.as_mut_ptr();
        (*p).codec_type = ffmpeg::ffi::AVMediaType::AVMEDIA_TYPE_VIDEO;
        (*p).codec_id = ffmpeg::ffi::AVCodecID::AV_CODEC_ID_RAWVIDEO;
        (*p).format = ffmpeg::ffi::AVPixelFormat::AV_PIX_FMT_GRAY8 as i32;
        (*p).width = width;
        (*p).height = height;
    }
}

/// Fill an `AVCodecParameters` with a packed little-endian S16 PCM description.
#[cfg(test)]
pub fn codec_params_set_pcm_for_test(
    params: &mut ffmpeg::codec::parameters::Parameters,
    sample_rate: i32,
    channels: i32,
) {
    // SAFETY: as above; `av_channel_layout_default` initializes the embedded
    // `ch_layout` in place and owns no heap memory for native layouts.
    unsafe {
        let p = params.as_mut_ptr();
        (*p).codec_type = ffmpeg::ffi::AVMediaType::AVMEDIA_TYPE_AUDIO;
        (*p).codec_id = ffmpeg::ffi::AVCodecID::AV_CODEC_ID_PCM_S16LE;
        (*p).format = ffmpeg::ffi::AVSampleFormat::AV_SAMPLE_FMT_S16 as i32;
        (*p).sample_rate = sample_rate;
        (*p).bits_per_coded_sample = 16;
        (*p).block_align = 2 * channels;
        (*p).bit_rate = 16 * sample_rate as i64 * channels as i64;
        ffmpeg::ffi::av_channel_layout_default(&mut (*p).ch_layout, channels);
    }
}
