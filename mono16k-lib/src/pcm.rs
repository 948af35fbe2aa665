//! Fixed output format and sample conversion
//!
//! Everything this crate produces or consumes is mono, 16 kHz, and carried
//! as `f64` in [-1, 1]. On the FFmpeg side the same audio is packed signed
//! 16-bit.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;

/// Sample rate of every decoded and encoded sample sequence
pub const TARGET_SAMPLE_RATE: u32 = 16000;
/// Channel count of every decoded and encoded sample sequence
pub const TARGET_CHANNELS: u16 = 1;
/// Channel layout matching [`TARGET_CHANNELS`]
pub const TARGET_CHANNEL_LAYOUT: ChannelLayout = ChannelLayout::MONO;
/// FFmpeg sample format of the intermediate PCM
pub const TARGET_SAMPLE_FORMAT: Sample = Sample::I16(ffmpeg::util::format::sample::Type::Packed);
/// Scale between S16 and the normalized range
pub const PCM_SCALE: f64 = 32767.0;

/// Time base of every timestamp the encoder produces (one tick per sample)
pub fn target_time_base() -> ffmpeg::Rational {
    ffmpeg::Rational::new(1, TARGET_SAMPLE_RATE as i32)
}

/// Convert one S16 sample to the normalized range.
///
/// -32768 would land just below -1.0, so the result is clamped.
pub fn s16_to_unit(sample: i16) -> f64 {
    (sample as f64 / PCM_SCALE).clamp(-1.0, 1.0)
}

/// Convert one normalized sample to S16, truncating toward zero.
///
/// Out-of-range input is clamped first; NaN becomes silence.
pub fn unit_to_s16(sample: f64) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * PCM_SCALE) as i16
}

/// Append converted S16 samples to a normalized sequence.
pub fn extend_from_s16(out: &mut Vec<f64>, samples: &[i16]) {
    out.reserve(samples.len());
    out.extend(samples.iter().map(|&s| s16_to_unit(s)));
}

/// Convert a normalized batch to S16.
pub fn to_s16(samples: &[f64]) -> Vec<i16> {
    samples.iter().map(|&s| unit_to_s16(s)).collect()
}

/// Duration in seconds of `count` samples at the target rate
pub fn duration_secs(count: usize) -> f64 {
    count as f64 / TARGET_SAMPLE_RATE as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s16_extremes() {
        assert_eq!(s16_to_unit(i16::MAX), 1.0);
        assert_eq!(s16_to_unit(0), 0.0);
        assert_eq!(s16_to_unit(-32767), -1.0);
        // Boundary: -32768 / 32767 is below -1 and must be clamped
        assert_eq!(s16_to_unit(i16::MIN), -1.0);
    }

    #[test]
    fn test_unit_to_s16_truncates() {
        assert_eq!(unit_to_s16(1.0), 32767);
        assert_eq!(unit_to_s16(-1.0), -32767);
        assert_eq!(unit_to_s16(0.5), 16383);
        assert_eq!(unit_to_s16(-0.5), -16383);
        assert_eq!(unit_to_s16(0.00001), 0);
    }

    #[test]
    fn test_unit_to_s16_clamps_out_of_range() {
        assert_eq!(unit_to_s16(3.0), 32767);
        assert_eq!(unit_to_s16(-7.5), -32767);
        assert_eq!(unit_to_s16(f64::INFINITY), 32767);
        assert_eq!(unit_to_s16(f64::NAN), 0);
    }

    #[test]
    fn test_all_s16_values_stay_in_range() {
        for s in i16::MIN..=i16::MAX {
            let v = s16_to_unit(s);
            assert!((-1.0..=1.0).contains(&v), "{} -> {}", s, v);
        }
    }

    #[test]
    fn test_requantize_within_one_step() {
        for s in [-32767i16, -12345, -1, 0, 1, 999, 32767] {
            let back = unit_to_s16(s16_to_unit(s));
            assert!((back as i32 - s as i32).abs() <= 1, "{} -> {}", s, back);
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration_secs(16000), 1.0);
        assert_eq!(duration_secs(8000), 0.5);
    }
}
