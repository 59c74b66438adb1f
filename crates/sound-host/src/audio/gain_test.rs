//! Unit tests for the gain and looping sources and rodio error mapping.
//!
//! These run against in-memory sample buffers, so no output device is
//! required.

#[cfg(test)]
mod tests {
    use crate::audio::{LoopState, Looping, StereoGain, StereoGains, seek_error};
    use proptest::prelude::*;
    use rodio::Source;
    use rodio::buffer::SamplesBuffer;
    use rodio::source::SeekError;
    use sound_core::SoundError;
    use std::sync::Arc;
    use std::time::Duration;

    fn buffer(channels: u16, samples: Vec<f32>) -> SamplesBuffer {
        SamplesBuffer::new(channels, 44100, samples)
    }

    // ==================== StereoGains Tests ====================

    #[test]
    fn test_gains_default_to_unity() {
        assert_eq!(StereoGains::default().get(), (1.0, 1.0));
    }

    #[test]
    fn test_gains_round_trip() {
        let gains = StereoGains::new(1.0, 1.0);
        gains.set(0.25, 0.5);
        assert_eq!(gains.get(), (0.25, 0.5));
    }

    // ==================== StereoGain Source Tests ====================

    #[test]
    fn test_stereo_gain_scales_each_channel() {
        let gains = Arc::new(StereoGains::new(0.5, 0.25));
        let source = StereoGain::new(buffer(2, vec![1.0, 1.0, -1.0, -1.0]), gains);

        let out: Vec<f32> = source.collect();
        assert_eq!(out, vec![0.5, 0.25, -0.5, -0.25]);
    }

    #[test]
    fn test_mono_uses_left_gain() {
        let gains = Arc::new(StereoGains::new(0.5, 0.0));
        let source = StereoGain::new(buffer(1, vec![1.0, 1.0, 1.0]), gains);

        let out: Vec<f32> = source.collect();
        assert_eq!(out, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_extra_channels_are_untouched() {
        let gains = Arc::new(StereoGains::new(0.0, 0.0));
        let source = StereoGain::new(buffer(3, vec![1.0, 1.0, 1.0]), gains);

        let out: Vec<f32> = source.collect();
        assert_eq!(out, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_gain_change_applies_to_live_source() {
        let gains = Arc::new(StereoGains::default());
        let mut source = StereoGain::new(buffer(2, vec![1.0; 4]), Arc::clone(&gains));

        assert_eq!(source.next(), Some(1.0));
        assert_eq!(source.next(), Some(1.0));
        gains.set(0.0, 0.5);
        assert_eq!(source.next(), Some(0.0));
        assert_eq!(source.next(), Some(0.5));
        assert_eq!(source.next(), None);
    }

    #[test]
    fn test_source_metadata_passes_through() {
        let source = StereoGain::new(
            buffer(2, vec![0.0; 88200]),
            Arc::new(StereoGains::default()),
        );

        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 44100);
        assert_eq!(source.total_duration(), Some(Duration::from_secs(1)));
    }

    // ==================== Looping Tests ====================

    #[test]
    fn test_looping_disabled_ends_with_source() {
        let state = Arc::new(LoopState::default());
        let out: Vec<f32> = Looping::new(buffer(1, vec![0.5, 0.25]), Arc::clone(&state)).collect();

        assert_eq!(out, vec![0.5, 0.25]);
        assert_eq!(state.wraps(), 0);
    }

    #[test]
    fn test_looping_rewinds_and_counts_wraps() {
        let state = Arc::new(LoopState::default());
        state.set_enabled(true);
        let out: Vec<f32> = Looping::new(buffer(1, vec![0.5, 0.25]), Arc::clone(&state))
            .take(7)
            .collect();

        assert_eq!(out, vec![0.5, 0.25, 0.5, 0.25, 0.5, 0.25, 0.5]);
        assert_eq!(state.wraps(), 3);
    }

    #[test]
    fn test_looping_stops_once_disabled() {
        let state = Arc::new(LoopState::default());
        state.set_enabled(true);
        let mut source = Looping::new(buffer(1, vec![0.5, 0.25]), Arc::clone(&state));

        assert_eq!(source.by_ref().take(3).count(), 3);
        state.set_enabled(false);
        assert_eq!(source.count(), 1);
        assert_eq!(state.wraps(), 1);
    }

    #[test]
    fn test_looping_seek_clears_wraps() {
        let state = Arc::new(LoopState::default());
        state.set_enabled(true);
        let mut source = Looping::new(buffer(1, vec![0.5; 4]), Arc::clone(&state));
        assert_eq!(source.by_ref().take(9).count(), 9);
        assert_eq!(state.wraps(), 2);

        source.try_seek(Duration::ZERO).unwrap();
        assert_eq!(state.wraps(), 0);
    }

    // ==================== Error Mapping Tests ====================

    #[test]
    fn test_rodio_errors_map_to_sound_error() {
        let err = seek_error(SeekError::NotSupported {
            underlying_source: "test",
        });
        assert!(matches!(err, SoundError::Seek(_)));
        assert_eq!(err.code(), -4);
    }

    #[test]
    fn test_io_error_is_file_open() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = SoundError::from(io);
        assert!(matches!(err, SoundError::FileOpen(_)));
    }

    proptest! {
        /// Every interleaved frame is scaled by exactly the left/right gains
        #[test]
        fn stereo_frames_scale_by_gain(
            frames in prop::collection::vec((-1.0f32..1.0, -1.0f32..1.0), 0..64),
            left in 0.0f32..1.0,
            right in 0.0f32..1.0,
        ) {
            let samples: Vec<f32> = frames.iter().flat_map(|&(l, r)| [l, r]).collect();
            let gains = Arc::new(StereoGains::new(left, right));
            let out: Vec<f32> = StereoGain::new(buffer(2, samples), gains).collect();

            prop_assert_eq!(out.len(), frames.len() * 2);
            for (i, &(l, r)) in frames.iter().enumerate() {
                prop_assert_eq!(out[2 * i], l * left);
                prop_assert_eq!(out[2 * i + 1], r * right);
            }
        }
    }
}
