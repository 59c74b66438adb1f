//! Property-based tests for registry invariants using proptest.

#[cfg(test)]
mod tests {
    use crate::callback::{CallbackStatus, PlayCallback};
    use crate::mock::MockBackend;
    use crate::registry::{SoundRegistry, seconds_to_millis};
    use crate::types::{CurrentTime, PlayOutcome};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const DURATION_MS: u64 = 600_000;

    fn registry() -> SoundRegistry<MockBackend> {
        SoundRegistry::new(MockBackend::new().with_source("tone", DURATION_MS))
    }

    /// A single registry operation against an arbitrary key
    #[derive(Debug, Clone)]
    enum Op {
        Prepare(i32),
        Play(i32),
        Pause(i32),
        Stop(i32),
        Release(i32),
        Seek(i32, f64),
    }

    fn key_strategy() -> impl Strategy<Value = i32> {
        -5i32..=5
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            key_strategy().prop_map(Op::Prepare),
            key_strategy().prop_map(Op::Play),
            key_strategy().prop_map(Op::Pause),
            key_strategy().prop_map(Op::Stop),
            key_strategy().prop_map(Op::Release),
            (key_strategy(), 0.0f64..600.0).prop_map(|(k, s)| Op::Seek(k, s)),
        ]
    }

    proptest! {
        /// Keys that were never prepared report absence for every operation
        #[test]
        fn unprepared_keys_report_absent(key in any::<i32>(), seconds in -10.0f64..10.0) {
            let mut registry = registry();

            let (callback, mut result) = PlayCallback::channel();
            prop_assert_eq!(registry.play(key, callback), PlayOutcome::Absent);
            prop_assert_eq!(result.status(), CallbackStatus::Fired(false));

            registry.pause(key);
            registry.stop(key);
            registry.set_volume(key, 0.1, 0.9);
            registry.set_looping(key, true);
            prop_assert!(registry.set_current_time(key, seconds).is_ok());
            prop_assert!(registry.release(key).is_ok());
            prop_assert_eq!(registry.get_current_time(key), CurrentTime::ABSENT);
            prop_assert!(registry.is_empty());
        }

        /// Seconds round to the nearest millisecond and never go negative
        #[test]
        fn seconds_round_to_millis(seconds in -1000.0f64..1000.0) {
            let ms = seconds_to_millis(seconds);
            if seconds <= 0.0 {
                prop_assert_eq!(ms, 0);
            } else {
                prop_assert!((ms as f64 - seconds * 1000.0).abs() <= 0.5);
            }
        }

        /// Seeking never changes whether a player is running
        #[test]
        fn seek_preserves_play_state(seconds in 0.0f64..600.0, playing in any::<bool>()) {
            let mut registry = registry();
            registry.prepare("tone", 1).unwrap();
            if playing {
                registry.play(1, PlayCallback::new(|_| {}));
            }

            registry.set_current_time(1, seconds).unwrap();
            let time = registry.get_current_time(1);
            prop_assert_eq!(time.is_playing, playing);
            prop_assert!((time.position * 1000.0 - seconds_to_millis(seconds) as f64).abs() < 1e-6);
        }

        /// The registry holds exactly the keys prepared and not yet released
        #[test]
        fn live_keys_track_prepare_and_release(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let mut registry = registry();
            let mut expected = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Prepare(key) => {
                        let result = registry.prepare("tone", key);
                        prop_assert_eq!(result.is_ok(), expected.insert(key));
                    }
                    Op::Play(key) => {
                        let outcome = registry.play(key, PlayCallback::new(|_| {}));
                        prop_assert_eq!(outcome == PlayOutcome::Absent, !expected.contains(&key));
                    }
                    Op::Pause(key) => registry.pause(key),
                    Op::Stop(key) => registry.stop(key),
                    Op::Release(key) => {
                        registry.release(key).unwrap();
                        expected.remove(&key);
                    }
                    Op::Seek(key, seconds) => registry.set_current_time(key, seconds).unwrap(),
                }

                let live: Vec<i32> = expected.iter().copied().collect();
                prop_assert_eq!(registry.keys(), live);
            }

            prop_assert!(registry.shutdown().is_ok());
            prop_assert!(registry.is_empty());
        }
    }
}
