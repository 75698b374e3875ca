//! Property-based tests for timing profiles and animation chaining.

mod common;
use common::*;

use emoface::{Property, StatusAnimator, StatusDelta, TimingProfile};
use proptest::prelude::*;

const PROFILES: [TimingProfile; 4] = [
    TimingProfile::Linear,
    TimingProfile::EaseIn,
    TimingProfile::EaseOut,
    TimingProfile::EaseInOut,
];

fn arb_profile() -> impl Strategy<Value = TimingProfile> {
    (0usize..PROFILES.len()).prop_map(|i| PROFILES[i])
}

proptest! {
    #[test]
    fn profiles_hit_both_endpoints(
        profile in arb_profile(),
        start in -500.0f32..500.0,
        end in -500.0f32..500.0,
        duration in 1u64..10_000,
    ) {
        prop_assert_eq!(profile.interpolate(start, end, 0, duration), start);
        prop_assert_eq!(profile.interpolate(start, end, duration, duration), end);
        prop_assert_eq!(profile.interpolate(start, end, duration + 1, duration), end);
    }

    #[test]
    fn profiles_are_monotonic_without_overshoot(
        profile in arb_profile(),
        start in -500.0f32..500.0,
        end in -500.0f32..500.0,
        duration in 1u64..5_000,
    ) {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let mut previous = start;
        for elapsed in 0..=duration.min(200) {
            let elapsed = elapsed * duration / duration.min(200);
            let value = profile.interpolate(start, end, elapsed, duration);
            prop_assert!(value >= lo - 1e-3 && value <= hi + 1e-3);
            if start <= end {
                prop_assert!(value >= previous - 1e-3);
            } else {
                prop_assert!(value <= previous + 1e-3);
            }
            previous = value;
        }
    }

    #[test]
    fn chained_starts_are_prefix_sums(durations in prop::collection::vec(1u64..2_000, 1..12)) {
        let mut animator = StatusAnimator::new(TestInstant(0));
        for (i, d) in durations.iter().enumerate() {
            let delta = StatusDelta::from([(Property::Smile, i as f32)]);
            animator.trigger_animation(
                &delta,
                TestDuration(*d),
                TimingProfile::Linear,
                false,
                TestInstant(0),
            );
        }

        let mut expected = 0;
        for (descriptor, d) in animator.queued().iter().zip(&durations) {
            prop_assert_eq!(descriptor.scheduled_start, TestInstant(expected));
            expected += d;
        }
        prop_assert_eq!(animator.final_time(TestInstant(0)), TestDuration(expected));
    }

    #[test]
    fn zero_duration_never_divides_by_zero(
        profile in arb_profile(),
        start in -1.0f32..1.0,
        end in -1.0f32..1.0,
    ) {
        let value = profile.interpolate(start, end, 1, 0);
        prop_assert!(value.is_finite());
        prop_assert_eq!(value, end);
    }
}
