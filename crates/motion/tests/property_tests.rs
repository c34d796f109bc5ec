//! Property-based tests for motion interpolation.
//!
//! Uses proptest with 500 cases to check the endpoint laws: every traversal
//! starts at the origin, ends exactly on the target, and is finite.

use approx::assert_relative_eq;
use hidbridge_motion::{Delta, MotionInterpolator, MotionPath, Point};
use proptest::prelude::*;

const COORD: std::ops::RangeInclusive<i32> = -100_000..=100_000;

fn point() -> impl Strategy<Value = Point> {
    (COORD, COORD).prop_map(|(x, y)| Point::from_counts(x, y))
}

fn path() -> impl Strategy<Value = MotionPath> {
    prop_oneof![
        point().prop_map(MotionPath::linear),
        (point(), point(), point()).prop_map(|(c1, c2, t)| MotionPath::cubic_bezier(c1, c2, t)),
    ]
}

fn target_delta(path: &MotionPath) -> Delta {
    let t = path.target();
    Delta::new(t.x as i64, t.y as i64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The deltas of a full traversal always sum to the target.
    #[test]
    fn prop_traversal_sums_to_target(
        path in path(),
        duration in 0u32..5_000,
        period in 1u32..250,
    ) {
        let total: Delta = MotionInterpolator::new(path, duration).ticks(period).sum();
        prop_assert_eq!(total, target_delta(&path));
    }

    /// The number of ticks is ceil(duration / period), and at least one.
    #[test]
    fn prop_tick_count_is_bounded(
        path in path(),
        duration in 0u32..5_000,
        period in 1u32..250,
    ) {
        let count = MotionInterpolator::new(path, duration).ticks(period).count();
        let expected = usize::try_from(duration.div_ceil(period).max(1)).unwrap_or(usize::MAX);
        prop_assert_eq!(count, expected);
    }

    /// Every path starts at the origin and ends on its target.
    #[test]
    fn prop_path_endpoints(path in path()) {
        let start = path.evaluate(0.0);
        assert_relative_eq!(start.x, 0.0);
        assert_relative_eq!(start.y, 0.0);

        let end = path.evaluate(1.0);
        let target = path.target();
        assert_relative_eq!(end.x, target.x, epsilon = 1e-6);
        assert_relative_eq!(end.y, target.y, epsilon = 1e-6);
    }

    /// Linear moves never step backwards along either axis.
    #[test]
    fn prop_linear_is_monotonic(target in point(), duration in 1u32..2_000, period in 1u32..100) {
        let deltas: Vec<Delta> = MotionInterpolator::new(MotionPath::linear(target), duration)
            .ticks(period)
            .collect();
        for d in deltas {
            prop_assert!(d.dx == 0 || d.dx.signum() == (target.x as i64).signum());
            prop_assert!(d.dy == 0 || d.dy.signum() == (target.y as i64).signum());
        }
    }

    /// Once exhausted, an interpolator stays exhausted.
    #[test]
    fn prop_exhausted_stays_exhausted(path in path(), duration in 0u32..1_000, extra in 1usize..10) {
        let mut interp = MotionInterpolator::new(path, duration);
        while interp.advance(50).is_some() {}
        for _ in 0..extra {
            prop_assert_eq!(interp.advance(50), None);
        }
        prop_assert_eq!(interp.remaining(), Delta::ZERO);
    }
}
