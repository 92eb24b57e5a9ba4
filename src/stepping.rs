//! Adaptive tolerance stepping along a curve.
//!
//! Steps through a curve taking the longest straight-line steps possible while
//! the curve stays within a deviation bound of each chord. Used to derive the
//! smallest number of bent segments that still track a curve closely, instead
//! of slicing it at a fixed interval.

use bevy::prelude::*;

use crate::curve::{Curve, CurveSpace};

/// Default number of bisection refinements once a violating step is found.
pub const DEFAULT_FINE_TUNING_ITERATIONS: u8 = 5;

/// Default minimum step, as a fraction of the step size.
pub const DEFAULT_MIN_STEP_FACTOR: f32 = 0.5;

/// Bounds on the number of interior samples tested against a candidate chord.
const MIN_DEVIATION_SAMPLES: usize = 2;
const MAX_DEVIATION_SAMPLES: usize = 16;

/// How deviation between the curve and a chord is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum DeviationMetric {
    /// Largest distance from interior curve samples to the chord segment.
    #[default]
    Perpendicular,
    /// Distance between the curve midpoint and the chord midpoint.
    ///
    /// Cheaper than [`DeviationMetric::Perpendicular`] but can under-report on
    /// S-shaped spans whose midpoints happen to coincide.
    Midpoint,
}

/// Parameters for adaptive stepping.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SteppingConfig {
    /// Distance the probe advances per test. Must be positive.
    pub step_size: f32,
    /// Maximum allowed deviation of the curve from the chord.
    pub tolerance: f32,
    /// Bisection iterations used to tighten the boundary once a probe exceeds
    /// the tolerance. Termination comes from this count, not from tolerance
    /// convergence, so a tolerance of zero is safe.
    pub fine_tuning_iterations: u8,
    /// Smallest acceptable step, as a fraction of `step_size`.
    ///
    /// Keeps the first step from degenerating when the curve bends sharply at
    /// the start, and keeps a sliver of curve from being left at the end.
    pub min_step_factor: f32,
    /// Coordinate space deviation is evaluated in.
    pub space: CurveSpace,
    /// Deviation metric to test against the tolerance.
    pub metric: DeviationMetric,
}

impl SteppingConfig {
    /// Create a config with the given step size and tolerance.
    pub fn new(step_size: f32, tolerance: f32) -> Self {
        Self {
            step_size,
            tolerance,
            ..default()
        }
    }

    /// Set the number of bisection refinements.
    pub fn with_fine_tuning_iterations(mut self, iterations: u8) -> Self {
        self.fine_tuning_iterations = iterations;
        self
    }

    /// Set the minimum step fraction.
    pub fn with_min_step_factor(mut self, factor: f32) -> Self {
        self.min_step_factor = factor;
        self
    }

    /// Set the coordinate space deviation is evaluated in.
    pub fn with_space(mut self, space: CurveSpace) -> Self {
        self.space = space;
        self
    }

    /// Set the deviation metric.
    pub fn with_metric(mut self, metric: DeviationMetric) -> Self {
        self.metric = metric;
        self
    }

    fn min_step(&self) -> f32 {
        (self.min_step_factor * self.step_size).max(f32::EPSILON)
    }
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            step_size: 1.0,
            tolerance: 0.1,
            fine_tuning_iterations: DEFAULT_FINE_TUNING_ITERATIONS,
            min_step_factor: DEFAULT_MIN_STEP_FACTOR,
            space: CurveSpace::Local,
            metric: DeviationMetric::Perpendicular,
        }
    }
}

/// One step produced by [`next_step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveStep {
    /// Arc-length distance at the end of the step.
    pub end_distance: f32,
    /// Position on the curve at `end_distance`.
    pub end_position: Vec3,
    /// Straight-line length of the chord from the start to the end position.
    /// Callers use this to scale tangents for curvature-following segments.
    pub chord_length: f32,
}

/// Find the farthest end distance such that the curve stays within tolerance
/// of the straight line from the start.
///
/// `start_position` must correspond to `start_distance`; passing it in avoids
/// a redundant curve fetch when stepping in a loop, since each step's end is
/// the next step's start.
///
/// The probe advances in multiples of `step_size`. Once a probe exceeds the
/// tolerance (or the curve ends), the boundary is refined with a bounded
/// number of bisections between the last distance within tolerance and the
/// first one outside it.
///
/// Returns the step and `true` while curve remains beyond the end distance;
/// `false` signals the curve's end was reached.
pub fn next_step(
    curve: &impl Curve,
    start_position: Vec3,
    start_distance: f32,
    config: &SteppingConfig,
) -> (CurveStep, bool) {
    let total = curve.length();
    let min_step = config.min_step();

    // Too little curve left for even a minimum step: take all of it as the
    // final step.
    if total - start_distance <= min_step {
        return (make_step(curve, start_position, total, config), false);
    }

    // March forward in whole steps while the chord stays within tolerance.
    let mut last_good = start_distance;
    let mut first_bad = None;
    let mut probe = start_distance + config.step_size;
    loop {
        let clamped = probe.min(total);
        if deviation_exceeds(curve, start_position, start_distance, clamped, config) {
            first_bad = Some(clamped);
            break;
        }
        last_good = clamped;
        if probe >= total {
            break;
        }
        probe += config.step_size;
    }

    let mut end_distance = match first_bad {
        None => total,
        Some(mut bad) => {
            let mut good = last_good;
            for _ in 0..config.fine_tuning_iterations {
                let mid = 0.5 * (good + bad);
                if deviation_exceeds(curve, start_position, start_distance, mid, config) {
                    bad = mid;
                } else {
                    good = mid;
                }
            }
            good
        }
    };

    // The minimum step wins over the tolerance when the curve bends sharply
    // right at the start.
    end_distance = end_distance.max(start_distance + min_step).min(total);

    // Absorb a tail shorter than the minimum step into this step.
    if total - end_distance < min_step {
        end_distance = total;
    }

    let more = end_distance < total;
    (make_step(curve, start_position, end_distance, config), more)
}

/// Step through the whole curve from its start and collect every step.
///
/// Always yields at least one step, even for a degenerate curve of zero
/// length. The step count is the adaptive target consumed by segment pool
/// reconciliation.
pub fn collect_steps(curve: &impl Curve, config: &SteppingConfig) -> Vec<CurveStep> {
    let mut steps = Vec::new();
    let mut distance = 0.0;
    let mut position = curve.position_at(0.0, config.space);

    loop {
        let (step, more) = next_step(curve, position, distance, config);
        distance = step.end_distance;
        position = step.end_position;
        steps.push(step);
        if !more {
            break;
        }
    }

    steps
}

fn make_step(
    curve: &impl Curve,
    start_position: Vec3,
    end_distance: f32,
    config: &SteppingConfig,
) -> CurveStep {
    let end_position = curve.position_at(end_distance, config.space);
    CurveStep {
        end_distance,
        end_position,
        chord_length: (end_position - start_position).length(),
    }
}

/// Test whether the curve deviates from the chord `start..end` by more than
/// the tolerance anywhere over a bounded set of interior samples.
fn deviation_exceeds(
    curve: &impl Curve,
    start_position: Vec3,
    start_distance: f32,
    end_distance: f32,
    config: &SteppingConfig,
) -> bool {
    let end_position = curve.position_at(end_distance, config.space);
    let span = end_distance - start_distance;
    if span <= 0.0 {
        return false;
    }

    match config.metric {
        DeviationMetric::Midpoint => {
            let mid = curve.position_at(start_distance + 0.5 * span, config.space);
            let chord_mid = 0.5 * (start_position + end_position);
            (mid - chord_mid).length() > config.tolerance
        }
        DeviationMetric::Perpendicular => {
            let samples = ((span / config.step_size).ceil() as usize * 2)
                .clamp(MIN_DEVIATION_SAMPLES, MAX_DEVIATION_SAMPLES);
            for i in 1..samples {
                let d = start_distance + span * i as f32 / samples as f32;
                let point = curve.position_at(d, config.space);
                if distance_to_segment(point, start_position, end_position) > config.tolerance {
                    return true;
                }
            }
            false
        }
    }
}

/// Distance from a point to the closest point on the segment `a..b`.
fn distance_to_segment(point: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight line along X of the given length.
    struct LineCurve {
        length: f32,
    }

    impl Curve for LineCurve {
        fn length(&self) -> f32 {
            self.length
        }

        fn position_at(&self, distance: f32, _space: CurveSpace) -> Vec3 {
            Vec3::new(distance.clamp(0.0, self.length), 0.0, 0.0)
        }

        fn tangent_at(&self, _distance: f32, _space: CurveSpace) -> Vec3 {
            Vec3::X
        }
    }

    /// Circular arc of the given radius in the XZ plane, parameterized by arc
    /// length.
    struct ArcCurve {
        radius: f32,
        length: f32,
    }

    impl Curve for ArcCurve {
        fn length(&self) -> f32 {
            self.length
        }

        fn position_at(&self, distance: f32, _space: CurveSpace) -> Vec3 {
            let angle = distance.clamp(0.0, self.length) / self.radius;
            Vec3::new(self.radius * angle.sin(), 0.0, self.radius * (1.0 - angle.cos()))
        }

        fn tangent_at(&self, distance: f32, _space: CurveSpace) -> Vec3 {
            let angle = distance.clamp(0.0, self.length) / self.radius;
            Vec3::new(angle.cos(), 0.0, angle.sin())
        }
    }

    #[test]
    fn test_straight_curve_takes_full_steps() {
        let curve = LineCurve { length: 10.0 };
        let config = SteppingConfig::new(2.0, 0.01);

        let (step, more) = next_step(&curve, curve.position_at(0.0, config.space), 0.0, &config);

        // No deviation anywhere, so the step runs to the end of the curve.
        assert!(!more);
        assert!((step.end_distance - 10.0).abs() < 0.001);
        assert!((step.chord_length - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_min_step_respected_on_sharp_curvature() {
        let curve = ArcCurve {
            radius: 1.0,
            length: std::f32::consts::PI,
        };
        // Tolerance so tight every probe violates it.
        let config = SteppingConfig::new(1.0, 1e-6);

        let (step, more) = next_step(&curve, curve.position_at(0.0, config.space), 0.0, &config);

        assert!(more);
        assert!(step.end_distance >= config.min_step_factor * config.step_size - 0.001);
    }

    #[test]
    fn test_deviation_bounded_by_tolerance() {
        let curve = ArcCurve {
            radius: 10.0,
            length: 10.0 * std::f32::consts::PI,
        };
        let config = SteppingConfig::new(1.0, 0.05);

        let (step, _) = next_step(&curve, curve.position_at(0.0, config.space), 0.0, &config);

        // Check the true curve against the chord over the accepted span.
        let start = curve.position_at(0.0, config.space);
        let checks = 32;
        for i in 1..checks {
            let d = step.end_distance * i as f32 / checks as f32;
            let point = curve.position_at(d, config.space);
            let deviation = distance_to_segment(point, start, step.end_position);
            // Allow slack for the bounded interior sampling.
            assert!(deviation <= config.tolerance * 1.5);
        }
    }

    #[test]
    fn test_zero_tolerance_terminates() {
        let curve = ArcCurve {
            radius: 5.0,
            length: 20.0,
        };
        let config = SteppingConfig::new(2.0, 0.0);

        let steps = collect_steps(&curve, &config);

        assert!(!steps.is_empty());
        assert!((steps.last().unwrap().end_distance - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_short_curve_yields_single_final_step() {
        let curve = LineCurve { length: 0.3 };
        let config = SteppingConfig::new(1.0, 0.01);

        let (step, more) = next_step(&curve, curve.position_at(0.0, config.space), 0.0, &config);

        assert!(!more);
        assert!((step.end_distance - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_zero_length_curve_yields_one_step() {
        let curve = LineCurve { length: 0.0 };
        let config = SteppingConfig::new(1.0, 0.01);

        let steps = collect_steps(&curve, &config);

        assert_eq!(steps.len(), 1);
        assert!(steps[0].end_distance.abs() < 0.001);
    }

    #[test]
    fn test_no_tail_shorter_than_min_step() {
        let curve = ArcCurve {
            radius: 2.0,
            length: 10.0,
        };
        let config = SteppingConfig::new(3.0, 0.05);

        let steps = collect_steps(&curve, &config);

        let last = steps.last().unwrap();
        assert!((last.end_distance - 10.0).abs() < 0.001);
        assert!(steps.len() > 1);
        let mut start = 0.0;
        for step in &steps {
            let span = step.end_distance - start;
            assert!(span >= config.min_step_factor * config.step_size - 0.001);
            start = step.end_distance;
        }
    }

    #[test]
    fn test_steps_cover_curve_monotonically() {
        let curve = ArcCurve {
            radius: 4.0,
            length: 25.0,
        };
        let config = SteppingConfig::new(1.5, 0.1).with_metric(DeviationMetric::Midpoint);

        let steps = collect_steps(&curve, &config);

        let mut previous = 0.0;
        for step in &steps {
            assert!(step.end_distance > previous);
            previous = step.end_distance;
        }
        assert!((previous - 25.0).abs() < 0.001);
    }
}
