//! Segment pool reconciliation.
//!
//! Keeps a caller-owned pool of placed segments matched to a target count with
//! minimal churn, then lays every segment out along the curve. Pools persist
//! across calls, which is what makes interactive editing cheap: the curve
//! changes every frame while most of the pool is reused in place.

use bevy::prelude::*;

use crate::curve::{Curve, CurveSpace};
use crate::stepping::{collect_steps, SteppingConfig};

/// Start and end pose of a placed segment.
///
/// Tangents are scaled to the segment's straight-line length so handles can
/// bend their geometry between the two ends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct SegmentPose {
    /// Position of the segment's start, in spline-local space.
    pub start_position: Vec3,
    /// Incoming direction at the start, scaled to the chord length.
    pub start_tangent: Vec3,
    /// Position of the segment's end.
    pub end_position: Vec3,
    /// Outgoing direction at the end, scaled to the chord length.
    pub end_tangent: Vec3,
}

impl SegmentPose {
    /// Compute the pose for the span between two arc-length distances.
    pub fn between(curve: &impl Curve, start_distance: f32, end_distance: f32) -> Self {
        let start_position = curve.position_at(start_distance, CurveSpace::Local);
        let end_position = curve.position_at(end_distance, CurveSpace::Local);
        let chord = (end_position - start_position).length();
        Self {
            start_position,
            start_tangent: curve
                .tangent_at(start_distance, CurveSpace::Local)
                .normalize_or_zero()
                * chord,
            end_position,
            end_tangent: curve
                .tangent_at(end_distance, CurveSpace::Local)
                .normalize_or_zero()
                * chord,
        }
    }

    /// Straight-line length between the two end positions.
    pub fn chord_length(&self) -> f32 {
        (self.end_position - self.start_position).length()
    }
}

/// A placed unit owned by a segment pool.
///
/// Handles are opaque to the reconciler: it sets poses, assigns visuals,
/// activates, and destroys, and never inspects what a handle is backed by.
pub trait SegmentHandle {
    /// Visual representation assigned to the segment, e.g. a mesh handle.
    type Visual: Clone;

    /// Apply the segment's start and end pose.
    fn set_pose(&mut self, pose: &SegmentPose);

    /// Assign the visual representation.
    fn set_visual(&mut self, visual: Self::Visual);

    /// Whether this segment has been made live.
    fn is_activated(&self) -> bool;

    /// Make the segment live. The reconciler calls this only after every pose
    /// in the batch is set, so an observer never sees an unpositioned segment.
    fn activate(&mut self);

    /// Tear the segment down. Called when the pool shrinks.
    fn destroy(self);
}

/// How segment boundaries are derived from the curve.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum SegmentPolicy {
    /// `max(1, round(length / segment_length))` segments of equal arc length.
    ///
    /// Uniform division by the target count, not the literal segment length,
    /// so the last segment never stretches or leaves a seam at the tail.
    FixedLength {
        /// Nominal length of one segment.
        segment_length: f32,
    },
    /// Same target count, but the pool never grows past `max_segments`.
    ///
    /// The uniform division still uses the uncapped count as the denominator,
    /// so a capped pool stops short of the curve's end instead of stretching
    /// the remaining segments to cover it.
    FixedLengthCapped {
        /// Nominal length of one segment.
        segment_length: f32,
        /// Upper bound on the pool size.
        max_segments: usize,
    },
    /// Segment boundaries come from adaptive tolerance stepping; segment count
    /// and lengths vary with curvature.
    Adaptive(SteppingConfig),
}

impl SegmentPolicy {
    /// Arc-length slice boundaries this policy produces for the curve.
    ///
    /// The slice count is the target pool size. Always at least one slice,
    /// even for a curve of zero length.
    pub fn slices(&self, curve: &impl Curve) -> Vec<(f32, f32)> {
        match *self {
            Self::FixedLength { segment_length } => {
                uniform_slices(curve.length(), segment_length, None)
            }
            Self::FixedLengthCapped {
                segment_length,
                max_segments,
            } => uniform_slices(curve.length(), segment_length, Some(max_segments)),
            Self::Adaptive(ref config) => {
                let mut start = 0.0;
                collect_steps(curve, config)
                    .iter()
                    .map(|step| {
                        let slice = (start, step.end_distance);
                        start = step.end_distance;
                        slice
                    })
                    .collect()
            }
        }
    }
}

fn uniform_slices(length: f32, segment_length: f32, cap: Option<usize>) -> Vec<(f32, f32)> {
    let target = (length / segment_length).round().max(1.0) as usize;
    let segment = length / target as f32;
    let count = cap.map_or(target, |cap| target.min(cap));
    (0..count)
        .map(|i| (i as f32 * segment, (i + 1) as f32 * segment))
        .collect()
}

/// Reconcile a segment pool against a curve.
///
/// Adjusts the pool size to the policy's target with minimal churn: surviving
/// entries keep their identity and order, shrinking removes only from the
/// tail, growing appends through `factory`. A factory returning `None` halts
/// growth for this call; the caller detects the partial pool by comparing its
/// length against the returned target and may simply call again later.
///
/// After the size adjustment every entry gets its pose (and visual, when one
/// is given) for its slice of the curve, and finally every not-yet-activated
/// entry is activated.
///
/// Calling this twice with an unchanged curve, policy, and pool produces
/// identical poses on the second call.
pub fn reconcile_segments<C, H, F>(
    curve: &C,
    policy: &SegmentPolicy,
    visual: Option<&H::Visual>,
    pool: &mut Vec<H>,
    mut factory: F,
) -> usize
where
    C: Curve,
    H: SegmentHandle,
    F: FnMut(&C) -> Option<H>,
{
    let slices = policy.slices(curve);
    let target = slices.len();

    // Remove the excess from the tail, or create more.
    while pool.len() > target {
        if let Some(handle) = pool.pop() {
            handle.destroy();
        }
    }
    while pool.len() < target {
        match factory(curve) {
            Some(handle) => pool.push(handle),
            None => break,
        }
    }

    // Put all pieces along the curve.
    for (handle, &(start, end)) in pool.iter_mut().zip(&slices) {
        handle.set_pose(&SegmentPose::between(curve, start, end));
        if let Some(visual) = visual {
            handle.set_visual(visual.clone());
        }
    }

    // Activation happens after every pose is set.
    for handle in pool.iter_mut() {
        if !handle.is_activated() {
            handle.activate();
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

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

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Created(usize),
        Posed(usize),
        Activated(usize),
        Destroyed(usize),
    }

    #[derive(Clone)]
    struct RecordingHandle {
        id: usize,
        pose: Option<SegmentPose>,
        visual: Option<u32>,
        activated: bool,
        log: Rc<RefCell<Vec<Event>>>,
    }

    impl SegmentHandle for RecordingHandle {
        type Visual = u32;

        fn set_pose(&mut self, pose: &SegmentPose) {
            self.pose = Some(*pose);
            self.log.borrow_mut().push(Event::Posed(self.id));
        }

        fn set_visual(&mut self, visual: u32) {
            self.visual = Some(visual);
        }

        fn is_activated(&self) -> bool {
            self.activated
        }

        fn activate(&mut self) {
            self.activated = true;
            self.log.borrow_mut().push(Event::Activated(self.id));
        }

        fn destroy(self) {
            self.log.borrow_mut().push(Event::Destroyed(self.id));
        }
    }

    struct Harness {
        log: Rc<RefCell<Vec<Event>>>,
        next_id: usize,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                next_id: 0,
            }
        }

        fn handle(&mut self) -> RecordingHandle {
            let id = self.next_id;
            self.next_id += 1;
            self.log.borrow_mut().push(Event::Created(id));
            RecordingHandle {
                id,
                pose: None,
                visual: None,
                activated: false,
                log: Rc::clone(&self.log),
            }
        }

        fn pool_of(&mut self, count: usize) -> Vec<RecordingHandle> {
            (0..count).map(|_| self.handle()).collect()
        }
    }

    #[test]
    fn test_fixed_length_exact_division() {
        let curve = LineCurve { length: 1000.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        let target = reconcile_segments(&curve, &policy, None, &mut pool, |_| {
            Some(harness.handle())
        });

        assert_eq!(target, 10);
        assert_eq!(pool.len(), 10);
        for (i, handle) in pool.iter().enumerate() {
            let pose = handle.pose.unwrap();
            assert!((pose.start_position.x - i as f32 * 100.0).abs() < 0.001);
            assert!((pose.end_position.x - (i + 1) as f32 * 100.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_fixed_length_uniform_redivision() {
        // 950 / 100 rounds to 10 segments of 95 each, not 9x100 + 1x50.
        let curve = LineCurve { length: 950.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));

        assert_eq!(pool.len(), 10);
        for handle in &pool {
            let pose = handle.pose.unwrap();
            assert!((pose.chord_length() - 95.0).abs() < 0.001);
        }
        let last = pool.last().unwrap().pose.unwrap();
        assert!((last.end_position.x - 950.0).abs() < 0.001);
    }

    #[test]
    fn test_slices_cover_length_without_gaps() {
        let curve = LineCurve { length: 730.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };

        let slices = policy.slices(&curve);

        let mut expected_start = 0.0;
        for &(start, end) in &slices {
            assert!((start - expected_start).abs() < 0.001);
            expected_start = end;
        }
        assert!((expected_start - 730.0).abs() < 0.001);
    }

    #[test]
    fn test_degenerate_curve_gets_one_segment() {
        let curve = LineCurve { length: 0.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        let target = reconcile_segments(&curve, &policy, None, &mut pool, |_| {
            Some(harness.handle())
        });

        assert_eq!(target, 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_shrink_keeps_head_destroys_tail() {
        let curve = LineCurve { length: 300.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = harness.pool_of(5);

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));

        assert_eq!(pool.len(), 3);
        assert_eq!(
            pool.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        let destroyed: Vec<_> = harness
            .log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Destroyed(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(destroyed, vec![4, 3]);
    }

    #[test]
    fn test_grow_keeps_existing_and_appends() {
        let curve = LineCurve { length: 500.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = harness.pool_of(2);

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));

        assert_eq!(
            pool.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_factory_exhaustion_halts_growth() {
        // Growing from 2 to 5 with the factory failing on its 3rd creation
        // leaves a pool of 4; no error, the caller may retry later.
        let curve = LineCurve { length: 500.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = harness.pool_of(2);
        let mut created = 0;

        let target = reconcile_segments(&curve, &policy, None, &mut pool, |_| {
            created += 1;
            if created >= 3 {
                None
            } else {
                Some(harness.handle())
            }
        });

        assert_eq!(target, 5);
        assert_eq!(pool.len(), 4);
        // All four surviving entries were still posed and activated.
        assert!(pool.iter().all(|h| h.pose.is_some() && h.activated));
    }

    #[test]
    fn test_capped_pool_stops_short_of_curve_end() {
        // Uncapped target is 10; capped at 6 the division still uses 10, so
        // the tail ends at 6 * (1000 / 10) = 600, short of the curve end.
        let curve = LineCurve { length: 1000.0 };
        let policy = SegmentPolicy::FixedLengthCapped {
            segment_length: 100.0,
            max_segments: 6,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));

        assert_eq!(pool.len(), 6);
        let last = pool.last().unwrap().pose.unwrap();
        assert!((last.end_position.x - 600.0).abs() < 0.001);
        assert!(last.end_position.x < 1000.0);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let curve = LineCurve { length: 470.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 120.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));
        let first: Vec<_> = pool.iter().map(|h| h.pose.unwrap()).collect();

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));
        let second: Vec<_> = pool.iter().map(|h| h.pose.unwrap()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_activation_happens_after_all_poses() {
        let curve = LineCurve { length: 400.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));

        let log = harness.log.borrow();
        let last_pose = log
            .iter()
            .rposition(|e| matches!(e, Event::Posed(_)))
            .unwrap();
        let first_activation = log
            .iter()
            .position(|e| matches!(e, Event::Activated(_)))
            .unwrap();
        assert!(last_pose < first_activation);
    }

    #[test]
    fn test_already_activated_segments_are_not_reactivated() {
        let curve = LineCurve { length: 400.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));
        reconcile_segments(&curve, &policy, None, &mut pool, |_| Some(harness.handle()));

        let activations = harness
            .log
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Activated(_)))
            .count();
        assert_eq!(activations, 4);
    }

    #[test]
    fn test_visual_assigned_to_every_segment() {
        let curve = LineCurve { length: 300.0 };
        let policy = SegmentPolicy::FixedLength {
            segment_length: 100.0,
        };
        let mut harness = Harness::new();
        let mut pool = Vec::new();

        reconcile_segments(&curve, &policy, Some(&7), &mut pool, |_| {
            Some(harness.handle())
        });

        assert!(pool.iter().all(|h| h.visual == Some(7)));
    }

    #[test]
    fn test_adaptive_policy_slices_follow_steps() {
        let curve = LineCurve { length: 10.0 };
        let policy = SegmentPolicy::Adaptive(SteppingConfig::new(2.0, 0.01));

        let slices = policy.slices(&curve);

        // A straight curve within tolerance everywhere collapses to one step.
        assert_eq!(slices.len(), 1);
        assert!((slices[0].1 - 10.0).abs() < 0.001);
    }
}
