//! Time-stamped poses and interpolation between them.

use crate::error::InvalidInput;
use crate::math::{heading_vector, lerp_heading, Point2d, Point3d, Vector2d};
use crate::util::Interval;
use cgmath::Rad;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The pose and speed of an agent at an instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseSample {
    /// The time of the sample in s, relative to the start of the planning cycle.
    pub time: f64,
    /// The position of the agent's reference point in world space.
    pub position: Point3d,
    /// The agent's heading, counter-clockwise from the world x-axis.
    pub heading: Rad<f64>,
    /// The agent's speed in m/s.
    pub velocity: f64,
}

impl PoseSample {
    /// Creates a new pose sample.
    pub fn new(time: f64, position: Point3d, heading: Rad<f64>, velocity: f64) -> Self {
        Self {
            time,
            position,
            heading,
            velocity,
        }
    }

    /// Creates a pose sample on the ground plane.
    pub fn planar(time: f64, x: f64, y: f64, heading: f64, velocity: f64) -> Self {
        Self::new(time, Point3d::new(x, y, 0.0), Rad(heading), velocity)
    }

    /// The position projected onto the ground plane.
    pub fn position_2d(&self) -> Point2d {
        Point2d::new(self.position.x, self.position.y)
    }

    /// A unit vector in world space aligned with the heading.
    pub fn direction(&self) -> Vector2d {
        heading_vector(self.heading)
    }

    fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.position.z.is_finite()
            && self.heading.0.is_finite()
            && self.velocity.is_finite()
    }
}

/// Checks that a trajectory is non-empty, finite and ordered by non-decreasing time.
pub fn validate_trajectory(samples: &[PoseSample]) -> Result<(), InvalidInput> {
    if samples.is_empty() {
        return Err(InvalidInput::EmptyTrajectory);
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(InvalidInput::NonFiniteSample { index });
    }
    match samples
        .iter()
        .tuple_windows()
        .position(|(a, b)| b.time < a.time)
    {
        Some(i) => Err(InvalidInput::NonMonotonicTime {
            index: i + 1,
            previous: samples[i].time,
            current: samples[i + 1].time,
        }),
        None => Ok(()),
    }
}

/// The span of time covered by a trajectory.
pub fn time_horizon(samples: &[PoseSample]) -> Option<Interval<f64>> {
    Some(Interval::new(samples.first()?.time, samples.last()?.time))
}

/// Resolves the pose at `time` by interpolating between the bracketing samples.
///
/// Returns `None` if the trajectory is empty or invalid (see [validate_trajectory]),
/// or if `time` lies outside the span of the trajectory. A query that exactly
/// matches a sample's time returns that sample unchanged.
pub fn interpolate(samples: &[PoseSample], time: f64) -> Option<PoseSample> {
    validate_trajectory(samples).ok()?;
    interpolate_validated(samples, time)
}

/// As [interpolate], for a trajectory which has already passed validation.
pub(crate) fn interpolate_validated(samples: &[PoseSample], time: f64) -> Option<PoseSample> {
    if !time.is_finite() || !time_horizon(samples)?.contains(time) {
        return None;
    }

    let idx = samples.partition_point(|s| s.time < time);
    let next = samples.get(idx)?;
    if next.time == time {
        return Some(*next);
    }
    let prev = samples.get(idx.checked_sub(1)?)?;

    let span = Interval::new(prev.time, next.time);
    if span.length() <= f64::EPSILON {
        return None;
    }
    let f = span.inv_lerp(time);

    let sample = PoseSample {
        time,
        position: prev.position + (next.position - prev.position) * f,
        heading: lerp_heading(prev.heading, next.heading, f),
        velocity: prev.velocity + (next.velocity - prev.velocity) * f,
    };
    sample.is_finite().then_some(sample)
}
