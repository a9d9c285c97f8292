//! Checks an ego trajectory against the predicted trajectories of other objects.

use self::verdict::PairOutcome;
use crate::error::{EvaluationError, InvalidInput};
use crate::footprint::{extend, StoppedObjectPolicy};
use crate::math::{normalize_angle, project_local, rot90, Point2d};
use crate::rss::{minimum_gap, minimum_longitudinal_length, RssParams};
use crate::shape::{ObjectShape, ShapeSpec, VehicleShape};
use crate::trajectory::{interpolate_validated, validate_trajectory, PoseSample};
use crate::util::Interval;
use log::{debug, trace, warn};
use rayon::prelude::*;

pub use policy::{CheckConfig, CheckOptions, MarginPolicy};
pub use verdict::{Anomaly, Criterion, SafetyVerdict, ViolationRecord};

mod policy;
mod verdict;

/// The predicted motion of a perceived object.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTrajectory {
    /// The object's shape in its own frame.
    pub shape: ObjectShape,
    /// Whether the object is currently stationary.
    pub is_stationary: bool,
    /// The predicted poses, ordered by time.
    pub samples: Vec<PoseSample>,
}

/// Where an object lies along ego's direction of travel.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Alignment {
    /// Wholly ahead of ego's front edge, by `gap` m.
    Ahead { gap: f64 },
    /// Wholly behind ego's rear edge, by `gap` m.
    Behind { gap: f64 },
}

/// Inputs shared by every pair in one evaluation.
struct Context<'a, P> {
    ego: &'a [PoseSample],
    ego_shape: &'a VehicleShape,
    policy: &'a MarginPolicy<P>,
    rss: &'a RssParams,
    options: &'a CheckOptions,
}

/// Checks an ego trajectory against each object trajectory.
///
/// At every ego sample, each object's pose is interpolated to the same time.
/// An instant is unsafe if the two safety envelopes intersect, or if one agent
/// is directly ahead of the other by less than the RSS distance. Instants an
/// object's prediction does not cover are skipped, as are objects whose input
/// is invalid (these are reported as anomalies).
///
/// Fails only if the ego trajectory, ego shape or margin policy is invalid.
pub fn evaluate<P: StoppedObjectPolicy>(
    ego: &[PoseSample],
    objects: &[ObjectTrajectory],
    ego_shape: &VehicleShape,
    policy: &MarginPolicy<P>,
    rss: &RssParams,
    options: &CheckOptions,
) -> Result<SafetyVerdict, EvaluationError> {
    let ctx = Context::new(ego, ego_shape, policy, rss, options)?;
    let outcomes = objects
        .iter()
        .enumerate()
        .map(|(idx, object)| ctx.check_object(idx, object));
    Ok(SafetyVerdict::from_outcomes(outcomes))
}

/// As [evaluate], checking objects in parallel.
///
/// The verdict is identical to the one [evaluate] returns.
pub fn evaluate_par<P: StoppedObjectPolicy + Sync>(
    ego: &[PoseSample],
    objects: &[ObjectTrajectory],
    ego_shape: &VehicleShape,
    policy: &MarginPolicy<P>,
    rss: &RssParams,
    options: &CheckOptions,
) -> Result<SafetyVerdict, EvaluationError> {
    let ctx = Context::new(ego, ego_shape, policy, rss, options)?;
    let outcomes = objects
        .par_iter()
        .enumerate()
        .map(|(idx, object)| ctx.check_object(idx, object))
        .collect::<Vec<_>>();
    Ok(SafetyVerdict::from_outcomes(outcomes))
}

impl<'a, P: StoppedObjectPolicy> Context<'a, P> {
    fn new(
        ego: &'a [PoseSample],
        ego_shape: &'a VehicleShape,
        policy: &'a MarginPolicy<P>,
        rss: &'a RssParams,
        options: &'a CheckOptions,
    ) -> Result<Self, EvaluationError> {
        validate_trajectory(ego).map_err(EvaluationError::EgoTrajectory)?;
        ego_shape.validate().map_err(EvaluationError::EgoShape)?;
        policy.validate().map_err(EvaluationError::MarginPolicy)?;
        Ok(Self {
            ego,
            ego_shape,
            policy,
            rss,
            options,
        })
    }

    /// Checks every ego instant against one object.
    fn check_object(&self, idx: usize, object: &ObjectTrajectory) -> PairOutcome {
        let mut outcome = PairOutcome::default();

        if let Err(cause) = validate_trajectory(&object.samples) {
            warn!("Skipping object {}: {}", idx, cause);
            outcome.anomalies.push(Anomaly {
                object: idx,
                time: None,
                cause,
            });
            return outcome;
        }

        for ego_pose in self.ego {
            let Some(object_pose) = interpolate_validated(&object.samples, ego_pose.time) else {
                trace!("Object {} has no prediction at t = {}", idx, ego_pose.time);
                continue;
            };

            match self.check_instant(idx, ego_pose, &object_pose, object) {
                Ok(Some(violation)) => {
                    outcome.violations.push(violation);
                    if self.options.stop_at_first_violation() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(cause) => {
                    warn!("Skipping object {} at t = {}: {}", idx, ego_pose.time, cause);
                    outcome.anomalies.push(Anomaly {
                        object: idx,
                        time: Some(ego_pose.time),
                        cause,
                    });
                }
            }
        }

        debug!(
            "Object {}: {} violation(s), {} anomaly(ies)",
            idx,
            outcome.violations.len(),
            outcome.anomalies.len()
        );
        outcome
    }

    /// Checks a single time-aligned pair of poses.
    fn check_instant(
        &self,
        idx: usize,
        ego_pose: &PoseSample,
        object_pose: &PoseSample,
        object: &ObjectTrajectory,
    ) -> Result<Option<ViolationRecord>, InvalidInput> {
        let footprint = object.shape.to_footprint(object_pose)?;
        let object_shape = ShapeSpec::Object {
            footprint: footprint.clone(),
            is_stationary: object.is_stationary,
        };
        let is_stopped = object_shape.is_stationary();
        let ego_vel = self.options.ego_velocity(ego_pose.velocity);
        let margins = self.policy.margins(ego_vel, object_pose.velocity);
        let stopped = &self.policy.stopped;

        // Kinematic criterion
        let lat_margin = if is_stopped {
            stopped.adjust(margins).lat
        } else {
            margins.lat
        };
        let alignment = self.alignment(ego_pose, object_pose, &footprint, lat_margin);
        let distances = alignment.map(|alignment| {
            let (lead_vel, follow_vel, gap) = match alignment {
                Alignment::Ahead { gap } => (object_pose.velocity, ego_vel, gap),
                Alignment::Behind { gap } => (ego_vel, object_pose.velocity, gap),
            };
            let required = f64::max(
                minimum_gap(lead_vel, follow_vel, self.rss),
                minimum_longitudinal_length(lead_vel, follow_vel, self.rss),
            ) * self.options.hysteresis_factor();
            (required, gap)
        });
        let insufficient_gap = distances.map_or(false, |(required, gap)| gap < required);

        // Spatial criterion
        let ego_shape = ShapeSpec::Vehicle(*self.ego_shape);
        let ego_polygon = extend(ego_pose, &ego_shape, margins, is_stopped, stopped)?;
        let object_polygon = extend(object_pose, &object_shape, margins, is_stopped, stopped)?;
        let overlap = ego_polygon.intersects(&object_polygon);

        Ok(
            Criterion::from_checks(overlap, insufficient_gap).map(|criterion| ViolationRecord {
                object: idx,
                time: ego_pose.time,
                ego_polygon,
                object_polygon,
                rss_distance: distances.map(|(required, _)| required),
                gap: distances.map(|(_, gap)| gap),
                criterion,
            }),
        )
    }

    /// Determines whether the object is directly ahead of or behind ego.
    ///
    /// The object must head the same way as ego (within the yaw threshold) and
    /// overlap ego's width grown by `lat_margin`. Objects beside ego are not aligned.
    fn alignment(
        &self,
        ego_pose: &PoseSample,
        object_pose: &PoseSample,
        footprint: &[Point2d],
        lat_margin: f64,
    ) -> Option<Alignment> {
        let yaw_diff = normalize_angle(ego_pose.heading - object_pose.heading).0.abs();
        if yaw_diff > self.options.yaw_difference_threshold() {
            return None;
        }

        let origin = ego_pose.position_2d();
        let dir = ego_pose.direction();
        let perp = rot90(dir);
        let local = footprint
            .iter()
            .map(|p| project_local(*p, origin, dir, perp))
            .collect::<Vec<_>>();
        let lon = Interval::enclosing(local.iter().map(|p| p.x))?;
        let lat = Interval::enclosing(local.iter().map(|p| p.y))?;

        let half_width = 0.5 * self.ego_shape.width;
        let ego_lat = Interval::new(-half_width, half_width).expand(lat_margin);
        if !ego_lat.overlaps(&lat) {
            return None;
        }

        let ego_lon = Interval::new(
            -self.ego_shape.rear_overhang,
            self.ego_shape.max_longitudinal_offset,
        );
        if lon.min >= ego_lon.max {
            Some(Alignment::Ahead {
                gap: lon.min - ego_lon.max,
            })
        } else if lon.max <= ego_lon.min {
            Some(Alignment::Behind {
                gap: ego_lon.min - lon.max,
            })
        } else {
            None
        }
    }
}
