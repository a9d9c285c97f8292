//! Responsibility-Sensitive Safety (RSS) longitudinal distance model.

use crate::error::ConfigError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The smallest deceleration magnitude accepted, in m/s<sup>2</sup>.
pub const MIN_DECELERATION: f64 = 1e-3;

/// Unvalidated RSS parameters, as read from planner configuration.
///
/// Decelerations may be given with either sign; only their magnitude is used.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RssConfig {
    /// The time taken by the following agent to begin braking, in s.
    pub reaction_time: f64,
    /// Additional time the following agent travels before braking, in s.
    pub safety_time_margin: f64,
    /// The smallest distance ever considered safe, in m.
    pub min_threshold: f64,
    /// Required distance per m/s of the faster agent's speed, in s.
    #[cfg_attr(feature = "serde", serde(default))]
    pub longitudinal_velocity_delta_time: f64,
    /// The leading agent's braking capability, in m/s<sup>2</sup>.
    pub lead_deceleration: f64,
    /// The following agent's braking capability, in m/s<sup>2</sup>.
    pub follow_deceleration: f64,
}

/// Validated RSS parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RssConfig", into = "RssConfig")
)]
pub struct RssParams {
    reaction_time: f64,
    safety_time_margin: f64,
    min_threshold: f64,
    longitudinal_velocity_delta_time: f64,
    lead_decel: f64,
    follow_decel: f64,
}

impl RssParams {
    /// Validates a configuration.
    ///
    /// Fails if either deceleration magnitude is below [MIN_DECELERATION] or
    /// non-finite, or if any time or distance is negative or non-finite.
    pub fn new(config: RssConfig) -> Result<Self, ConfigError> {
        let non_negative = |name: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(ConfigError::NegativeOrNonFinite { name, value })
            }
        };
        let deceleration = |name: &'static str, value: f64| {
            if value.is_finite() && value.abs() >= MIN_DECELERATION {
                Ok(value.abs())
            } else {
                Err(ConfigError::InvalidDeceleration { name, value })
            }
        };

        Ok(Self {
            reaction_time: non_negative("reaction time", config.reaction_time)?,
            safety_time_margin: non_negative("safety time margin", config.safety_time_margin)?,
            min_threshold: non_negative("minimum threshold", config.min_threshold)?,
            longitudinal_velocity_delta_time: non_negative(
                "longitudinal velocity delta time",
                config.longitudinal_velocity_delta_time,
            )?,
            lead_decel: deceleration("lead", config.lead_deceleration)?,
            follow_decel: deceleration("follow", config.follow_deceleration)?,
        })
    }

    /// The time taken by the following agent to begin braking, in s.
    pub fn reaction_time(&self) -> f64 {
        self.reaction_time
    }

    /// Additional time the following agent travels before braking, in s.
    pub fn safety_time_margin(&self) -> f64 {
        self.safety_time_margin
    }

    /// The smallest distance ever considered safe, in m.
    pub fn min_threshold(&self) -> f64 {
        self.min_threshold
    }

    /// The magnitude of the leading agent's deceleration.
    pub fn lead_deceleration(&self) -> f64 {
        self.lead_decel
    }

    /// The magnitude of the following agent's deceleration.
    pub fn follow_deceleration(&self) -> f64 {
        self.follow_decel
    }
}

impl TryFrom<RssConfig> for RssParams {
    type Error = ConfigError;

    fn try_from(config: RssConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<RssParams> for RssConfig {
    fn from(params: RssParams) -> Self {
        Self {
            reaction_time: params.reaction_time,
            safety_time_margin: params.safety_time_margin,
            min_threshold: params.min_threshold,
            longitudinal_velocity_delta_time: params.longitudinal_velocity_delta_time,
            lead_deceleration: params.lead_decel,
            follow_deceleration: params.follow_decel,
        }
    }
}

/// Computes the minimum longitudinal gap the following agent must keep behind
/// the leading agent, in m.
///
/// The follower covers `follow_vel * (reaction_time + safety_time_margin)` before
/// it brakes, then its own braking distance; the leader's braking distance is
/// credited back. The result is never below `min_threshold`. A non-finite
/// result (from non-finite or overflowing speeds) is reported as an infinite
/// gap.
///
/// # Parameters
/// * `lead_vel` - The leading agent's speed in m/s
/// * `follow_vel` - The following agent's speed in m/s
pub fn minimum_gap(lead_vel: f64, follow_vel: f64, params: &RssParams) -> f64 {
    let reaction_dist = follow_vel * (params.reaction_time + params.safety_time_margin);
    let follow_braking_dist = follow_vel.powi(2) / (2.0 * params.follow_decel);
    let lead_braking_dist = lead_vel.powi(2) / (2.0 * params.lead_decel);
    let raw = reaction_dist + follow_braking_dist - lead_braking_dist;
    if !raw.is_finite() {
        return f64::INFINITY;
    }
    f64::max(raw, params.min_threshold)
}

/// The minimum gap implied by the faster agent's speed alone, in m.
pub fn minimum_longitudinal_length(lead_vel: f64, follow_vel: f64, params: &RssParams) -> f64 {
    let max_vel = f64::max(lead_vel.abs(), follow_vel.abs());
    let length = params.min_threshold + params.longitudinal_velocity_delta_time * max_vel;
    if length.is_nan() {
        f64::INFINITY
    } else {
        length
    }
}
