use crate::error::{ConfigError, InvalidInput};
use crate::footprint::{KeepMargins, Margins};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI};

/// How far the safety envelopes of ego and an object are grown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarginPolicy<P = KeepMargins> {
    /// The base longitudinal margin in m.
    pub lon_margin: f64,
    /// The lateral margin in m.
    pub lat_margin: f64,
    /// Additional longitudinal margin per m/s of speed difference, in s.
    pub closing_speed_gain: f64,
    /// The margin adjustment for stationary objects.
    pub stopped: P,
}

impl MarginPolicy {
    /// Creates a policy with fixed margins.
    pub fn new(lon_margin: f64, lat_margin: f64) -> Self {
        Self {
            lon_margin,
            lat_margin,
            closing_speed_gain: 0.0,
            stopped: KeepMargins,
        }
    }
}

impl<P> MarginPolicy<P> {
    /// Replaces the margin adjustment for stationary objects.
    pub fn with_stopped_policy<Q>(self, stopped: Q) -> MarginPolicy<Q> {
        MarginPolicy {
            lon_margin: self.lon_margin,
            lat_margin: self.lat_margin,
            closing_speed_gain: self.closing_speed_gain,
            stopped,
        }
    }

    /// Checks that the margins and gain are finite and non-negative.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        let gain = self.closing_speed_gain;
        if !(gain.is_finite() && gain >= 0.0) {
            return Err(InvalidInput::InvalidClosingSpeedGain(gain));
        }
        Margins::new(self.lon_margin, self.lat_margin).validate()
    }

    /// The margins to apply when ego and the object travel at the given speeds.
    pub fn margins(&self, ego_vel: f64, object_vel: f64) -> Margins {
        let closing = (ego_vel - object_vel).abs();
        Margins {
            lon: self.lon_margin + self.closing_speed_gain * closing,
            lat: self.lat_margin,
        }
    }
}

/// Unvalidated evaluation options.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CheckConfig {
    /// Scales the required longitudinal distance; at least 1.
    pub hysteresis_factor: f64,
    /// Objects whose heading differs from ego's by more than this (in rad)
    /// are never treated as leading or following ego.
    pub yaw_difference_threshold: f64,
    /// Caps the ego speed used by the RSS model, in m/s.
    pub max_ego_velocity: Option<f64>,
    /// Stop checking an object after its first violation.
    pub stop_at_first_violation: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            hysteresis_factor: 1.0,
            yaw_difference_threshold: FRAC_PI_4,
            max_ego_velocity: None,
            stop_at_first_violation: false,
        }
    }
}

/// Validated evaluation options.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "CheckConfig", into = "CheckConfig")
)]
pub struct CheckOptions {
    config: CheckConfig,
}

impl CheckOptions {
    /// Validates a configuration.
    pub fn new(config: CheckConfig) -> Result<Self, ConfigError> {
        let hysteresis = config.hysteresis_factor;
        if !(hysteresis.is_finite() && hysteresis >= 1.0) {
            return Err(ConfigError::InvalidHysteresis(hysteresis));
        }
        let yaw = config.yaw_difference_threshold;
        if !(0.0..=PI).contains(&yaw) {
            return Err(ConfigError::InvalidYawThreshold(yaw));
        }
        if let Some(value) = config.max_ego_velocity {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeOrNonFinite {
                    name: "max ego velocity",
                    value,
                });
            }
        }
        Ok(Self { config })
    }

    /// The factor the required longitudinal distance is scaled by.
    pub fn hysteresis_factor(&self) -> f64 {
        self.config.hysteresis_factor
    }

    /// The largest heading difference, in rad, at which an object can lead or follow ego.
    pub fn yaw_difference_threshold(&self) -> f64 {
        self.config.yaw_difference_threshold
    }

    /// The cap on the ego speed used by the RSS model, in m/s.
    pub fn max_ego_velocity(&self) -> Option<f64> {
        self.config.max_ego_velocity
    }

    /// Whether checking an object stops after its first violation.
    pub fn stop_at_first_violation(&self) -> bool {
        self.config.stop_at_first_violation
    }

    /// Applies the ego speed cap.
    pub(crate) fn ego_velocity(&self, velocity: f64) -> f64 {
        match self.config.max_ego_velocity {
            Some(max) => f64::min(velocity, max),
            None => velocity,
        }
    }
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            config: CheckConfig::default(),
        }
    }
}

impl TryFrom<CheckConfig> for CheckOptions {
    type Error = ConfigError;

    fn try_from(config: CheckConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<CheckOptions> for CheckConfig {
    fn from(options: CheckOptions) -> Self {
        options.config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn margins_grow_with_speed_difference() {
        let policy = MarginPolicy {
            closing_speed_gain: 0.5,
            ..MarginPolicy::new(2.0, 1.0)
        };
        assert_eq!(policy.margins(10.0, 6.0), Margins::new(4.0, 1.0));
        assert_eq!(policy.margins(6.0, 10.0), Margins::new(4.0, 1.0));
        assert_eq!(MarginPolicy::new(2.0, 1.0).margins(30.0, 0.0), Margins::new(2.0, 1.0));
    }

    #[test]
    fn invalid_policy() {
        assert!(MarginPolicy::new(-1.0, 0.0).validate().is_err());
        assert!(MarginPolicy::new(1.0, f64::NAN).validate().is_err());
        let policy = MarginPolicy {
            closing_speed_gain: -0.1,
            ..MarginPolicy::new(1.0, 1.0)
        };
        assert!(policy.validate().is_err());
        assert!(MarginPolicy::new(0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn invalid_options() {
        let config = CheckConfig {
            hysteresis_factor: 0.5,
            ..Default::default()
        };
        assert_eq!(CheckOptions::new(config), Err(ConfigError::InvalidHysteresis(0.5)));

        let config = CheckConfig {
            yaw_difference_threshold: 4.0,
            ..Default::default()
        };
        assert_eq!(CheckOptions::new(config), Err(ConfigError::InvalidYawThreshold(4.0)));

        let config = CheckConfig {
            max_ego_velocity: Some(-3.0),
            ..Default::default()
        };
        assert!(CheckOptions::new(config).is_err());
        assert_eq!(CheckOptions::new(CheckConfig::default()), Ok(CheckOptions::default()));
    }

    #[test]
    fn ego_velocity_cap() {
        let options = CheckOptions::new(CheckConfig {
            max_ego_velocity: Some(10.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(options.ego_velocity(15.0), 10.0);
        assert_eq!(options.ego_velocity(5.0), 5.0);
        assert_eq!(CheckOptions::default().ego_velocity(15.0), 15.0);
    }
}
