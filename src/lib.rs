//! Safety checking of planned ego trajectories against the predicted
//! trajectories of surrounding traffic.

pub use cgmath;
pub use error::{ConfigError, EvaluationError, InvalidInput};
pub use footprint::{extend, ExtendedPolygon, KeepMargins, Margins, StoppedObjectPolicy};
pub use rss::{
    minimum_gap, minimum_longitudinal_length, RssConfig, RssParams, MIN_DECELERATION,
};
pub use safety::{
    evaluate, evaluate_par, Anomaly, CheckConfig, CheckOptions, Criterion, MarginPolicy,
    ObjectTrajectory, SafetyVerdict, ViolationRecord,
};
pub use shape::{ObjectShape, ShapeSpec, VehicleShape, Vertices};
pub use trajectory::{interpolate, time_horizon, validate_trajectory, PoseSample};
pub use util::Interval;

#[cfg(feature = "debug")]
pub mod debug;
mod error;
mod footprint;
pub mod math;
mod rss;
mod safety;
mod shape;
mod trajectory;
mod util;
