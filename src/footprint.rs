//! Safety envelopes: footprints grown by longitudinal and lateral margins.

use crate::error::InvalidInput;
use crate::math::{polygon_area, polygons_intersect, project_local, rot90, Point2d, Vector2d};
use crate::shape::{ShapeSpec, VehicleShape};
use crate::trajectory::PoseSample;
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distances by which a footprint is grown, in m.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Margins {
    /// Added to the front edge only.
    pub lon: f64,
    /// Added to each side.
    pub lat: f64,
}

impl Margins {
    /// Creates margins of `lon` m longitudinally and `lat` m laterally.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Checks that both margins are finite and non-negative.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        let valid = |m: f64| m.is_finite() && m >= 0.0;
        if valid(self.lon) && valid(self.lat) {
            Ok(())
        } else {
            Err(InvalidInput::InvalidMargins {
                lon: self.lon,
                lat: self.lat,
            })
        }
    }
}

/// Decides how margins apply to an object that is currently stationary.
///
/// Any `Fn(Margins) -> Margins` closure is a policy.
pub trait StoppedObjectPolicy {
    /// Adjusts the margins for a stationary object.
    fn adjust(&self, margins: Margins) -> Margins;
}

/// Applies margins to stationary objects exactly as to moving ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeepMargins;

impl StoppedObjectPolicy for KeepMargins {
    fn adjust(&self, margins: Margins) -> Margins {
        margins
    }
}

impl<F: Fn(Margins) -> Margins> StoppedObjectPolicy for F {
    fn adjust(&self, margins: Margins) -> Margins {
        self(margins)
    }
}

/// A rectangular safety envelope in world space.
///
/// The ring runs front-left, front-right, rear-right, rear-left (clockwise),
/// and repeats the first vertex to close.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtendedPolygon {
    ring: [Point2d; 5],
}

impl ExtendedPolygon {
    /// Builds an envelope from extents in a local frame.
    ///
    /// # Parameters
    /// * `origin` - The origin of the local frame in world space
    /// * `dir` - A unit vector along the local x-axis (forward)
    /// * `lon` - The longitudinal extent
    /// * `lat` - The lateral extent, positive to the left
    fn from_local(origin: Point2d, dir: Vector2d, lon: Interval<f64>, lat: Interval<f64>) -> Self {
        let perp = rot90(dir);
        let corner = |x: f64, y: f64| origin + x * dir + y * perp;
        let first = corner(lon.max, lat.max);
        Self {
            ring: [
                first,
                corner(lon.max, lat.min),
                corner(lon.min, lat.min),
                corner(lon.min, lat.max),
                first,
            ],
        }
    }

    /// The closed ring of vertices.
    pub fn ring(&self) -> &[Point2d; 5] {
        &self.ring
    }

    /// The four distinct corners.
    pub fn corners(&self) -> &[Point2d] {
        &self.ring[..4]
    }

    /// The enclosed area in m<sup>2</sup>.
    pub fn area(&self) -> f64 {
        polygon_area(&self.ring)
    }

    /// Returns true if this envelope touches or overlaps the other.
    pub fn intersects(&self, other: &Self) -> bool {
        polygons_intersect(&self.ring, &other.ring)
    }
}

/// Grows a footprint into a safety envelope.
///
/// Vehicles are extended forward by `margins.lon` from their front edge; the
/// rear edge stays at the rear overhang. Objects are measured along their own
/// heading, and likewise only their forward extent grows longitudinally. Both
/// sides grow by `margins.lat`. When `is_stopped` is set, `policy` adjusts the
/// margins first.
///
/// # Parameters
/// * `pose` - The pose of the vehicle or object
/// * `shape` - The vehicle dimensions or the object's world-space footprint
/// * `margins` - The longitudinal and lateral margins
/// * `is_stopped` - Whether the object of the pair is stationary; for an object
///   shape this is normally [ShapeSpec::is_stationary]
/// * `policy` - The margin adjustment for stationary objects
pub fn extend<P: StoppedObjectPolicy + ?Sized>(
    pose: &PoseSample,
    shape: &ShapeSpec,
    margins: Margins,
    is_stopped: bool,
    policy: &P,
) -> Result<ExtendedPolygon, InvalidInput> {
    margins.validate()?;
    let margins = if is_stopped {
        let adjusted = policy.adjust(margins);
        adjusted.validate()?;
        adjusted
    } else {
        margins
    };

    let origin = pose.position_2d();
    let dir = pose.direction();

    let polygon = match shape {
        ShapeSpec::Vehicle(vehicle) => extend_vehicle(origin, dir, vehicle, margins)?,
        ShapeSpec::Object { footprint, .. } => {
            let perp = rot90(dir);
            let local = footprint
                .iter()
                .map(|p| project_local(*p, origin, dir, perp))
                .collect::<Vec<_>>();
            let lon = Interval::enclosing(local.iter().map(|p| p.x))
                .ok_or(InvalidInput::DegenerateFootprint)?;
            let lat = Interval::enclosing(local.iter().map(|p| p.y))
                .ok_or(InvalidInput::DegenerateFootprint)?;
            let lon = Interval::new(lon.min, lon.max + margins.lon);
            ExtendedPolygon::from_local(origin, dir, lon, lat.expand(margins.lat))
        }
    };

    if polygon.area() > 0.0 {
        Ok(polygon)
    } else {
        Err(InvalidInput::DegenerateFootprint)
    }
}

fn extend_vehicle(
    origin: Point2d,
    dir: Vector2d,
    vehicle: &VehicleShape,
    margins: Margins,
) -> Result<ExtendedPolygon, InvalidInput> {
    vehicle.validate()?;
    let lon = Interval::new(
        -vehicle.rear_overhang,
        vehicle.max_longitudinal_offset + margins.lon,
    );
    let lat = Interval::new(-0.5 * vehicle.width, 0.5 * vehicle.width).expand(margins.lat);
    Ok(ExtendedPolygon::from_local(origin, dir, lon, lat))
}
