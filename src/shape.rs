//! Vehicle and object geometry.

use crate::error::InvalidInput;
use crate::math::{polygon_area, rot90, Point2d};
use crate::trajectory::PoseSample;
use smallvec::SmallVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// The number of vertices used to approximate a cylinder's footprint.
const CYLINDER_SEGMENTS: usize = 16;

/// The vertices of a footprint polygon.
pub type Vertices = SmallVec<[Point2d; CYLINDER_SEGMENTS]>;

/// The geometry of a vehicle relative to its reference point (the rear axle centre).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleShape {
    /// Distance from the reference point to the front of the vehicle in m.
    pub max_longitudinal_offset: f64,
    /// The vehicle width in m.
    pub width: f64,
    /// Distance from the reference point to the rear of the vehicle in m.
    pub rear_overhang: f64,
}

impl VehicleShape {
    /// Checks that the vehicle has a positive, finite extent.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        let length = self.max_longitudinal_offset + self.rear_overhang;
        let valid = [self.max_longitudinal_offset, self.width, self.rear_overhang]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && length > 0.0;
        if valid {
            Ok(())
        } else {
            Err(InvalidInput::InvalidDimensions)
        }
    }
}

/// The shape of a perceived object, in the object's own frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectShape {
    /// A footprint polygon relative to the object's pose, x forward and y left.
    Polygon(Vertices),
    /// A box centred on the object's pose.
    BoundingBox { length: f64, width: f64 },
    /// A cylinder centred on the object's pose.
    Cylinder { radius: f64 },
}

impl ObjectShape {
    /// Places the shape at a pose, producing its world-frame footprint.
    pub fn to_footprint(&self, pose: &PoseSample) -> Result<Vertices, InvalidInput> {
        let local: Vertices = match *self {
            Self::Polygon(ref vertices) => vertices.clone(),
            Self::BoundingBox { length, width } => {
                if !(length > 0.0 && width > 0.0 && length.is_finite() && width.is_finite()) {
                    return Err(InvalidInput::InvalidDimensions);
                }
                let (hl, hw) = (0.5 * length, 0.5 * width);
                [(hl, hw), (hl, -hw), (-hl, -hw), (-hl, hw)]
                    .into_iter()
                    .map(|(x, y)| Point2d::new(x, y))
                    .collect()
            }
            Self::Cylinder { radius } => {
                if !(radius > 0.0 && radius.is_finite()) {
                    return Err(InvalidInput::InvalidDimensions);
                }
                (0..CYLINDER_SEGMENTS)
                    .map(|i| TAU * i as f64 / CYLINDER_SEGMENTS as f64)
                    .map(|a| Point2d::new(radius * a.cos(), radius * a.sin()))
                    .collect()
            }
        };

        if local.len() < 3 || polygon_area(&local) <= 0.0 {
            return Err(InvalidInput::DegenerateFootprint);
        }

        let origin = pose.position_2d();
        let dir = pose.direction();
        let perp = rot90(dir);
        Ok(local
            .iter()
            .map(|p| origin + p.x * dir + p.y * perp)
            .collect())
    }
}

/// The geometry passed to the footprint builder.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeSpec {
    /// A vehicle described by its dimensions.
    Vehicle(VehicleShape),
    /// An object footprint already placed in world space.
    Object {
        /// The footprint vertices in world coordinates.
        footprint: Vertices,
        /// Whether the object is currently stationary.
        is_stationary: bool,
    },
}

impl ShapeSpec {
    /// Whether this is an object flagged as stationary. Vehicles never are.
    pub fn is_stationary(&self) -> bool {
        matches!(self, Self::Object { is_stationary: true, .. })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::polygon_area;
    use assert_approx_eq::assert_approx_eq;
    use smallvec::smallvec;
    use std::f64::consts::PI;

    #[test]
    fn bounding_box_footprint() {
        let pose = PoseSample::planar(0.0, 10.0, 5.0, PI / 2.0, 0.0);
        let shape = ObjectShape::BoundingBox {
            length: 4.0,
            width: 2.0,
        };
        let footprint = shape.to_footprint(&pose).unwrap();
        assert_eq!(footprint.len(), 4);
        // Front-left corner: 2 m ahead (+y), 1 m to the left (-x)
        assert_approx_eq!(footprint[0].x, 9.0);
        assert_approx_eq!(footprint[0].y, 7.0);
        assert_approx_eq!(polygon_area(&footprint), 8.0);
    }

    #[test]
    fn cylinder_footprint() {
        let pose = PoseSample::planar(0.0, -3.0, 1.0, 0.0, 0.0);
        let footprint = ObjectShape::Cylinder { radius: 2.0 }
            .to_footprint(&pose)
            .unwrap();
        assert_eq!(footprint.len(), CYLINDER_SEGMENTS);
        for p in &footprint {
            assert_approx_eq!(((p.x + 3.0).powi(2) + (p.y - 1.0).powi(2)).sqrt(), 2.0);
        }
    }

    #[test]
    fn polygon_footprint_follows_pose() {
        let pose = PoseSample::planar(0.0, 1.0, 2.0, PI, 0.0);
        let shape = ObjectShape::Polygon(smallvec![
            Point2d::new(1.0, 0.0),
            Point2d::new(0.0, 1.0),
            Point2d::new(-1.0, 0.0),
        ]);
        let footprint = shape.to_footprint(&pose).unwrap();
        assert_approx_eq!(footprint[0].x, 0.0);
        assert_approx_eq!(footprint[0].y, 2.0);
        assert_approx_eq!(footprint[1].x, 1.0);
        assert_approx_eq!(footprint[1].y, 1.0);
    }

    #[test]
    fn stationary_flag() {
        let object = |is_stationary| ShapeSpec::Object {
            footprint: Vertices::new(),
            is_stationary,
        };
        assert!(object(true).is_stationary());
        assert!(!object(false).is_stationary());
        let vehicle = VehicleShape {
            max_longitudinal_offset: 4.0,
            width: 2.0,
            rear_overhang: 1.0,
        };
        assert!(!ShapeSpec::Vehicle(vehicle).is_stationary());
    }

    #[test]
    fn degenerate_shapes() {
        let pose = PoseSample::planar(0.0, 0.0, 0.0, 0.0, 0.0);
        let line = ObjectShape::Polygon(smallvec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)]);
        assert_eq!(line.to_footprint(&pose), Err(InvalidInput::DegenerateFootprint));

        let flat = ObjectShape::BoundingBox {
            length: 4.0,
            width: 0.0,
        };
        assert_eq!(flat.to_footprint(&pose), Err(InvalidInput::InvalidDimensions));

        let vehicle = VehicleShape {
            max_longitudinal_offset: 4.0,
            width: -2.0,
            rear_overhang: 1.0,
        };
        assert_eq!(vehicle.validate(), Err(InvalidInput::InvalidDimensions));
    }
}
