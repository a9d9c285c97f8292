//! End-to-end checks of ego trajectories against predicted traffic.

use assert_approx_eq::assert_approx_eq;
use path_safety::{
    evaluate, evaluate_par, extend, interpolate, minimum_gap, CheckConfig, CheckOptions,
    Criterion, KeepMargins, MarginPolicy, Margins, ObjectShape, ObjectTrajectory, PoseSample,
    RssConfig, RssParams, ShapeSpec, VehicleShape,
};
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn ego_shape() -> VehicleShape {
    VehicleShape {
        max_longitudinal_offset: 3.8,
        width: 1.9,
        rear_overhang: 1.0,
    }
}

fn rss() -> RssParams {
    RssParams::new(RssConfig {
        reaction_time: 1.0,
        safety_time_margin: 1.0,
        min_threshold: 3.0,
        longitudinal_velocity_delta_time: 0.0,
        lead_deceleration: -2.0,
        follow_deceleration: -1.0,
    })
    .unwrap()
}

/// Samples a constant-velocity path every 0.5 s for 4 s.
fn constant_velocity(x: f64, y: f64, heading: f64, vel: f64) -> Vec<PoseSample> {
    (0..=8)
        .map(|i| {
            let t = 0.5 * i as f64;
            let d = vel * t;
            PoseSample::planar(t, x + d * heading.cos(), y + d * heading.sin(), heading, vel)
        })
        .collect()
}

fn car(samples: Vec<PoseSample>) -> ObjectTrajectory {
    ObjectTrajectory {
        shape: ObjectShape::BoundingBox {
            length: 4.5,
            width: 1.8,
        },
        is_stationary: false,
        samples,
    }
}

/// Test the worked examples for each building block.
#[test]
fn worked_examples() {
    let path = vec![
        PoseSample::planar(0.0, 0.0, 0.0, 0.0, 1.0),
        PoseSample::planar(1.0, 1.0, 0.0, 0.0, 2.0),
        PoseSample::planar(2.0, 2.0, 0.0, 0.0, 3.0),
    ];
    let mid = interpolate(&path, 0.5).unwrap();
    assert_approx_eq!(mid.position.x, 0.5);
    assert_approx_eq!(mid.velocity, 1.5);
    assert!(interpolate(&path, -1.0).is_none());
    assert!(interpolate(&path, 3.0).is_none());
    assert!(interpolate(&[], 1.0).is_none());

    let vehicle = ShapeSpec::Vehicle(VehicleShape {
        max_longitudinal_offset: 4.0,
        width: 2.0,
        rear_overhang: 1.0,
    });
    let pose = PoseSample::planar(0.0, 0.0, 0.0, PI / 3.0, 0.0);
    let polygon = extend(&pose, &vehicle, Margins::new(10.0, 2.0), false, &KeepMargins).unwrap();
    assert_approx_eq!(polygon.ring()[0].x, 7.0 - 1.5 * 3f64.sqrt());
    assert_approx_eq!(polygon.ring()[0].y, 7.0 * 3f64.sqrt() + 1.5);

    assert_approx_eq!(minimum_gap(5.0, 10.0, &rss()), 63.75);
}

/// Test that following at a comfortable distance on a straight road is safe.
#[test]
fn car_following() {
    let ego = constant_velocity(0.0, 0.0, 0.0, 10.0);
    let objects = [
        // Leader 80 m ahead, same speed
        car(constant_velocity(80.0, 0.0, 0.0, 10.0)),
        // Oncoming traffic in the next lane
        car(constant_velocity(150.0, 3.5, PI, 10.0)),
    ];
    let verdict = evaluate(
        &ego,
        &objects,
        &ego_shape(),
        &MarginPolicy::new(2.0, 0.5),
        &rss(),
        &CheckOptions::default(),
    )
    .unwrap();
    assert!(verdict.is_safe(), "{:?}", verdict.violations());
}

/// Test that a cut-in close ahead of ego is rejected on the kinematic criterion.
#[test]
fn cut_in() {
    let ego = constant_velocity(0.0, 0.0, 0.0, 15.0);
    let objects = [car(constant_velocity(15.0, 0.0, 0.0, 10.0))];
    let verdict = evaluate(
        &ego,
        &objects,
        &ego_shape(),
        &MarginPolicy::new(1.0, 0.3),
        &rss(),
        &CheckOptions::default(),
    )
    .unwrap();

    assert!(!verdict.is_safe());
    let first = &verdict.violations()[0];
    assert_eq!(first.time, 0.0);
    assert!(matches!(
        first.criterion,
        Criterion::InsufficientGap | Criterion::OverlapAndInsufficientGap
    ));
    assert!(first.gap.unwrap() < first.rss_distance.unwrap());
}

/// Test that a larger hysteresis factor only ever adds violations.
#[test]
fn hysteresis() {
    let ego = constant_velocity(0.0, 0.0, 0.0, 10.0);
    // Faster leader pulling away
    let objects = [car(constant_velocity(18.0, 0.0, 0.0, 13.0))];
    let policy = MarginPolicy::new(0.0, 0.0);
    let check = |hysteresis_factor| {
        let options = CheckOptions::new(CheckConfig {
            hysteresis_factor,
            ..Default::default()
        })
        .unwrap();
        evaluate(&ego, &objects, &ego_shape(), &policy, &rss(), &options).unwrap()
    };
    let base = check(1.0);
    let strict = check(2.0);
    assert!(strict.violations().len() >= base.violations().len());
    assert!(!strict.is_safe());
}

/// Test that repeated and parallel evaluation give identical verdicts.
#[test]
fn deterministic() {
    let mut rng = rand::rngs::StdRng::from_seed(*b"Same inputs give the same answer");
    let ego = constant_velocity(0.0, 0.0, 0.0, 8.0);
    let objects = (0..24)
        .map(|_| {
            let shape = match rng.gen_range(0..3) {
                0 => ObjectShape::BoundingBox {
                    length: rng.gen_range(1.0..6.0),
                    width: rng.gen_range(0.5..2.5),
                },
                1 => ObjectShape::Cylinder {
                    radius: rng.gen_range(0.3..1.0),
                },
                _ => ObjectShape::Polygon(
                    [(2.0, 0.0), (0.0, -1.0), (-2.0, -0.5), (-2.0, 0.5), (0.0, 1.0)]
                        .into_iter()
                        .map(|(x, y)| path_safety::math::Point2d::new(x, y))
                        .collect(),
                ),
            };
            let mut samples = constant_velocity(
                rng.gen_range(-20.0..60.0),
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-PI..PI),
                rng.gen_range(0.0..15.0),
            );
            // Some predictions start late or end early
            let skip = rng.gen_range(0..3);
            samples.drain(..skip);
            samples.truncate(samples.len() - rng.gen_range(0..3));
            ObjectTrajectory {
                shape,
                is_stationary: rng.gen_bool(0.2),
                samples,
            }
        })
        .collect::<Vec<_>>();

    let policy = MarginPolicy {
        closing_speed_gain: 0.2,
        ..MarginPolicy::new(1.0, 0.5)
    };
    let options = CheckOptions::default();
    let run = || evaluate(&ego, &objects, &ego_shape(), &policy, &rss(), &options).unwrap();

    let first = run();
    assert_eq!(first, run());
    let par = evaluate_par(&ego, &objects, &ego_shape(), &policy, &rss(), &options).unwrap();
    assert_eq!(first, par);

    let order = first
        .violations()
        .iter()
        .map(|v| (v.object, v.time))
        .collect::<Vec<_>>();
    assert!(order.windows(2).all(|w| w[0] <= w[1]));
}
