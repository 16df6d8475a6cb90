use nalgebra::{Rotation2, Vector2};

pub type Vec2 = Vector2<f32>;

/// r = v - 2 (v ⋅ n) n
pub fn reflected_vector(
    v: Vec2,
    surface_normal: Vec2,
) -> Vec2 {
    v - 2.0 * v.dot(&surface_normal) * surface_normal
}

/// angle of `v` against the x-axis in degrees (-180..=180)
pub fn heading_degrees(v: Vec2) -> f32 { v.y.atan2(v.x).to_degrees() }

/// `v` rotated by `angle` (radians)
pub fn rotate(
    v: Vec2,
    angle: f32,
) -> Vec2 {
    Rotation2::new(angle) * v
}

/// Unit vector from `from` to `to`; zero when both points coincide
pub fn direction(
    from: Vec2,
    to: Vec2,
) -> Vec2 {
    (to - from).try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros)
}

/// displacement from `from` towards `to`, at most `max_step` long, never overshooting the target
pub fn step_towards(
    from: Vec2,
    to: Vec2,
    max_step: f32,
) -> Vec2 {
    clamp_length(to - from, max_step)
}

pub fn clamp_length(
    v: Vec2,
    max_len: f32,
) -> Vec2 {
    let len = v.norm();
    if len > max_len {
        v * (max_len / len)
    } else {
        v
    }
}

/// Shortest distance from `from` to any of `others`.
/// `others` must not be empty.
pub fn min_distance<I>(
    from: Vec2,
    others: I,
) -> f32
where
    I: IntoIterator<Item = Vec2>,
{
    let min = others.into_iter().map(|p| (p - from).norm()).fold(None, |acc: Option<f32>, d| {
        Some(acc.map_or(d, |a| a.min(d)))
    });
    match min {
        Some(d) => d,
        None => panic!("minimum distance requires at least one position"),
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use rstest::rstest;

    use super::*;

    fn approx_eq(
        a: Vec2,
        b: Vec2,
    ) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_reflected_vector() {
        assert!(approx_eq(reflected_vector(Vec2::new(3.0, -2.0), Vec2::new(0.0, 1.0)), Vec2::new(3.0, 2.0)));
        assert!(approx_eq(reflected_vector(Vec2::new(-4.0, 1.0), Vec2::new(1.0, 0.0)), Vec2::new(4.0, 1.0)));
    }

    #[test]
    fn test_rotate() {
        assert!(approx_eq(rotate(Vec2::new(1.0, 0.0), FRAC_PI_2), Vec2::new(0.0, 1.0)));
        assert!(approx_eq(rotate(Vec2::new(2.0, 0.0), 0.0), Vec2::new(2.0, 0.0)));
    }

    #[rstest]
    #[case(Vec2::new(1.0, 0.0), 0.0)]
    #[case(Vec2::new(0.0, 1.0), 90.0)]
    #[case(Vec2::new(-1.0, 0.0), 180.0)]
    #[case(Vec2::new(0.0, -2.0), -90.0)]
    fn test_heading_degrees(
        #[case] v: Vec2,
        #[case] expected: f32,
    ) {
        assert!((heading_degrees(v) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_direction_of_coinciding_points() {
        assert_eq!(direction(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)), Vec2::zeros());
        assert!(approx_eq(direction(Vec2::new(0.0, 0.0), Vec2::new(0.0, 7.0)), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_step_towards_does_not_overshoot() {
        assert!(approx_eq(step_towards(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 3.0), Vec2::new(3.0, 0.0)));
        assert!(approx_eq(step_towards(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 3.0), Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_min_distance() {
        let others = vec![Vec2::new(3.0, 4.0), Vec2::new(0.0, 2.0), Vec2::new(-10.0, 0.0)];
        assert_eq!(min_distance(Vec2::zeros(), others), 2.0);
    }

    #[test]
    #[should_panic]
    fn test_min_distance_of_nothing() {
        min_distance(Vec2::zeros(), Vec::new());
    }
}
