use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

pub(in crate::app) fn closest_point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let segment = b - a;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return a;
    }

    let t = ((point - a).dot(segment) / length_sq).clamp(0.0, 1.0);
    a + segment * t
}

pub(in crate::app) fn point_to_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    (point - closest_point_on_segment(point, a, b)).length()
}

pub(in crate::app) fn golden_angle_direction(index: usize) -> Vec2 {
    let angle = ((index as f32) * 0.618_034 + 0.37) * TAU;
    vec2(angle.cos(), angle.sin())
}

pub(in crate::app) fn safe_direction(delta: Vec2, fallback_index: usize) -> Vec2 {
    let length = delta.length();
    if length > 0.0001 {
        delta / length
    } else {
        golden_angle_direction(fallback_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_projection_gives_perpendicular_distance() {
        let a = vec2(0.0, 0.0);
        let b = vec2(10.0, 0.0);
        let point = vec2(5.0, 3.0);

        assert_eq!(closest_point_on_segment(point, a, b), vec2(5.0, 0.0));
        assert!((point_to_segment_distance(point, a, b) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn projection_clamps_to_endpoints() {
        let a = vec2(0.0, 0.0);
        let b = vec2(10.0, 0.0);

        assert_eq!(closest_point_on_segment(vec2(-4.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(vec2(14.0, -3.0), a, b), b);
        assert!((point_to_segment_distance(vec2(-4.0, 3.0), a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_segment_falls_back_to_point_distance() {
        let a = vec2(2.0, 2.0);
        let distance = point_to_segment_distance(vec2(2.0, 6.0), a, a);
        assert!((distance - 4.0).abs() < 1e-5);
        assert!(distance.is_finite());
    }

    #[test]
    fn safe_direction_is_always_unit_and_finite() {
        for index in 0..8 {
            let direction = safe_direction(Vec2::ZERO, index);
            assert!((direction.length() - 1.0).abs() < 1e-4);
        }

        let direction = safe_direction(vec2(3.0, 4.0), 0);
        assert!((direction.x - 0.6).abs() < 1e-5);
        assert!((direction.y - 0.8).abs() < 1e-5);
    }
}
