use eframe::egui::Vec2;

use super::geom::{closest_point_on_segment, safe_direction};
use super::{SimEdge, SimNode, SimParams};

pub(super) fn link_attraction(
    positions: &[Vec2],
    edges: &[SimEdge],
    params: &SimParams,
    alpha: f32,
    impulses: &mut [Vec2],
) {
    let node_count = positions.len();
    for edge in edges {
        let (source, target) = edge.endpoints;
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let delta = positions[target] - positions[source];
        let distance = delta.length();
        let direction = safe_direction(delta, source + target);
        let pull = (distance - params.link_distance) * params.link_strength * alpha;

        impulses[source] += direction * (pull * 0.5);
        impulses[target] -= direction * (pull * 0.5);
    }
}

pub(super) fn many_body_repulsion(
    positions: &[Vec2],
    params: &SimParams,
    alpha: f32,
    impulses: &mut [Vec2],
) {
    let node_count = positions.len();
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = positions[i] - positions[j];
            let distance_sq = delta.length_sq();
            let direction = safe_direction(delta, i + j);
            let push = params.repulsion * alpha / (distance_sq + params.softening);

            impulses[i] += direction * push;
            impulses[j] -= direction * push;
        }
    }
}

pub(super) fn collision(positions: &[Vec2], params: &SimParams, impulses: &mut [Vec2]) {
    let min_distance = params.collide_radius * 2.0;
    if min_distance <= 0.0 {
        return;
    }

    let node_count = positions.len();
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = positions[i] - positions[j];
            let distance = delta.length();
            if distance >= min_distance {
                continue;
            }

            let direction = safe_direction(delta, i + j);
            let push = (min_distance - distance) * params.collide_strength;

            impulses[i] += direction * push;
            impulses[j] -= direction * push;
        }
    }
}

pub(super) fn gravity_wells(
    positions: &[Vec2],
    nodes: &[SimNode],
    params: &SimParams,
    alpha: f32,
    impulses: &mut [Vec2],
) {
    for (index, position) in positions.iter().enumerate() {
        let strength = if nodes[index].focal {
            params.focal_gravity
        } else {
            params.center_gravity
        };
        impulses[index] -= *position * (strength * alpha);
    }
}

pub(super) fn line_avoidance(
    positions: &[Vec2],
    edges: &[SimEdge],
    params: &SimParams,
    alpha: f32,
    impulses: &mut [Vec2],
) {
    if params.avoid_radius <= 0.0 {
        return;
    }

    let node_count = positions.len();
    for edge in edges {
        let (source, target) = edge.endpoints;
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let a = positions[source];
        let b = positions[target];
        for index in 0..node_count {
            if index == source || index == target {
                continue;
            }

            let closest = closest_point_on_segment(positions[index], a, b);
            let delta = positions[index] - closest;
            let distance = delta.length();
            if distance >= params.avoid_radius {
                continue;
            }

            let direction = safe_direction(delta, index);
            let push =
                (params.avoid_radius - distance) / params.avoid_radius * params.avoid_strength;
            impulses[index] += direction * (push * alpha);
        }
    }
}
