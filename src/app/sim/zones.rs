use std::collections::HashSet;

use eframe::egui::Vec2;

use super::geom::safe_direction;
use super::{SimParams, SimZone};

pub(super) fn zone_radius(member_count: usize, shares_members: bool, params: &SimParams) -> f32 {
    let radius = params.zone_base_radius + params.zone_member_spacing * (member_count as f32).sqrt();
    if shares_members {
        radius * params.zone_overlap_scale
    } else {
        radius
    }
}

pub(super) fn shared_zone_pairs(memberships: &[Vec<usize>]) -> HashSet<(usize, usize)> {
    let mut pairs = HashSet::new();
    for zones in memberships {
        for (slot, &first) in zones.iter().enumerate() {
            for &second in &zones[slot + 1..] {
                let key = if first < second {
                    (first, second)
                } else {
                    (second, first)
                };
                pairs.insert(key);
            }
        }
    }
    pairs
}

pub(super) fn containment(
    positions: &[Vec2],
    memberships: &[Vec<usize>],
    zones: &[SimZone],
    params: &SimParams,
    alpha: f32,
    impulses: &mut [Vec2],
) {
    for (index, position) in positions.iter().enumerate() {
        for (zone_index, zone) in zones.iter().enumerate() {
            let delta = *position - zone.center;
            let distance = delta.length();

            if memberships[index].contains(&zone_index) {
                impulses[index] -= delta * (params.zone_pull * alpha);

                let boundary = (zone.radius - params.zone_boundary_margin)
                    .max(params.zone_core_radius + 1.0);
                if distance > boundary {
                    let direction = safe_direction(delta, index);
                    impulses[index] -=
                        direction * ((distance - boundary) * params.zone_boundary_strength);
                } else if distance < params.zone_core_radius {
                    let direction = safe_direction(delta, index);
                    impulses[index] +=
                        direction * ((params.zone_core_radius - distance) * params.zone_core_strength);
                }
            } else {
                let exclusion = zone.radius + params.zone_boundary_margin;
                if distance < exclusion {
                    let direction = safe_direction(delta, index);
                    impulses[index] +=
                        direction * ((exclusion - distance) * params.zone_exclude_strength);
                }
            }
        }
    }
}

pub(super) fn update_centers(
    zones: &mut [SimZone],
    positions: &[Vec2],
    memberships: &[Vec<usize>],
    shared_pairs: &HashSet<(usize, usize)>,
    params: &SimParams,
    alpha: f32,
) {
    for (zone_index, zone) in zones.iter_mut().enumerate() {
        zone.radius = zone_radius(zone.member_count, zone.shares_members, params);
        if zone.dragged || zone.member_count == 0 {
            continue;
        }

        let mut centroid = Vec2::ZERO;
        let mut count = 0usize;
        for (index, zone_refs) in memberships.iter().enumerate() {
            if zone_refs.contains(&zone_index) {
                centroid += positions[index];
                count += 1;
            }
        }
        if count > 0 {
            centroid /= count as f32;
            let step = (centroid - zone.center) * (params.zone_centroid_tracking * alpha);
            if step.is_finite() {
                zone.center += step;
            }
        }
    }

    let zone_count = zones.len();
    for i in 0..zone_count {
        for j in (i + 1)..zone_count {
            let delta = zones[i].center - zones[j].center;
            let distance = delta.length();
            let direction = safe_direction(delta, i + j);

            let correction = if shared_pairs.contains(&(i, j)) {
                let target = params.zone_overlap_target * (zones[i].radius + zones[j].radius);
                (target - distance) * params.zone_separation_strength
            } else {
                let min_separation =
                    zones[i].radius + zones[j].radius + params.zone_separation_buffer;
                if distance >= min_separation {
                    continue;
                }
                (min_separation - distance) * params.zone_separation_strength
            };

            let shift = direction * correction;
            if !shift.is_finite() {
                continue;
            }

            match (zones[i].dragged, zones[j].dragged) {
                (false, false) => {
                    zones[i].center += shift * 0.5;
                    zones[j].center -= shift * 0.5;
                }
                (true, false) => zones[j].center -= shift,
                (false, true) => zones[i].center += shift,
                (true, true) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    fn zone(id: usize, center: Vec2, member_count: usize, shares: bool) -> SimZone {
        SimZone {
            id: format!("zone-{id}"),
            name: String::new(),
            color: String::new(),
            icon: None,
            center,
            radius: 0.0,
            member_count,
            shares_members: shares,
            dragged: false,
        }
    }

    #[test]
    fn radius_is_monotonic_in_member_count() {
        let params = SimParams::default();
        let mut previous = 0.0;
        for count in 0..12 {
            let radius = zone_radius(count, false, &params);
            assert!(radius > previous);
            previous = radius;
        }
        assert!(zone_radius(4, true, &params) > zone_radius(4, false, &params));
    }

    #[test]
    fn shared_pairs_come_from_multi_membership() {
        let memberships = vec![vec![0], vec![0, 1], vec![1], vec![]];
        let pairs = shared_zone_pairs(&memberships);
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn disjoint_zones_separate_past_buffer() {
        let params = SimParams::default();
        let mut zones = vec![
            zone(0, vec2(-10.0, 0.0), 3, false),
            zone(1, vec2(10.0, 0.0), 3, false),
        ];
        let memberships: Vec<Vec<usize>> = Vec::new();
        let shared = HashSet::new();

        for _ in 0..600 {
            update_centers(&mut zones, &[], &memberships, &shared, &params, 0.3);
        }

        let distance = (zones[0].center - zones[1].center).length();
        let required = zones[0].radius + zones[1].radius + params.zone_separation_buffer;
        assert!(
            distance >= required - 1.0,
            "distance {distance} should reach {required}"
        );
    }

    #[test]
    fn overlapping_zones_settle_at_target_distance() {
        let params = SimParams::default();
        let mut zones = vec![
            zone(0, vec2(-400.0, 0.0), 4, true),
            zone(1, vec2(400.0, 0.0), 4, true),
        ];
        let memberships: Vec<Vec<usize>> = Vec::new();
        let mut shared = HashSet::new();
        shared.insert((0usize, 1usize));

        for _ in 0..600 {
            update_centers(&mut zones, &[], &memberships, &shared, &params, 0.3);
        }

        let distance = (zones[0].center - zones[1].center).length();
        let target = params.zone_overlap_target * (zones[0].radius + zones[1].radius);
        assert!(
            (distance - target).abs() <= target * 0.05,
            "distance {distance} should settle near {target}"
        );
    }

    #[test]
    fn coincident_zone_centers_still_separate() {
        let params = SimParams::default();
        let mut zones = vec![
            zone(0, Vec2::ZERO, 2, false),
            zone(1, Vec2::ZERO, 2, false),
        ];
        let shared = HashSet::new();

        for _ in 0..600 {
            update_centers(&mut zones, &[], &[], &shared, &params, 0.3);
        }

        let distance = (zones[0].center - zones[1].center).length();
        assert!(distance.is_finite());
        assert!(distance > zones[0].radius);
    }

    #[test]
    fn dragged_zone_center_is_not_moved_by_separation() {
        let params = SimParams::default();
        let mut zones = vec![
            zone(0, Vec2::ZERO, 2, false),
            zone(1, vec2(5.0, 0.0), 2, false),
        ];
        zones[0].dragged = true;
        let pinned = zones[0].center;
        let shared = HashSet::new();

        for _ in 0..50 {
            update_centers(&mut zones, &[], &[], &shared, &params, 0.3);
        }

        assert_eq!(zones[0].center, pinned);
        assert!((zones[1].center - pinned).length() > 5.0);
    }

    #[test]
    fn member_containment_pushes_stray_node_back_inside() {
        let params = SimParams::default();
        let mut zones = vec![zone(0, Vec2::ZERO, 1, false)];
        zones[0].radius = zone_radius(1, false, &params);

        let outside = vec2(zones[0].radius + 80.0, 0.0);
        let positions = vec![outside];
        let memberships = vec![vec![0usize]];
        let mut impulses = vec![Vec2::ZERO];

        containment(&positions, &memberships, &zones, &params, 0.3, &mut impulses);

        assert!(impulses[0].x < 0.0, "stray member should be pushed back toward center");
    }

    #[test]
    fn non_member_inside_zone_is_pushed_out() {
        let params = SimParams::default();
        let mut zones = vec![zone(0, Vec2::ZERO, 3, false)];
        zones[0].radius = zone_radius(3, false, &params);

        let positions = vec![vec2(10.0, 0.0)];
        let memberships = vec![Vec::new()];
        let mut impulses = vec![Vec2::ZERO];

        containment(&positions, &memberships, &zones, &params, 0.3, &mut impulses);

        assert!(impulses[0].x > 0.0, "intruder should be pushed outward");
        assert!(impulses[0].is_finite());
    }

    #[test]
    fn dead_center_member_is_pushed_off_the_icon_core() {
        let params = SimParams::default();
        let mut zones = vec![zone(0, Vec2::ZERO, 1, false)];
        zones[0].radius = zone_radius(1, false, &params);

        let positions = vec![Vec2::ZERO];
        let memberships = vec![vec![0usize]];
        let mut impulses = vec![Vec2::ZERO];

        containment(&positions, &memberships, &zones, &params, 0.3, &mut impulses);

        assert!(impulses[0].length() > 0.0);
        assert!(impulses[0].is_finite());
    }
}
