use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::Simulation;

pub(in crate::app) struct FrameNode {
    pub display_pos: Vec2,
    pub focal: bool,
}

pub(in crate::app) struct FrameLink {
    pub source: usize,
    pub target: usize,
    pub fan: f32,
    pub directional: bool,
}

pub(in crate::app) struct FrameZone {
    pub center: Vec2,
    pub radius: f32,
}

pub(in crate::app) struct FrameSnapshot {
    pub nodes: Vec<FrameNode>,
    pub links: Vec<FrameLink>,
    pub zones: Vec<FrameZone>,
}

fn drift_offset(phase: (f32, f32), time: f64, strength: f32) -> Vec2 {
    let t = (time % (TAU as f64 * 1000.0)) as f32;
    vec2(
        (t * 0.9 + phase.0 * TAU).sin(),
        (t * 0.7 + phase.1 * TAU).cos(),
    ) * strength
}

impl Simulation {
    pub(in crate::app) fn frame(&self, time: f64) -> FrameSnapshot {
        let drift_strength = if self.params.drift_enabled {
            self.params.drift_strength
        } else {
            0.0
        };

        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let offset = if drift_strength > 0.0 {
                    drift_offset(node.drift_phase, time, drift_strength)
                } else {
                    Vec2::ZERO
                };
                FrameNode {
                    display_pos: node.pos + offset,
                    focal: node.focal,
                }
            })
            .collect();

        let links = self
            .edges
            .iter()
            .map(|edge| FrameLink {
                source: edge.endpoints.0,
                target: edge.endpoints.1,
                fan: edge.fan,
                directional: edge.directional,
            })
            .collect();

        let zones = self
            .zones
            .iter()
            .map(|zone| FrameZone {
                center: zone.center,
                radius: zone.radius,
            })
            .collect();

        FrameSnapshot { nodes, links, zones }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{GraphDocument, NodeRecord};
    use crate::app::sim::SimParams;

    fn sim_with_two_nodes() -> Simulation {
        let mut doc = GraphDocument::default();
        for id in ["A", "B"] {
            doc.nodes.push(NodeRecord {
                id: id.to_string(),
                x: Some(0.0),
                y: Some(0.0),
                ..NodeRecord::default()
            });
        }

        let mut sim = Simulation::new(SimParams::default());
        sim.reconcile(&doc);
        sim
    }

    #[test]
    fn drift_is_bounded_by_strength_and_never_mutates_physics() {
        let sim = sim_with_two_nodes();
        let strength = sim.params().drift_strength;
        let physical: Vec<Vec2> = sim.nodes().iter().map(|node| node.pos).collect();

        for step in 0..50 {
            let snapshot = sim.frame(step as f64 * 0.016);
            for (index, frame_node) in snapshot.nodes.iter().enumerate() {
                let offset = frame_node.display_pos - physical[index];
                assert!(offset.x.abs() <= strength + 1e-4);
                assert!(offset.y.abs() <= strength + 1e-4);
            }
        }

        let after: Vec<Vec2> = sim.nodes().iter().map(|node| node.pos).collect();
        assert_eq!(physical, after);
    }

    #[test]
    fn drift_is_deterministic_per_node_and_time() {
        let sim = sim_with_two_nodes();

        let first = sim.frame(3.5);
        let second = sim.frame(3.5);
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(a.display_pos, b.display_pos);
        }

        assert_ne!(
            first.nodes[0].display_pos - sim.nodes()[0].pos,
            first.nodes[1].display_pos - sim.nodes()[1].pos,
            "distinct ids should carry distinct drift phases"
        );
    }

    #[test]
    fn disabling_drift_snaps_display_to_physical_positions() {
        let mut sim = sim_with_two_nodes();
        let mut params = *sim.params();
        params.drift_enabled = false;
        sim.set_params(params);

        let snapshot = sim.frame(11.2);
        for (frame_node, node) in snapshot.nodes.iter().zip(sim.nodes()) {
            assert_eq!(frame_node.display_pos, node.pos);
        }
    }
}
