mod forces;
mod frame;
mod geom;
mod zones;

use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Vec2, vec2};
use log::warn;

use crate::document::GraphDocument;
use crate::util::stable_pair;

pub(in crate::app) use frame::{FrameLink, FrameNode, FrameSnapshot, FrameZone};
pub(in crate::app) use geom::point_to_segment_distance;

pub(in crate::app) const PULSE_TOPOLOGY: f32 = 0.3;
pub(in crate::app) const PULSE_COSMETIC: f32 = 0.05;
pub(in crate::app) const DRAG_ALPHA_TARGET: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct SimParams {
    pub repulsion: f32,
    pub softening: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub collide_radius: f32,
    pub collide_strength: f32,
    pub center_gravity: f32,
    pub focal_gravity: f32,
    pub avoid_radius: f32,
    pub avoid_strength: f32,
    pub node_radius: f32,
    pub seed_jitter: f32,
    pub drift_enabled: bool,
    pub drift_strength: f32,
    pub focal_color: Color32,
    pub zone_base_radius: f32,
    pub zone_member_spacing: f32,
    pub zone_boundary_margin: f32,
    pub zone_core_radius: f32,
    pub zone_overlap_scale: f32,
    pub zone_overlap_target: f32,
    pub zone_separation_buffer: f32,
    pub zone_pull: f32,
    pub zone_boundary_strength: f32,
    pub zone_core_strength: f32,
    pub zone_exclude_strength: f32,
    pub zone_separation_strength: f32,
    pub zone_centroid_tracking: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_damping: f32,
    pub edge_hit_width: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            repulsion: 78_000.0,
            softening: 620.0,
            link_distance: 200.0,
            link_strength: 0.12,
            collide_radius: 40.0,
            collide_strength: 0.5,
            center_gravity: 0.04,
            focal_gravity: 0.4,
            avoid_radius: 60.0,
            avoid_strength: 14.0,
            node_radius: 30.0,
            seed_jitter: 25.0,
            drift_enabled: true,
            drift_strength: 4.0,
            focal_color: Color32::from_rgb(0xd4, 0xaf, 0x37),
            zone_base_radius: 90.0,
            zone_member_spacing: 34.0,
            zone_boundary_margin: 14.0,
            zone_core_radius: 30.0,
            zone_overlap_scale: 1.2,
            zone_overlap_target: 0.55,
            zone_separation_buffer: 40.0,
            zone_pull: 0.08,
            zone_boundary_strength: 0.35,
            zone_core_strength: 0.6,
            zone_exclude_strength: 0.25,
            zone_separation_strength: 0.15,
            zone_centroid_tracking: 0.08,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.977_237_2,
            velocity_damping: 0.6,
            edge_hit_width: 6.0,
        }
    }
}

pub(in crate::app) struct SimNode {
    pub id: String,
    pub name: String,
    pub role: String,
    pub lore: String,
    pub factions: Vec<String>,
    pub focal: bool,
    pub image: Option<String>,
    pub pos: Vec2,
    pub vel: Vec2,
    pub pin: Option<Vec2>,
    pub drift_phase: (f32, f32),
}

pub(in crate::app) struct SimEdge {
    pub source_id: String,
    pub target_id: String,
    pub label: String,
    pub directional: bool,
    pub endpoints: (usize, usize),
    pub fan: f32,
}

pub(in crate::app) struct SimZone {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub center: Vec2,
    pub radius: f32,
    pub member_count: usize,
    pub shares_members: bool,
    pub dragged: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum ReconcileEffect {
    Unchanged,
    Cosmetic,
    Structural,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Hit {
    Node(usize),
    Zone(usize),
    Link(usize),
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    impulses: Vec<Vec2>,
}

pub(in crate::app) struct Simulation {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    zones: Vec<SimZone>,
    index_by_id: HashMap<String, usize>,
    memberships: Vec<Vec<usize>>,
    shared_pairs: HashSet<(usize, usize)>,
    alpha: f32,
    alpha_target: f32,
    params: SimParams,
    scratch: Scratch,
}

impl Simulation {
    pub fn new(params: SimParams) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            zones: Vec::new(),
            index_by_id: HashMap::new(),
            memberships: Vec::new(),
            shared_pairs: HashSet::new(),
            alpha: 0.0,
            alpha_target: 0.0,
            params,
            scratch: Scratch::default(),
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SimParams) {
        self.params = params;
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SimEdge] {
        &self.edges
    }

    pub fn zones(&self) -> &[SimZone] {
        &self.zones
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_cold(&self) -> bool {
        self.alpha < self.params.alpha_min && self.alpha_target < self.params.alpha_min
    }

    pub fn pulse(&mut self, amount: f32) {
        self.alpha = self.alpha.max(amount).clamp(0.0, 1.0);
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn set_pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index)
            && position.is_finite()
        {
            node.pin = Some(position);
        }
    }

    pub fn clear_pin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    pub fn begin_zone_drag(&mut self, index: usize) {
        if let Some(zone) = self.zones.get_mut(index) {
            zone.dragged = true;
        }
    }

    pub fn drag_zone_to(&mut self, index: usize, center: Vec2) {
        if let Some(zone) = self.zones.get_mut(index)
            && center.is_finite()
        {
            zone.center = center;
        }
    }

    pub fn end_zone_drag(&mut self, index: usize) {
        if let Some(zone) = self.zones.get_mut(index) {
            zone.dragged = false;
        }
    }

    fn seed_position(record_x: Option<f32>, record_y: Option<f32>, id: &str, jitter: f32) -> Vec2 {
        if let (Some(x), Some(y)) = (record_x, record_y) {
            let position = vec2(x, y);
            if position.is_finite() {
                return position;
            }
        }

        let (jx, jy) = stable_pair(id);
        vec2(jx, jy) * jitter
    }

    pub fn reconcile(&mut self, document: &GraphDocument) -> ReconcileEffect {
        let mut structural = false;
        let mut cosmetic = false;

        let mut prior: HashMap<String, SimNode> = self
            .nodes
            .drain(..)
            .map(|node| (node.id.clone(), node))
            .collect();

        let mut seen: HashSet<&str> = HashSet::with_capacity(document.nodes.len());
        let mut next_nodes = Vec::with_capacity(document.nodes.len());
        for record in &document.nodes {
            if !seen.insert(record.id.as_str()) {
                warn!("duplicate node id {:?} in document, keeping first", record.id);
                continue;
            }

            if let Some(mut node) = prior.remove(&record.id) {
                if node.name != record.name
                    || node.role != record.role
                    || node.lore != record.lore
                    || node.factions != record.factions
                    || node.focal != record.focal
                    || node.image != record.image
                {
                    cosmetic = true;
                }
                node.name = record.name.clone();
                node.role = record.role.clone();
                node.lore = record.lore.clone();
                node.factions = record.factions.clone();
                node.focal = record.focal;
                node.image = record.image.clone();
                next_nodes.push(node);
            } else {
                structural = true;
                let position =
                    Self::seed_position(record.x, record.y, &record.id, self.params.seed_jitter);
                let velocity = match (record.vx, record.vy) {
                    (Some(vx), Some(vy)) if vx.is_finite() && vy.is_finite() => vec2(vx, vy),
                    _ => Vec2::ZERO,
                };
                next_nodes.push(SimNode {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    role: record.role.clone(),
                    lore: record.lore.clone(),
                    factions: record.factions.clone(),
                    focal: record.focal,
                    image: record.image.clone(),
                    pos: position,
                    vel: velocity,
                    pin: None,
                    drift_phase: stable_pair(&record.id),
                });
            }
        }
        if !prior.is_empty() {
            structural = true;
        }

        self.nodes = next_nodes;
        self.index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        let mut prior_zones: HashMap<String, SimZone> = self
            .zones
            .drain(..)
            .map(|zone| (zone.id.clone(), zone))
            .collect();
        let mut next_zones = Vec::with_capacity(document.factions.len());
        let mut seen_zones: HashSet<&str> = HashSet::with_capacity(document.factions.len());
        for record in &document.factions {
            if !seen_zones.insert(record.id.as_str()) {
                warn!("duplicate faction id {:?} in document, keeping first", record.id);
                continue;
            }

            if let Some(mut zone) = prior_zones.remove(&record.id) {
                if zone.name != record.name || zone.color != record.color || zone.icon != record.icon
                {
                    cosmetic = true;
                }
                zone.name = record.name.clone();
                zone.color = record.color.clone();
                zone.icon = record.icon.clone();
                next_zones.push(zone);
            } else {
                structural = true;
                next_zones.push(SimZone {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    color: record.color.clone(),
                    icon: record.icon.clone(),
                    center: Self::seed_position(
                        record.x,
                        record.y,
                        &record.id,
                        self.params.seed_jitter,
                    ),
                    radius: 0.0,
                    member_count: 0,
                    shares_members: false,
                    dragged: false,
                });
            }
        }
        if !prior_zones.is_empty() {
            structural = true;
        }
        self.zones = next_zones;

        let zone_index_by_id: HashMap<&str, usize> = self
            .zones
            .iter()
            .enumerate()
            .map(|(index, zone)| (zone.id.as_str(), index))
            .collect();

        let old_pairs: Vec<(String, String)> = self
            .edges
            .iter()
            .map(|edge| (edge.source_id.clone(), edge.target_id.clone()))
            .collect();
        let old_labels: Vec<(String, bool)> = self
            .edges
            .iter()
            .map(|edge| (edge.label.clone(), edge.directional))
            .collect();

        let mut next_edges = Vec::with_capacity(document.links.len());
        for link in &document.links {
            let (Some(&source), Some(&target)) = (
                self.index_by_id.get(&link.source),
                self.index_by_id.get(&link.target),
            ) else {
                warn!(
                    "dropping link {:?} -> {:?}: endpoint not in node list",
                    link.source, link.target
                );
                continue;
            };
            if source == target {
                warn!("dropping self-link on {:?}", link.source);
                continue;
            }

            next_edges.push(SimEdge {
                source_id: link.source.clone(),
                target_id: link.target.clone(),
                label: link.label.clone(),
                directional: link.directional,
                endpoints: (source, target),
                fan: 0.0,
            });
        }
        assign_fan_multipliers(&mut next_edges);

        let new_pairs: Vec<(String, String)> = next_edges
            .iter()
            .map(|edge| (edge.source_id.clone(), edge.target_id.clone()))
            .collect();
        let new_labels: Vec<(String, bool)> = next_edges
            .iter()
            .map(|edge| (edge.label.clone(), edge.directional))
            .collect();
        if new_pairs != old_pairs {
            structural = true;
        } else if new_labels != old_labels {
            cosmetic = true;
        }
        self.edges = next_edges;

        self.memberships = self
            .nodes
            .iter()
            .map(|node| {
                node.factions
                    .iter()
                    .filter_map(|faction| zone_index_by_id.get(faction.as_str()).copied())
                    .collect::<Vec<_>>()
            })
            .collect();
        self.shared_pairs = zones::shared_zone_pairs(&self.memberships);

        for (zone_index, zone) in self.zones.iter_mut().enumerate() {
            zone.member_count = self
                .memberships
                .iter()
                .filter(|zone_refs| zone_refs.contains(&zone_index))
                .count();
            zone.shares_members = self
                .shared_pairs
                .iter()
                .any(|&(a, b)| a == zone_index || b == zone_index);
            zone.radius = zones::zone_radius(zone.member_count, zone.shares_members, &self.params);
        }

        let effect = if structural {
            ReconcileEffect::Structural
        } else if cosmetic {
            ReconcileEffect::Cosmetic
        } else {
            ReconcileEffect::Unchanged
        };
        match effect {
            ReconcileEffect::Structural => self.pulse(PULSE_TOPOLOGY),
            ReconcileEffect::Cosmetic => self.pulse(PULSE_COSMETIC),
            ReconcileEffect::Unchanged => {}
        }
        effect
    }

    pub fn tick(&mut self) -> bool {
        if self.is_cold() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

        let node_count = self.nodes.len();
        self.scratch.positions.clear();
        self.scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.pos));
        self.scratch.impulses.resize(node_count, Vec2::ZERO);
        self.scratch.impulses.fill(Vec2::ZERO);

        {
            let positions = &self.scratch.positions;
            let impulses = &mut self.scratch.impulses;
            forces::link_attraction(positions, &self.edges, &self.params, self.alpha, impulses);
            forces::many_body_repulsion(positions, &self.params, self.alpha, impulses);
            forces::collision(positions, &self.params, impulses);
            forces::gravity_wells(positions, &self.nodes, &self.params, self.alpha, impulses);
            forces::line_avoidance(positions, &self.edges, &self.params, self.alpha, impulses);
            zones::containment(
                positions,
                &self.memberships,
                &self.zones,
                &self.params,
                self.alpha,
                impulses,
            );
        }

        for (index, node) in self.nodes.iter_mut().enumerate() {
            let mut impulse = self.scratch.impulses[index];
            if !impulse.is_finite() {
                impulse = Vec2::ZERO;
            }

            node.vel = (node.vel + impulse) * self.params.velocity_damping;
            if !node.vel.is_finite() {
                node.vel = Vec2::ZERO;
            }

            if let Some(pin) = node.pin {
                node.pos = pin;
                node.vel = Vec2::ZERO;
            } else {
                node.pos += node.vel;
            }
        }

        self.scratch.positions.clear();
        self.scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.pos));
        zones::update_centers(
            &mut self.zones,
            &self.scratch.positions,
            &self.memberships,
            &self.shared_pairs,
            &self.params,
            self.alpha,
        );

        true
    }

    pub fn hit_test(&self, world: Vec2, zoom: f32) -> Option<Hit> {
        let nearest_node = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index, (node.pos - world).length()))
            .filter(|(_, distance)| *distance <= self.params.node_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = nearest_node {
            return Some(Hit::Node(index));
        }

        let nearest_zone = self
            .zones
            .iter()
            .enumerate()
            .map(|(index, zone)| (index, (zone.center - world).length()))
            .filter(|(_, distance)| *distance <= self.params.zone_core_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = nearest_zone {
            return Some(Hit::Zone(index));
        }

        let threshold = self.params.edge_hit_width / zoom.max(0.0001);
        let nearest_edge = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let (source, target) = edge.endpoints;
                let distance = point_to_segment_distance(
                    world,
                    self.nodes.get(source)?.pos,
                    self.nodes.get(target)?.pos,
                );
                (distance <= threshold).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        nearest_edge.map(|(index, _)| Hit::Link(index))
    }

    pub fn persist_into(&self, document: &mut GraphDocument) {
        for record in &mut document.nodes {
            if let Some(&index) = self.index_by_id.get(&record.id) {
                let node = &self.nodes[index];
                record.x = Some(node.pos.x);
                record.y = Some(node.pos.y);
                record.vx = Some(node.vel.x);
                record.vy = Some(node.vel.y);
            }
        }

        for record in &mut document.factions {
            if let Some(zone) = self.zones.iter().find(|zone| zone.id == record.id) {
                record.x = Some(zone.center.x);
                record.y = Some(zone.center.y);
            }
        }
    }
}

fn assign_fan_multipliers(edges: &mut [SimEdge]) {
    let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        let (source, target) = edge.endpoints;
        let key = if source < target {
            (source, target)
        } else {
            (target, source)
        };
        groups.entry(key).or_default().push(index);
    }

    for group in groups.values() {
        let total = group.len();
        for (slot, &edge_index) in group.iter().enumerate() {
            edges[edge_index].fan = fan_multiplier(slot, total);
        }
    }
}

fn fan_multiplier(slot: usize, total: usize) -> f32 {
    if total <= 1 {
        return 0.0;
    }

    let sign = if slot % 2 == 0 { 1.0 } else { -1.0 };
    if total % 2 == 0 {
        sign * ((slot / 2) as f32 + 0.5)
    } else if slot == 0 {
        0.0
    } else {
        sign * ((slot + 1) / 2) as f32
    }
}
