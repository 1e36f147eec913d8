use eframe::egui::{self, Rect, Ui, Vec2};

use super::super::render_utils::screen_to_world;
use super::super::sim::{DRAG_ALPHA_TARGET, Hit};
use super::super::{DragSubject, Selection, ViewModel};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 4.0;
const FIT_PADDING: f32 = 80.0;
const FIT_DURATION_SECS: f32 = 0.35;
const ZONE_DRAG_PULSE: f32 = 0.1;

pub(in crate::app) struct FitTransition {
    from_pan: Vec2,
    to_pan: Vec2,
    from_zoom: f32,
    to_zoom: f32,
    progress: f32,
}

impl FitTransition {
    pub(in crate::app) fn advance(&mut self, dt: f32) -> (Vec2, f32, bool) {
        self.progress = (self.progress + dt / FIT_DURATION_SECS).min(1.0);
        let t = self.progress;
        let eased = t * t * (3.0 - 2.0 * t);

        let pan = self.from_pan + (self.to_pan - self.from_pan) * eased;
        let zoom = self.from_zoom + (self.to_zoom - self.from_zoom) * eased;
        (pan, zoom, self.progress >= 1.0)
    }
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
        self.fit = None;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary) && self.drag.is_none())
        {
            if response.drag_delta() != Vec2::ZERO {
                self.pan += response.drag_delta();
                self.fit = None;
            }
        }
    }

    pub(in crate::app) fn handle_drag_protocol(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let pointer_world = ui
            .input(|input| input.pointer.interact_pos())
            .map(|pointer| screen_to_world(rect, self.pan, self.zoom, pointer));

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(world) = pointer_world
        {
            match self.sim.hit_test(world, self.zoom) {
                Some(Hit::Node(index)) => {
                    self.drag = Some(DragSubject::Node(index));
                    self.sim.set_pin(index, world);
                    self.sim.set_alpha_target(DRAG_ALPHA_TARGET);
                }
                Some(Hit::Zone(index)) => {
                    let grab_offset = world - self.sim.zones()[index].center;
                    self.drag = Some(DragSubject::Zone { index, grab_offset });
                    self.sim.begin_zone_drag(index);
                }
                _ => {}
            }
        }

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(world) = pointer_world
        {
            match self.drag {
                Some(DragSubject::Node(index)) => {
                    self.sim.set_pin(index, world);
                }
                Some(DragSubject::Zone { index, grab_offset }) => {
                    self.sim.drag_zone_to(index, world - grab_offset);
                    self.sim.pulse(ZONE_DRAG_PULSE);
                }
                None => {}
            }
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            match self.drag.take() {
                Some(DragSubject::Node(index)) => {
                    self.sim.clear_pin(index);
                    self.sim.set_alpha_target(0.0);
                    self.queue_save();
                }
                Some(DragSubject::Zone { index, .. }) => {
                    self.sim.end_zone_drag(index);
                    self.queue_save();
                }
                None => {}
            }
        }
    }

    pub(in crate::app) fn apply_click_selection(
        &mut self,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.clicked_by(egui::PointerButton::Primary) {
            return;
        }
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        let world = screen_to_world(rect, self.pan, self.zoom, pointer);
        self.selection = match self.sim.hit_test(world, self.zoom) {
            Some(Hit::Node(index)) => Some(Selection::Node(self.sim.nodes()[index].id.clone())),
            Some(Hit::Zone(index)) => Some(Selection::Zone(self.sim.zones()[index].id.clone())),
            Some(Hit::Link(index)) => Some(Selection::Link(index)),
            None => None,
        };
    }

    pub(in crate::app) fn start_zoom_to_fit(&mut self, rect: Rect) {
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return;
        }

        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for node in self.sim.nodes() {
            min = min.min(node.pos);
            max = max.max(node.pos);
        }
        for zone in self.sim.zones() {
            min = min.min(zone.center - Vec2::splat(zone.radius));
            max = max.max(zone.center + Vec2::splat(zone.radius));
        }

        let (center, span) = if self.sim.nodes().is_empty() && self.sim.zones().is_empty() {
            (Vec2::ZERO, Vec2::splat(400.0))
        } else {
            let span = (max - min).max(Vec2::splat(200.0));
            ((min + max) * 0.5, span)
        };

        let to_zoom = ((rect.width() - FIT_PADDING * 2.0) / span.x)
            .min((rect.height() - FIT_PADDING * 2.0) / span.y)
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let to_pan = -center * to_zoom;

        self.fit = Some(FitTransition {
            from_pan: self.pan,
            to_pan,
            from_zoom: self.zoom,
            to_zoom,
            progress: 0.0,
        });
    }

    pub(in crate::app) fn advance_fit(&mut self, dt: f32) -> bool {
        let Some(fit) = self.fit.as_mut() else {
            return false;
        };

        let (pan, zoom, done) = fit.advance(dt);
        self.pan = pan;
        self.zoom = zoom;
        if done {
            self.fit = None;
        }
        true
    }
}
