use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2, vec2,
};

use super::super::render_utils::{
    blend_color, circle_visible, parse_hex_color, screen_to_world, with_alpha, world_to_screen,
};
use super::super::sim::{Hit, PULSE_TOPOLOGY};
use super::super::{Selection, ViewModel};

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const LINK_COLOR: Color32 = Color32::from_rgb(136, 136, 136);
const NODE_FILL: Color32 = Color32::from_rgb(0xb9, 0x1c, 0x1c);
const NODE_STROKE: Color32 = Color32::from_rgb(0xd9, 0x77, 0x06);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const ZONE_FALLBACK: Color32 = Color32::from_rgb(96, 110, 128);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return;
        }

        if let Some(last) = self.last_rect {
            if (last.width() - rect.width()).abs() > 1.0
                || (last.height() - rect.height()).abs() > 1.0
            {
                self.sim.pulse(PULSE_TOPOLOGY);
            }
        }
        self.last_rect = Some(rect);

        if self.fit_requested {
            self.fit_requested = false;
            self.start_zoom_to_fit(rect);
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_drag_protocol(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.apply_click_selection(rect, &response);

        let dt = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let fitting = self.advance_fit(dt);

        let moving = self.sim.tick();
        let drifting = self.sim.params().drift_enabled && !self.sim.nodes().is_empty();
        if moving || fitting || drifting || response.dragged() {
            ui.ctx().request_repaint();
        }

        let time = ui.input(|input| input.time);
        let snapshot = self.sim.frame(time);
        let pan = self.pan;
        let zoom = self.zoom;
        let node_radius = (self.sim.params().node_radius * zoom).max(2.0);

        if self.document.show_factions {
            for (index, frame_zone) in snapshot.zones.iter().enumerate() {
                let zone = &self.sim.zones()[index];
                let center = world_to_screen(rect, pan, zoom, frame_zone.center);
                let radius = frame_zone.radius * zoom;
                if !circle_visible(rect, center, radius) {
                    continue;
                }

                let color = parse_hex_color(&zone.color, ZONE_FALLBACK);
                let selected = self.selection == Some(Selection::Zone(zone.id.clone()));
                painter.circle_filled(center, radius, with_alpha(color, 28));
                painter.circle_stroke(
                    center,
                    radius,
                    Stroke::new(
                        if selected { 2.6 } else { 1.4 },
                        with_alpha(if selected { SELECTED_COLOR } else { color }, 150),
                    ),
                );
                painter.text(
                    center,
                    Align2::CENTER_CENTER,
                    &zone.name,
                    FontId::proportional((15.0 * zoom.sqrt()).clamp(10.0, 22.0)),
                    with_alpha(color, 210),
                );
            }
        }

        for (index, link) in snapshot.links.iter().enumerate() {
            let source = snapshot.nodes[link.source].display_pos;
            let target = snapshot.nodes[link.target].display_pos;
            let selected = self.selection == Some(Selection::Link(index));
            let stroke = Stroke::new(
                (2.0 * zoom.sqrt()).clamp(0.8, 3.5),
                if selected { SELECTED_COLOR } else { LINK_COLOR },
            );

            let delta = target - source;
            let distance = delta.length().max(1.0);
            let direction = delta / distance;
            let normal = vec2(-direction.y, direction.x);
            let mid = source + delta * 0.5;
            let spread = 30.0 + distance * 0.1;

            let source_screen = world_to_screen(rect, pan, zoom, source);
            let target_screen = world_to_screen(rect, pan, zoom, target);

            let label_world;
            if link.fan == 0.0 {
                let tip = if link.directional {
                    target_screen - direction * (node_radius + 2.0)
                } else {
                    target_screen
                };
                painter.line_segment([source_screen, tip], stroke);
                if link.directional {
                    draw_arrowhead(&painter, tip, direction, node_radius * 0.33 + 6.0, stroke.color);
                }
                label_world = mid;
            } else {
                let control = mid + normal * (link.fan * spread * 2.0);
                let control_screen = world_to_screen(rect, pan, zoom, control);
                let mut approach = (target_screen - control_screen).normalized();
                if !approach.is_finite() {
                    approach = direction;
                }
                let tip = if link.directional {
                    target_screen - approach * (node_radius + 2.0)
                } else {
                    target_screen
                };

                painter.add(Shape::from(QuadraticBezierShape::from_points_stroke(
                    [source_screen, control_screen, tip],
                    false,
                    Color32::TRANSPARENT,
                    stroke,
                )));
                if link.directional {
                    draw_arrowhead(&painter, tip, approach, node_radius * 0.33 + 6.0, stroke.color);
                }
                label_world = mid + normal * (link.fan * spread);
            }

            if self.document.show_labels && !self.sim.edges()[index].label.is_empty() {
                let label_screen = world_to_screen(rect, pan, zoom, label_world);
                draw_link_label(&painter, label_screen, &self.sim.edges()[index].label, zoom);
            }
        }

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| {
                let world = screen_to_world(rect, pan, zoom, pointer);
                self.sim.hit_test(world, zoom)
            });
        if matches!(hovered, Some(Hit::Node(_) | Hit::Zone(_))) {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        for (index, frame_node) in snapshot.nodes.iter().enumerate() {
            let node = &self.sim.nodes()[index];
            let position = world_to_screen(rect, pan, zoom, frame_node.display_pos);
            if !circle_visible(rect, position, node_radius + 4.0) {
                continue;
            }

            let selected = self.selection == Some(Selection::Node(node.id.clone()));
            let is_hovered = hovered == Some(Hit::Node(index));

            let fill = if is_hovered {
                blend_color(NODE_FILL, Color32::WHITE, 0.18)
            } else {
                NODE_FILL
            };
            painter.circle_filled(position, node_radius, fill);
            painter.circle_stroke(position, node_radius, Stroke::new(2.0, NODE_STROKE));

            if frame_node.focal {
                painter.circle_stroke(
                    position,
                    node_radius + 3.5,
                    Stroke::new(2.6, self.sim.params().focal_color),
                );
            }
            if selected {
                painter.circle_stroke(
                    position,
                    node_radius + 7.0,
                    Stroke::new(1.8, SELECTED_COLOR),
                );
            }

            if self.document.show_labels {
                painter.text(
                    position + vec2(0.0, node_radius + 11.0),
                    Align2::CENTER_CENTER,
                    &node.name,
                    FontId::proportional((13.0 * zoom.sqrt()).clamp(9.0, 20.0)),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(Hit::Node(index)) = hovered
            && let Some(node) = self.sim.nodes().get(index)
        {
            let mut hover_text = node.name.clone();
            if !node.role.is_empty() {
                hover_text.push_str("  |  ");
                hover_text.push_str(&node.role);
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                hover_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

fn draw_background(painter: &egui::Painter, rect: egui::Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid_line = Color32::from_rgba_unmultiplied(60, 70, 80, 70);

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, grid_line),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, grid_line),
        );
        y += step;
    }
}

fn draw_arrowhead(
    painter: &egui::Painter,
    tip: Pos2,
    direction: Vec2,
    size: f32,
    color: Color32,
) {
    let normal = vec2(-direction.y, direction.x);
    let base = tip - direction * size;
    painter.add(Shape::convex_polygon(
        vec![tip, base + normal * (size * 0.5), base - normal * (size * 0.5)],
        color,
        Stroke::NONE,
    ));
}

fn draw_link_label(painter: &egui::Painter, position: Pos2, label: &str, zoom: f32) {
    let font = FontId::proportional((12.0 * zoom.sqrt()).clamp(9.0, 18.0));
    let galley = painter.layout_no_wrap(label.to_owned(), font, Color32::from_rgb(26, 26, 26));
    let padding = vec2(5.0, 2.0);
    let bg_rect = egui::Rect::from_center_size(position, galley.size() + padding * 2.0);

    painter.rect_filled(bg_rect, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 235));
    painter.rect_stroke(
        bg_rect,
        4.0,
        Stroke::new(1.0, Color32::from_rgb(0xdc, 0xd6, 0xcc)),
        egui::StrokeKind::Outside,
    );
    painter.galley(bg_rect.min + padding, galley, Color32::from_rgb(26, 26, 26));
}
