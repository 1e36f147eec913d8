use eframe::egui::{self, Slider, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::warn;

use super::super::sim::PULSE_COSMETIC;
use super::super::{Selection, ViewModel};
use crate::document::ZoneRecord;

fn faction_id_from_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        self.draw_search_section(ui);
        ui.separator();
        self.draw_link_section(ui);
        ui.separator();
        self.draw_faction_section(ui);
        ui.separator();
        self.draw_selection_section(ui);
        ui.separator();
        self.draw_tuning_section(ui);

        if let Some(error) = self.form_error.clone() {
            ui.separator();
            ui.colored_label(egui::Color32::from_rgb(240, 120, 100), error);
            if ui.button("Dismiss").clicked() {
                self.form_error = None;
            }
        }
    }

    fn draw_search_section(&mut self, ui: &mut Ui) {
        ui.heading("Find actor");
        ui.text_edit_singleline(&mut self.search);

        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut matches: Vec<(i64, String, String)> = self
            .sim
            .nodes()
            .iter()
            .filter_map(|node| {
                matcher
                    .fuzzy_match(&node.name, query)
                    .or_else(|| matcher.fuzzy_match(&node.id, query))
                    .map(|score| (score, node.id.clone(), node.name.clone()))
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        matches.truncate(8);

        for (_, id, name) in matches {
            let selected = self.selection == Some(Selection::Node(id.clone()));
            if ui.selectable_label(selected, &name).clicked() {
                self.selection = Some(Selection::Node(id));
            }
        }
    }

    fn draw_link_section(&mut self, ui: &mut Ui) {
        ui.heading("Add link");
        ui.horizontal(|ui| {
            ui.label("source");
            ui.text_edit_singleline(&mut self.link_source);
        });
        ui.horizontal(|ui| {
            ui.label("target");
            ui.text_edit_singleline(&mut self.link_target);
        });
        ui.horizontal(|ui| {
            ui.label("label");
            ui.text_edit_singleline(&mut self.link_label);
        });
        ui.checkbox(&mut self.link_directional, "directional");

        if ui.button("Add link").clicked() {
            let result = self.document.add_link(
                self.link_source.trim(),
                self.link_target.trim(),
                self.link_label.trim(),
                self.link_directional,
                self.directory.as_ref(),
            );
            match result {
                Ok(()) => {
                    self.link_label.clear();
                    self.link_directional = false;
                    self.form_error = None;
                    self.commit();
                }
                Err(error) => {
                    warn!("add link rejected: {error}");
                    self.form_error = Some(error.to_string());
                }
            }
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("actor id");
            ui.text_edit_singleline(&mut self.actor_id);
            if ui.button("Add actor").clicked() {
                let id = self.actor_id.trim().to_owned();
                if id.is_empty() {
                    self.form_error = Some("actor id must not be empty".to_owned());
                } else if self.document.node(&id).is_some() {
                    self.form_error = Some(format!("actor {id:?} already exists"));
                } else {
                    let resolved = self.directory.resolve(&id);
                    self.document.nodes.push(crate::document::NodeRecord {
                        name: resolved
                            .as_ref()
                            .map(|entity| entity.name.clone())
                            .unwrap_or_else(|| id.clone()),
                        image: resolved.and_then(|entity| entity.image),
                        id,
                        ..crate::document::NodeRecord::default()
                    });
                    self.actor_id.clear();
                    self.form_error = None;
                    self.commit();
                }
            }
        });
    }

    fn draw_faction_section(&mut self, ui: &mut Ui) {
        ui.heading("Factions");

        let mut remove: Option<String> = None;
        for zone in &self.document.factions {
            ui.horizontal(|ui| {
                let selected = self.selection == Some(Selection::Zone(zone.id.clone()));
                if ui.selectable_label(selected, &zone.name).clicked() {
                    self.selection = Some(Selection::Zone(zone.id.clone()));
                }
                if ui.small_button("remove").clicked() {
                    remove = Some(zone.id.clone());
                }
            });
        }
        if let Some(id) = remove {
            self.document.remove_faction(&id);
            self.commit();
        }

        ui.horizontal(|ui| {
            ui.label("name");
            ui.text_edit_singleline(&mut self.faction_name);
        });
        ui.horizontal(|ui| {
            ui.label("color");
            ui.text_edit_singleline(&mut self.faction_color);
        });
        if ui.button("Add faction").clicked() {
            let id = faction_id_from_name(&self.faction_name);
            if id.is_empty() {
                self.form_error = Some("faction name must not be empty".to_owned());
            } else if self.document.faction(&id).is_some() {
                self.form_error = Some(format!("faction {id:?} already exists"));
            } else {
                self.document.upsert_faction(ZoneRecord {
                    id,
                    name: self.faction_name.trim().to_owned(),
                    color: self.faction_color.trim().to_owned(),
                    ..ZoneRecord::default()
                });
                self.faction_name.clear();
                self.form_error = None;
                self.commit();
            }
        }
    }

    fn draw_selection_section(&mut self, ui: &mut Ui) {
        match self.selection.clone() {
            Some(Selection::Node(id)) => self.draw_selected_node(ui, &id),
            Some(Selection::Link(index)) => self.draw_selected_link(ui, index),
            Some(Selection::Zone(id)) => self.draw_selected_zone(ui, &id),
            None => {
                ui.heading("Selection");
                ui.label("Click an actor, link, or faction in the graph.");
            }
        }
    }

    fn draw_selected_node(&mut self, ui: &mut Ui, id: &str) {
        ui.heading("Actor");

        let faction_ids: Vec<(String, String)> = self
            .document
            .factions
            .iter()
            .map(|zone| (zone.id.clone(), zone.name.clone()))
            .collect();

        let mut committed = false;
        let mut membership_change: Option<Vec<String>> = None;
        let mut focal_change: Option<bool> = None;
        let mut delete = false;

        {
            let Some(node) = self.document.node_mut(id) else {
                return;
            };

            ui.label(format!("id: {}", node.id));
            ui.horizontal(|ui| {
                ui.label("name");
                if ui.text_edit_singleline(&mut node.name).lost_focus() {
                    committed = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label("role");
                if ui.text_edit_singleline(&mut node.role).lost_focus() {
                    committed = true;
                }
            });
            ui.label("lore");
            if ui.text_edit_multiline(&mut node.lore).lost_focus() {
                committed = true;
            }

            let mut focal = node.focal;
            if ui.checkbox(&mut focal, "focal actor").changed() {
                focal_change = Some(focal);
            }

            if !faction_ids.is_empty() {
                ui.label("factions");
                let mut memberships = node.factions.clone();
                let mut changed = false;
                for (faction_id, faction_name) in &faction_ids {
                    let mut member = memberships.contains(faction_id);
                    if ui.checkbox(&mut member, faction_name).changed() {
                        changed = true;
                        if member {
                            memberships.push(faction_id.clone());
                        } else {
                            memberships.retain(|entry| entry != faction_id);
                        }
                    }
                }
                if changed {
                    membership_change = Some(memberships);
                }
            }

            if ui.button("Delete actor").clicked() {
                delete = true;
            }
        }

        if let Some(focal) = focal_change {
            self.document.set_focal(id, focal);
            committed = true;
        }
        if let Some(memberships) = membership_change {
            self.document.set_memberships(id, memberships);
            committed = true;
        }
        if delete {
            self.document.remove_node(id);
            self.selection = None;
            committed = true;
        }
        if committed {
            self.commit();
        }
    }

    fn draw_selected_link(&mut self, ui: &mut Ui, index: usize) {
        ui.heading("Link");

        let mut committed = false;
        let mut delete = false;

        {
            let Some(link) = self.document.links.get_mut(index) else {
                return;
            };

            ui.label(format!("{} -> {}", link.source, link.target));
            ui.horizontal(|ui| {
                ui.label("label");
                if ui.text_edit_singleline(&mut link.label).lost_focus() {
                    committed = true;
                }
            });
            if ui.checkbox(&mut link.directional, "directional").changed() {
                committed = true;
            }
            if ui.button("Delete link").clicked() {
                delete = true;
            }
        }

        if delete {
            self.document.remove_link(index);
            self.selection = None;
            committed = true;
        }
        if committed {
            self.commit();
        }
    }

    fn draw_selected_zone(&mut self, ui: &mut Ui, id: &str) {
        ui.heading("Faction");

        let mut committed = false;
        let mut delete = false;

        {
            let Some(zone) = self
                .document
                .factions
                .iter_mut()
                .find(|zone| zone.id == id)
            else {
                return;
            };

            ui.label(format!("id: {}", zone.id));
            ui.horizontal(|ui| {
                ui.label("name");
                if ui.text_edit_singleline(&mut zone.name).lost_focus() {
                    committed = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label("color");
                if ui.text_edit_singleline(&mut zone.color).lost_focus() {
                    committed = true;
                }
            });
            if ui.button("Delete faction").clicked() {
                delete = true;
            }
        }

        if delete {
            self.document.remove_faction(id);
            self.selection = None;
            committed = true;
        }
        if committed {
            self.commit();
        }
    }

    fn draw_tuning_section(&mut self, ui: &mut Ui) {
        ui.heading("Simulation");

        let mut params = *self.sim.params();
        let mut changed = false;

        changed |= ui
            .add(Slider::new(&mut params.node_radius, 10.0..=60.0).text("token radius"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut params.link_distance, 60.0..=400.0).text("link distance"))
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut params.repulsion, 8_000.0..=240_000.0)
                    .logarithmic(true)
                    .text("repulsion"),
            )
            .changed();
        changed |= ui
            .add(Slider::new(&mut params.collide_radius, 10.0..=120.0).text("collision radius"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut params.center_gravity, 0.0..=0.2).text("gravity"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut params.focal_gravity, 0.0..=1.0).text("focal gravity"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut params.avoid_radius, 0.0..=150.0).text("line avoid radius"))
            .changed();
        changed |= ui
            .add(Slider::new(&mut params.avoid_strength, 0.0..=40.0).text("line avoid strength"))
            .changed();

        ui.add_space(4.0);
        changed |= ui.checkbox(&mut params.drift_enabled, "ambient drift").changed();
        changed |= ui
            .add(Slider::new(&mut params.drift_strength, 0.1..=10.0).text("drift strength"))
            .changed();

        ui.add_space(4.0);
        changed |= ui
            .add(Slider::new(&mut params.zone_base_radius, 40.0..=200.0).text("faction radius"))
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut params.zone_member_spacing, 8.0..=80.0)
                    .text("faction member spacing"),
            )
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut params.zone_overlap_target, 0.3..=0.8)
                    .text("faction overlap target"),
            )
            .changed();
        changed |= ui
            .add(
                Slider::new(&mut params.zone_separation_buffer, 0.0..=120.0)
                    .text("faction buffer"),
            )
            .changed();

        let mut focal_color = [
            params.focal_color.r(),
            params.focal_color.g(),
            params.focal_color.b(),
        ];
        ui.horizontal(|ui| {
            ui.label("focal accent");
            if ui.color_edit_button_srgb(&mut focal_color).changed() {
                params.focal_color =
                    egui::Color32::from_rgb(focal_color[0], focal_color[1], focal_color[2]);
                changed = true;
            }
        });

        if changed {
            self.sim.set_params(params);
            self.sim.pulse(PULSE_COSMETIC);
        }

        ui.add_space(6.0);
        let mut show_factions = self.document.show_factions;
        if ui.checkbox(&mut show_factions, "show factions").changed() {
            self.document.show_factions = show_factions;
            self.queue_save();
        }
        let mut show_labels = self.document.show_labels;
        if ui.checkbox(&mut show_labels, "show labels").changed() {
            self.document.show_labels = show_labels;
            self.queue_save();
        }
    }
}
