use eframe::egui::{self, Align, Context, Layout, Vec2};
use log::{info, warn};

use super::super::sim::{SimParams, Simulation};
use super::super::{LoadedData, ViewModel};
use crate::document::{DocumentStore, EntityDirectory, NullDirectory};

impl ViewModel {
    pub(in crate::app) fn new(store: DocumentStore, loaded: LoadedData) -> Self {
        let mut sim = Simulation::new(SimParams::default());
        sim.reconcile(&loaded.document);
        info!(
            "loaded document: {} actors, {} links, {} factions",
            loaded.document.nodes.len(),
            loaded.document.links.len(),
            loaded.document.factions.len()
        );

        let directory: Box<dyn EntityDirectory> = match loaded.directory {
            Some(directory) => {
                if directory.is_empty() {
                    warn!("actor directory has no entries");
                } else {
                    info!("actor directory loaded with {} entries", directory.len());
                }
                Box::new(directory)
            }
            None => Box::new(NullDirectory),
        };

        Self {
            store,
            directory,
            document: loaded.document,
            sim,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit: None,
            last_rect: None,
            selection: None,
            drag: None,
            fit_requested: false,
            search: String::new(),
            actor_id: String::new(),
            link_source: String::new(),
            link_target: String::new(),
            link_label: String::new(),
            link_directional: false,
            faction_name: String::new(),
            faction_color: "#8e24aa".to_owned(),
            form_error: None,
            save_handles: Vec::new(),
            save_error: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.poll_saves();
        self.prune_selection();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("nexus-graph");
                    ui.separator();
                    ui.label(format!("document: {}", self.store.path().display()));
                    ui.label(format!(
                        "actors: {}  links: {}  factions: {}",
                        self.document.nodes.len(),
                        self.document.links.len(),
                        self.document.factions.len()
                    ));

                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Zoom to fit").clicked() {
                        self.fit_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(error) = &self.save_error {
                            ui.colored_label(
                                egui::Color32::from_rgb(240, 120, 100),
                                format!("save failed: {error}"),
                            );
                        } else if !self.save_handles.is_empty() {
                            ui.label("saving...");
                        }
                        if !self.sim.is_cold() {
                            ui.label(format!("alpha {:.3}", self.sim.alpha()));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }
}
