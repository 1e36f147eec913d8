use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Rect, Vec2};
use log::{info, warn};

use crate::document::{DocumentStore, EntityDirectory, FileDirectory, GraphDocument, SaveHandle};

mod graph;
mod render_utils;
mod sim;
mod ui;

use graph::FitTransition;
use sim::Simulation;

pub struct NexusApp {
    document_path: PathBuf,
    directory_path: Option<PathBuf>,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedData, String>>>,
}

struct LoadedData {
    document: GraphDocument,
    directory: Option<FileDirectory>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedData, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Selection {
    Node(String),
    Link(usize),
    Zone(String),
}

#[derive(Clone, Copy)]
enum DragSubject {
    Node(usize),
    Zone { index: usize, grab_offset: Vec2 },
}

struct ViewModel {
    store: DocumentStore,
    directory: Box<dyn EntityDirectory>,
    document: GraphDocument,
    sim: Simulation,
    pan: Vec2,
    zoom: f32,
    fit: Option<FitTransition>,
    last_rect: Option<Rect>,
    selection: Option<Selection>,
    drag: Option<DragSubject>,
    fit_requested: bool,
    search: String,
    actor_id: String,
    link_source: String,
    link_target: String,
    link_label: String,
    link_directional: bool,
    faction_name: String,
    faction_color: String,
    form_error: Option<String>,
    save_handles: Vec<SaveHandle>,
    save_error: Option<String>,
}

impl NexusApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        document_path: PathBuf,
        directory_path: Option<PathBuf>,
    ) -> Self {
        let state = Self::start_load(document_path.clone(), directory_path.clone());
        Self {
            document_path,
            directory_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        document_path: PathBuf,
        directory_path: Option<PathBuf>,
    ) -> Receiver<Result<LoadedData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let store = DocumentStore::new(document_path);
            let result = store
                .load()
                .and_then(|document| {
                    let directory = match &directory_path {
                        Some(path) => Some(FileDirectory::load(path)?),
                        None => None,
                    };
                    Ok(LoadedData {
                        document,
                        directory,
                    })
                })
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(document_path: PathBuf, directory_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(document_path, directory_path),
        }
    }
}

impl eframe::App for NexusApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => AppState::Ready(Box::new(ViewModel::new(
                            DocumentStore::new(self.document_path.clone()),
                            loaded,
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading relationship graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load relationship graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(
                            self.document_path.clone(),
                            self.directory_path.clone(),
                        ));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        self.document_path.clone(),
                        self.directory_path.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(loaded)) => {
                            model.replace_document(loaded);
                        }
                        Ok(Err(error)) => {
                            warn!("reload failed, keeping current graph: {error}");
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            warn!("reload worker disconnected, keeping current graph");
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn replace_document(&mut self, loaded: LoadedData) {
        self.document = loaded.document;
        if let Some(directory) = loaded.directory {
            self.directory = Box::new(directory);
        }
        self.sim.reconcile(&self.document);
        info!(
            "reloaded document: {} actors, {} links, {} factions",
            self.document.nodes.len(),
            self.document.links.len(),
            self.document.factions.len()
        );
    }

    fn commit(&mut self) {
        self.sim.reconcile(&self.document);
        self.queue_save();
    }

    fn queue_save(&mut self) {
        self.sim.persist_into(&mut self.document);
        self.save_handles.push(self.store.save_async(&self.document));
    }

    fn poll_saves(&mut self) {
        use crate::document::SavePoll;

        let mut finished = Vec::new();
        for (index, handle) in self.save_handles.iter().enumerate() {
            match handle.poll() {
                SavePoll::Pending => {}
                SavePoll::Done(result) => {
                    if let Err(error) = result {
                        warn!("saving document failed: {error}");
                        self.save_error = Some(error);
                    } else {
                        self.save_error = None;
                    }
                    finished.push(index);
                }
            }
        }
        for index in finished.into_iter().rev() {
            self.save_handles.remove(index);
        }
    }

    fn prune_selection(&mut self) {
        let keep = match &self.selection {
            Some(Selection::Node(id)) => self.sim.node_index(id).is_some(),
            Some(Selection::Link(index)) => *index < self.document.links.len(),
            Some(Selection::Zone(id)) => self.document.faction(id).is_some(),
            None => true,
        };
        if !keep {
            self.selection = None;
        }
    }
}
