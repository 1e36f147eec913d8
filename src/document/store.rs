use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result, anyhow};
use log::info;

use super::directory::EntityDirectory;
use super::model::{GraphDocument, LinkRecord, NodeRecord, ZoneRecord};

pub struct DocumentStore {
    path: PathBuf,
}

pub struct SaveHandle {
    rx: Receiver<Result<(), String>>,
}

pub enum SavePoll {
    Pending,
    Done(Result<(), String>),
}

impl DocumentStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<GraphDocument> {
        if !self.path.exists() {
            info!("document {} not found, starting empty", self.path.display());
            return Ok(GraphDocument::default());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read document {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid graph document in {}", self.path.display()))
    }

    pub fn save_async(&self, document: &GraphDocument) -> SaveHandle {
        let (tx, rx) = mpsc::channel();
        let path = self.path.clone();
        let snapshot = document.clone();

        thread::spawn(move || {
            let result = write_document(&path, &snapshot).map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        SaveHandle { rx }
    }
}

fn write_document(path: &Path, document: &GraphDocument) -> Result<()> {
    let raw = serde_json::to_string_pretty(document).context("failed to serialize document")?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write document {}", path.display()))
}

impl SaveHandle {
    pub fn poll(&self) -> SavePoll {
        match self.rx.try_recv() {
            Ok(result) => SavePoll::Done(result),
            Err(TryRecvError::Empty) => SavePoll::Pending,
            Err(TryRecvError::Disconnected) => {
                SavePoll::Done(Err("save worker disconnected".to_owned()))
            }
        }
    }
}

impl GraphDocument {
    pub fn add_link(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
        directional: bool,
        directory: &dyn EntityDirectory,
    ) -> Result<()> {
        if source.is_empty() || target.is_empty() {
            return Err(anyhow!("link endpoints must not be empty"));
        }
        if source == target {
            return Err(anyhow!("cannot link an actor to itself"));
        }

        for id in [source, target] {
            if self.node(id).is_none() {
                let resolved = directory.resolve(id);
                self.nodes.push(NodeRecord {
                    id: id.to_string(),
                    name: resolved
                        .as_ref()
                        .map(|entity| entity.name.clone())
                        .unwrap_or_else(|| id.to_string()),
                    image: resolved.and_then(|entity| entity.image),
                    ..NodeRecord::default()
                });
            }
        }

        self.links.push(LinkRecord {
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
            directional,
        });

        Ok(())
    }

    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != id);
        if self.nodes.len() == before {
            return false;
        }

        self.links
            .retain(|link| link.source != id && link.target != id);
        true
    }

    pub fn remove_link(&mut self, index: usize) -> bool {
        if index >= self.links.len() {
            return false;
        }

        self.links.remove(index);
        true
    }

    pub fn upsert_faction(&mut self, zone: ZoneRecord) {
        if let Some(existing) = self.factions.iter_mut().find(|entry| entry.id == zone.id) {
            let (x, y) = (existing.x, existing.y);
            *existing = zone;
            if existing.x.is_none() {
                existing.x = x;
                existing.y = y;
            }
        } else {
            self.factions.push(zone);
        }
    }

    pub fn remove_faction(&mut self, id: &str) -> bool {
        let before = self.factions.len();
        self.factions.retain(|zone| zone.id != id);
        if self.factions.len() == before {
            return false;
        }

        for node in &mut self.nodes {
            node.factions.retain(|faction| faction != id);
        }
        true
    }

    pub fn set_memberships(&mut self, node_id: &str, factions: Vec<String>) -> bool {
        let known = |faction: &String| self.factions.iter().any(|zone| &zone.id == faction);
        let factions = factions.into_iter().filter(|f| known(f)).collect();

        let Some(node) = self.nodes.iter_mut().find(|node| node.id == node_id) else {
            return false;
        };
        node.factions = factions;
        true
    }

    pub fn set_focal(&mut self, node_id: &str, focal: bool) -> bool {
        let Some(node) = self.node_mut(node_id) else {
            return false;
        };
        node.focal = focal;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::directory::NullDirectory;

    #[test]
    fn add_link_creates_missing_endpoints() {
        let mut doc = GraphDocument::default();
        doc.add_link("A", "B", "rivals", false, &NullDirectory)
            .expect("link is added");

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.node("A").expect("A exists").name, "A");
        assert_eq!(doc.node("B").expect("B exists").name, "B");
    }

    #[test]
    fn add_link_reuses_existing_nodes() {
        let mut doc = GraphDocument::default();
        doc.add_link("A", "B", "", false, &NullDirectory)
            .expect("first link");
        doc.add_link("A", "B", "", true, &NullDirectory)
            .expect("parallel link");

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.links.len(), 2);
    }

    #[test]
    fn self_links_are_rejected() {
        let mut doc = GraphDocument::default();
        assert!(doc.add_link("A", "A", "", false, &NullDirectory).is_err());
        assert!(doc.nodes.is_empty());
    }

    #[test]
    fn remove_node_cascades_to_links() {
        let mut doc = GraphDocument::default();
        doc.add_link("A", "B", "", false, &NullDirectory)
            .expect("link A-B");
        doc.add_link("B", "C", "", false, &NullDirectory)
            .expect("link B-C");
        doc.add_link("A", "C", "", false, &NullDirectory)
            .expect("link A-C");

        assert!(doc.remove_node("B"));

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.links.len(), 1);
        assert!(
            doc.links
                .iter()
                .all(|link| link.source != "B" && link.target != "B")
        );
    }

    #[test]
    fn remove_faction_clears_memberships_but_keeps_nodes() {
        let mut doc = GraphDocument::default();
        doc.add_link("A", "B", "", false, &NullDirectory)
            .expect("link");
        doc.upsert_faction(ZoneRecord {
            id: "camarilla".into(),
            name: "Camarilla".into(),
            ..ZoneRecord::default()
        });
        doc.set_memberships("A", vec!["camarilla".into()]);

        assert!(doc.remove_faction("camarilla"));
        assert_eq!(doc.nodes.len(), 2);
        assert!(doc.node("A").expect("A kept").factions.is_empty());
    }

    #[test]
    fn set_memberships_drops_unknown_factions() {
        let mut doc = GraphDocument::default();
        doc.add_link("A", "B", "", false, &NullDirectory)
            .expect("link");
        doc.upsert_faction(ZoneRecord {
            id: "sabbat".into(),
            ..ZoneRecord::default()
        });

        doc.set_memberships("A", vec!["sabbat".into(), "ghosts".into()]);
        assert_eq!(doc.node("A").expect("A").factions, vec!["sabbat"]);
    }
}
