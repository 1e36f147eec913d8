use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub lore: String,
    #[serde(default)]
    pub factions: Vec<String>,
    #[serde(default)]
    pub focal: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub vx: Option<f32>,
    #[serde(default)]
    pub vy: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub directional: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(default)]
    pub factions: Vec<ZoneRecord>,
    #[serde(default = "default_true", rename = "showFactions")]
    pub show_factions: bool,
    #[serde(default = "default_true", rename = "showLabels")]
    pub show_labels: bool,
}

impl Default for GraphDocument {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            factions: Vec::new(),
            show_factions: true,
            show_labels: true,
        }
    }
}

impl GraphDocument {
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeRecord> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn faction(&self, id: &str) -> Option<&ZoneRecord> {
        self.factions.iter().find(|zone| zone.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::GraphDocument;

    #[test]
    fn missing_arrays_and_flags_default_fill() {
        let doc: GraphDocument = serde_json::from_str("{}").expect("empty object parses");
        assert!(doc.nodes.is_empty());
        assert!(doc.links.is_empty());
        assert!(doc.factions.is_empty());
        assert!(doc.show_factions);
        assert!(doc.show_labels);
    }

    #[test]
    fn partial_node_records_default_fill() {
        let doc: GraphDocument = serde_json::from_str(
            r#"{"nodes":[{"id":"A"}],"links":[{"source":"A","target":"B"}]}"#,
        )
        .expect("partial records parse");

        let node = doc.node("A").expect("node A present");
        assert_eq!(node.name, "");
        assert!(node.factions.is_empty());
        assert!(!node.focal);
        assert_eq!(node.x, None);
        assert!(!doc.links[0].directional);
    }

    #[test]
    fn wrongly_typed_document_is_refused() {
        assert!(serde_json::from_str::<GraphDocument>("[]").is_err());
        assert!(serde_json::from_str::<GraphDocument>(r#"{"nodes":{}}"#).is_err());
        assert!(serde_json::from_str::<GraphDocument>(r#"{"nodes":[{"id":7}]}"#).is_err());
    }

    #[test]
    fn view_flags_round_trip_with_wire_names() {
        let mut doc = GraphDocument::default();
        doc.show_factions = false;

        let raw = serde_json::to_string(&doc).expect("serializes");
        assert!(raw.contains("\"showFactions\":false"));

        let back: GraphDocument = serde_json::from_str(&raw).expect("round trips");
        assert_eq!(back, doc);
    }
}
