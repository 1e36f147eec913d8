use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug)]
pub struct EntityRef {
    pub name: String,
    pub image: Option<String>,
}

pub trait EntityDirectory {
    fn resolve(&self, id: &str) -> Option<EntityRef>;
}

pub struct NullDirectory;

impl EntityDirectory for NullDirectory {
    fn resolve(&self, _id: &str) -> Option<EntityRef> {
        None
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawEntity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
}

pub struct FileDirectory {
    entities: HashMap<String, RawEntity>,
}

impl FileDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read actor directory {}", path.display()))?;
        let entities: HashMap<String, RawEntity> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid actor directory JSON in {}", path.display()))?;

        Ok(Self { entities })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityDirectory for FileDirectory {
    fn resolve(&self, id: &str) -> Option<EntityRef> {
        self.entities.get(id).map(|entity| EntityRef {
            name: if entity.name.is_empty() {
                id.to_string()
            } else {
                entity.name.clone()
            },
            image: entity.image.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_from(raw: &str) -> FileDirectory {
        FileDirectory {
            entities: serde_json::from_str(raw).expect("valid directory JSON"),
        }
    }

    #[test]
    fn resolves_known_ids_and_rejects_unknown() {
        let directory =
            directory_from(r#"{"a1":{"name":"Viktor","image":"tokens/viktor.webp"}}"#);

        let entity = directory.resolve("a1").expect("known id resolves");
        assert_eq!(entity.name, "Viktor");
        assert_eq!(entity.image.as_deref(), Some("tokens/viktor.webp"));
        assert!(directory.resolve("missing").is_none());
    }

    #[test]
    fn empty_name_falls_back_to_id() {
        let directory = directory_from(r#"{"a2":{}}"#);
        assert_eq!(directory.resolve("a2").expect("resolves").name, "a2");
    }
}
