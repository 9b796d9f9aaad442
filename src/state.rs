//! Local state file and desired-state manifest
//!
//! The manifest (YAML) names each managed resource and its configured
//! attributes; the state file (JSON) records what the last run left behind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// One resource as declared in the manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DesiredResource {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: BTreeMap<String, DesiredResource>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// One resource as recorded after the last apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

impl State {
    /// Load state, starting empty when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading state {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing state {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing state {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }

    /// Record a resource; an empty id removes it
    pub fn put(&mut self, name: &str, type_name: &str, id: &str, attributes: Map<String, Value>) {
        if id.is_empty() {
            self.resources.remove(name);
            return;
        }
        self.resources.insert(
            name.to_string(),
            ResourceState {
                type_name: type_name.to_string(),
                id: id.to_string(),
                attributes,
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<ResourceState> {
        self.resources.remove(name)
    }
}
