// ABOUTME: Versioned, JSON-compatible layout documents and their file persistence.
// ABOUTME: Loading checks the major version first and never yields a partially built tree.

use std::path::{Path, PathBuf};

use msplit_core::PaneId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LayoutError, SerializationError};
use crate::model::{Snapshot, TreeModel};
use crate::node::Node;

/// Version written into every saved layout
pub const LAYOUT_FORMAT_VERSION: &str = "1.0.0";

/// Serialized form of a tree model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub version: String,
    pub focused_pane_id: Option<PaneId>,
    pub root: Option<Node>,
}

/// Accept any version whose major component matches ours
pub fn check_version(version: &str) -> Result<(), SerializationError> {
    let supported = supported_version();
    let found =
        semver::Version::parse(version).map_err(|source| SerializationError::InvalidVersion {
            version: version.to_string(),
            source,
        })?;
    if found.major != supported.major {
        return Err(SerializationError::IncompatibleVersion {
            found: version.to_string(),
            supported: supported.major,
        });
    }
    Ok(())
}

fn supported_version() -> semver::Version {
    semver::Version::new(1, 0, 0)
}

impl LayoutDocument {
    pub fn from_model(model: &TreeModel) -> Self {
        let snapshot = model.snapshot();
        Self {
            version: LAYOUT_FORMAT_VERSION.to_string(),
            focused_pane_id: snapshot.focused().cloned(),
            root: snapshot.root().cloned(),
        }
    }

    /// Parse a document, rejecting incompatible versions before looking at the tree
    pub fn from_value(value: Value) -> Result<Self, SerializationError> {
        let version = value
            .get("version")
            .and_then(Value::as_str)
            .ok_or(SerializationError::MissingVersion)?;
        check_version(version)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value, SerializationError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_snapshot(self) -> Snapshot {
        Snapshot::new(self.root, self.focused_pane_id)
    }

    /// Validate and build a standalone model
    pub fn into_model(self) -> Result<TreeModel, SerializationError> {
        TreeModel::from_snapshot(self.into_snapshot()).map_err(|e| match e {
            LayoutError::Validation(errors) => SerializationError::InvalidTree(errors),
            other => SerializationError::InvalidTree(vec![other.to_string()]),
        })
    }

    /// Get the default layout file path (~/.local/state/multisplit/layout.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("multisplit").join("layout.json"))
    }

    /// Write to a sibling temp file, then rename over the target
    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn save_to_default(&self) -> Result<PathBuf, SerializationError> {
        let path = Self::default_path().ok_or(SerializationError::NoStatePath)?;
        self.save(&path)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, SerializationError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from default path, returns None if not found or invalid
    pub fn load_from_default() -> Option<Self> {
        let path = Self::default_path()?;
        Self::load(&path).ok()
    }
}

impl TreeModel {
    pub fn to_dict(&self) -> Result<Value, SerializationError> {
        LayoutDocument::from_model(self).to_value()
    }

    pub fn from_dict(value: &Value) -> Result<TreeModel, SerializationError> {
        LayoutDocument::from_value(value.clone())?.into_model()
    }
}
