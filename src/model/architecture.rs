//! Architecture model: components and interfaces

use crate::computation::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Unique identifier of an architecture item
///
/// Serializes as a plain string (the model element id of the source model).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What kind of design element an item is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Building block of the architecture
    Component {
        /// Type as declared in the meta model (e.g. "BasicComponent")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component_type: Option<String>,
    },
    /// Provided or required interface of a component
    Interface {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        method_signatures: Vec<String>,
    },
}

/// A component or interface of the architecture model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchitectureItem {
    pub id: ItemId,
    pub name: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ArchitectureItem {
    /// Create a component without declared type information
    pub fn component(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Component {
                component_type: None,
            },
        }
    }

    /// Create an interface with the given method signatures
    pub fn interface(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        method_signatures: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Interface { method_signatures },
        }
    }

    /// Set the declared component type (no effect on interfaces)
    pub fn with_component_type(mut self, ty: impl Into<String>) -> Self {
        if let ItemKind::Component { component_type } = &mut self.kind {
            *component_type = Some(ty.into());
        }
        self
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, ItemKind::Component { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ItemKind::Interface { .. })
    }

    pub fn component_type(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Component { component_type } => component_type.as_deref(),
            ItemKind::Interface { .. } => None,
        }
    }

    /// Method signatures of an interface; empty for components
    pub fn method_signatures(&self) -> &[String] {
        match &self.kind {
            ItemKind::Interface { method_signatures } => method_signatures,
            ItemKind::Component { .. } => &[],
        }
    }
}

impl std::fmt::Display for ArchitectureItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ItemKind::Component { .. } => write!(f, "Component: {}", self.name),
            ItemKind::Interface { .. } => write!(f, "Interface: {}", self.name),
        }
    }
}

/// The architecture side of a run
///
/// Item order is preserved; it determines the outer order of the candidate
/// tuples and therefore the order of exported links.
#[derive(Debug, Clone, Default)]
pub struct ArchitectureModel {
    items: Vec<Arc<ArchitectureItem>>,
    index: HashMap<ItemId, usize>,
}

impl ArchitectureModel {
    /// Build a model from its items. Item ids must be unique.
    pub fn new(items: Vec<ArchitectureItem>) -> TraceResult<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(TraceError::InvalidArgument(format!(
                    "duplicate architecture item id '{}'",
                    item.id
                )));
            }
        }
        Ok(Self {
            items: items.into_iter().map(Arc::new).collect(),
            index,
        })
    }

    /// All items that can be endpoints of a trace link
    pub fn endpoints(&self) -> &[Arc<ArchitectureItem>] {
        &self.items
    }

    /// Look up an item by id
    pub fn item(&self, id: &ItemId) -> TraceResult<&Arc<ArchitectureItem>> {
        self.index
            .get(id)
            .map(|&position| &self.items[position])
            .ok_or_else(|| TraceError::UnresolvedReference(format!("architecture item '{}'", id)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// On-disk form of an architecture model
#[derive(Debug, Serialize, Deserialize)]
struct ArchitectureDocument {
    items: Vec<ArchitectureItem>,
}

impl ArchitectureModel {
    /// Parse a model from JSON of the form `{"items": [...]}`
    pub fn from_json_str(json: &str) -> TraceResult<Self> {
        let document: ArchitectureDocument = serde_json::from_str(json)?;
        Self::new(document.items)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> TraceResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}
