//! Code model: compilation units, their nested data types and packages

use crate::computation::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Unique identifier of a compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Classification of a named code item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeItemKind {
    CompilationUnit,
    #[default]
    Class,
    Interface,
    Enum,
    Record,
    Other,
}

/// A data type declared inside a compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub name: String,
    #[serde(default)]
    pub kind: CodeItemKind,
    /// Names of the types this type extends or implements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
}

impl DataType {
    pub fn new(name: impl Into<String>, kind: CodeItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, CodeItemKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, CodeItemKind::Interface)
    }

    /// Declare a supertype (extends / implements)
    pub fn extending(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }
}

/// Borrowed view of a named code item, used for name matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeItem<'a> {
    pub name: &'a str,
    pub kind: CodeItemKind,
}

/// A code package (namespace / module directory)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodePackage {
    pub id: String,
    pub name: String,
}

impl CodePackage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A file-level code unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeCompilationUnit {
    pub id: UnitId,
    pub name: String,
    /// Directory segments containing the unit, outermost first
    #[serde(default)]
    pub path: Vec<String>,
    /// Id of the enclosing package, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub data_types: Vec<DataType>,
}

impl CodeCompilationUnit {
    pub fn new(id: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: Vec::new(),
            package: None,
            data_types: Vec::new(),
        }
    }

    pub fn with_path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = segments.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_package(mut self, package_id: impl Into<String>) -> Self {
        self.package = Some(package_id.into());
        self
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_types.push(data_type);
        self
    }

    pub fn path_elements(&self) -> &[String] {
        &self.path
    }

    /// Whether the unit lives inside a declared package
    pub fn has_parent(&self) -> bool {
        self.package.is_some()
    }

    /// The unit itself followed by every data type it declares
    pub fn all_data_types_and_self(&self) -> Vec<CodeItem<'_>> {
        std::iter::once(CodeItem {
            name: &self.name,
            kind: CodeItemKind::CompilationUnit,
        })
        .chain(self.data_types.iter().map(|t| CodeItem {
            name: &t.name,
            kind: t.kind,
        }))
        .collect()
    }

    /// Whether both units share the same enclosing package
    pub fn same_package(&self, other: &CodeCompilationUnit) -> bool {
        self.package == other.package
    }

    /// Whether any type of this unit extends a type declared in `other`
    pub fn inherits_from(&self, other: &CodeCompilationUnit) -> bool {
        self.data_types.iter().any(|t| {
            t.supertypes
                .iter()
                .any(|sup| other.data_types.iter().any(|o| &o.name == sup))
        })
    }
}

impl std::fmt::Display for CodeCompilationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.path.join("/"), self.name)
        }
    }
}

/// The code side of a run
#[derive(Debug, Clone, Default)]
pub struct CodeModel {
    units: Vec<Arc<CodeCompilationUnit>>,
    packages: Vec<CodePackage>,
    index: HashMap<UnitId, usize>,
}

impl CodeModel {
    /// Build a model from its units and packages.
    ///
    /// Unit ids must be unique and every unit's package must be declared.
    pub fn new(units: Vec<CodeCompilationUnit>, packages: Vec<CodePackage>) -> TraceResult<Self> {
        let package_ids: BTreeSet<&str> = packages.iter().map(|p| p.id.as_str()).collect();
        let mut index = HashMap::with_capacity(units.len());
        for (position, unit) in units.iter().enumerate() {
            if index.insert(unit.id.clone(), position).is_some() {
                return Err(TraceError::InvalidArgument(format!(
                    "duplicate compilation unit id '{}'",
                    unit.id
                )));
            }
            if let Some(package) = &unit.package {
                if !package_ids.contains(package.as_str()) {
                    return Err(TraceError::UnresolvedReference(format!(
                        "package '{}' of compilation unit '{}'",
                        package, unit.id
                    )));
                }
            }
        }
        Ok(Self {
            units: units.into_iter().map(Arc::new).collect(),
            packages,
            index,
        })
    }

    /// All compilation units that can be endpoints of a trace link
    pub fn endpoints(&self) -> &[Arc<CodeCompilationUnit>] {
        &self.units
    }

    pub fn packages(&self) -> &[CodePackage] {
        &self.packages
    }

    /// Names of all declared packages
    pub fn package_names(&self) -> BTreeSet<&str> {
        self.packages.iter().map(|p| p.name.as_str()).collect()
    }

    /// Look up a unit by id
    pub fn unit(&self, id: &UnitId) -> TraceResult<&Arc<CodeCompilationUnit>> {
        self.index
            .get(id)
            .map(|&position| &self.units[position])
            .ok_or_else(|| TraceError::UnresolvedReference(format!("compilation unit '{}'", id)))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// On-disk form of a code model
#[derive(Debug, Serialize, Deserialize)]
struct CodeDocument {
    units: Vec<CodeCompilationUnit>,
    #[serde(default)]
    packages: Vec<CodePackage>,
}

impl CodeModel {
    /// Parse a model from JSON of the form `{"units": [...], "packages": [...]}`
    pub fn from_json_str(json: &str) -> TraceResult<Self> {
        let document: CodeDocument = serde_json::from_str(json)?;
        Self::new(document.units, document.packages)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> TraceResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}
