//! Typed input models consumed by the engine
//!
//! Both models are produced by external extractors and are immutable once
//! built. A run shares them read-only across every computation node.

mod architecture;
mod code;

pub use architecture::{ArchitectureItem, ArchitectureModel, ItemId, ItemKind};
pub use code::{CodeCompilationUnit, CodeItem, CodeItemKind, CodeModel, CodePackage, DataType, UnitId};
