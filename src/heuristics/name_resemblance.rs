//! Name resemblance between an architecture item and a compilation unit

use super::names::{is_contained, ratio, NamePreprocessor, PreprocessingMethod};
use super::{has_signatures, EvaluationContext, Heuristic};
use crate::computation::{Confidence, EndpointTuple, TraceResult};
use crate::model::{CodeItem, CodeItemKind};
use serde::{Deserialize, Serialize};

/// Which items and units a [`NameResemblance`] instance scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameScope {
    /// Components and interfaces without method signatures
    Component,
    /// Like `Component`, restricted to units outside any package
    ComponentWithoutPackage,
    /// Interfaces that declare method signatures
    Interface,
}

impl std::fmt::Display for NameScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Component => "component",
            Self::ComponentWithoutPackage => "component_without_package",
            Self::Interface => "interface",
        };
        write!(f, "{}", s)
    }
}

/// Scores a tuple by how well the item's name words are contained in the
/// name of the unit or one of its declared types.
///
/// The confidence is the word-count ratio of the best matching name; an
/// interface-typed code item matched under [`NameScope::Interface`] scores 1.
pub struct NameResemblance {
    id: String,
    scope: NameScope,
    preprocessor: NamePreprocessor,
}

impl NameResemblance {
    pub fn new(scope: NameScope, method: PreprocessingMethod) -> Self {
        Self::with_preprocessor(scope, NamePreprocessor::new(method))
    }

    pub fn with_preprocessor(scope: NameScope, preprocessor: NamePreprocessor) -> Self {
        Self {
            id: format!("name-resemblance-{}-{}", scope, preprocessor.method()),
            scope,
            preprocessor,
        }
    }

    pub fn scope(&self) -> NameScope {
        self.scope
    }

    fn applies_to(&self, tuple: &EndpointTuple) -> bool {
        let interface_scope = self.scope == NameScope::Interface;
        if interface_scope != has_signatures(tuple) {
            return false;
        }
        !(self.scope == NameScope::ComponentWithoutPackage && tuple.code.has_parent())
    }

    fn single(&self, item_words: &[String], fallback: Option<&[String]>, code_item: CodeItem<'_>) -> TraceResult<Confidence> {
        let code_words = self.preprocessor.words(code_item.name);
        if is_contained(item_words, &code_words) {
            if self.scope == NameScope::Interface && code_item.kind == CodeItemKind::Interface {
                return Confidence::of(1.0);
            }
            return Confidence::of(ratio(item_words, &code_words));
        }
        match fallback {
            Some(stripped) if is_contained(stripped, &code_words) => Confidence::of(ratio(stripped, &code_words)),
            _ => Ok(Confidence::unset()),
        }
    }
}

/// `IOrderService` → `OrderService`
fn strip_interface_prefix(name: &str) -> Option<&str> {
    let rest = name.strip_prefix('I')?;
    rest.chars().next().filter(|c| c.is_uppercase()).map(|_| rest)
}

impl Heuristic for NameResemblance {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, tuple: &EndpointTuple, _context: &EvaluationContext<'_>) -> TraceResult<Confidence> {
        if !self.applies_to(tuple) {
            return Ok(Confidence::unset());
        }
        let item_words = self.preprocessor.words(&tuple.architecture.name);
        let fallback = if self.scope == NameScope::Interface {
            strip_interface_prefix(&tuple.architecture.name).map(|n| self.preprocessor.words(n))
        } else {
            None
        };

        let mut best = Confidence::unset();
        for code_item in tuple.code.all_data_types_and_self() {
            let confidence = self.single(&item_words, fallback.as_deref(), code_item)?;
            if confidence > best {
                best = confidence;
            }
        }
        Ok(best)
    }
}
