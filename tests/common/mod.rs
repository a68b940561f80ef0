//! Common fixtures for archtrace integration tests
//!
//! Small hand-built models whose expected links are easy to reason about,
//! plus helpers to write them to disk for loader and CLI-style tests.

#![allow(dead_code)]

use archtrace::{
    ArchitectureItem, ArchitectureModel, CodeCompilationUnit, CodeModel, CodePackage, Confidence, DataType,
    EndpointTuple, Evaluation, EvaluationContext, Heuristic, HeuristicKind, TraceResult,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One component, two units: the name matches only `OrderService`
pub fn order_service_models() -> (ArchitectureModel, CodeModel) {
    let architecture = ArchitectureModel::new(vec![ArchitectureItem::component("c1", "OrderService")]).unwrap();
    let code = CodeModel::new(
        vec![
            CodeCompilationUnit::new("u1", "OrderService").with_path(["shop"]),
            CodeCompilationUnit::new("u2", "Invoice").with_path(["shop", "billing"]),
        ],
        Vec::new(),
    )
    .unwrap();
    (architecture, code)
}

/// A small shop with packages, companions and an inheritance chain
pub fn shop_models() -> (ArchitectureModel, CodeModel) {
    let architecture = ArchitectureModel::new(vec![
        ArchitectureItem::component("c-orders", "Orders").with_component_type("BasicComponent"),
        ArchitectureItem::component("c-billing", "Billing"),
        ArchitectureItem::interface("i-payments", "IPaymentGateway", vec!["charge(amount)".into()]),
    ])
    .unwrap();
    let code = CodeModel::new(
        vec![
            CodeCompilationUnit::new("u-orders", "Orders")
                .with_path(["shop", "orders"])
                .in_package("p-orders")
                .with_type(DataType::class("Orders")),
            CodeCompilationUnit::new("u-orders-test", "OrdersTest")
                .with_path(["shop", "orders"])
                .in_package("p-orders")
                .with_type(DataType::class("OrdersTest")),
            CodeCompilationUnit::new("u-bulk", "BulkProcessor")
                .with_path(["shop", "orders"])
                .in_package("p-orders")
                .with_type(DataType::class("BulkProcessor").extending("Orders")),
            CodeCompilationUnit::new("u-invoice", "Invoice")
                .with_path(["shop", "billing"])
                .in_package("p-billing")
                .with_type(DataType::class("Invoice")),
            CodeCompilationUnit::new("u-gateway", "PaymentGateway")
                .with_path(["shop", "payments"])
                .with_type(DataType::interface("PaymentGateway")),
            CodeCompilationUnit::new("u-util", "StringUtil").with_path(["shop", "common"]),
        ],
        vec![CodePackage::new("p-orders", "orders"), CodePackage::new("p-billing", "billing")],
    )
    .unwrap();
    (architecture, code)
}

/// Root confidence of (item, unit), looked up by ids
pub fn root_confidence(evaluation: &Evaluation, item: &str, unit: &str) -> Confidence {
    evaluation
        .repo()
        .tuples()
        .iter()
        .find(|t| t.architecture.id.as_str() == item && t.code.id.as_str() == unit)
        .map(|t| evaluation.root_result().get(t))
        .unwrap_or_default()
}

/// Write `contents` to `name` inside `dir` and return the path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Journal of heuristic calls, shared across threads
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn first(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn last(&self, entry: &str) -> Option<usize> {
        self.entries().iter().rposition(|e| e == entry)
    }
}

/// Heuristic that records every call and scores a constant
pub struct Recording {
    pub id: String,
    pub value: Option<f64>,
    pub kind: HeuristicKind,
    pub log: CallLog,
}

impl Recording {
    pub fn new(id: &str, value: Option<f64>, log: &CallLog) -> Self {
        Self {
            id: id.to_string(),
            value,
            kind: HeuristicKind::Standalone,
            log: log.clone(),
        }
    }

    /// A recording heuristic that must declare a base dependency
    pub fn dependent(id: &str, value: Option<f64>, log: &CallLog) -> Self {
        Self {
            kind: HeuristicKind::Dependent,
            ..Self::new(id, value, log)
        }
    }
}

impl Heuristic for Recording {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> HeuristicKind {
        self.kind
    }

    fn evaluate(&self, _: &EndpointTuple, _: &EvaluationContext<'_>) -> TraceResult<Confidence> {
        self.log.record(&self.id);
        match self.value {
            Some(v) => Confidence::of(v),
            None => Ok(Confidence::unset()),
        }
    }
}
