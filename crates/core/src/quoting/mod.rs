pub mod deliverable;
pub mod engine;

pub use deliverable::{validate_deliverable, DeliverableDraft};
pub use engine::{
    prepare, validate, DeliverablePayload, QuotationDraft, QuotationPayload, QuotationTerms,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field-keyed validation errors. An empty map signals a valid input;
/// validation failures are returned, never raised. Per-deliverable keys
/// take the form `deliverables[i].field`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Fold another map into this one, prefixing every key, e.g.
    /// `deliverables[2]` + `title` -> `deliverables[2].title`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: ErrorMap) {
        for (field, message) in other.0 {
            self.0.insert(format!("{prefix}.{field}"), message);
        }
    }
}
