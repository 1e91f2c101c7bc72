//! Fitted transformation parameters shipped inside a model artifact

use crate::schema::{FeatureSchema, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rank assigned to ordinal codes missing from the training mapping
pub const DEFAULT_UNKNOWN_RANK: f64 = -1.0;

fn default_unknown_rank() -> f64 {
    DEFAULT_UNKNOWN_RANK
}

/// Training-time statistics of one numeric field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub field: String,
    pub mean: f64,
    pub std: f64,
}

impl NumericStats {
    pub fn new(field: impl Into<String>, mean: f64, std: f64) -> Self {
        Self {
            field: field.into(),
            mean,
            std,
        }
    }
}

/// Learned code → rank table of one ordinal field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalMapping {
    pub field: String,
    pub ranks: BTreeMap<String, i64>,
}

/// One-hot vocabulary of one nominal field; order defines column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalVocabulary {
    pub field: String,
    pub categories: Vec<String>,
}

impl NominalVocabulary {
    pub fn new<S: Into<String>>(field: impl Into<String>, categories: impl IntoIterator<Item = S>) -> Self {
        Self {
            field: field.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Column name of one category, matching the training frame's dummy columns
    pub fn column_name(&self, category: &str) -> String {
        one_hot_column(&self.field, category)
    }
}

pub(crate) fn one_hot_column(field: &str, category: &str) -> String {
    format!("{}_{}", field, category)
}

/// Everything the training job learned about the input space.
///
/// `columns` is the exact feature order the classifier was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedParameters {
    pub columns: Vec<String>,
    pub numeric: Vec<NumericStats>,
    pub ordinal: Vec<OrdinalMapping>,
    pub nominal: Vec<NominalVocabulary>,
    #[serde(default = "default_unknown_rank")]
    pub unknown_rank: f64,
}

impl FittedParameters {
    /// Assemble parameters in canonical column order: numeric, ordinal, then
    /// every nominal field's vocabulary in the order given.
    ///
    /// Ordinal mappings are taken from the schema's rank tables.
    pub fn from_parts(
        schema: &FeatureSchema,
        numeric: Vec<NumericStats>,
        nominal: Vec<NominalVocabulary>,
    ) -> Self {
        let ordinal: Vec<OrdinalMapping> = schema
            .ordinal_fields()
            .filter_map(|field| match &field.kind {
                FieldKind::Ordinal(levels) => Some(OrdinalMapping {
                    field: field.name.clone(),
                    ranks: levels
                        .iter()
                        .enumerate()
                        .map(|(rank, code)| (code.clone(), rank as i64))
                        .collect(),
                }),
                _ => None,
            })
            .collect();

        let mut columns: Vec<String> = numeric.iter().map(|s| s.field.clone()).collect();
        columns.extend(ordinal.iter().map(|m| m.field.clone()));
        for vocab in &nominal {
            columns.extend(vocab.categories.iter().map(|c| vocab.column_name(c)));
        }

        Self {
            columns,
            numeric,
            ordinal,
            nominal,
            unknown_rank: DEFAULT_UNKNOWN_RANK,
        }
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn vocabulary(&self, field: &str) -> Option<&NominalVocabulary> {
        self.nominal.iter().find(|v| v.field == field)
    }

    pub fn stats(&self, field: &str) -> Option<&NumericStats> {
        self.numeric.iter().find(|s| s.field == field)
    }
}
