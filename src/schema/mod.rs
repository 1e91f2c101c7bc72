//! Feature schema
//!
//! Fixed description of the input fields the classifier was trained on:
//! - Numeric fields with policy bounds checked on every request
//! - Ordinal fields with a fixed code → rank table
//! - Nominal fields, one-hot expanded over a vocabulary learned in training
//!
//! Unknown ordinal/nominal codes are not a validation failure; the
//! preprocessor maps them to well-defined "unknown" encodings.

mod credit;
mod record;

pub use credit::{sample_application, CREDIT_MODEL_NAME, NOMINAL_FIELDS, NUMERIC_FIELDS, ORDINAL_FIELDS};
pub use record::{CreditRecord, FieldValue};

use crate::error::{CreditError, FieldViolation, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Accepted range for a numeric field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericPolicy {
    pub lower: f64,
    pub lower_inclusive: bool,
    pub upper: Option<f64>,
    /// Value must be a whole number
    pub integer: bool,
}

impl NumericPolicy {
    /// Closed interval `[min, max]`
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            lower: min,
            lower_inclusive: true,
            upper: Some(max),
            integer: false,
        }
    }

    /// Strictly positive, unbounded above
    pub fn positive() -> Self {
        Self {
            lower: 0.0,
            lower_inclusive: false,
            upper: None,
            integer: false,
        }
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Returns the reason the value is rejected, if any
    pub fn check(&self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return Some("must be a finite number".to_string());
        }
        if self.integer && value.fract() != 0.0 {
            return Some("must be an integer".to_string());
        }
        if self.lower_inclusive && value < self.lower {
            return Some(format!("must be >= {}", self.lower));
        }
        if !self.lower_inclusive && value <= self.lower {
            return Some(format!("must be > {}", self.lower));
        }
        if let Some(upper) = self.upper {
            if value > upper {
                return Some(format!("must be <= {}", upper));
            }
        }
        None
    }
}

/// Kind of a schema field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Numeric(NumericPolicy),
    /// Ordered codes; rank = position in the list
    Ordinal(Vec<String>),
    Nominal,
}

/// One named input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureField {
    pub name: String,
    pub kind: FieldKind,
}

impl FeatureField {
    pub fn numeric(name: impl Into<String>, policy: NumericPolicy) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric(policy),
        }
    }

    pub fn ordinal<S: Into<String>>(name: impl Into<String>, levels: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Ordinal(levels.into_iter().map(Into::into).collect()),
        }
    }

    pub fn nominal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Nominal,
        }
    }

    /// Rank of an ordinal code, `None` for unknown codes or non-ordinal fields
    pub fn rank_of(&self, code: &str) -> Option<usize> {
        match &self.kind {
            FieldKind::Ordinal(levels) => levels.iter().position(|l| l == code),
            _ => None,
        }
    }
}

/// Immutable description of every accepted input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    fields: Vec<FeatureField>,
    /// Known-good record used for post-load smoke tests
    #[serde(default)]
    sample: Option<CreditRecord>,
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicate field names
    pub fn new(fields: Vec<FeatureField>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CreditError::Config(format!(
                    "duplicate schema field '{}'",
                    field.name
                )));
            }
            if let FieldKind::Ordinal(levels) = &field.kind {
                if levels.is_empty() {
                    return Err(CreditError::Config(format!(
                        "ordinal field '{}' has no levels",
                        field.name
                    )));
                }
            }
        }
        Ok(Self {
            fields,
            sample: None,
        })
    }

    /// Attach a known-good record; it must pass validation
    pub fn with_sample(mut self, sample: CreditRecord) -> Result<Self> {
        self.validate(&sample)?;
        self.sample = Some(sample);
        Ok(self)
    }

    /// The 19-field credit application schema
    pub fn credit() -> Self {
        Self {
            fields: credit::credit_fields(),
            sample: Some(credit::sample_application()),
        }
    }

    pub fn sample_record(&self) -> Option<&CreditRecord> {
        self.sample.as_ref()
    }

    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FeatureField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &FeatureField> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Numeric(_)))
    }

    pub fn ordinal_fields(&self) -> impl Iterator<Item = &FeatureField> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Ordinal(_)))
    }

    pub fn nominal_fields(&self) -> impl Iterator<Item = &FeatureField> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Nominal))
    }

    /// Check presence, type and numeric bounds of every field.
    ///
    /// All violations are collected into a single `CreditError::Validation`.
    /// Categorical codes outside the known levels/vocabulary are accepted.
    pub fn validate(&self, record: &CreditRecord) -> Result<()> {
        let violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|field| Self::check_field(field, record))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CreditError::Validation { violations })
        }
    }

    fn check_field(field: &FeatureField, record: &CreditRecord) -> Option<FieldViolation> {
        let value = match record.get(&field.name) {
            None | Some(FieldValue::Null) => {
                return Some(FieldViolation::new(&field.name, "field is required"))
            }
            Some(v) => v,
        };

        match (&field.kind, value) {
            (FieldKind::Numeric(policy), FieldValue::Number(v)) => policy
                .check(*v)
                .map(|reason| FieldViolation::new(&field.name, reason)),
            (FieldKind::Numeric(_), _) => {
                Some(FieldViolation::new(&field.name, "expected a number"))
            }
            (FieldKind::Ordinal(_) | FieldKind::Nominal, FieldValue::Text(code)) => {
                if code.trim().is_empty() {
                    Some(FieldViolation::new(&field.name, "code must not be empty"))
                } else {
                    None
                }
            }
            (FieldKind::Ordinal(_) | FieldKind::Nominal, _) => {
                Some(FieldViolation::new(&field.name, "expected a string code"))
            }
        }
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::credit()
    }
}
