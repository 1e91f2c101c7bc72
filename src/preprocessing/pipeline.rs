//! Record → feature vector transform with training column parity
//!
//! The preprocessor is compiled once per artifact: every declared column is
//! resolved to its source field up front, so any disagreement between the
//! schema and the fitted parameters fails at load time instead of silently
//! corrupting predictions.

use super::encoder::{OneHotEncoder, OrdinalEncoder};
use super::params::{one_hot_column, FittedParameters};
use super::scaler::StandardScaler;
use crate::error::{CreditError, Result};
use crate::schema::{CreditRecord, FeatureSchema, FieldKind, FieldValue};
use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1, Axis};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct NumericInput {
    field: String,
    scaler: StandardScaler,
}

/// Where one output column takes its value from
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnSource {
    Numeric(usize),
    Ordinal(usize),
    OneHot { encoder: usize, category: usize },
}

/// Compiled, immutable feature transform
#[derive(Debug, Clone)]
pub struct Preprocessor {
    schema: Arc<FeatureSchema>,
    columns: Vec<String>,
    plan: Vec<ColumnSource>,
    numeric: Vec<NumericInput>,
    ordinal: Vec<OrdinalEncoder>,
    nominal: Vec<OneHotEncoder>,
    /// Output column of each (nominal encoder, category)
    one_hot_columns: Vec<Vec<usize>>,
}

fn skew(msg: String) -> CreditError {
    CreditError::Transform(msg)
}

impl Preprocessor {
    /// Compile the transform, validating the fitted parameters against the schema
    pub fn new(schema: Arc<FeatureSchema>, params: &FittedParameters) -> Result<Self> {
        let numeric = Self::numeric_inputs(&schema, params)?;
        let ordinal = Self::ordinal_encoders(&schema, params)?;
        let nominal = Self::one_hot_encoders(&schema, params)?;

        let mut lookup: HashMap<String, ColumnSource> = HashMap::new();
        for (i, input) in numeric.iter().enumerate() {
            lookup.insert(input.field.clone(), ColumnSource::Numeric(i));
        }
        for (i, enc) in ordinal.iter().enumerate() {
            lookup.insert(enc.field().to_string(), ColumnSource::Ordinal(i));
        }
        for (encoder, enc) in nominal.iter().enumerate() {
            for (category, value) in enc.categories().iter().enumerate() {
                let name = one_hot_column(enc.field(), value);
                if lookup
                    .insert(name.clone(), ColumnSource::OneHot { encoder, category })
                    .is_some()
                {
                    return Err(skew(format!("column '{}' is produced by more than one field", name)));
                }
            }
        }

        let mut plan = Vec::with_capacity(params.columns.len());
        let mut seen = HashSet::with_capacity(params.columns.len());
        let mut one_hot_columns: Vec<Vec<usize>> =
            nominal.iter().map(|enc| vec![usize::MAX; enc.n_categories()]).collect();

        for (col, name) in params.columns.iter().enumerate() {
            if !seen.insert(name.as_str()) {
                return Err(skew(format!("column '{}' is declared twice", name)));
            }
            let source = lookup
                .get(name)
                .copied()
                .ok_or_else(|| skew(format!("declared column '{}' has no source field", name)))?;
            if let ColumnSource::OneHot { encoder, category } = source {
                one_hot_columns[encoder][category] = col;
            }
            plan.push(source);
        }

        if let Some(missing) = lookup.keys().find(|name| !seen.contains(name.as_str())) {
            return Err(skew(format!(
                "column '{}' is derivable from the schema but not declared",
                missing
            )));
        }

        Ok(Self {
            schema,
            columns: params.columns.clone(),
            plan,
            numeric,
            ordinal,
            nominal,
            one_hot_columns,
        })
    }

    fn numeric_inputs(schema: &FeatureSchema, params: &FittedParameters) -> Result<Vec<NumericInput>> {
        for stats in &params.numeric {
            match schema.field(&stats.field).map(|f| &f.kind) {
                Some(FieldKind::Numeric(_)) => {}
                _ => return Err(skew(format!("scaler statistics for non-numeric field '{}'", stats.field))),
            }
        }
        schema
            .numeric_fields()
            .map(|field| {
                let stats = params
                    .stats(&field.name)
                    .ok_or_else(|| skew(format!("no scaler statistics for '{}'", field.name)))?;
                Ok(NumericInput {
                    field: field.name.clone(),
                    scaler: StandardScaler::new(stats.mean, stats.std),
                })
            })
            .collect()
    }

    fn ordinal_encoders(schema: &FeatureSchema, params: &FittedParameters) -> Result<Vec<OrdinalEncoder>> {
        if params.ordinal.len() != schema.ordinal_fields().count() {
            return Err(skew(format!(
                "{} ordinal mappings for {} ordinal fields",
                params.ordinal.len(),
                schema.ordinal_fields().count()
            )));
        }
        schema
            .ordinal_fields()
            .map(|field| {
                let mapping = params
                    .ordinal
                    .iter()
                    .find(|m| m.field == field.name)
                    .ok_or_else(|| skew(format!("no ordinal mapping for '{}'", field.name)))?;
                if let FieldKind::Ordinal(levels) = &field.kind {
                    let matches = mapping.ranks.len() == levels.len()
                        && levels
                            .iter()
                            .enumerate()
                            .all(|(rank, code)| mapping.ranks.get(code) == Some(&(rank as i64)));
                    if !matches {
                        return Err(skew(format!(
                            "ordinal mapping for '{}' disagrees with the schema",
                            field.name
                        )));
                    }
                }
                Ok(OrdinalEncoder::new(
                    field.name.clone(),
                    mapping.ranks.iter().map(|(k, v)| (k.clone(), *v)),
                    params.unknown_rank,
                ))
            })
            .collect()
    }

    fn one_hot_encoders(schema: &FeatureSchema, params: &FittedParameters) -> Result<Vec<OneHotEncoder>> {
        for vocab in &params.nominal {
            match schema.field(&vocab.field).map(|f| &f.kind) {
                Some(FieldKind::Nominal) => {}
                _ => return Err(skew(format!("vocabulary for non-nominal field '{}'", vocab.field))),
            }
        }
        schema
            .nominal_fields()
            .map(|field| {
                let vocab = params
                    .vocabulary(&field.name)
                    .ok_or_else(|| skew(format!("no vocabulary for '{}'", field.name)))?;
                OneHotEncoder::new(field.name.clone(), vocab.categories.clone())
                    .ok_or_else(|| skew(format!("vocabulary for '{}' repeats a category", field.name)))
            })
            .collect()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Output column names in classifier order
    pub fn feature_names(&self) -> &[String] {
        &self.columns
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Transform one validated record
    pub fn transform(&self, record: &CreditRecord) -> Result<Array1<f64>> {
        let mut row = Array1::zeros(self.columns.len());
        self.transform_into(record, row.view_mut())?;
        Ok(row)
    }

    /// Transform many records into a `(n_records, n_features)` matrix
    pub fn transform_batch(&self, records: &[CreditRecord]) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((records.len(), self.columns.len()));
        for (record, row) in records.iter().zip(matrix.axis_iter_mut(Axis(0))) {
            self.transform_into(record, row)?;
        }
        Ok(matrix)
    }

    fn transform_into(&self, record: &CreditRecord, mut out: ArrayViewMut1<f64>) -> Result<()> {
        let scaled = self
            .numeric
            .iter()
            .map(|input| Ok(input.scaler.transform(number(record, &input.field)?)))
            .collect::<Result<Vec<f64>>>()?;
        let ranks = self
            .ordinal
            .iter()
            .map(|enc| Ok(enc.encode(text(record, enc.field())?)))
            .collect::<Result<Vec<f64>>>()?;
        let hits = self
            .nominal
            .iter()
            .map(|enc| Ok(enc.index_of(text(record, enc.field())?)))
            .collect::<Result<Vec<Option<usize>>>>()?;

        for (value, source) in out.iter_mut().zip(&self.plan) {
            *value = match *source {
                ColumnSource::Numeric(i) => scaled[i],
                ColumnSource::Ordinal(i) => ranks[i],
                ColumnSource::OneHot { encoder, category } => {
                    if hits[encoder] == Some(category) {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
        }
        Ok(())
    }

    /// Recover each nominal field's category from an encoded vector.
    ///
    /// Fields whose one-hot segment is all zeros decode to `None`.
    pub fn decode_nominal(&self, features: ArrayView1<f64>) -> Result<Vec<(String, Option<String>)>> {
        if features.len() != self.columns.len() {
            return Err(skew(format!(
                "expected {} features, got {}",
                self.columns.len(),
                features.len()
            )));
        }
        Ok(self
            .nominal
            .iter()
            .zip(&self.one_hot_columns)
            .map(|(enc, cols)| {
                let segment: Vec<f64> = cols.iter().map(|&c| features[c]).collect();
                (enc.field().to_string(), enc.decode(&segment).map(str::to_string))
            })
            .collect())
    }

    /// Output columns belonging to a nominal field, in vocabulary order
    pub fn one_hot_columns(&self, field: &str) -> Option<&[usize]> {
        self.nominal
            .iter()
            .position(|enc| enc.field() == field)
            .map(|i| self.one_hot_columns[i].as_slice())
    }
}

fn number(record: &CreditRecord, field: &str) -> Result<f64> {
    match record.get(field) {
        Some(FieldValue::Number(v)) => Ok(*v),
        _ => Err(skew(format!("field '{}' missing or not numeric after validation", field))),
    }
}

fn text<'a>(record: &'a CreditRecord, field: &str) -> Result<&'a str> {
    match record.get(field) {
        Some(FieldValue::Text(s)) => Ok(s.as_str()),
        _ => Err(skew(format!("field '{}' missing or not a code after validation", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::params::{NominalVocabulary, NumericStats};
    use crate::schema::sample_application;

    fn params(schema: &FeatureSchema) -> FittedParameters {
        let numeric = schema
            .numeric_fields()
            .map(|f| NumericStats::new(f.name.clone(), 10.0, 2.0))
            .collect();
        let nominal = schema
            .nominal_fields()
            .map(|f| NominalVocabulary::new(f.name.clone(), ["X1", "X2"]))
            .collect();
        FittedParameters::from_parts(schema, numeric, nominal)
    }

    fn record() -> CreditRecord {
        let schema = FeatureSchema::credit();
        let mut r = sample_application();
        for f in schema.nominal_fields() {
            r.insert(f.name.clone(), "X2");
        }
        r
    }

    #[test]
    fn test_vector_width_and_segments() {
        let schema = Arc::new(FeatureSchema::credit());
        let pre = Preprocessor::new(schema.clone(), &params(&schema)).unwrap();
        let v = pre.transform(&record()).unwrap();

        assert_eq!(v.len(), 6 + 5 + 16);
        // Duration 12 with mean 10 / std 2
        assert!((v[0] - 1.0).abs() < 1e-12);
        // A12 → rank 1
        assert_eq!(v[6], 1.0);
        // first nominal field: X1 cold, X2 hot
        assert_eq!(v[11], 0.0);
        assert_eq!(v[12], 1.0);
    }

    #[test]
    fn test_missing_vocabulary_fails_fast() {
        let schema = Arc::new(FeatureSchema::credit());
        let mut p = params(&schema);
        p.nominal.retain(|v| v.field != "Housing");
        assert!(matches!(Preprocessor::new(schema, &p), Err(CreditError::Transform(_))));
    }

    #[test]
    fn test_undeclared_column_fails_fast() {
        let schema = Arc::new(FeatureSchema::credit());
        let mut p = params(&schema);
        p.columns.retain(|c| c != "Housing_X1");
        assert!(Preprocessor::new(schema, &p).is_err());
    }

    #[test]
    fn test_unknown_declared_column_fails_fast() {
        let schema = Arc::new(FeatureSchema::credit());
        let mut p = params(&schema);
        p.columns.push("Housing_X3".to_string());
        assert!(Preprocessor::new(schema, &p).is_err());
    }

    #[test]
    fn test_ordinal_mapping_must_match_schema() {
        let schema = Arc::new(FeatureSchema::credit());
        let mut p = params(&schema);
        p.ordinal[0].ranks.insert("A11".to_string(), 3);
        assert!(Preprocessor::new(schema, &p).is_err());
    }

    #[test]
    fn test_unvalidated_record_is_transform_error() {
        let schema = Arc::new(FeatureSchema::credit());
        let pre = Preprocessor::new(schema.clone(), &params(&schema)).unwrap();
        let mut r = record();
        r.remove("Credit amount");
        assert!(matches!(pre.transform(&r), Err(CreditError::Transform(_))));
    }

    #[test]
    fn test_batch_rows_match_single() {
        let schema = Arc::new(FeatureSchema::credit());
        let pre = Preprocessor::new(schema.clone(), &params(&schema)).unwrap();
        let a = record();
        let b = record().with("Job", "A999").with("Housing", "X1");
        let m = pre.transform_batch(&[a.clone(), b.clone()]).unwrap();

        assert_eq!(m.nrows(), 2);
        assert_eq!(m.row(0), pre.transform(&a).unwrap());
        assert_eq!(m.row(1), pre.transform(&b).unwrap());
    }
}
