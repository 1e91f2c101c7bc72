//! Field definitions for the credit application model

use super::{CreditRecord, FeatureField, NumericPolicy};

/// Registered name of the production credit pipeline
pub const CREDIT_MODEL_NAME: &str = "RDF_score_pipeline";

pub const NUMERIC_FIELDS: [&str; 6] = [
    "Duration in month",
    "Credit amount",
    "Installment rate in percentage of disposable income",
    "Age in years",
    "Number of existing credits at this bank",
    "Number of people being liable to provide maintenance for",
];

pub const ORDINAL_FIELDS: [&str; 5] = [
    "Status of existing checking account",
    "Credit history",
    "Savings account/bonds",
    "Present employment since",
    "Job",
];

pub const NOMINAL_FIELDS: [&str; 8] = [
    "Purpose",
    "Personal status and sex",
    "Other debtors / guarantors",
    "Property",
    "Other installment plans",
    "Housing",
    "Telephone",
    "foreign worker",
];

pub(super) fn credit_fields() -> Vec<FeatureField> {
    vec![
        FeatureField::numeric(NUMERIC_FIELDS[0], NumericPolicy::range(1.0, 120.0).integer()),
        FeatureField::numeric(NUMERIC_FIELDS[1], NumericPolicy::positive()),
        FeatureField::numeric(NUMERIC_FIELDS[2], NumericPolicy::range(1.0, 4.0).integer()),
        FeatureField::numeric(NUMERIC_FIELDS[3], NumericPolicy::range(18.0, 100.0).integer()),
        FeatureField::numeric(NUMERIC_FIELDS[4], NumericPolicy::range(1.0, 4.0).integer()),
        FeatureField::numeric(NUMERIC_FIELDS[5], NumericPolicy::range(1.0, 2.0).integer()),
        // < 0 DM, 0..200 DM, >= 200 DM, no checking account
        FeatureField::ordinal(ORDINAL_FIELDS[0], ["A11", "A12", "A13", "A14"]),
        FeatureField::ordinal(ORDINAL_FIELDS[1], ["A30", "A31", "A32", "A33", "A34"]),
        FeatureField::ordinal(ORDINAL_FIELDS[2], ["A61", "A62", "A63", "A64", "A65"]),
        FeatureField::ordinal(ORDINAL_FIELDS[3], ["A71", "A72", "A73", "A74", "A75"]),
        FeatureField::ordinal(ORDINAL_FIELDS[4], ["A171", "A172", "A173", "A174"]),
        FeatureField::nominal(NOMINAL_FIELDS[0]),
        FeatureField::nominal(NOMINAL_FIELDS[1]),
        FeatureField::nominal(NOMINAL_FIELDS[2]),
        FeatureField::nominal(NOMINAL_FIELDS[3]),
        FeatureField::nominal(NOMINAL_FIELDS[4]),
        FeatureField::nominal(NOMINAL_FIELDS[5]),
        FeatureField::nominal(NOMINAL_FIELDS[6]),
        FeatureField::nominal(NOMINAL_FIELDS[7]),
    ]
}

/// The reference application shipped with the service's request docs
pub fn sample_application() -> CreditRecord {
    CreditRecord::new()
        .with("Duration in month", 12i64)
        .with("Credit amount", 5000.0)
        .with("Installment rate in percentage of disposable income", 2i64)
        .with("Age in years", 35i64)
        .with("Number of existing credits at this bank", 1i64)
        .with("Number of people being liable to provide maintenance for", 1i64)
        .with("Status of existing checking account", "A12")
        .with("Credit history", "A32")
        .with("Savings account/bonds", "A61")
        .with("Present employment since", "A73")
        .with("Job", "A173")
        .with("Purpose", "A43")
        .with("Personal status and sex", "A93")
        .with("Other debtors / guarantors", "A101")
        .with("Property", "A121")
        .with("Other installment plans", "A143")
        .with("Housing", "A152")
        .with("Telephone", "A192")
        .with("foreign worker", "A201")
}
