//! Feature preprocessing
//!
//! Reproduces the training-time transform exactly:
//! - Numeric fields: z-score scaling with fitted mean/std
//! - Ordinal fields: code → rank substitution, unknown codes → sentinel rank
//! - Nominal fields: one-hot expansion over the fitted vocabulary
//!
//! Output columns follow the order recorded in [`FittedParameters`].

mod encoder;
mod params;
mod pipeline;
mod scaler;

pub use encoder::{OneHotEncoder, OrdinalEncoder};
pub use params::{
    FittedParameters, NominalVocabulary, NumericStats, OrdinalMapping, DEFAULT_UNKNOWN_RANK,
};
pub use pipeline::Preprocessor;
pub use scaler::{StandardScaler, STD_EPSILON};
