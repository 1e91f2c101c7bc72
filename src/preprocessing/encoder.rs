//! Categorical encoders: ordinal rank substitution and one-hot expansion

use std::collections::HashMap;

/// Maps an ordinal code to its learned rank
#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    field: String,
    ranks: HashMap<String, f64>,
    unknown_rank: f64,
}

impl OrdinalEncoder {
    pub fn new(field: impl Into<String>, ranks: impl IntoIterator<Item = (String, i64)>, unknown_rank: f64) -> Self {
        Self {
            field: field.into(),
            ranks: ranks.into_iter().map(|(code, rank)| (code, rank as f64)).collect(),
            unknown_rank,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Learned rank, or the unknown sentinel for unmapped codes
    #[inline]
    pub fn encode(&self, code: &str) -> f64 {
        self.ranks.get(code).copied().unwrap_or(self.unknown_rank)
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.ranks.contains_key(code)
    }
}

/// One column per vocabulary entry; out-of-vocabulary values encode to all zeros
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    field: String,
    categories: Vec<String>,
    index: HashMap<String, usize>,
}

impl OneHotEncoder {
    /// Returns `None` if the vocabulary repeats a category
    pub fn new(field: impl Into<String>, categories: Vec<String>) -> Option<Self> {
        let mut index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            if index.insert(category.clone(), i).is_some() {
                return None;
            }
        }
        Some(Self {
            field: field.into(),
            categories,
            index,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    /// Position of the value in the vocabulary
    #[inline]
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Dense one-hot row for a value
    pub fn encode(&self, value: &str) -> Vec<f64> {
        let mut row = vec![0.0; self.categories.len()];
        if let Some(i) = self.index_of(value) {
            row[i] = 1.0;
        }
        row
    }

    /// Category whose column is hot, `None` for an all-zero row
    pub fn decode(&self, row: &[f64]) -> Option<&str> {
        row.iter()
            .position(|&v| v > 0.5)
            .and_then(|i| self.categories.get(i))
            .map(String::as_str)
    }
}
