//! Fitted decision trees evaluated at inference time

use crate::error::{CreditError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with per-class sample weights (counts or fractions)
    Leaf { distribution: Vec<f64> },
    /// Internal node; `x[feature_idx] <= threshold` goes left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(distribution: Vec<f64>) -> Self {
        TreeNode::Leaf { distribution }
    }

    pub fn split(feature_idx: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            feature_idx,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// A single fitted classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Walk to the leaf for `x` and return its normalised class distribution
    pub fn predict_distribution(&self, x: ArrayView1<f64>) -> Result<Vec<f64>> {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { distribution } => {
                    let total: f64 = distribution.iter().sum();
                    if !(total > 0.0) {
                        return Err(CreditError::Transform("tree leaf has no samples".to_string()));
                    }
                    return Ok(distribution.iter().map(|w| w / total).collect());
                }
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    let value = x.get(*feature_idx).ok_or_else(|| {
                        CreditError::Transform(format!(
                            "split on feature {} but vector has {}",
                            feature_idx,
                            x.len()
                        ))
                    })?;
                    node = if *value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Structural check: every leaf has `n_classes` non-negative weights with
    /// a positive total, every split references a feature below `n_features`.
    pub fn check(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(format!(
                            "leaf has {} classes, expected {}",
                            distribution.len(),
                            n_classes
                        ));
                    }
                    if distribution.iter().any(|w| !w.is_finite() || *w < 0.0)
                        || !(distribution.iter().sum::<f64>() > 0.0)
                    {
                        return Err("leaf distribution is not a valid weight vector".to_string());
                    }
                }
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature_idx >= n_features {
                        return Err(format!(
                            "split on feature {} outside {} features",
                            feature_idx, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err("split threshold is NaN".to_string());
                    }
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    pub fn n_leaves(&self) -> usize {
        fn leaves_of(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves_of(left) + leaves_of(right),
            }
        }
        leaves_of(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump() -> DecisionTree {
        DecisionTree::new(TreeNode::split(
            0,
            0.5,
            TreeNode::leaf(vec![8.0, 2.0]),
            TreeNode::leaf(vec![1.0, 3.0]),
        ))
    }

    #[test]
    fn test_split_goes_left_on_equal() {
        let tree = stump();
        let d = tree.predict_distribution(array![0.5].view()).unwrap();
        assert_eq!(d, vec![0.8, 0.2]);
        let d = tree.predict_distribution(array![0.6].view()).unwrap();
        assert_eq!(d, vec![0.25, 0.75]);
    }

    #[test]
    fn test_check_rejects_out_of_range_feature() {
        assert!(stump().check(1, 2).is_ok());
        assert!(stump().check(0, 2).is_err());
        assert!(stump().check(1, 3).is_err());
    }

    #[test]
    fn test_depth_and_leaves() {
        let tree = stump();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn test_short_vector_is_transform_error() {
        let tree = DecisionTree::new(TreeNode::split(
            3,
            0.0,
            TreeNode::leaf(vec![1.0, 0.0]),
            TreeNode::leaf(vec![0.0, 1.0]),
        ));
        assert!(matches!(
            tree.predict_distribution(array![0.0].view()),
            Err(CreditError::Transform(_))
        ));
    }
}
