//! Regression model artifacts and their evaluation.
//!
//! The runtime only evaluates models; it never fits them. Two shapes are
//! supported:
//! - `linear`: `y = intercept + Σ coefficients[i] * x[i]`
//! - `forest`: mean over regression trees (a single tree is a forest of one)
//!
//! Tree nodes are stored flat, root first. A split sends `x[feature] <= threshold`
//! to `left`, everything else to `right`. Children always come after their
//! parent, so traversal terminates.

use serde::{Deserialize, Serialize};

pub const ARTIFACT_FORMAT: &str = "traffic-model";
pub const ARTIFACT_VERSION: u32 = 1;

/// A persisted model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub version: u32,
    /// Width of the feature vector the model was trained on.
    pub n_features: usize,
    /// Informational column names, in feature order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub model: RegressionModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    Forest(TreeEnsemble),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl ModelArtifact {
    /// Check that the artifact is one this runtime can evaluate.
    ///
    /// This does not compare `n_features` to the caller's feature vector; a
    /// width mismatch only surfaces when a prediction is attempted.
    pub fn validate(&self) -> Result<(), String> {
        if self.format != ARTIFACT_FORMAT {
            return Err(format!(
                "Unsupported model format '{}' (expected '{ARTIFACT_FORMAT}').",
                self.format
            ));
        }
        if self.version != ARTIFACT_VERSION {
            return Err(format!(
                "Unsupported model version {} (this build reads version {ARTIFACT_VERSION}).",
                self.version
            ));
        }
        if self.n_features == 0 {
            return Err("Model declares zero input features.".to_string());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(format!(
                    "Model lists {} feature names but declares n_features={}.",
                    names.len(),
                    self.n_features
                ));
            }
        }
        self.model.validate(self.n_features)
    }
}

impl RegressionModel {
    pub fn display_name(&self) -> String {
        match self {
            RegressionModel::Linear(_) => "linear".to_string(),
            RegressionModel::Forest(f) if f.trees.len() == 1 => "tree".to_string(),
            RegressionModel::Forest(f) => format!("forest ({} trees)", f.trees.len()),
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            RegressionModel::Linear(m) => {
                if m.coefficients.len() != n_features {
                    return Err(format!(
                        "Linear model has {} coefficients but declares n_features={n_features}.",
                        m.coefficients.len()
                    ));
                }
                if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("Linear model has non-finite parameters.".to_string());
                }
                Ok(())
            }
            RegressionModel::Forest(f) => {
                if f.trees.is_empty() {
                    return Err("Forest model has no trees.".to_string());
                }
                for (i, tree) in f.trees.iter().enumerate() {
                    tree.validate(n_features).map_err(|e| format!("Tree {i}: {e}"))?;
                }
                Ok(())
            }
        }
    }

    /// Evaluate the model on `x`.
    ///
    /// # Panics
    /// Panics if `x` is shorter than the validated `n_features`. Callers check
    /// the width first.
    pub fn predict(&self, x: &[f64]) -> f64 {
        match self {
            RegressionModel::Linear(m) => {
                m.intercept + m.coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>()
            }
            RegressionModel::Forest(f) => {
                let sum: f64 = f.trees.iter().map(|t| t.predict(x)).sum();
                sum / f.trees.len() as f64
            }
        }
    }
}

impl RegressionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(format!("node {idx} splits on feature {feature} (n_features={n_features})"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} points to invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {idx} has a non-finite value"));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    fn leaf(value: f64) -> TreeNode {
        TreeNode::Leaf { value }
    }

    fn artifact(model: RegressionModel) -> ModelArtifact {
        ModelArtifact {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            n_features: 5,
            feature_names: None,
            model,
        }
    }

    #[test]
    fn linear_is_intercept_plus_dot_product() {
        let m = RegressionModel::Linear(LinearModel {
            intercept: 3.0,
            coefficients: vec![0.5, 0.0, 0.0, 0.0, 2.0],
        });
        assert!((m.predict(&[10.0, 15.0, 6.0, 2023.0, 1.0]) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn tree_routes_left_on_equal_threshold() {
        let tree = RegressionTree {
            nodes: vec![split(0, 8.0, 1, 2), leaf(5.0), leaf(20.0)],
        };
        assert_eq!(tree.predict(&[8.0, 0.0, 0.0, 0.0, 0.0]), 5.0);
        assert_eq!(tree.predict(&[8.5, 0.0, 0.0, 0.0, 0.0]), 20.0);
    }

    #[test]
    fn forest_averages_trees() {
        let m = RegressionModel::Forest(TreeEnsemble {
            trees: vec![
                RegressionTree { nodes: vec![leaf(10.0)] },
                RegressionTree {
                    nodes: vec![split(4, 1.5, 1, 2), leaf(20.0), leaf(40.0)],
                },
            ],
        });
        assert_eq!(m.predict(&[0.0, 0.0, 0.0, 0.0, 1.0]), 15.0);
        assert_eq!(m.predict(&[0.0, 0.0, 0.0, 0.0, 2.0]), 25.0);
        assert_eq!(m.display_name(), "forest (2 trees)");
    }

    #[test]
    fn backwards_child_pointer_is_rejected() {
        let a = artifact(RegressionModel::Forest(TreeEnsemble {
            trees: vec![RegressionTree {
                nodes: vec![split(0, 1.0, 1, 2), split(1, 1.0, 0, 2), leaf(1.0)],
            }],
        }));
        let err = a.validate().unwrap_err();
        assert!(err.contains("invalid child 0"), "{err}");
    }

    #[test]
    fn coefficient_count_must_match_declared_width() {
        let a = artifact(RegressionModel::Linear(LinearModel {
            intercept: 0.0,
            coefficients: vec![1.0, 2.0],
        }));
        assert!(a.validate().is_err());
    }

    #[test]
    fn parses_json_node_shapes() {
        let json = r#"{"kind":"forest","trees":[{"nodes":[
            {"feature":0,"threshold":12.5,"left":1,"right":2},
            {"value":3.0},
            {"value":9.0}
        ]}]}"#;
        let m: RegressionModel = serde_json::from_str(json).unwrap();
        assert_eq!(m.predict(&[13.0, 0.0, 0.0, 0.0, 0.0]), 9.0);
        assert_eq!(m.display_name(), "tree");
    }
}
