//! Core data types for the objective function core.
//!
//! This module defines the scalar aliases shared with the rest of the
//! trainer, the gradient/Hessian pair written by every objective, and the
//! closed registry of objective kinds.

use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;
use std::fmt;
use std::str::FromStr;

use crate::core::error::LightGBMError;

/// Data indexing type, equivalent to `data_size_t` in LightGBM C++.
/// 32-bit integer supporting up to 2 billion data points.
pub type DataSize = i32;

/// Cumulative raw prediction type. The boosting driver keeps its score
/// buffers in double precision.
pub type Score = f64;

/// Target value and sample weight type, equivalent to `label_t` in LightGBM C++.
/// 32-bit float for target values and sample weights.
pub type Label = f32;

/// First and second derivative of the loss for one (example, channel) slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradHessPair {
    /// First derivative of the loss with respect to the raw score
    pub grad: f64,
    /// Second derivative of the loss with respect to the raw score
    pub hess: f64,
}

assert_eq_size!(GradHessPair, [f64; 2]);

impl GradHessPair {
    /// Create a pair from its components.
    #[inline]
    pub const fn new(grad: f64, hess: f64) -> Self {
        GradHessPair { grad, hess }
    }

    /// Scale both components by a sample weight.
    #[inline]
    pub fn weighted(self, weight: f64) -> Self {
        GradHessPair {
            grad: self.grad * weight,
            hess: self.hess * weight,
        }
    }
}

/// Objective function types known to the factory.
///
/// This is the single registration point: adding a variant means adding it
/// here, to [`ObjectiveType::ALL`], and to the factory's dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveType {
    /// Squared error regression
    Regression,
    /// Absolute error regression
    RegressionL1,
    /// Huber loss regression
    Huber,
    /// Fair loss regression
    Fair,
    /// Poisson regression
    Poisson,
    /// Quantile regression
    Quantile,
    /// Mean absolute percentage error regression
    Mape,
    /// Gamma regression
    Gamma,
    /// Tweedie regression
    Tweedie,
    /// Binary classification
    Binary,
    /// Multiclass classification with softmax
    Multiclass,
    /// Multiclass classification, one-vs-all
    MulticlassOva,
    /// Cross-entropy on probability labels
    CrossEntropy,
    /// LambdaMART ranking optimizing NDCG
    Lambdarank,
}

impl ObjectiveType {
    /// Every registered objective type.
    pub const ALL: [ObjectiveType; 14] = [
        ObjectiveType::Regression,
        ObjectiveType::RegressionL1,
        ObjectiveType::Huber,
        ObjectiveType::Fair,
        ObjectiveType::Poisson,
        ObjectiveType::Quantile,
        ObjectiveType::Mape,
        ObjectiveType::Gamma,
        ObjectiveType::Tweedie,
        ObjectiveType::Binary,
        ObjectiveType::Multiclass,
        ObjectiveType::MulticlassOva,
        ObjectiveType::CrossEntropy,
        ObjectiveType::Lambdarank,
    ];

    /// Canonical name, as written into persisted model descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveType::Regression => "regression",
            ObjectiveType::RegressionL1 => "regression_l1",
            ObjectiveType::Huber => "huber",
            ObjectiveType::Fair => "fair",
            ObjectiveType::Poisson => "poisson",
            ObjectiveType::Quantile => "quantile",
            ObjectiveType::Mape => "mape",
            ObjectiveType::Gamma => "gamma",
            ObjectiveType::Tweedie => "tweedie",
            ObjectiveType::Binary => "binary",
            ObjectiveType::Multiclass => "multiclass",
            ObjectiveType::MulticlassOva => "multiclassova",
            ObjectiveType::CrossEntropy => "cross_entropy",
            ObjectiveType::Lambdarank => "lambdarank",
        }
    }

    /// Resolve a canonical name only. Persisted descriptions never carry aliases.
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        ObjectiveType::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Resolve a canonical name or one of LightGBM's accepted aliases.
    pub fn from_name_or_alias(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        if let Some(t) = Self::from_canonical_name(&lowered) {
            return Some(t);
        }
        let resolved = match lowered.as_str() {
            "regression_l2" | "l2" | "mean_squared_error" | "mse" | "l2_root"
            | "root_mean_squared_error" | "rmse" => ObjectiveType::Regression,
            "l1" | "mean_absolute_error" | "mae" => ObjectiveType::RegressionL1,
            "mean_absolute_percentage_error" => ObjectiveType::Mape,
            "softmax" => ObjectiveType::Multiclass,
            "multiclass_ova" | "ova" | "ovr" => ObjectiveType::MulticlassOva,
            "xentropy" => ObjectiveType::CrossEntropy,
            _ => return None,
        };
        Some(resolved)
    }

    /// Whether the objective trains several output channels per round.
    pub fn is_multiclass(&self) -> bool {
        matches!(self, ObjectiveType::Multiclass | ObjectiveType::MulticlassOva)
    }

    /// Whether the objective needs query boundaries in its metadata.
    pub fn needs_queries(&self) -> bool {
        matches!(self, ObjectiveType::Lambdarank)
    }
}

impl Default for ObjectiveType {
    fn default() -> Self {
        ObjectiveType::Regression
    }
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectiveType {
    type Err = LightGBMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectiveType::from_name_or_alias(s)
            .ok_or_else(|| LightGBMError::config(format!("unknown objective type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_sizes() {
        assert_eq!(std::mem::size_of::<DataSize>(), 4);
        assert_eq!(std::mem::size_of::<Label>(), 4);
        assert_eq!(std::mem::size_of::<Score>(), 8);
        assert_eq!(std::mem::size_of::<GradHessPair>(), 16);
    }

    #[test]
    fn test_grad_hess_pair_weighted() {
        let pair = GradHessPair::new(-0.5, 0.25).weighted(2.0);
        assert_eq!(pair, GradHessPair::new(-1.0, 0.5));
        assert_eq!(GradHessPair::default(), GradHessPair::new(0.0, 0.0));
    }

    #[test]
    fn test_objective_type_display() {
        assert_eq!(ObjectiveType::Regression.to_string(), "regression");
        assert_eq!(ObjectiveType::MulticlassOva.to_string(), "multiclassova");
        assert_eq!(ObjectiveType::CrossEntropy.to_string(), "cross_entropy");
    }

    #[test]
    fn test_task_predicates() {
        let ranking: Vec<_> = ObjectiveType::ALL.into_iter().filter(|t| t.needs_queries()).collect();
        assert_eq!(ranking, vec![ObjectiveType::Lambdarank]);
        let multi = ObjectiveType::ALL.into_iter().filter(|t| t.is_multiclass()).count();
        assert_eq!(multi, 2);
    }

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        for t in ObjectiveType::ALL {
            assert_eq!(ObjectiveType::from_canonical_name(t.name()), Some(t));
            assert_eq!(t.name().parse::<ObjectiveType>().unwrap(), t);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("mse".parse::<ObjectiveType>().unwrap(), ObjectiveType::Regression);
        assert_eq!("MAE".parse::<ObjectiveType>().unwrap(), ObjectiveType::RegressionL1);
        assert_eq!("softmax".parse::<ObjectiveType>().unwrap(), ObjectiveType::Multiclass);
        assert_eq!("ovr".parse::<ObjectiveType>().unwrap(), ObjectiveType::MulticlassOva);
        assert_eq!("xentropy".parse::<ObjectiveType>().unwrap(), ObjectiveType::CrossEntropy);
        // aliases are not canonical
        assert_eq!(ObjectiveType::from_canonical_name("mse"), None);
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let err = "not_a_real_type".parse::<ObjectiveType>().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_serialization() {
        let objective = ObjectiveType::MulticlassOva;
        let serialized = serde_json::to_string(&objective).unwrap();
        assert_eq!(serialized, "\"multiclass_ova\"");
        let deserialized: ObjectiveType = serde_json::from_str(&serialized).unwrap();
        assert_eq!(objective, deserialized);
    }
}
