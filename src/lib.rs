//! # LightGBM objective functions
//!
//! The loss functions of a LightGBM-compatible gradient boosting trainer,
//! implemented in pure Rust.
//!
//! An objective turns the model's current raw scores into per-example
//! gradients and Hessians, which the tree learner fits in the next boosting
//! round. This crate provides:
//!
//! - **A common interface**: [`ObjectiveFunction`], implemented by regression
//!   (L2, L1, Huber, Fair, Poisson, quantile, MAPE, gamma, Tweedie),
//!   classification (binary, softmax multiclass, one-vs-all, cross-entropy)
//!   and ranking (LambdaRank NDCG) losses.
//! - **A factory**: objectives are created by name from an
//!   [`ObjectiveConfig`], or rebuilt from the description line persisted with
//!   a model.
//! - **Parallel gradient kernels**: rows (and ranking queries) are processed
//!   with Rayon.
//!
//! ## Quick Start
//!
//! ```rust
//! use lightgbm_objective::{
//!     create_objective_function, GradHessPair, Metadata, ObjectiveConfig,
//! };
//!
//! # fn main() -> lightgbm_objective::Result<()> {
//! let metadata = Metadata::new(vec![0.0, 1.0, 0.0, 1.0]);
//! let mut objective = create_objective_function("binary", &ObjectiveConfig::binary())?;
//! objective.init(&metadata, 4)?;
//!
//! let scores = vec![0.0; 4];
//! let mut gpair = vec![GradHessPair::default(); 4];
//! objective.get_gradients(&scores, &mut gpair);
//! assert_eq!(gpair[1].grad, -0.5);
//!
//! // The description is what a model file stores.
//! let restored = lightgbm_objective::create_objective_function_from_str(&objective.to_string())?;
//! assert_eq!(restored.to_string(), "binary sigmoid:1");
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/lightgbm-objective/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure: errors, types, constants, training metadata
pub mod core;

// Objective configuration
pub mod config;

// Loss functions and their factory
pub mod objective;

pub use core::{
    error::{LightGBMError, Result},
    meta::Metadata,
    types::{DataSize, GradHessPair, Label, ObjectiveType, Score},
};

pub use config::ObjectiveConfig;

pub use objective::{
    convert_scores, create_objective_function, create_objective_function_from_config,
    create_objective_function_from_str, ObjectiveFunction,
};

// Version information
pub use core::CORE_MODULE_VERSION as VERSION;

/// Initialize the library.
///
/// Installs the `env_logger` backend for the `log` facade, honouring
/// `RUST_LOG` and defaulting to `info`. Calling it more than once, or after
/// the application installed its own logger, is harmless.
pub fn init() {
    core::initialize_logging();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        assert!(core::is_logging_initialized());
    }

    #[test]
    fn test_error_integration() {
        let err = create_objective_function("unknown", &ObjectiveConfig::default()).unwrap_err();
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());
    }
}
