//! Core infrastructure module for the objective function core.
//!
//! - [`types`]: scalar aliases, the gradient/Hessian pair and the objective registry key
//! - [`constants`]: numeric constants and hyperparameter defaults
//! - [`error`]: error types and the crate-wide `Result`
//! - [`meta`]: training metadata shared with objectives
//!
//! ```rust
//! use lightgbm_objective::core::{
//!     meta::Metadata,
//!     types::{GradHessPair, ObjectiveType},
//! };
//!
//! let metadata = Metadata::new(vec![0.0, 1.0, 0.0, 1.0]);
//! assert_eq!(metadata.num_data(), 4);
//! assert_eq!("binary".parse::<ObjectiveType>()?, ObjectiveType::Binary);
//! let _slot = GradHessPair::default();
//! # Ok::<(), lightgbm_objective::LightGBMError>(())
//! ```

pub mod constants;
pub mod error;
pub mod meta;
pub mod types;

pub use constants::*;
pub use error::{LightGBMError, Result};
pub use meta::Metadata;
pub use types::*;

use std::sync::Once;

/// Version information for the core module
pub const CORE_MODULE_VERSION: &str = env!("CARGO_PKG_VERSION");

static LOGGING_INIT: Once = Once::new();

/// Install `env_logger` as the `log` backend, once per process.
///
/// `RUST_LOG` is honored when set; otherwise the filter defaults to `info`.
/// An already-installed logger (for example one set up by the host
/// application) is left untouched.
pub fn initialize_logging() {
    LOGGING_INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        if env_logger::Builder::from_env(env).try_init().is_ok() {
            log::debug!("lightgbm-objective {} logging initialized", CORE_MODULE_VERSION);
        }
    });
}

/// Check whether [`initialize_logging`] has run.
pub fn is_logging_initialized() -> bool {
    LOGGING_INIT.is_completed()
}
