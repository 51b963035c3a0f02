//! Numeric constants and objective hyperparameter defaults.
//!
//! Defaults match the values LightGBM uses, so that a configuration that
//! leaves a field untouched trains the same loss as the reference trainer.

/// Smallest magnitude treated as non-zero in objective arithmetic.
pub const K_EPSILON: f64 = 1e-15;

/// Score assigned to padded rows inside a ranking query; such rows are skipped.
pub const K_MIN_SCORE: f64 = f64::NEG_INFINITY;

/// Default number of classes. Only multiclass objectives read it.
pub const DEFAULT_NUM_CLASS: usize = 1;

/// Default sigmoid scale for binary, one-vs-all and ranking objectives.
pub const DEFAULT_SIGMOID: f64 = 1.0;

/// Default weight multiplier for the positive class.
pub const DEFAULT_SCALE_POS_WEIGHT: f64 = 1.0;

/// Default alpha shared by the Huber and quantile objectives.
pub const DEFAULT_ALPHA: f64 = 0.9;

/// Default Fair loss constant.
pub const DEFAULT_FAIR_C: f64 = 1.0;

/// Default safeguard added to the Poisson Hessian exponent.
pub const DEFAULT_POISSON_MAX_DELTA_STEP: f64 = 0.7;

/// Default Tweedie variance power.
pub const DEFAULT_TWEEDIE_VARIANCE_POWER: f64 = 1.5;

/// Default number of top positions considered by lambdarank.
pub const DEFAULT_LAMBDARANK_TRUNCATION_LEVEL: usize = 30;

/// Number of relevance levels covered by the default label gain table.
pub const DEFAULT_LABEL_GAIN_SIZE: usize = 31;

/// Minimum number of rows handed to one rayon task in gradient kernels.
pub const PARALLEL_MIN_ROWS: usize = 1024;

/// Prefix of environment variables that override objective configuration.
pub const ENV_PREFIX: &str = "LIGHTGBM_OBJECTIVE_";

/// Default label gain table: `2^i - 1` for each relevance level `i`.
pub fn default_label_gain() -> Vec<f64> {
    (0..DEFAULT_LABEL_GAIN_SIZE)
        .map(|i| (1u64 << i) as f64 - 1.0)
        .collect()
}
