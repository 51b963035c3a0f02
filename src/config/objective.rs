//! Objective function configuration.
//!
//! [`ObjectiveConfig`] is the plain value object the factory reads when it
//! builds an objective: the task type name plus every hyperparameter any
//! registered objective understands. Each objective reads only the fields
//! relevant to it; the rest are ignored.

use crate::core::constants::*;
use crate::core::error::{LightGBMError, Result};
use crate::core::types::ObjectiveType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Objective function configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    /// Objective type name; canonical names and LightGBM aliases are accepted
    pub objective: String,
    /// Number of classes for multiclass classification
    pub num_class: usize,
    /// Whether to reweight classes of an unbalanced binary dataset
    pub is_unbalance: bool,
    /// Positive class weight scaling factor
    pub scale_pos_weight: f64,
    /// Sigmoid scale for binary, one-vs-all and ranking objectives
    pub sigmoid: f64,
    /// Fit `sign(y) * sqrt(|y|)` instead of the raw label in L2 regression
    pub reg_sqrt: bool,
    /// Huber delta and quantile level
    pub alpha: f64,
    /// Fair loss constant
    pub fair_c: f64,
    /// Poisson maximum delta step
    pub poisson_max_delta_step: f64,
    /// Tweedie variance power
    pub tweedie_variance_power: f64,
    /// Gain of each relevance level for lambdarank
    pub label_gain: Vec<f64>,
    /// Number of top positions lambdarank optimizes
    pub lambdarank_truncation_level: usize,
    /// Normalize lambdarank gradients per query
    pub lambdarank_norm: bool,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        ObjectiveConfig {
            objective: ObjectiveType::Regression.name().to_string(),
            num_class: DEFAULT_NUM_CLASS,
            is_unbalance: false,
            scale_pos_weight: DEFAULT_SCALE_POS_WEIGHT,
            sigmoid: DEFAULT_SIGMOID,
            reg_sqrt: false,
            alpha: DEFAULT_ALPHA,
            fair_c: DEFAULT_FAIR_C,
            poisson_max_delta_step: DEFAULT_POISSON_MAX_DELTA_STEP,
            tweedie_variance_power: DEFAULT_TWEEDIE_VARIANCE_POWER,
            label_gain: default_label_gain(),
            lambdarank_truncation_level: DEFAULT_LAMBDARANK_TRUNCATION_LEVEL,
            lambdarank_norm: true,
        }
    }
}

impl ObjectiveConfig {
    /// Recognized parameter keys, canonical spelling.
    pub const PARAMETER_NAMES: [&'static str; 13] = [
        "objective",
        "num_class",
        "is_unbalance",
        "scale_pos_weight",
        "sigmoid",
        "reg_sqrt",
        "alpha",
        "fair_c",
        "poisson_max_delta_step",
        "tweedie_variance_power",
        "label_gain",
        "lambdarank_truncation_level",
        "lambdarank_norm",
    ];

    /// Create a new objective configuration
    pub fn new(objective_type: ObjectiveType) -> Self {
        ObjectiveConfig {
            objective: objective_type.name().to_string(),
            ..ObjectiveConfig::default()
        }
    }

    /// Create configuration for regression
    pub fn regression() -> Self {
        ObjectiveConfig::new(ObjectiveType::Regression)
    }

    /// Create configuration for binary classification
    pub fn binary() -> Self {
        ObjectiveConfig::new(ObjectiveType::Binary)
    }

    /// Create configuration for multiclass classification
    pub fn multiclass(num_class: usize) -> Self {
        let mut config = ObjectiveConfig::new(ObjectiveType::Multiclass);
        config.num_class = num_class;
        config
    }

    /// Create configuration for lambdarank
    pub fn lambdarank() -> Self {
        ObjectiveConfig::new(ObjectiveType::Lambdarank)
    }

    /// Create configuration for Tweedie regression
    pub fn tweedie(variance_power: f64) -> Self {
        let mut config = ObjectiveConfig::new(ObjectiveType::Tweedie);
        config.tweedie_variance_power = variance_power;
        config
    }

    /// Set the number of classes
    pub fn with_num_class(mut self, num_class: usize) -> Self {
        self.num_class = num_class;
        self
    }

    /// Set unbalanced dataset handling
    pub fn with_unbalance(mut self, is_unbalance: bool) -> Self {
        self.is_unbalance = is_unbalance;
        self
    }

    /// Set positive class weight scaling
    pub fn with_scale_pos_weight(mut self, scale_pos_weight: f64) -> Self {
        self.scale_pos_weight = scale_pos_weight;
        self
    }

    /// Set sigmoid parameter
    pub fn with_sigmoid(mut self, sigmoid: f64) -> Self {
        self.sigmoid = sigmoid;
        self
    }

    /// Fit square-rooted labels in L2 regression
    pub fn with_reg_sqrt(mut self, reg_sqrt: bool) -> Self {
        self.reg_sqrt = reg_sqrt;
        self
    }

    /// Set the Huber delta / quantile level
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set Fair C parameter
    pub fn with_fair_c(mut self, fair_c: f64) -> Self {
        self.fair_c = fair_c;
        self
    }

    /// Set Poisson max delta step
    pub fn with_poisson_max_delta_step(mut self, max_delta_step: f64) -> Self {
        self.poisson_max_delta_step = max_delta_step;
        self
    }

    /// Set the Tweedie variance power
    pub fn with_tweedie_variance_power(mut self, variance_power: f64) -> Self {
        self.tweedie_variance_power = variance_power;
        self
    }

    /// Set the lambdarank label gain table
    pub fn with_label_gain(mut self, label_gain: Vec<f64>) -> Self {
        self.label_gain = label_gain;
        self
    }

    /// Set the lambdarank truncation level
    pub fn with_lambdarank_truncation_level(mut self, level: usize) -> Self {
        self.lambdarank_truncation_level = level;
        self
    }

    /// Enable or disable lambdarank per-query normalization
    pub fn with_lambdarank_norm(mut self, norm: bool) -> Self {
        self.lambdarank_norm = norm;
        self
    }

    /// Resolve the configured objective name.
    pub fn objective_type(&self) -> Result<ObjectiveType> {
        self.objective.parse()
    }

    /// Validate the fields read by the configured objective.
    pub fn validate(&self) -> Result<()> {
        self.validate_for(self.objective_type()?)
    }

    /// Validate the fields read by `objective_type`. Other fields are not inspected.
    pub fn validate_for(&self, objective_type: ObjectiveType) -> Result<()> {
        match objective_type {
            ObjectiveType::Regression
            | ObjectiveType::RegressionL1
            | ObjectiveType::Mape
            | ObjectiveType::Gamma
            | ObjectiveType::CrossEntropy => Ok(()),
            ObjectiveType::Huber => require_positive("alpha", self.alpha),
            ObjectiveType::Quantile => {
                if !(self.alpha > 0.0 && self.alpha < 1.0) {
                    return Err(LightGBMError::invalid_parameter(
                        "alpha",
                        self.alpha.to_string(),
                        "must be in range (0.0, 1.0) for quantile objective",
                    ));
                }
                Ok(())
            }
            ObjectiveType::Fair => require_positive("fair_c", self.fair_c),
            ObjectiveType::Poisson => {
                require_positive("poisson_max_delta_step", self.poisson_max_delta_step)
            }
            ObjectiveType::Tweedie => {
                if !(self.tweedie_variance_power >= 1.0 && self.tweedie_variance_power < 2.0) {
                    return Err(LightGBMError::invalid_parameter(
                        "tweedie_variance_power",
                        self.tweedie_variance_power.to_string(),
                        "must be in range [1.0, 2.0)",
                    ));
                }
                Ok(())
            }
            ObjectiveType::Binary => self.validate_binary(),
            ObjectiveType::Multiclass => self.validate_num_class(),
            ObjectiveType::MulticlassOva => {
                self.validate_num_class()?;
                self.validate_binary()
            }
            ObjectiveType::Lambdarank => {
                require_positive("sigmoid", self.sigmoid)?;
                if self.label_gain.is_empty() {
                    return Err(LightGBMError::invalid_parameter(
                        "label_gain",
                        "[]",
                        "must not be empty",
                    ));
                }
                if let Some(g) = self.label_gain.iter().find(|g| !(g.is_finite() && **g >= 0.0)) {
                    return Err(LightGBMError::invalid_parameter(
                        "label_gain",
                        g.to_string(),
                        "every gain must be finite and non-negative",
                    ));
                }
                if self.lambdarank_truncation_level == 0 {
                    return Err(LightGBMError::invalid_parameter(
                        "lambdarank_truncation_level",
                        "0",
                        "must be at least 1",
                    ));
                }
                Ok(())
            }
        }
    }

    fn validate_binary(&self) -> Result<()> {
        require_positive("sigmoid", self.sigmoid)?;
        require_positive("scale_pos_weight", self.scale_pos_weight)?;
        if conflicting_binary_weights(self.is_unbalance, self.scale_pos_weight) {
            return Err(LightGBMError::config(
                "cannot set is_unbalance and scale_pos_weight at the same time",
            ));
        }
        Ok(())
    }

    fn validate_num_class(&self) -> Result<()> {
        if self.num_class < 2 {
            return Err(LightGBMError::invalid_parameter(
                "num_class",
                self.num_class.to_string(),
                "must be at least 2 for multiclass objectives",
            ));
        }
        Ok(())
    }

    /// Set one parameter from its textual form.
    ///
    /// Accepts canonical keys and LightGBM's aliases. Returns `Ok(false)` for
    /// a key this configuration does not know.
    pub fn set_parameter(&mut self, key: &str, value: &str) -> Result<bool> {
        let value = value.trim();
        match key.trim() {
            "objective" | "objective_type" | "app" | "application" | "loss" => {
                self.objective = value.to_string();
            }
            "num_class" | "num_classes" => self.num_class = parse_value(key, value)?,
            "is_unbalance" | "unbalance" | "unbalanced_sets" => {
                self.is_unbalance = parse_bool(key, value)?
            }
            "scale_pos_weight" => self.scale_pos_weight = parse_value(key, value)?,
            "sigmoid" => self.sigmoid = parse_value(key, value)?,
            "reg_sqrt" => self.reg_sqrt = parse_bool(key, value)?,
            "alpha" => self.alpha = parse_value(key, value)?,
            "fair_c" => self.fair_c = parse_value(key, value)?,
            "poisson_max_delta_step" => self.poisson_max_delta_step = parse_value(key, value)?,
            "tweedie_variance_power" => self.tweedie_variance_power = parse_value(key, value)?,
            "label_gain" => {
                self.label_gain = value
                    .split(',')
                    .map(|v| parse_value(key, v))
                    .collect::<Result<Vec<f64>>>()?
            }
            "lambdarank_truncation_level" | "max_position" => {
                self.lambdarank_truncation_level = parse_value(key, value)?
            }
            "lambdarank_norm" => self.lambdarank_norm = parse_bool(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Build a configuration from LightGBM-style `key=value` pairs separated
    /// by whitespace, e.g. `"objective=multiclass num_class=3"`.
    pub fn from_parameter_str(params: &str) -> Result<Self> {
        let mut config = ObjectiveConfig::default();
        for pair in params.split_whitespace() {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                LightGBMError::config(format!("expected key=value, got '{}'", pair))
            })?;
            if !config.set_parameter(key, value)? {
                log::warn!("Unknown objective parameter: {}", key);
            }
        }
        Ok(config)
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            Some("toml") => toml::from_str(&std::fs::read_to_string(path)?)?,
            _ => {
                return Err(LightGBMError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(LightGBMError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `LIGHTGBM_OBJECTIVE` and `LIGHTGBM_OBJECTIVE_<PARAMETER>` overrides
    /// from the environment.
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(objective) = lookup(ENV_PREFIX.trim_end_matches('_')) {
            self.objective = objective;
        }
        for key in Self::PARAMETER_NAMES.iter().skip(1) {
            let var = format!("{}{}", ENV_PREFIX, key.to_ascii_uppercase());
            if let Some(value) = lookup(&var) {
                log::debug!("Overriding {} from {}", key, var);
                self.set_parameter(key, &value)?;
            }
        }
        Ok(())
    }

    /// Get objective-specific parameter map
    pub fn as_parameter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("objective".to_string(), self.objective.clone());

        match self.objective_type() {
            Ok(ObjectiveType::Multiclass) => {
                map.insert("num_class".to_string(), self.num_class.to_string());
            }
            Ok(ObjectiveType::MulticlassOva) => {
                map.insert("num_class".to_string(), self.num_class.to_string());
                map.insert("sigmoid".to_string(), self.sigmoid.to_string());
                map.insert("is_unbalance".to_string(), self.is_unbalance.to_string());
            }
            Ok(ObjectiveType::Binary) => {
                map.insert("sigmoid".to_string(), self.sigmoid.to_string());
                map.insert("is_unbalance".to_string(), self.is_unbalance.to_string());
                map.insert("scale_pos_weight".to_string(), self.scale_pos_weight.to_string());
            }
            Ok(ObjectiveType::Regression) => {
                map.insert("reg_sqrt".to_string(), self.reg_sqrt.to_string());
            }
            Ok(ObjectiveType::Huber) | Ok(ObjectiveType::Quantile) => {
                map.insert("alpha".to_string(), self.alpha.to_string());
            }
            Ok(ObjectiveType::Fair) => {
                map.insert("fair_c".to_string(), self.fair_c.to_string());
            }
            Ok(ObjectiveType::Poisson) => {
                map.insert(
                    "poisson_max_delta_step".to_string(),
                    self.poisson_max_delta_step.to_string(),
                );
            }
            Ok(ObjectiveType::Tweedie) => {
                map.insert(
                    "tweedie_variance_power".to_string(),
                    self.tweedie_variance_power.to_string(),
                );
            }
            Ok(ObjectiveType::Lambdarank) => {
                map.insert("sigmoid".to_string(), self.sigmoid.to_string());
                map.insert(
                    "lambdarank_truncation_level".to_string(),
                    self.lambdarank_truncation_level.to_string(),
                );
                map.insert("lambdarank_norm".to_string(), self.lambdarank_norm.to_string());
                let gains: Vec<String> = self.label_gain.iter().map(|g| g.to_string()).collect();
                map.insert("label_gain".to_string(), gains.join(","));
            }
            _ => {}
        }

        map
    }
}

/// Domain of every scale-like hyperparameter: strictly positive and finite.
pub(crate) fn is_positive_finite(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

/// Whether `is_unbalance` and a non-default `scale_pos_weight` are both set.
pub(crate) fn conflicting_binary_weights(is_unbalance: bool, scale_pos_weight: f64) -> bool {
    is_unbalance && scale_pos_weight != DEFAULT_SCALE_POS_WEIGHT
}

fn require_positive(parameter: &str, value: f64) -> Result<()> {
    if !is_positive_finite(value) {
        return Err(LightGBMError::invalid_parameter(
            parameter,
            value.to_string(),
            "must be positive",
        ));
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| LightGBMError::invalid_parameter(key, value, "cannot be parsed"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "+" => Ok(true),
        "false" | "0" | "-" => Ok(false),
        _ => Err(LightGBMError::invalid_parameter(key, value, "expected a boolean")),
    }
}
