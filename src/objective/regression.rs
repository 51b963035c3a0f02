//! Regression objectives.
//!
//! All of them are row-wise: the gradient of example `i` depends only on its
//! label, weight and score, so rows are processed in parallel without
//! synchronization. Sample weights scale both gradient and Hessian.

use std::fmt;

use crate::config::ObjectiveConfig;
use crate::core::constants::K_EPSILON;
use crate::core::error::Result;
use crate::core::meta::Metadata;
use crate::core::types::{DataSize, GradHessPair, Label};
use crate::data_error;
use crate::objective::factory::DescriptionTokens;
use crate::objective::{
    check_buffers, compute_rows, weighted_mean, weighted_percentile, ObjectiveFunction, Session,
};

/// Largest exponent fed to `exp` by log-link objectives; keeps extreme scores finite.
const MAX_EXP_ARG: f64 = 700.0;

#[inline]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[inline]
fn safe_exp(x: f64) -> f64 {
    x.min(MAX_EXP_ARG).exp()
}

#[inline]
fn safe_log(x: f64) -> f64 {
    x.max(K_EPSILON).ln()
}

fn check_non_negative_labels(name: &str, label: &[Label]) -> Result<()> {
    if let Some(i) = label.iter().position(|&l| l < 0.0) {
        return Err(data_error!(
            "[{}]: at least one target label is negative (label {} at index {})",
            name,
            label[i],
            i
        ));
    }
    if label.iter().map(|&l| l as f64).sum::<f64>() <= 0.0 {
        return Err(data_error!("[{}]: sum of labels is zero", name));
    }
    Ok(())
}

/// Squared error: `g = s - y`, `h = 1`.
///
/// With `sqrt` enabled the model fits `sign(y) * sqrt(|y|)` and predictions
/// are squared back.
#[derive(Debug)]
pub struct RegressionL2 {
    sqrt: bool,
    session: Session,
    trans_label: Option<Vec<Label>>,
}

impl RegressionL2 {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        RegressionL2 {
            sqrt: config.reg_sqrt,
            session: Session::default(),
            trans_label: None,
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["sqrt"]);
        Ok(RegressionL2 {
            sqrt: tokens.flag("sqrt"),
            session: Session::default(),
            trans_label: None,
        })
    }

    fn label(&self) -> &[Label] {
        match &self.trans_label {
            Some(label) => label,
            None => self.session.label(),
        }
    }
}

impl fmt::Display for RegressionL2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        if self.sqrt {
            f.write_str(" sqrt")?;
        }
        Ok(())
    }
}

impl ObjectiveFunction for RegressionL2 {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        self.trans_label = self.sqrt.then(|| {
            session
                .label()
                .iter()
                .map(|&l| l.signum() * l.abs().sqrt())
                .collect()
        });
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.label();
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            GradHessPair::new(s - label[i] as f64, 1.0)
        });
    }

    fn name(&self) -> &'static str {
        "regression"
    }

    fn is_constant_hessian(&self) -> bool {
        !self.session.has_weights()
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = if self.sqrt {
            sign(input[0]) * input[0] * input[0]
        } else {
            input[0]
        };
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        weighted_mean(self.label(), self.session.weights())
    }
}

/// Absolute error: `g = sign(s - y)`, `h = 1`.
#[derive(Debug, Default)]
pub struct RegressionL1 {
    session: Session,
}

impl RegressionL1 {
    /// Create the objective; it has no parameters.
    pub fn new(_config: &ObjectiveConfig) -> Self {
        RegressionL1::default()
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&[]);
        Ok(RegressionL1::default())
    }
}

impl fmt::Display for RegressionL1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ObjectiveFunction for RegressionL1 {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        self.session = Session::bind(metadata, num_data)?;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            GradHessPair::new(sign(s - label[i] as f64), 1.0)
        });
    }

    fn name(&self) -> &'static str {
        "regression_l1"
    }

    fn is_constant_hessian(&self) -> bool {
        !self.session.has_weights()
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        weighted_percentile(self.session.label(), self.session.weights(), 0.5)
    }
}

/// Huber loss: quadratic within `alpha` of the label, linear outside.
#[derive(Debug)]
pub struct RegressionHuber {
    alpha: f64,
    session: Session,
}

impl RegressionHuber {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        RegressionHuber {
            alpha: config.alpha,
            session: Session::default(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["alpha"]);
        Ok(RegressionHuber {
            alpha: tokens.positive("alpha")?,
            session: Session::default(),
        })
    }
}

impl fmt::Display for RegressionHuber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} alpha:{}", self.name(), self.alpha)
    }
}

impl ObjectiveFunction for RegressionHuber {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        self.session = Session::bind(metadata, num_data)?;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        let alpha = self.alpha;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            let diff = s - label[i] as f64;
            let grad = if diff.abs() <= alpha {
                diff
            } else {
                sign(diff) * alpha
            };
            GradHessPair::new(grad, 1.0)
        });
    }

    fn name(&self) -> &'static str {
        "huber"
    }

    fn is_constant_hessian(&self) -> bool {
        !self.session.has_weights()
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        weighted_mean(self.session.label(), self.session.weights())
    }
}

/// Fair loss: `g = c x / (|x| + c)`, `h = c^2 / (|x| + c)^2` with `x = s - y`.
#[derive(Debug)]
pub struct RegressionFair {
    c: f64,
    session: Session,
}

impl RegressionFair {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        RegressionFair {
            c: config.fair_c,
            session: Session::default(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["fair_c"]);
        Ok(RegressionFair {
            c: tokens.positive("fair_c")?,
            session: Session::default(),
        })
    }
}

impl fmt::Display for RegressionFair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fair_c:{}", self.name(), self.c)
    }
}

impl ObjectiveFunction for RegressionFair {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        self.session = Session::bind(metadata, num_data)?;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        let c = self.c;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            let x = s - label[i] as f64;
            let denom = x.abs() + c;
            GradHessPair::new(c * x / denom, c * c / (denom * denom))
        });
    }

    fn name(&self) -> &'static str {
        "fair"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        weighted_mean(self.session.label(), self.session.weights())
    }
}

/// Poisson regression with a log link.
///
/// The Hessian is inflated by `exp(max_delta_step)` to keep leaf updates
/// conservative.
#[derive(Debug)]
pub struct RegressionPoisson {
    max_delta_step: f64,
    session: Session,
}

impl RegressionPoisson {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        RegressionPoisson {
            max_delta_step: config.poisson_max_delta_step,
            session: Session::default(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["max_delta_step"]);
        Ok(RegressionPoisson {
            max_delta_step: tokens.positive("max_delta_step")?,
            session: Session::default(),
        })
    }
}

impl fmt::Display for RegressionPoisson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} max_delta_step:{}", self.name(), self.max_delta_step)
    }
}

impl ObjectiveFunction for RegressionPoisson {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        check_non_negative_labels(self.name(), session.label())?;
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        let max_delta_step = self.max_delta_step;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            GradHessPair::new(
                safe_exp(s) - label[i] as f64,
                safe_exp(s + max_delta_step),
            )
        });
    }

    fn name(&self) -> &'static str {
        "poisson"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = input[0].exp();
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        safe_log(weighted_mean(self.session.label(), self.session.weights()))
    }
}

/// Quantile (pinball) loss at level `alpha`.
#[derive(Debug)]
pub struct RegressionQuantile {
    alpha: f64,
    session: Session,
}

impl RegressionQuantile {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        RegressionQuantile {
            alpha: config.alpha,
            session: Session::default(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["alpha"]);
        Ok(RegressionQuantile {
            alpha: tokens.required_where(
                "alpha",
                |a: &f64| *a > 0.0 && *a < 1.0,
                "must be in (0, 1)",
            )?,
            session: Session::default(),
        })
    }
}

impl fmt::Display for RegressionQuantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} alpha:{}", self.name(), self.alpha)
    }
}

impl ObjectiveFunction for RegressionQuantile {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        self.session = Session::bind(metadata, num_data)?;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        let alpha = self.alpha;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            let grad = if s - label[i] as f64 >= 0.0 {
                1.0 - alpha
            } else {
                -alpha
            };
            GradHessPair::new(grad, 1.0)
        });
    }

    fn name(&self) -> &'static str {
        "quantile"
    }

    fn is_constant_hessian(&self) -> bool {
        !self.session.has_weights()
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        weighted_percentile(self.session.label(), self.session.weights(), self.alpha)
    }
}

/// Mean absolute percentage error: L1 with each example weighted by `1 / max(1, |y|)`.
#[derive(Debug, Default)]
pub struct RegressionMape {
    session: Session,
    label_weight: Vec<Label>,
}

impl RegressionMape {
    /// Create the objective; it has no parameters.
    pub fn new(_config: &ObjectiveConfig) -> Self {
        RegressionMape::default()
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&[]);
        Ok(RegressionMape::default())
    }
}

impl fmt::Display for RegressionMape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ObjectiveFunction for RegressionMape {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        if session.label().iter().any(|l| l.abs() < 1.0) {
            log::warn!("[mape]: some labels are close to zero; their weight is capped at 1");
        }
        self.label_weight = session
            .label()
            .iter()
            .map(|&l| 1.0 / l.abs().max(1.0))
            .collect();
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        let label_weight = &self.label_weight;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            GradHessPair::new(sign(s - label[i] as f64) * label_weight[i] as f64, 1.0)
        });
    }

    fn name(&self) -> &'static str {
        "mape"
    }

    fn is_constant_hessian(&self) -> bool {
        !self.session.has_weights()
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        let combined: Vec<Label> = match self.session.weights() {
            Some(w) => self.label_weight.iter().zip(w).map(|(a, b)| a * b).collect(),
            None => self.label_weight.clone(),
        };
        weighted_percentile(self.session.label(), Some(&combined), 0.5)
    }
}

/// Gamma regression with a log link. Labels must be positive.
#[derive(Debug, Default)]
pub struct RegressionGamma {
    session: Session,
}

impl RegressionGamma {
    /// Create the objective; it has no parameters.
    pub fn new(_config: &ObjectiveConfig) -> Self {
        RegressionGamma::default()
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&[]);
        Ok(RegressionGamma::default())
    }
}

impl fmt::Display for RegressionGamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ObjectiveFunction for RegressionGamma {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        if let Some(i) = session.label().iter().position(|&l| l <= 0.0) {
            return Err(data_error!(
                "[gamma]: labels must be positive (label {} at index {})",
                session.label()[i],
                i
            ));
        }
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            let y_exp = label[i] as f64 * safe_exp(-s);
            GradHessPair::new(1.0 - y_exp, y_exp)
        });
    }

    fn name(&self) -> &'static str {
        "gamma"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = input[0].exp();
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        safe_log(weighted_mean(self.session.label(), self.session.weights()))
    }
}

/// Tweedie regression with a log link and variance power `rho` in `[1, 2)`.
#[derive(Debug)]
pub struct RegressionTweedie {
    rho: f64,
    session: Session,
}

impl RegressionTweedie {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        RegressionTweedie {
            rho: config.tweedie_variance_power,
            session: Session::default(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["variance_power"]);
        Ok(RegressionTweedie {
            rho: tokens.required_where(
                "variance_power",
                |p: &f64| (1.0..2.0).contains(p),
                "must be in [1, 2)",
            )?,
            session: Session::default(),
        })
    }
}

impl fmt::Display for RegressionTweedie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} variance_power:{}", self.name(), self.rho)
    }
}

impl ObjectiveFunction for RegressionTweedie {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        check_non_negative_labels(self.name(), session.label())?;
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let label = self.session.label();
        let rho = self.rho;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            let y = label[i] as f64;
            let exp_1 = safe_exp((1.0 - rho) * s);
            let exp_2 = safe_exp((2.0 - rho) * s);
            GradHessPair::new(
                -y * exp_1 + exp_2,
                -y * (1.0 - rho) * exp_1 + (2.0 - rho) * exp_2,
            )
        });
    }

    fn name(&self) -> &'static str {
        "tweedie"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = input[0].exp();
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        safe_log(weighted_mean(self.session.label(), self.session.weights()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn run(objective: &mut dyn ObjectiveFunction, meta: &Metadata, scores: &[f64]) -> Vec<GradHessPair> {
        objective.init(meta, meta.num_data() as DataSize).unwrap();
        let mut gpair = vec![GradHessPair::default(); scores.len()];
        objective.get_gradients(scores, &mut gpair);
        gpair
    }

    #[test]
    fn test_l2_gradients() {
        let meta = Metadata::new(vec![1.5, 2.5, 2.0]);
        let mut objective = RegressionL2::new(&ObjectiveConfig::regression());
        let gpair = run(&mut objective, &meta, &[1.0, 2.0, 3.0]);
        assert_eq!(gpair[0], GradHessPair::new(-0.5, 1.0));
        assert_eq!(gpair[1], GradHessPair::new(-0.5, 1.0));
        assert_eq!(gpair[2], GradHessPair::new(1.0, 1.0));
        assert!(objective.is_constant_hessian());
        assert_abs_diff_eq!(objective.boost_from_score(0), 2.0);
    }

    #[test]
    fn test_l2_weighted_is_not_constant_hessian() {
        let meta = Metadata::new(vec![1.0, 2.0]).with_weights(vec![2.0, 0.5]);
        let mut objective = RegressionL2::new(&ObjectiveConfig::regression());
        let gpair = run(&mut objective, &meta, &[0.0, 0.0]);
        assert_eq!(gpair[0], GradHessPair::new(-2.0, 2.0));
        assert_eq!(gpair[1], GradHessPair::new(-1.0, 0.5));
        assert!(!objective.is_constant_hessian());
    }

    #[test]
    fn test_l2_sqrt() {
        let meta = Metadata::new(vec![4.0, -9.0]);
        let mut objective = RegressionL2::new(&ObjectiveConfig::regression().with_reg_sqrt(true));
        let gpair = run(&mut objective, &meta, &[0.0, 0.0]);
        assert_abs_diff_eq!(gpair[0].grad, -2.0);
        assert_abs_diff_eq!(gpair[1].grad, 3.0);

        let mut out = [0.0];
        objective.convert_output(&[-3.0], &mut out);
        assert_abs_diff_eq!(out[0], -9.0);
        assert_eq!(objective.to_string(), "regression sqrt");
    }

    #[test]
    fn test_l1_gradients_and_median() {
        let meta = Metadata::new(vec![1.0, 2.0, 3.0]);
        let mut objective = RegressionL1::new(&ObjectiveConfig::default());
        let gpair = run(&mut objective, &meta, &[2.0, 2.0, 2.0]);
        let grads: Vec<f64> = gpair.iter().map(|p| p.grad).collect();
        assert_eq!(grads, vec![1.0, 0.0, -1.0]);
        assert_abs_diff_eq!(objective.boost_from_score(0), 2.0);
    }

    #[test]
    fn test_huber_clips_gradient() {
        let meta = Metadata::new(vec![0.0, 0.0]);
        let mut objective = RegressionHuber::new(&ObjectiveConfig::default().with_alpha(1.0));
        let gpair = run(&mut objective, &meta, &[0.5, -4.0]);
        assert_abs_diff_eq!(gpair[0].grad, 0.5);
        assert_abs_diff_eq!(gpair[1].grad, -1.0);
        assert_eq!(objective.to_string(), "huber alpha:1");
    }

    #[test]
    fn test_fair_gradients() {
        let meta = Metadata::new(vec![0.0]);
        let mut objective = RegressionFair::new(&ObjectiveConfig::default().with_fair_c(1.0));
        let gpair = run(&mut objective, &meta, &[1.0]);
        assert_abs_diff_eq!(gpair[0].grad, 0.5);
        assert_abs_diff_eq!(gpair[0].hess, 0.25);
    }

    #[test]
    fn test_poisson_domain_checks() {
        let mut objective = RegressionPoisson::new(&ObjectiveConfig::default());
        let err = objective.init(&Metadata::new(vec![1.0, -1.0]), 2).unwrap_err();
        assert!(err.is_data_error());
        let err = objective.init(&Metadata::new(vec![0.0, 0.0]), 2).unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_poisson_gradients() {
        let meta = Metadata::new(vec![1.0, 3.0]);
        let mut objective = RegressionPoisson::new(&ObjectiveConfig::default());
        let gpair = run(&mut objective, &meta, &[0.0, 0.0]);
        assert_abs_diff_eq!(gpair[0].grad, 0.0);
        assert_abs_diff_eq!(gpair[1].grad, -2.0);
        assert_abs_diff_eq!(gpair[0].hess, 0.7f64.exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(objective.boost_from_score(0), 2.0f64.ln(), epsilon = 1e-12);

        let gpair = run(&mut objective, &meta, &[1e6, -1e6]);
        assert!(gpair.iter().all(|p| p.grad.is_finite() && p.hess.is_finite()));
    }

    #[test]
    fn test_quantile_gradients() {
        let meta = Metadata::new(vec![1.0, 1.0]);
        let mut objective = RegressionQuantile::new(&ObjectiveConfig::default().with_alpha(0.2));
        let gpair = run(&mut objective, &meta, &[2.0, 0.0]);
        assert_abs_diff_eq!(gpair[0].grad, 0.8);
        assert_abs_diff_eq!(gpair[1].grad, -0.2);
        assert!(objective.is_constant_hessian());
    }

    #[test]
    fn test_mape_label_weight() {
        let meta = Metadata::new(vec![10.0, 0.5]);
        let mut objective = RegressionMape::new(&ObjectiveConfig::default());
        let gpair = run(&mut objective, &meta, &[0.0, 1.0]);
        assert_abs_diff_eq!(gpair[0].grad, -0.1, epsilon = 1e-7);
        assert_abs_diff_eq!(gpair[1].grad, 1.0);
    }

    #[test]
    fn test_gamma_requires_positive_labels() {
        let mut objective = RegressionGamma::new(&ObjectiveConfig::default());
        assert!(objective.init(&Metadata::new(vec![1.0, 0.0]), 2).is_err());

        let gpair = run(&mut objective, &Metadata::new(vec![2.0]), &[0.0]);
        assert_abs_diff_eq!(gpair[0].grad, -1.0);
        assert_abs_diff_eq!(gpair[0].hess, 2.0);
    }

    #[test]
    fn test_tweedie_gradients() {
        let meta = Metadata::new(vec![1.0, 0.0]);
        let mut objective = RegressionTweedie::new(&ObjectiveConfig::tweedie(1.5));
        let gpair = run(&mut objective, &meta, &[0.0, 0.0]);
        assert_abs_diff_eq!(gpair[0].grad, 0.0);
        assert_abs_diff_eq!(gpair[0].hess, 1.0);
        assert_abs_diff_eq!(gpair[1].grad, 1.0);
        assert_abs_diff_eq!(gpair[1].hess, 0.5);
        assert!(gpair.iter().all(|p| p.hess >= 0.0));
    }

    #[test]
    fn test_failed_init_leaves_objective_uninitialized() {
        let mut objective = RegressionGamma::new(&ObjectiveConfig::default());
        assert!(objective.init(&Metadata::new(vec![-1.0]), 1).is_err());
        assert!(!objective.session.is_bound());
        assert_eq!(objective.boost_from_score(0), 0.0);
    }
}
