//! Objective functions: the loss abstraction used by the boosting driver.
//!
//! Every loss implements [`ObjectiveFunction`]. The driver obtains an
//! instance from the [`factory`], calls [`ObjectiveFunction::init`] once with
//! the training [`Metadata`], then calls
//! [`ObjectiveFunction::get_gradients`] once per boosting round. At save time
//! the instance's [`Display`](std::fmt::Display) output is persisted with the
//! model; at load time
//! [`create_objective_function_from_str`](factory::create_objective_function_from_str)
//! rebuilds an equivalent instance from that line.
//!
//! # Score layout
//!
//! Multi-output objectives train `K = num_tree_per_iteration()` channels.
//! Training buffers (`scores` and `gpair`) are **channel-major**: the slot of
//! channel `k` for example `i` is `k * num_data + i`, so each channel's
//! values are contiguous and can be handed to the tree learner as one slice.
//! At prediction time [`ObjectiveFunction::convert_output`] receives the `K`
//! raw scores of a single row contiguously.

pub mod binary;
pub mod factory;
pub mod multiclass;
pub mod rank;
pub mod regression;
pub mod xentropy;

pub use binary::BinaryLogloss;
pub use factory::{
    create_objective_function, create_objective_function_from_config,
    create_objective_function_from_str,
};
pub use multiclass::{MulticlassOva, MulticlassSoftmax};
pub use rank::LambdarankNdcg;
pub use regression::{
    RegressionFair, RegressionGamma, RegressionHuber, RegressionL1, RegressionL2, RegressionMape,
    RegressionPoisson, RegressionQuantile, RegressionTweedie,
};
pub use xentropy::CrossEntropy;

use std::fmt;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::core::constants::PARALLEL_MIN_ROWS;
use crate::core::error::{LightGBMError, Result};
use crate::core::meta::Metadata;
use crate::core::types::{DataSize, GradHessPair, Label};

/// The interface every objective (loss) function implements.
///
/// Instances are created by the factory, owned by exactly one driver for a
/// training session, and never cloned. `init` takes `&mut self` while
/// `get_gradients` takes `&self`, so a gradient computation can never overlap
/// initialization.
///
/// The persisted description of an objective is its `Display` output
/// (`objective.to_string()`): the canonical name followed by every
/// configuration value the gradients depend on.
pub trait ObjectiveFunction: fmt::Display + fmt::Debug + Send + Sync {
    /// Bind the training metadata and precompute round-invariant quantities.
    ///
    /// Called exactly once before any gradient computation. Fails with a data
    /// error when `metadata` does not match `num_data` or violates the
    /// objective's label domain. On failure the objective stays uninitialized.
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()>;

    /// Compute gradients and Hessians for the current cumulative scores.
    ///
    /// Reads the first `num_data * num_tree_per_iteration()` values of
    /// `scores` and overwrites exactly that many slots of `gpair`, in the
    /// channel-major layout described in the [module docs](self).
    ///
    /// # Panics
    ///
    /// Panics when called before a successful `init` or when either buffer is
    /// shorter than required; both are caller logic defects.
    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]);

    /// Canonical name of the objective, used for factory dispatch.
    fn name(&self) -> &'static str;

    /// Whether every Hessian this objective produces is the same constant.
    ///
    /// Meaningful after `init`: sample weights usually make it false.
    fn is_constant_hessian(&self) -> bool {
        false
    }

    /// Whether the driver should start from [`boost_from_score`](Self::boost_from_score)
    /// instead of zero.
    fn boost_from_average(&self) -> bool {
        false
    }

    /// Whether channels without positive examples may be skipped during tree growth.
    fn skip_empty_class(&self) -> bool {
        false
    }

    /// Number of trees grown per boosting round.
    fn num_tree_per_iteration(&self) -> usize {
        1
    }

    /// Number of values reported per row at prediction time.
    fn num_predict_one_row(&self) -> usize {
        1
    }

    /// Map the raw scores of one row into the reported prediction.
    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = input[0];
    }

    /// Initial raw score for channel `class_id`, valid after `init`.
    fn boost_from_score(&self, class_id: usize) -> f64 {
        let _ = class_id;
        0.0
    }

    /// Whether channel `class_id` has anything to learn, valid after `init`.
    fn class_need_train(&self, class_id: usize) -> bool {
        let _ = class_id;
        true
    }
}

/// Apply [`ObjectiveFunction::convert_output`] to every row of a raw score
/// matrix of shape `(num_rows, num_tree_per_iteration)`.
///
/// Returns a matrix of shape `(num_rows, num_predict_one_row)`. Rows are
/// converted in parallel.
pub fn convert_scores(
    objective: &dyn ObjectiveFunction,
    raw: ArrayView2<'_, f64>,
) -> Result<Array2<f64>> {
    let num_channels = objective.num_tree_per_iteration();
    if raw.ncols() != num_channels {
        return Err(LightGBMError::dimension_mismatch(
            format!("{} raw score columns", num_channels),
            format!("{} columns", raw.ncols()),
        ));
    }
    let num_outputs = objective.num_predict_one_row();
    let mut converted = Array2::<f64>::zeros((raw.nrows(), num_outputs));

    converted
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(raw.axis_iter(Axis(0)))
        .for_each_init(
            || (vec![0.0; num_channels], vec![0.0; num_outputs]),
            |(input, output), (mut out_row, raw_row)| {
                for (dst, &src) in input.iter_mut().zip(raw_row.iter()) {
                    *dst = src;
                }
                objective.convert_output(&input[..], &mut output[..]);
                out_row.assign(&ArrayView1::from(&output[..]));
            },
        );

    Ok(converted)
}

/// Training state bound by `init`: the row count and a shared handle on the
/// metadata.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    num_data: usize,
    metadata: Option<Metadata>,
}

impl Session {
    /// Validate `metadata` against `num_data` and capture it.
    pub(crate) fn bind(metadata: &Metadata, num_data: DataSize) -> Result<Self> {
        metadata.check_consistency(num_data)?;
        log::debug!(
            "Binding objective metadata: {} rows, weighted: {}, queries: {}",
            num_data,
            metadata.weights().is_some(),
            metadata.num_queries()
        );
        Ok(Session {
            num_data: num_data as usize,
            metadata: Some(metadata.clone()),
        })
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.metadata.is_some()
    }

    pub(crate) fn num_data(&self) -> usize {
        self.num_data
    }

    pub(crate) fn metadata(&self) -> &Metadata {
        match &self.metadata {
            Some(metadata) => metadata,
            None => panic!("objective used before init"),
        }
    }

    pub(crate) fn label(&self) -> &[Label] {
        self.metadata().label()
    }

    pub(crate) fn weights(&self) -> Option<&[Label]> {
        self.metadata().weights()
    }

    /// False before `init`.
    pub(crate) fn has_weights(&self) -> bool {
        self.metadata
            .as_ref()
            .map_or(false, |m| m.weights().is_some())
    }
}

/// Assert that both buffers cover `len` slots.
#[inline]
pub(crate) fn check_buffers(len: usize, scores: &[f64], gpair: &[GradHessPair]) {
    assert!(
        scores.len() >= len,
        "scores holds {} values, expected at least {}",
        scores.len(),
        len
    );
    assert!(
        gpair.len() >= len,
        "gradient buffer holds {} slots, expected at least {}",
        gpair.len(),
        len
    );
}

/// Fill `gpair[..num_data]` in parallel from a per-row kernel `(row, score)`,
/// scaling by the sample weight when weights are present.
pub(crate) fn compute_rows<F>(
    scores: &[f64],
    gpair: &mut [GradHessPair],
    weights: Option<&[Label]>,
    kernel: F,
) where
    F: Fn(usize, f64) -> GradHessPair + Sync + Send,
{
    let num_data = scores.len().min(gpair.len());
    let rows = gpair[..num_data]
        .par_iter_mut()
        .zip(scores[..num_data].par_iter())
        .enumerate()
        .with_min_len(PARALLEL_MIN_ROWS);
    match weights {
        None => rows.for_each(|(i, (slot, &score))| *slot = kernel(i, score)),
        Some(weights) => rows.for_each(|(i, (slot, &score))| {
            *slot = kernel(i, score).weighted(weights[i] as f64)
        }),
    }
}

/// Weighted mean of the labels.
pub(crate) fn weighted_mean(label: &[Label], weights: Option<&[Label]>) -> f64 {
    let (sum, total) = match weights {
        None => (
            label.iter().map(|&l| l as f64).sum::<f64>(),
            label.len() as f64,
        ),
        Some(w) => label
            .iter()
            .zip(w)
            .fold((0.0, 0.0), |(s, t), (&l, &w)| (s + l as f64 * w as f64, t + w as f64)),
    };
    if total > 0.0 {
        sum / total
    } else {
        0.0
    }
}

/// Weighted `alpha`-percentile of the labels.
///
/// Unweighted data interpolates linearly between order statistics; weighted
/// data returns the first label whose cumulative weight reaches
/// `alpha * total_weight`.
pub(crate) fn weighted_percentile(label: &[Label], weights: Option<&[Label]>, alpha: f64) -> f64 {
    if label.is_empty() {
        return 0.0;
    }
    let mut order: Vec<usize> = (0..label.len()).collect();
    order.sort_by(|&a, &b| label[a].total_cmp(&label[b]));

    match weights {
        None => {
            let pos = alpha * (label.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            let v_lo = label[order[lo]] as f64;
            let v_hi = label[order[hi]] as f64;
            v_lo + (v_hi - v_lo) * frac
        }
        Some(w) => {
            let total: f64 = w.iter().map(|&x| x as f64).sum();
            let threshold = alpha * total;
            let mut acc = 0.0;
            for &idx in &order {
                acc += w[idx] as f64;
                if acc >= threshold {
                    return label[idx] as f64;
                }
            }
            label[order[order.len() - 1]] as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[derive(Debug)]
    struct Identity;

    impl fmt::Display for Identity {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("identity")
        }
    }

    impl ObjectiveFunction for Identity {
        fn init(&mut self, _metadata: &Metadata, _num_data: DataSize) -> Result<()> {
            Ok(())
        }

        fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
            compute_rows(scores, gpair, None, |_, s| GradHessPair::new(s, 1.0));
        }

        fn name(&self) -> &'static str {
            "identity"
        }
    }

    #[test]
    fn test_trait_defaults() {
        let objective = Identity;
        assert!(!objective.is_constant_hessian());
        assert!(!objective.boost_from_average());
        assert!(!objective.skip_empty_class());
        assert_eq!(objective.num_tree_per_iteration(), 1);
        assert_eq!(objective.num_predict_one_row(), 1);
        assert_eq!(objective.boost_from_score(0), 0.0);
        assert!(objective.class_need_train(0));

        let mut out = [0.0];
        for x in [-3.5, 0.0, 1e300, f64::MIN_POSITIVE] {
            objective.convert_output(&[x], &mut out);
            assert_eq!(out[0], x);
        }
    }

    #[test]
    fn test_compute_rows_weighted() {
        let scores = [1.0, 2.0, 3.0];
        let weights = [1.0f32, 0.5, 2.0];
        let mut gpair = [GradHessPair::default(); 3];
        compute_rows(&scores, &mut gpair, Some(&weights), |_, s| GradHessPair::new(s, 1.0));
        assert_eq!(gpair[1], GradHessPair::new(1.0, 0.5));
        assert_eq!(gpair[2], GradHessPair::new(6.0, 2.0));
    }

    #[test]
    fn test_convert_scores_identity() {
        let raw = array![[0.5], [-1.0], [2.0]];
        let converted = convert_scores(&Identity, raw.view()).unwrap();
        assert_eq!(converted, raw);

        let wrong = array![[0.5, 1.0]];
        assert!(convert_scores(&Identity, wrong.view()).is_err());
    }

    #[test]
    fn test_weighted_mean() {
        assert_abs_diff_eq!(weighted_mean(&[1.0, 2.0, 3.0], None), 2.0);
        assert_abs_diff_eq!(weighted_mean(&[1.0, 3.0], Some(&[3.0, 1.0])), 1.5);
        assert_eq!(weighted_mean(&[1.0], Some(&[0.0])), 0.0);
    }

    #[test]
    fn test_weighted_percentile() {
        let label = [5.0, 1.0, 3.0, 2.0, 4.0];
        assert_abs_diff_eq!(weighted_percentile(&label, None, 0.5), 3.0);
        assert_abs_diff_eq!(weighted_percentile(&label, None, 0.0), 1.0);
        assert_abs_diff_eq!(weighted_percentile(&label, None, 1.0), 5.0);
        assert_abs_diff_eq!(weighted_percentile(&[1.0, 2.0], None, 0.5), 1.5);

        let weights = [1.0, 1.0, 1.0, 1.0, 10.0];
        assert_abs_diff_eq!(weighted_percentile(&label, Some(&weights), 0.5), 4.0);
    }

    #[test]
    #[should_panic(expected = "before init")]
    fn test_unbound_session_panics() {
        let session = Session::default();
        assert!(!session.is_bound());
        let _ = session.label();
    }
}
