//! LambdaMART with the NDCG metric.

use std::fmt;

use rayon::prelude::*;

use crate::config::ObjectiveConfig;
use crate::core::constants::K_MIN_SCORE;
use crate::core::error::Result;
use crate::core::meta::Metadata;
use crate::core::types::{DataSize, GradHessPair, Label};
use crate::{data_error, parse_error};
use crate::objective::factory::DescriptionTokens;
use crate::objective::{check_buffers, ObjectiveFunction, Session};

/// Position discount `1 / log2(2 + i)` for zero-based rank `i`.
#[inline]
fn discount(rank: usize) -> f64 {
    1.0 / (2.0 + rank as f64).log2()
}

/// Pairwise ranking objective that weights each swapped pair by its NDCG change.
///
/// Gradients are computed independently per query; only pairs involving a
/// document in the top `truncation_level` positions contribute.
#[derive(Debug)]
pub struct LambdarankNdcg {
    sigmoid: f64,
    norm: bool,
    truncation_level: usize,
    label_gain: Vec<f64>,
    session: Session,
    inverse_max_dcgs: Vec<f64>,
}

impl LambdarankNdcg {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        LambdarankNdcg {
            sigmoid: config.sigmoid,
            norm: config.lambdarank_norm,
            truncation_level: config.lambdarank_truncation_level,
            label_gain: config.label_gain.clone(),
            session: Session::default(),
            inverse_max_dcgs: Vec::new(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["sigmoid", "truncation_level", "norm", "label_gain"]);
        let label_gain: Vec<f64> = tokens.list("label_gain")?;
        if label_gain.iter().any(|g| !(g.is_finite() && *g >= 0.0)) {
            return Err(parse_error!(
                "label_gain in lambdarank objective description must be finite and non-negative"
            ));
        }
        Ok(LambdarankNdcg {
            sigmoid: tokens.positive("sigmoid")?,
            norm: tokens.required("norm")?,
            truncation_level: tokens.required_where(
                "truncation_level",
                |t: &usize| *t >= 1,
                "must be at least 1",
            )?,
            label_gain,
            session: Session::default(),
            inverse_max_dcgs: Vec::new(),
        })
    }

    /// Largest DCG attainable in the top `k` positions for this set of labels.
    fn max_dcg_at_k(&self, k: usize, label: &[Label]) -> f64 {
        let mut gains: Vec<f64> = label
            .iter()
            .map(|&l| self.label_gain[l as usize])
            .collect();
        gains.sort_by(|a, b| b.total_cmp(a));
        gains
            .iter()
            .take(k)
            .enumerate()
            .map(|(rank, gain)| gain * discount(rank))
            .sum()
    }

    fn gradients_for_query(
        &self,
        query_id: usize,
        score: &[f64],
        label: &[Label],
        weights: Option<&[Label]>,
        out: &mut [GradHessPair],
    ) {
        let cnt = out.len();
        out.fill(GradHessPair::default());
        let inverse_max_dcg = self.inverse_max_dcgs[query_id];

        let mut sorted_idx: Vec<usize> = (0..cnt).collect();
        sorted_idx.sort_by(|&a, &b| score[b].total_cmp(&score[a]));

        let mut worst_idx = cnt - 1;
        if worst_idx > 0 && score[sorted_idx[worst_idx]] == K_MIN_SCORE {
            worst_idx -= 1;
        }
        let best_score = score[sorted_idx[0]];
        let worst_score = score[sorted_idx[worst_idx]];

        let mut sum_lambdas = 0.0;
        for i in 0..(cnt - 1).min(self.truncation_level) {
            if score[sorted_idx[i]] == K_MIN_SCORE {
                continue;
            }
            for j in (i + 1)..cnt {
                if score[sorted_idx[j]] == K_MIN_SCORE {
                    continue;
                }
                if label[sorted_idx[i]] == label[sorted_idx[j]] {
                    continue;
                }
                let (high_rank, low_rank) = if label[sorted_idx[i]] > label[sorted_idx[j]] {
                    (i, j)
                } else {
                    (j, i)
                };
                let high = sorted_idx[high_rank];
                let low = sorted_idx[low_rank];

                let delta_score = score[high] - score[low];
                let dcg_gap =
                    self.label_gain[label[high] as usize] - self.label_gain[label[low] as usize];
                let paired_discount = (discount(high_rank) - discount(low_rank)).abs();
                let mut delta_pair_ndcg = dcg_gap * paired_discount * inverse_max_dcg;
                if self.norm && best_score != worst_score {
                    delta_pair_ndcg /= 0.01 + delta_score.abs();
                }

                let mut p_lambda = 1.0 / (1.0 + (self.sigmoid * delta_score).exp());
                let mut p_hessian = p_lambda * (1.0 - p_lambda);
                p_lambda *= -self.sigmoid * delta_pair_ndcg;
                p_hessian *= self.sigmoid * self.sigmoid * delta_pair_ndcg;

                out[low].grad -= p_lambda;
                out[low].hess += p_hessian;
                out[high].grad += p_lambda;
                out[high].hess += p_hessian;
                sum_lambdas -= 2.0 * p_lambda;
            }
        }

        if self.norm && sum_lambdas > 0.0 {
            let norm_factor = (1.0 + sum_lambdas).log2() / sum_lambdas;
            for pair in out.iter_mut() {
                *pair = pair.weighted(norm_factor);
            }
        }
        if let Some(weights) = weights {
            for (pair, &w) in out.iter_mut().zip(weights) {
                *pair = pair.weighted(w as f64);
            }
        }
    }
}

impl fmt::Display for LambdarankNdcg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sigmoid:{} truncation_level:{} norm:{} label_gain:",
            self.name(),
            self.sigmoid,
            self.truncation_level,
            self.norm
        )?;
        for (i, gain) in self.label_gain.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", gain)?;
        }
        Ok(())
    }
}

impl ObjectiveFunction for LambdarankNdcg {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        let boundaries = session
            .metadata()
            .query_boundaries()
            .ok_or_else(|| data_error!("Lambdarank tasks require query information"))?;

        let num_gain = self.label_gain.len();
        if let Some(i) = session
            .label()
            .iter()
            .position(|&l| l < 0.0 || l.fract() != 0.0 || l as usize >= num_gain)
        {
            return Err(data_error!(
                "[{}]: label must be an integer in [0, {}), but found {} at index {}",
                self.name(),
                num_gain,
                session.label()[i],
                i
            ));
        }

        let label = session.label();
        let inverse_max_dcgs: Vec<f64> = boundaries
            .windows(2)
            .map(|w| {
                let query_label = &label[w[0] as usize..w[1] as usize];
                let max_dcg = self.max_dcg_at_k(self.truncation_level, query_label);
                if max_dcg > 0.0 {
                    1.0 / max_dcg
                } else {
                    0.0
                }
            })
            .collect();
        log::info!(
            "[{}]: {} queries, truncation level {}",
            self.name(),
            inverse_max_dcgs.len(),
            self.truncation_level
        );

        self.inverse_max_dcgs = inverse_max_dcgs;
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let metadata = self.session.metadata();
        let boundaries = metadata.query_boundaries().unwrap_or_default();
        let label = metadata.label();
        let weights = metadata.weights();

        // disjoint per-query output slices
        let mut queries: Vec<(usize, &mut [GradHessPair])> =
            Vec::with_capacity(boundaries.len().saturating_sub(1));
        let mut rest = &mut gpair[..n];
        for (query_id, w) in boundaries.windows(2).enumerate() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut((w[1] - w[0]) as usize);
            queries.push((query_id, head));
            rest = tail;
        }

        queries.into_par_iter().for_each(|(query_id, out)| {
            if out.is_empty() {
                return;
            }
            let start = boundaries[query_id] as usize;
            let end = start + out.len();
            self.gradients_for_query(
                query_id,
                &scores[start..end],
                &label[start..end],
                weights.map(|w| &w[start..end]),
                out,
            );
        });
    }

    fn name(&self) -> &'static str {
        "lambdarank"
    }
}
