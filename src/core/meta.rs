//! Training metadata handed to objectives at initialization.
//!
//! [`Metadata`] is a read-only view over per-example labels, optional sample
//! weights, optional query (group) boundaries for ranking, and an optional
//! initial score. Every buffer sits behind an [`Arc`], so an objective can
//! keep the metadata for the whole session by cloning the handle without
//! copying any rows.

use std::sync::Arc;

use ndarray::Array1;

use crate::core::error::Result;
use crate::core::types::{DataSize, Label};
use crate::data_error;

/// Per-example training context owned by the dataset and shared with objectives.
#[derive(Debug, Clone)]
pub struct Metadata {
    label: Arc<[Label]>,
    weights: Option<Arc<[Label]>>,
    query_boundaries: Option<Arc<[DataSize]>>,
    init_score: Option<Arc<[f64]>>,
}

impl Metadata {
    /// Create metadata from labels only.
    pub fn new(labels: Vec<Label>) -> Self {
        Metadata {
            label: labels.into(),
            weights: None,
            query_boundaries: None,
            init_score: None,
        }
    }

    /// Create metadata from an ndarray label vector.
    pub fn from_array(labels: Array1<Label>) -> Self {
        Self::new(labels.to_vec())
    }

    /// Attach per-example weights.
    pub fn with_weights(mut self, weights: Vec<Label>) -> Self {
        self.weights = Some(weights.into());
        self
    }

    /// Attach query boundaries: `num_queries + 1` offsets starting at 0.
    pub fn with_query_boundaries(mut self, boundaries: Vec<DataSize>) -> Self {
        self.query_boundaries = Some(boundaries.into());
        self
    }

    /// Attach queries given as consecutive group sizes.
    pub fn with_query_counts(self, counts: &[DataSize]) -> Self {
        let mut boundaries = Vec::with_capacity(counts.len() + 1);
        let mut offset: DataSize = 0;
        boundaries.push(offset);
        for &count in counts {
            offset = offset.saturating_add(count);
            boundaries.push(offset);
        }
        self.with_query_boundaries(boundaries)
    }

    /// Attach an initial score, `num_data * num_channels` values, channel-major.
    pub fn with_init_score(mut self, init_score: Vec<f64>) -> Self {
        self.init_score = Some(init_score.into());
        self
    }

    /// Number of examples covered by the labels.
    pub fn num_data(&self) -> usize {
        self.label.len()
    }

    /// Labels, one per example.
    pub fn label(&self) -> &[Label] {
        &self.label
    }

    /// Sample weights, if any.
    pub fn weights(&self) -> Option<&[Label]> {
        self.weights.as_deref()
    }

    /// Query boundaries, if any.
    pub fn query_boundaries(&self) -> Option<&[DataSize]> {
        self.query_boundaries.as_deref()
    }

    /// Number of queries, zero when no grouping is attached.
    pub fn num_queries(&self) -> usize {
        self.query_boundaries
            .as_ref()
            .map_or(0, |b| b.len().saturating_sub(1))
    }

    /// Initial score, if any.
    pub fn init_score(&self) -> Option<&[f64]> {
        self.init_score.as_deref()
    }

    /// Weight of example `idx`, `1.0` when unweighted.
    #[inline]
    pub fn weight_at(&self, idx: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[idx] as f64)
    }

    /// Verify that every attached buffer agrees with `num_data` and holds
    /// finite values.
    pub fn check_consistency(&self, num_data: DataSize) -> Result<()> {
        if num_data <= 0 {
            return Err(data_error!("num_data must be positive, got {}", num_data));
        }
        let n = num_data as usize;
        if self.label.len() != n {
            return Err(data_error!(
                "label length {} does not match num_data {}",
                self.label.len(),
                n
            ));
        }
        if let Some(i) = self.label.iter().position(|l| !l.is_finite()) {
            return Err(data_error!("label at index {} is not finite", i));
        }

        if let Some(weights) = &self.weights {
            if weights.len() != n {
                return Err(data_error!(
                    "weights length {} does not match num_data {}",
                    weights.len(),
                    n
                ));
            }
            if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
                return Err(data_error!(
                    "weight at index {} must be finite and non-negative, got {}",
                    i,
                    weights[i]
                ));
            }
        }

        if let Some(boundaries) = &self.query_boundaries {
            if boundaries.len() < 2 || boundaries[0] != 0 {
                return Err(data_error!(
                    "query boundaries must start at 0 and describe at least one query"
                ));
            }
            if boundaries.windows(2).any(|w| w[1] < w[0]) {
                return Err(data_error!("query boundaries must be non-decreasing"));
            }
            let last = boundaries[boundaries.len() - 1];
            if last != num_data {
                return Err(data_error!(
                    "query boundaries end at {} but num_data is {}",
                    last,
                    num_data
                ));
            }
        }

        if let Some(init_score) = &self.init_score {
            if init_score.is_empty() || init_score.len() % n != 0 {
                return Err(data_error!(
                    "init score length {} is not a multiple of num_data {}",
                    init_score.len(),
                    n
                ));
            }
        }

        Ok(())
    }
}
