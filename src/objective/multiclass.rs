//! Multiclass objectives: softmax and one-vs-all.
//!
//! Both train one tree per class per round. Scores and gradients use the
//! channel-major layout, so class `k` owns slots `k * num_data..(k + 1) * num_data`.

use std::fmt;

use rayon::prelude::*;

use crate::config::ObjectiveConfig;
use crate::core::constants::{K_EPSILON, PARALLEL_MIN_ROWS};
use crate::core::error::Result;
use crate::core::meta::Metadata;
use crate::core::types::{DataSize, GradHessPair, Label};
use crate::data_error;
use crate::objective::factory::DescriptionTokens;
use crate::objective::{check_buffers, compute_rows, BinaryLogloss, ObjectiveFunction, Session};

/// Labels must be integers in `[0, num_class)`.
fn check_class_labels(name: &str, label: &[Label], num_class: usize) -> Result<()> {
    match label
        .iter()
        .position(|&l| l < 0.0 || l.fract() != 0.0 || l as usize >= num_class)
    {
        Some(i) => Err(data_error!(
            "[{}]: label must be in [0, {}), but found {} at index {}",
            name,
            num_class,
            label[i],
            i
        )),
        None => Ok(()),
    }
}

/// Numerically stable softmax of `input` into `output`.
fn softmax(input: &[f64], output: &mut [f64]) {
    let max = input.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for (o, &x) in output.iter_mut().zip(input) {
        *o = (x - max).exp();
        sum += *o;
    }
    for o in output.iter_mut() {
        *o /= sum;
    }
}

fn num_class_from_tokens(tokens: &DescriptionTokens<'_>) -> Result<usize> {
    tokens.required_where("num_class", |k: &usize| *k >= 2, "must be at least 2")
}

/// Softmax cross-entropy over `num_class` classes.
#[derive(Debug)]
pub struct MulticlassSoftmax {
    num_class: usize,
    session: Session,
    label_int: Vec<usize>,
    class_init_probs: Vec<f64>,
}

impl MulticlassSoftmax {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        MulticlassSoftmax::with_num_class(config.num_class)
    }

    fn with_num_class(num_class: usize) -> Self {
        MulticlassSoftmax {
            num_class,
            session: Session::default(),
            label_int: Vec::new(),
            class_init_probs: Vec::new(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["num_class"]);
        Ok(MulticlassSoftmax::with_num_class(num_class_from_tokens(tokens)?))
    }
}

impl fmt::Display for MulticlassSoftmax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} num_class:{}", self.name(), self.num_class)
    }
}

impl ObjectiveFunction for MulticlassSoftmax {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        check_class_labels(self.name(), session.label(), self.num_class)?;

        let label_int: Vec<usize> = session.label().iter().map(|&l| l as usize).collect();
        let mut class_init_probs = vec![0.0; self.num_class];
        let mut sum_weight = 0.0;
        for (i, &class_id) in label_int.iter().enumerate() {
            let w = session.metadata().weight_at(i);
            class_init_probs[class_id] += w;
            sum_weight += w;
        }
        if sum_weight > 0.0 {
            for p in class_init_probs.iter_mut() {
                *p /= sum_weight;
            }
        }
        for (class_id, _) in class_init_probs.iter().enumerate().filter(|&(_, &p)| p == 0.0) {
            log::warn!("[{}]: class {} has no training examples", self.name(), class_id);
        }

        self.label_int = label_int;
        self.class_init_probs = class_init_probs;
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        let k_count = self.num_class;
        check_buffers(n * k_count, scores, gpair);

        // per-row (max, sum of exp(score - max))
        let normalizers: Vec<(f64, f64)> = (0..n)
            .into_par_iter()
            .with_min_len(PARALLEL_MIN_ROWS)
            .map(|i| {
                let row = (0..k_count).map(|k| scores[k * n + i]);
                let max = row.clone().fold(f64::NEG_INFINITY, f64::max);
                (max, row.map(|s| (s - max).exp()).sum::<f64>())
            })
            .collect();

        let factor = k_count as f64 / (k_count as f64 - 1.0);
        let label_int = &self.label_int;
        let normalizers = &normalizers;
        for (k, channel) in gpair[..n * k_count].chunks_mut(n).enumerate() {
            compute_rows(
                &scores[k * n..(k + 1) * n],
                channel,
                self.session.weights(),
                |i, s| {
                    let (max, sum) = normalizers[i];
                    let p = (s - max).exp() / sum;
                    let grad = if label_int[i] == k { p - 1.0 } else { p };
                    GradHessPair::new(grad, factor * p * (1.0 - p))
                },
            );
        }
    }

    fn name(&self) -> &'static str {
        "multiclass"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn skip_empty_class(&self) -> bool {
        true
    }

    fn num_tree_per_iteration(&self) -> usize {
        self.num_class
    }

    fn num_predict_one_row(&self) -> usize {
        self.num_class
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        softmax(&input[..self.num_class], &mut output[..self.num_class]);
    }

    fn boost_from_score(&self, class_id: usize) -> f64 {
        match self.class_init_probs.get(class_id) {
            Some(&p) => p.max(K_EPSILON).ln(),
            None => 0.0,
        }
    }

    fn class_need_train(&self, class_id: usize) -> bool {
        match self.class_init_probs.get(class_id) {
            Some(&p) => p > K_EPSILON && p < 1.0 - K_EPSILON,
            None => true,
        }
    }
}

/// One-vs-all multiclass: an independent binary log-loss per class.
#[derive(Debug)]
pub struct MulticlassOva {
    num_class: usize,
    template: BinaryLogloss,
    binaries: Vec<BinaryLogloss>,
}

impl MulticlassOva {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        MulticlassOva {
            num_class: config.num_class,
            template: BinaryLogloss::new(config),
            binaries: Vec::new(),
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["num_class", "sigmoid", "scale_pos_weight", "is_unbalance"]);
        let num_class = num_class_from_tokens(tokens)?;
        Ok(MulticlassOva {
            num_class,
            template: BinaryLogloss::from_tokens(tokens)?,
            binaries: Vec::new(),
        })
    }
}

impl fmt::Display for MulticlassOva {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} num_class:{}", self.name(), self.num_class)?;
        self.template.fmt_params(f)
    }
}

impl ObjectiveFunction for MulticlassOva {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        metadata.check_consistency(num_data)?;
        check_class_labels(self.name(), metadata.label(), self.num_class)?;

        let mut binaries: Vec<BinaryLogloss> = (0..self.num_class)
            .map(|k| self.template.engine_for(k))
            .collect();
        for binary in binaries.iter_mut() {
            binary.init(metadata, num_data)?;
        }
        self.binaries = binaries;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        assert!(!self.binaries.is_empty(), "objective used before init");
        let n = self.binaries[0].num_data();
        check_buffers(n * self.num_class, scores, gpair);

        gpair[..n * self.num_class]
            .par_chunks_mut(n)
            .zip(self.binaries.par_iter())
            .enumerate()
            .for_each(|(k, (channel, binary))| {
                binary.get_gradients(&scores[k * n..(k + 1) * n], channel);
            });
    }

    fn name(&self) -> &'static str {
        "multiclassova"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn skip_empty_class(&self) -> bool {
        true
    }

    fn num_tree_per_iteration(&self) -> usize {
        self.num_class
    }

    fn num_predict_one_row(&self) -> usize {
        self.num_class
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        let sigmoid = self.template.sigmoid();
        for (o, &x) in output[..self.num_class].iter_mut().zip(input) {
            *o = 1.0 / (1.0 + (-sigmoid * x).exp());
        }
    }

    fn boost_from_score(&self, class_id: usize) -> f64 {
        self.binaries
            .get(class_id)
            .map_or(0.0, |binary| binary.boost_from_score(0))
    }

    fn class_need_train(&self, class_id: usize) -> bool {
        self.binaries
            .get(class_id)
            .map_or(true, |binary| binary.class_need_train(0))
    }
}
