//! Binary log-loss.

use std::fmt;

use crate::config::objective::conflicting_binary_weights;
use crate::config::ObjectiveConfig;
use crate::core::constants::{DEFAULT_SCALE_POS_WEIGHT, K_EPSILON};
use crate::core::error::Result;
use crate::core::meta::Metadata;
use crate::core::types::{DataSize, GradHessPair};
use crate::{data_error, parse_error};
use crate::objective::factory::DescriptionTokens;
use crate::objective::{check_buffers, compute_rows, ObjectiveFunction, Session};

/// Logistic loss on labels in `{0, 1}` with a scaled sigmoid link.
///
/// Also serves as the per-class engine of one-vs-all multiclass training, in
/// which case an example is positive when its label equals `positive_class`.
#[derive(Debug)]
pub struct BinaryLogloss {
    sigmoid: f64,
    is_unbalance: bool,
    scale_pos_weight: f64,
    positive_class: Option<usize>,
    session: Session,
    is_pos: Vec<bool>,
    /// `[negative, positive]`
    label_weights: [f64; 2],
    need_train: bool,
}

impl BinaryLogloss {
    /// Create the objective from configuration.
    pub fn new(config: &ObjectiveConfig) -> Self {
        BinaryLogloss::with_params(
            config.sigmoid,
            config.is_unbalance,
            config.scale_pos_weight,
            None,
        )
    }

    /// Binary engine that treats label `class_id` as the positive class.
    pub fn for_class(config: &ObjectiveConfig, class_id: usize) -> Self {
        BinaryLogloss::with_params(
            config.sigmoid,
            config.is_unbalance,
            config.scale_pos_weight,
            Some(class_id),
        )
    }

    pub(crate) fn with_params(
        sigmoid: f64,
        is_unbalance: bool,
        scale_pos_weight: f64,
        positive_class: Option<usize>,
    ) -> Self {
        BinaryLogloss {
            sigmoid,
            is_unbalance,
            scale_pos_weight,
            positive_class,
            session: Session::default(),
            is_pos: Vec::new(),
            label_weights: [1.0, 1.0],
            need_train: true,
        }
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&["sigmoid", "scale_pos_weight", "is_unbalance"]);
        let sigmoid = tokens.positive("sigmoid")?;
        let scale_pos_weight = tokens
            .optional_positive("scale_pos_weight")?
            .unwrap_or(DEFAULT_SCALE_POS_WEIGHT);
        let is_unbalance = tokens.flag("is_unbalance");
        if conflicting_binary_weights(is_unbalance, scale_pos_weight) {
            return Err(parse_error!(
                "{} objective description sets both is_unbalance and scale_pos_weight",
                tokens.name()
            ));
        }
        Ok(BinaryLogloss::with_params(
            sigmoid,
            is_unbalance,
            scale_pos_weight,
            None,
        ))
    }

    pub(crate) fn sigmoid(&self) -> f64 {
        self.sigmoid
    }

    pub(crate) fn num_data(&self) -> usize {
        self.session.num_data()
    }

    /// Uninitialized copy of this objective's parameters with `class_id` as the positive class.
    pub(crate) fn engine_for(&self, class_id: usize) -> BinaryLogloss {
        BinaryLogloss::with_params(
            self.sigmoid,
            self.is_unbalance,
            self.scale_pos_weight,
            Some(class_id),
        )
    }

    /// Write the parameter tokens shared with one-vs-all descriptions.
    pub(crate) fn fmt_params(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " sigmoid:{}", self.sigmoid)?;
        if self.scale_pos_weight != DEFAULT_SCALE_POS_WEIGHT {
            write!(f, " scale_pos_weight:{}", self.scale_pos_weight)?;
        }
        if self.is_unbalance {
            f.write_str(" is_unbalance")?;
        }
        Ok(())
    }

    fn is_positive(&self, label: f32) -> bool {
        match self.positive_class {
            Some(class_id) => label as usize == class_id,
            None => label > 0.0,
        }
    }
}

impl fmt::Display for BinaryLogloss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        self.fmt_params(f)
    }
}

impl ObjectiveFunction for BinaryLogloss {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        if self.positive_class.is_none() {
            if let Some(i) = session
                .label()
                .iter()
                .position(|&l| l != 0.0 && l != 1.0)
            {
                return Err(data_error!(
                    "[binary]: labels must be 0 or 1 (label {} at index {})",
                    session.label()[i],
                    i
                ));
            }
        }

        let is_pos: Vec<bool> = session.label().iter().map(|&l| self.is_positive(l)).collect();
        let cnt_positive = is_pos.iter().filter(|&&p| p).count();
        let cnt_negative = is_pos.len() - cnt_positive;

        let need_train = cnt_positive > 0 && cnt_negative > 0;
        if !need_train {
            log::warn!("Contains only one class");
        }
        log::info!(
            "Number of positive: {}, number of negative: {}",
            cnt_positive,
            cnt_negative
        );

        let mut label_weights = [1.0, 1.0];
        if self.is_unbalance && need_train {
            if cnt_positive > cnt_negative {
                label_weights[0] = cnt_positive as f64 / cnt_negative as f64;
            } else {
                label_weights[1] = cnt_negative as f64 / cnt_positive as f64;
            }
        }
        label_weights[1] *= self.scale_pos_weight;

        self.is_pos = is_pos;
        self.label_weights = label_weights;
        self.need_train = need_train;
        self.session = session;
        Ok(())
    }

    fn get_gradients(&self, scores: &[f64], gpair: &mut [GradHessPair]) {
        let n = self.session.num_data();
        check_buffers(n, scores, gpair);
        let sigmoid = self.sigmoid;
        let is_pos = &self.is_pos;
        let label_weights = self.label_weights;
        compute_rows(&scores[..n], &mut gpair[..n], self.session.weights(), |i, s| {
            let pos = is_pos[i];
            let label = if pos { 1.0 } else { -1.0 };
            let label_weight = label_weights[pos as usize];
            let response = -label * sigmoid / (1.0 + (label * sigmoid * s).exp());
            let abs_response = response.abs();
            GradHessPair::new(
                response * label_weight,
                abs_response * (sigmoid - abs_response) * label_weight,
            )
        });
    }

    fn name(&self) -> &'static str {
        "binary"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = 1.0 / (1.0 + (-self.sigmoid * input[0]).exp());
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        let (suml, sumw) = match self.session.weights() {
            Some(weights) => self
                .is_pos
                .iter()
                .zip(weights)
                .fold((0.0, 0.0), |(sl, sw), (&p, &w)| {
                    (sl + if p { w as f64 } else { 0.0 }, sw + w as f64)
                }),
            None => (
                self.is_pos.iter().filter(|&&p| p).count() as f64,
                self.is_pos.len() as f64,
            ),
        };
        let pavg = if sumw > 0.0 { suml / sumw } else { 0.5 };
        let pavg = pavg.clamp(K_EPSILON, 1.0 - K_EPSILON);
        let init_score = (pavg / (1.0 - pavg)).ln() / self.sigmoid;
        log::info!(
            "[{}:BoostFromScore]: pavg={:.6} -> initscore={:.6}",
            self.name(),
            pavg,
            init_score
        );
        init_score
    }

    fn class_need_train(&self, _class_id: usize) -> bool {
        self.need_train
    }
}
