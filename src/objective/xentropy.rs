//! Cross-entropy on probability labels.

use std::fmt;

use crate::config::ObjectiveConfig;
use crate::core::constants::K_EPSILON;
use crate::core::error::Result;
use crate::core::meta::Metadata;
use crate::core::types::{DataSize, GradHessPair};
use crate::data_error;
use crate::objective::factory::DescriptionTokens;
use crate::objective::{check_buffers, compute_rows, ObjectiveFunction, Session};

/// Log-loss against labels in `[0, 1]` with a plain sigmoid link.
///
/// Unlike [`BinaryLogloss`](super::BinaryLogloss) the labels may be any
/// probability, and sample weights enter as plain multipliers.
#[derive(Debug, Default)]
pub struct CrossEntropy {
    session: Session,
}

impl CrossEntropy {
    /// Create the objective; it has no parameters.
    pub fn new(_config: &ObjectiveConfig) -> Self {
        CrossEntropy::default()
    }

    pub(crate) fn from_tokens(tokens: &DescriptionTokens<'_>) -> Result<Self> {
        tokens.log_unknown(&[]);
        Ok(CrossEntropy::default())
    }
}

impl fmt::Display for CrossEntropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ObjectiveFunction for CrossEntropy {
    fn init(&mut self, metadata: &Metadata, num_data: DataSize) -> Result<()> {
        let session = Session::bind(metadata, num_data)?;
        if let Some(i) = session
            .label()
            .iter()
            .position(|l| !(0.0..=1.0).contains(l))
        {
            return Err(data_error!(
                "[{}]: label must be in [0, 1], but found {} at index {}",
                self.name(),
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
            let z = 1.0 / (1.0 + (-s).exp());
            GradHessPair::new(z - label[i] as f64, z * (1.0 - z))
        });
    }

    fn name(&self) -> &'static str {
        "cross_entropy"
    }

    fn boost_from_average(&self) -> bool {
        true
    }

    fn convert_output(&self, input: &[f64], output: &mut [f64]) {
        output[0] = 1.0 / (1.0 + (-input[0]).exp());
    }

    fn boost_from_score(&self, _class_id: usize) -> f64 {
        if !self.session.is_bound() {
            return 0.0;
        }
        let pavg = crate::objective::weighted_mean(self.session.label(), self.session.weights())
            .clamp(K_EPSILON, 1.0 - K_EPSILON);
        let init_score = (pavg / (1.0 - pavg)).ln();
        log::info!(
            "[{}:BoostFromScore]: pavg={:.6} -> initscore={:.6}",
            self.name(),
            pavg,
            init_score
        );
        init_score
    }
}
