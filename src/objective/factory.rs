//! Objective construction from a configuration or a persisted description.
//!
//! A persisted description is the objective's `Display` output: the
//! canonical name followed by whitespace-separated `key:value` tokens and
//! bare flags, e.g. `binary sigmoid:1 is_unbalance`.

use std::fmt::Display;
use std::str::FromStr;

use crate::config::objective::is_positive_finite;
use crate::config::ObjectiveConfig;
use crate::core::error::Result;
use crate::core::types::ObjectiveType;
use crate::objective::{
    BinaryLogloss, CrossEntropy, LambdarankNdcg, MulticlassOva, MulticlassSoftmax,
    ObjectiveFunction, RegressionFair, RegressionGamma, RegressionHuber, RegressionL1,
    RegressionL2, RegressionMape, RegressionPoisson, RegressionQuantile, RegressionTweedie,
};
use crate::{config_error, parse_error};

/// Create the objective named `type_name` (canonical name or alias).
///
/// Only the configuration fields the chosen objective reads are validated.
/// Fails with a configuration error for an unknown name or an invalid field.
pub fn create_objective_function(
    type_name: &str,
    config: &ObjectiveConfig,
) -> Result<Box<dyn ObjectiveFunction>> {
    let objective_type = ObjectiveType::from_name_or_alias(type_name)
        .ok_or_else(|| config_error!("Unknown objective type name: {}", type_name))?;
    config.validate_for(objective_type)?;
    log::debug!(
        "Creating objective function {} (requested as {})",
        objective_type,
        type_name
    );

    let objective: Box<dyn ObjectiveFunction> = match objective_type {
        ObjectiveType::Regression => Box::new(RegressionL2::new(config)),
        ObjectiveType::RegressionL1 => Box::new(RegressionL1::new(config)),
        ObjectiveType::Huber => Box::new(RegressionHuber::new(config)),
        ObjectiveType::Fair => Box::new(RegressionFair::new(config)),
        ObjectiveType::Poisson => Box::new(RegressionPoisson::new(config)),
        ObjectiveType::Quantile => Box::new(RegressionQuantile::new(config)),
        ObjectiveType::Mape => Box::new(RegressionMape::new(config)),
        ObjectiveType::Gamma => Box::new(RegressionGamma::new(config)),
        ObjectiveType::Tweedie => Box::new(RegressionTweedie::new(config)),
        ObjectiveType::Binary => Box::new(BinaryLogloss::new(config)),
        ObjectiveType::Multiclass => Box::new(MulticlassSoftmax::new(config)),
        ObjectiveType::MulticlassOva => Box::new(MulticlassOva::new(config)),
        ObjectiveType::CrossEntropy => Box::new(CrossEntropy::new(config)),
        ObjectiveType::Lambdarank => Box::new(LambdarankNdcg::new(config)),
    };
    Ok(objective)
}

/// Create the objective named by `config.objective`.
pub fn create_objective_function_from_config(
    config: &ObjectiveConfig,
) -> Result<Box<dyn ObjectiveFunction>> {
    create_objective_function(&config.objective, config)
}

/// Rebuild an objective from its persisted description.
///
/// The first token must be a canonical objective name. Fails with a parse
/// error for an empty string, an unknown name, or a missing or malformed
/// parameter. Unrecognized tokens are ignored.
pub fn create_objective_function_from_str(description: &str) -> Result<Box<dyn ObjectiveFunction>> {
    let tokens = DescriptionTokens::parse(description)?;
    let objective_type = ObjectiveType::from_canonical_name(tokens.name()).ok_or_else(|| {
        parse_error!("Unknown objective type in description: '{}'", tokens.name())
    })?;

    let objective: Box<dyn ObjectiveFunction> = match objective_type {
        ObjectiveType::Regression => Box::new(RegressionL2::from_tokens(&tokens)?),
        ObjectiveType::RegressionL1 => Box::new(RegressionL1::from_tokens(&tokens)?),
        ObjectiveType::Huber => Box::new(RegressionHuber::from_tokens(&tokens)?),
        ObjectiveType::Fair => Box::new(RegressionFair::from_tokens(&tokens)?),
        ObjectiveType::Poisson => Box::new(RegressionPoisson::from_tokens(&tokens)?),
        ObjectiveType::Quantile => Box::new(RegressionQuantile::from_tokens(&tokens)?),
        ObjectiveType::Mape => Box::new(RegressionMape::from_tokens(&tokens)?),
        ObjectiveType::Gamma => Box::new(RegressionGamma::from_tokens(&tokens)?),
        ObjectiveType::Tweedie => Box::new(RegressionTweedie::from_tokens(&tokens)?),
        ObjectiveType::Binary => Box::new(BinaryLogloss::from_tokens(&tokens)?),
        ObjectiveType::Multiclass => Box::new(MulticlassSoftmax::from_tokens(&tokens)?),
        ObjectiveType::MulticlassOva => Box::new(MulticlassOva::from_tokens(&tokens)?),
        ObjectiveType::CrossEntropy => Box::new(CrossEntropy::from_tokens(&tokens)?),
        ObjectiveType::Lambdarank => Box::new(LambdarankNdcg::from_tokens(&tokens)?),
    };
    log::debug!("Loaded objective function from description: {}", objective);
    Ok(objective)
}

/// Tokenized persisted description.
#[derive(Debug)]
pub(crate) struct DescriptionTokens<'a> {
    name: &'a str,
    entries: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> DescriptionTokens<'a> {
    pub(crate) fn parse(description: &'a str) -> Result<Self> {
        let mut tokens = description.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| parse_error!("Empty objective description"))?;
        let entries = tokens
            .map(|token| match token.split_once(':') {
                Some((key, value)) => (key, Some(value)),
                None => (token, None),
            })
            .collect();
        Ok(DescriptionTokens { name, entries })
    }

    pub(crate) fn name(&self) -> &'a str {
        self.name
    }

    /// Whether the bare flag `key` is present.
    pub(crate) fn flag(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, v)| *k == key && v.is_none())
    }

    pub(crate) fn optional<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        let raw = self
            .entries
            .iter()
            .find_map(|(k, v)| if *k == key { *v } else { None });
        match raw {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
                parse_error!(
                    "Malformed value '{}' for '{}' in {} objective description",
                    raw,
                    key,
                    self.name
                )
            }),
        }
    }

    pub(crate) fn required<T: FromStr>(&self, key: &str) -> Result<T> {
        self.optional(key)?.ok_or_else(|| {
            parse_error!(
                "Objective description '{}' is missing required '{}'",
                self.name,
                key
            )
        })
    }

    /// Like [`required`](Self::required), rejecting values outside the objective's domain.
    pub(crate) fn required_where<T, F>(&self, key: &str, valid: F, expectation: &str) -> Result<T>
    where
        T: FromStr + Display,
        F: Fn(&T) -> bool,
    {
        let value: T = self.required(key)?;
        if !valid(&value) {
            return Err(parse_error!(
                "Value {} for '{}' in {} objective description {}",
                value,
                key,
                self.name,
                expectation
            ));
        }
        Ok(value)
    }

    /// Required strictly positive, finite float.
    pub(crate) fn positive(&self, key: &str) -> Result<f64> {
        self.required_where(key, |v: &f64| is_positive_finite(*v), "must be positive and finite")
    }

    /// Optional strictly positive, finite float.
    pub(crate) fn optional_positive(&self, key: &str) -> Result<Option<f64>> {
        match self.optional::<f64>(key)? {
            Some(value) if !is_positive_finite(value) => Err(parse_error!(
                "Value {} for '{}' in {} objective description must be positive and finite",
                value,
                key,
                self.name
            )),
            value => Ok(value),
        }
    }

    /// Required comma-separated list.
    pub(crate) fn list<T: FromStr>(&self, key: &str) -> Result<Vec<T>> {
        let raw: String = self.required(key)?;
        raw.split(',')
            .map(|item| {
                item.parse::<T>().map_err(|_| {
                    parse_error!(
                        "Malformed list item '{}' for '{}' in {} objective description",
                        item,
                        key,
                        self.name
                    )
                })
            })
            .collect()
    }

    pub(crate) fn log_unknown(&self, known: &[&str]) {
        for (key, _) in &self.entries {
            if !known.contains(key) {
                log::debug!(
                    "Ignoring unknown token '{}' in {} objective description",
                    key,
                    self.name
                );
            }
        }
    }
}
