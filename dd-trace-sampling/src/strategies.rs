// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sampling strategies, as served by a remote sampling endpoint

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::per_operation_sampler::PerOperationSampler;
use crate::probabilistic_sampler::ProbabilisticSampler;
use crate::rate_limiting_sampler::RateLimitingSampler;
use crate::sampler::Sampler;

/// Samples traces with a fixed probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticSamplingStrategy {
    /// Sampling probability in the range [0.0, 1.0]
    pub sampling_rate: f64,
}

/// Samples a fixed number of traces per second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingSamplingStrategy {
    /// Fractional values express rates below one trace per second
    pub max_traces_per_second: f64,
}

/// Probabilistic sampling strategy of a single operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSamplingStrategy {
    pub operation: String,
    pub probabilistic_sampling: ProbabilisticSamplingStrategy,
}

/// Strategies for individual operations, and defaults for the other ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerOperationSamplingStrategies {
    /// Sampling probability of operations without a dedicated strategy
    pub default_sampling_probability: f64,
    /// Minimum number of traces per second sampled for every operation.
    ///
    /// The limit is local to the process: N instances of a service sample at least N times
    /// this rate.
    pub default_lower_bound_traces_per_second: f64,
    #[serde(default)]
    pub per_operation_strategies: Vec<OperationSamplingStrategy>,
    /// Not used by the samplers of this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_upper_bound_traces_per_second: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SamplingStrategyType {
    Probabilistic,
    RateLimiting,
}

/// The sampling strategy of a service.
///
/// Only one of the strategies is expected to be set. When several are, operation sampling takes
/// precedence over probabilistic sampling, which takes precedence over rate limiting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyResponse {
    /// Legacy discriminant, ignored in favor of the strategies actually present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<SamplingStrategyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilistic_sampling: Option<ProbabilisticSamplingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limiting_sampling: Option<RateLimitingSamplingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_sampling: Option<PerOperationSamplingStrategies>,
}

impl SamplingStrategyResponse {
    /// Parse from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Creates the sampler implementing this strategy
    pub fn build_sampler(&self, max_operations: usize) -> Result<Box<dyn Sampler>> {
        if let Some(operation_sampling) = &self.operation_sampling {
            return Ok(Box::new(PerOperationSampler::new(
                max_operations,
                operation_sampling,
            )?));
        }
        if let Some(probabilistic) = &self.probabilistic_sampling {
            return Ok(Box::new(ProbabilisticSampler::new(
                probabilistic.sampling_rate,
            )?));
        }
        if let Some(rate_limiting) = &self.rate_limiting_sampling {
            return Ok(Box::new(RateLimitingSampler::new(
                rate_limiting.max_traces_per_second,
            )?));
        }
        Err(Error::EmptyStrategy)
    }
}
