// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use dd_trace::{dd_warn, Config};

use crate::error::Result;
use crate::per_operation_sampler::PerOperationSampler;
use crate::sampler::{ConstSampler, Sampler};
use crate::strategies::SamplingStrategyResponse;

/// Settings of the sampler installed by the tracer
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// When false, every trace is dropped
    pub enabled: bool,
    /// Default sampling probability of an operation
    pub sampling_rate: f64,
    /// Traces per second sampled for each operation whatever the sampling rate
    pub lower_bound: f64,
    /// Maximum number of operations with their own sampler
    pub max_operations: usize,
    /// Strategy overriding the defaults above
    pub strategies: Option<SamplingStrategyResponse>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            enabled: true,
            sampling_rate: dd_trace::configuration::DEFAULT_SAMPLING_PROBABILITY,
            lower_bound: dd_trace::configuration::DEFAULT_LOWER_BOUND_TRACES_PER_SECOND,
            max_operations: dd_trace::configuration::DEFAULT_MAX_OPERATIONS,
            strategies: None,
        }
    }
}

impl SamplerConfig {
    /// Reads the sampling settings of the tracer configuration.
    ///
    /// A strategy document that cannot be parsed is logged and ignored.
    pub fn from_config(config: &Config) -> Self {
        let strategies = config.sampling_strategies().and_then(|json| {
            SamplingStrategyResponse::from_json(json)
                .map_err(|e| dd_warn!("SamplerConfig: ignoring invalid sampling strategies, {e}"))
                .ok()
        });

        SamplerConfig {
            enabled: config.enabled(),
            sampling_rate: config.sample_rate(),
            lower_bound: config.sampling_lower_bound(),
            max_operations: config.sampling_max_operations(),
            strategies,
        }
    }

    /// Creates the sampler described by this configuration
    pub fn build_sampler(&self) -> Result<Box<dyn Sampler>> {
        if !self.enabled {
            return Ok(Box::new(ConstSampler::new(false)));
        }
        if let Some(strategies) = &self.strategies {
            return strategies.build_sampler(self.max_operations);
        }
        Ok(Box::new(PerOperationSampler::with_defaults(
            self.max_operations,
            self.sampling_rate,
            self.lower_bound,
        )?))
    }
}
