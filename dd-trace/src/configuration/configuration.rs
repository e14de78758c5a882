// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, fmt, str::FromStr};

use super::sources::{ConfigSourceOrigin, ConfigSources};
use crate::log::LevelFilter;

/// Probability used for operations without a dedicated strategy
pub const DEFAULT_SAMPLING_PROBABILITY: f64 = 0.001;
/// One trace every ten minutes
pub const DEFAULT_LOWER_BOUND_TRACES_PER_SECOND: f64 = 1.0 / 600.0;
/// Maximum number of operations tracked by the per-operation sampler
pub const DEFAULT_MAX_OPERATIONS: usize = 2000;

const DD_TRACE_ENABLED: &str = "DD_TRACE_ENABLED";
const DD_LOG_LEVEL: &str = "DD_LOG_LEVEL";
const DD_TRACE_SAMPLE_RATE: &str = "DD_TRACE_SAMPLE_RATE";
const DD_TRACE_SAMPLING_LOWER_BOUND: &str = "DD_TRACE_SAMPLING_LOWER_BOUND";
const DD_TRACE_SAMPLING_MAX_OPERATIONS: &str = "DD_TRACE_SAMPLING_MAX_OPERATIONS";
const DD_TRACE_SAMPLING_STRATEGIES: &str = "DD_TRACE_SAMPLING_STRATEGIES";

#[derive(Debug)]
#[non_exhaustive]
/// Configuration of the tracer sampling
///
/// # Usage
/// ```
/// use dd_trace::Config;
///
/// // This pulls configuration from the environment
/// let mut builder = Config::builder();
///
/// // Manual overrides
/// builder
///     .set_sample_rate(0.25)
///     .set_sampling_lower_bound(1.0 / 60.0);
///
/// let config = builder.build();
/// assert_eq!(config.sample_rate(), 0.25);
/// ```
pub struct Config {
    /// Disables the library if this is false
    enabled: bool,
    /// The log level for the tracer
    log_level: LevelFilter,

    // # Sampling
    /// Probability of keeping a trace whose operation has no dedicated strategy
    sample_rate: f64,
    /// Minimum number of traces per second kept for every operation
    sampling_lower_bound: f64,
    /// Above this count, new operations share the default probabilistic sampler
    sampling_max_operations: usize,
    /// JSON sampling strategy response, overriding the defaults above when set
    sampling_strategies: Option<String>,

    origins: HashMap<&'static str, ConfigSourceOrigin>,
}

impl Config {
    fn from_sources(sources: &ConfigSources) -> Self {
        let mut config = Config::default();

        if let Some(enabled) = config.read(sources, DD_TRACE_ENABLED) {
            config.enabled = enabled;
        }
        if let Some(log_level) = config.read(sources, DD_LOG_LEVEL) {
            config.log_level = log_level;
        }
        if let Some(sample_rate) = config.read(sources, DD_TRACE_SAMPLE_RATE) {
            config.sample_rate = sample_rate;
        }
        if let Some(lower_bound) = config.read(sources, DD_TRACE_SAMPLING_LOWER_BOUND) {
            config.sampling_lower_bound = lower_bound;
        }
        if let Some(max_operations) = config.read(sources, DD_TRACE_SAMPLING_MAX_OPERATIONS) {
            config.sampling_max_operations = max_operations;
        }
        if let Some(strategies) = config.read(sources, DD_TRACE_SAMPLING_STRATEGIES) {
            config.sampling_strategies = Some(strategies);
        }

        config
    }

    /// Reads `key` from the sources and remembers where the value came from.
    ///
    /// `None` when no source has a value that parses, so the default applies.
    fn read<T>(&mut self, sources: &ConfigSources, key: &'static str) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let sourced = sources.lookup(key)?;
        self.origins.insert(key, sourced.origin);
        Some(sourced.value)
    }

    fn builder_with_sources(sources: &ConfigSources) -> ConfigBuilder {
        ConfigBuilder {
            config: Config::from_sources(sources),
        }
    }

    /// Creates a new builder to set overrides detected configuration
    pub fn builder() -> ConfigBuilder {
        Self::builder_with_sources(&ConfigSources::env())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn sampling_lower_bound(&self) -> f64 {
        self.sampling_lower_bound
    }

    pub fn sampling_max_operations(&self) -> usize {
        self.sampling_max_operations
    }

    pub fn sampling_strategies(&self) -> Option<&str> {
        self.sampling_strategies.as_deref()
    }

    /// Where the value of the configuration `name` came from
    pub fn origin(&self, name: &str) -> ConfigSourceOrigin {
        self.origins
            .get(name)
            .copied()
            .unwrap_or(ConfigSourceOrigin::Default)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: true,
            log_level: LevelFilter::default(),
            sample_rate: DEFAULT_SAMPLING_PROBABILITY,
            sampling_lower_bound: DEFAULT_LOWER_BOUND_TRACES_PER_SECOND,
            sampling_max_operations: DEFAULT_MAX_OPERATIONS,
            sampling_strategies: None,
            origins: HashMap::new(),
        }
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Finalizes the builder and returns the configuration
    pub fn build(self) -> Config {
        self.config
    }

    fn set_origin(&mut self, name: &'static str) {
        self.config.origins.insert(name, ConfigSourceOrigin::Code);
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.config.enabled = enabled;
        self.set_origin(DD_TRACE_ENABLED);
        self
    }

    pub fn set_log_level(&mut self, log_level: LevelFilter) -> &mut Self {
        self.config.log_level = log_level;
        self.set_origin(DD_LOG_LEVEL);
        self
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> &mut Self {
        self.config.sample_rate = sample_rate;
        self.set_origin(DD_TRACE_SAMPLE_RATE);
        self
    }

    pub fn set_sampling_lower_bound(&mut self, traces_per_second: f64) -> &mut Self {
        self.config.sampling_lower_bound = traces_per_second;
        self.set_origin(DD_TRACE_SAMPLING_LOWER_BOUND);
        self
    }

    pub fn set_sampling_max_operations(&mut self, max_operations: usize) -> &mut Self {
        self.config.sampling_max_operations = max_operations;
        self.set_origin(DD_TRACE_SAMPLING_MAX_OPERATIONS);
        self
    }

    pub fn set_sampling_strategies(&mut self, strategies_json: String) -> &mut Self {
        self.config.sampling_strategies = Some(strategies_json);
        self.set_origin(DD_TRACE_SAMPLING_STRATEGIES);
        self
    }
}
