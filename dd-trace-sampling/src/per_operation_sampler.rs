// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dd_trace::{dd_debug, dd_warn};

use crate::decision::SamplingDecision;
use crate::error::{ensure_non_negative, Result};
use crate::guaranteed_throughput_sampler::GuaranteedThroughputProbabilisticSampler;
use crate::probabilistic_sampler::ProbabilisticSampler;
use crate::sampler::Sampler;
use crate::strategies::PerOperationSamplingStrategies;
use crate::types::TraceId;

/// Samples each operation with its own [`GuaranteedThroughputProbabilisticSampler`].
///
/// Operations without a strategy get a sampler built from the default sampling rate and lower
/// bound, until `max_operations` operations are tracked. Past that limit, new operations are
/// sampled by the default probabilistic sampler, without lower bound.
///
/// Clones share the same samplers.
#[derive(Clone)]
pub struct PerOperationSampler {
    inner: Arc<PerOperationState>,
}

struct PerOperationState {
    max_operations: usize,
    registry: RwLock<Registry>,
    closed: AtomicBool,
}

struct Registry {
    default_sampler: Arc<ProbabilisticSampler>,
    lower_bound: f64,
    samplers: HashMap<String, Arc<GuaranteedThroughputProbabilisticSampler>>,
}

impl fmt::Debug for PerOperationSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.read();
        f.debug_struct("PerOperationSampler")
            .field("max_operations", &self.inner.max_operations)
            .field("default_sampling_rate", &registry.default_sampler.sampling_rate())
            .field("lower_bound", &registry.lower_bound)
            .field("operations", &registry.samplers.len())
            .finish()
    }
}

impl PerOperationSampler {
    /// Creates a sampler from per-operation strategies.
    ///
    /// # Errors
    /// The default sampling probability and lower bound must be valid. An invalid operation
    /// strategy is only logged, that operation will use the defaults.
    pub fn new(max_operations: usize, strategies: &PerOperationSamplingStrategies) -> Result<Self> {
        let sampler = Self::with_defaults(
            max_operations,
            strategies.default_sampling_probability,
            strategies.default_lower_bound_traces_per_second,
        )?;
        sampler.update(strategies);
        Ok(sampler)
    }

    /// Creates a sampler without any operation strategy
    pub fn with_defaults(
        max_operations: usize,
        default_sampling_rate: f64,
        lower_bound: f64,
    ) -> Result<Self> {
        let default_sampler = ProbabilisticSampler::new(default_sampling_rate)?;
        let lower_bound = ensure_non_negative("lower_bound", lower_bound)?;

        Ok(PerOperationSampler {
            inner: Arc::new(PerOperationState {
                max_operations,
                registry: RwLock::new(Registry {
                    default_sampler: Arc::new(default_sampler),
                    lower_bound,
                    samplers: HashMap::new(),
                }),
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn max_operations(&self) -> usize {
        self.inner.max_operations
    }

    pub fn default_sampling_rate(&self) -> f64 {
        self.read().default_sampler.sampling_rate()
    }

    pub fn lower_bound(&self) -> f64 {
        self.read().lower_bound
    }

    /// Number of operations with their own sampler
    pub fn operation_count(&self) -> usize {
        self.read().samplers.len()
    }

    pub fn operation_sampler(
        &self,
        operation: &str,
    ) -> Option<Arc<GuaranteedThroughputProbabilisticSampler>> {
        self.read().samplers.get(operation).cloned()
    }

    /// Applies new strategies.
    ///
    /// Existing operation samplers are updated in place, new operations get a sampler while
    /// there is room for them. Returns `true` if any sampler changed. A closed sampler ignores
    /// updates.
    pub fn update(&self, strategies: &PerOperationSamplingStrategies) -> bool {
        let mut registry = self.write();
        if self.is_closed() {
            return false;
        }
        let mut updated = false;

        match ProbabilisticSampler::new(strategies.default_sampling_probability) {
            Ok(sampler) if sampler != *registry.default_sampler => {
                registry.default_sampler = Arc::new(sampler);
                updated = true;
            }
            Ok(_) => {}
            Err(e) => dd_warn!("PerOperationSampler: default sampling rate not updated, {e}"),
        }

        match ensure_non_negative(
            "lower_bound",
            strategies.default_lower_bound_traces_per_second,
        ) {
            Ok(lower_bound) => registry.lower_bound = lower_bound,
            Err(e) => dd_warn!("PerOperationSampler: default lower bound not updated, {e}"),
        }

        let lower_bound = registry.lower_bound;
        for strategy in &strategies.per_operation_strategies {
            let sampling_rate = strategy.probabilistic_sampling.sampling_rate;

            if let Some(sampler) = registry.samplers.get(&strategy.operation) {
                updated = sampler.update(sampling_rate, lower_bound) || updated;
            } else if registry.samplers.len() < self.inner.max_operations {
                match GuaranteedThroughputProbabilisticSampler::new(sampling_rate, lower_bound) {
                    Ok(sampler) => {
                        registry
                            .samplers
                            .insert(strategy.operation.clone(), Arc::new(sampler));
                        updated = true;
                    }
                    Err(e) => dd_warn!(
                        "PerOperationSampler: no sampler created for operation {}, {e}",
                        strategy.operation
                    ),
                }
            } else {
                dd_warn!(
                    "PerOperationSampler: exceeded the maximum number of operations ({}), {} uses the default sampler",
                    self.inner.max_operations,
                    strategy.operation
                );
            }
        }

        updated
    }

    fn sampler_for(
        &self,
        operation: &str,
    ) -> std::result::Result<Arc<GuaranteedThroughputProbabilisticSampler>, Arc<ProbabilisticSampler>>
    {
        {
            let registry = self.read();
            if let Some(sampler) = registry.samplers.get(operation) {
                return Ok(sampler.clone());
            }
            if registry.samplers.len() >= self.inner.max_operations || self.is_closed() {
                return Err(registry.default_sampler.clone());
            }
        }

        let mut registry = self.write();
        // Another thread may have registered the operation, filled the registry or closed the
        // sampler in between
        if let Some(sampler) = registry.samplers.get(operation) {
            return Ok(sampler.clone());
        }
        if registry.samplers.len() >= self.inner.max_operations || self.is_closed() {
            return Err(registry.default_sampler.clone());
        }
        match GuaranteedThroughputProbabilisticSampler::new(
            registry.default_sampler.sampling_rate(),
            registry.lower_bound,
        ) {
            Ok(sampler) => {
                let sampler = Arc::new(sampler);
                registry
                    .samplers
                    .insert(operation.to_string(), sampler.clone());
                Ok(sampler)
            }
            // Defaults are validated before being stored
            Err(_) => Err(registry.default_sampler.clone()),
        }
    }

    /// Set before the registry is drained, so it is up to date for any holder of the lock
    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sampler for PerOperationSampler {
    fn is_sampled(&self, trace_id: TraceId, operation: &str) -> SamplingDecision {
        match self.sampler_for(operation) {
            Ok(sampler) => sampler.is_sampled(trace_id, operation),
            Err(default_sampler) => default_sampler.is_sampled(trace_id, operation),
        }
    }

    fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let samplers = std::mem::take(&mut self.write().samplers);
        for sampler in samplers.values() {
            sampler.close();
        }
        dd_debug!(
            "PerOperationSampler: closed {} operation samplers",
            samplers.len()
        );
    }
}
