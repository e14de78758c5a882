// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::constants::limiter::{ITEM_COST, MIN_MAX_BALANCE};
use crate::decision::{SamplerTags, SamplerType, SamplingDecision};
use crate::error::Result;
use crate::rate_limiter::RateLimiter;
use crate::sampler::Sampler;
use crate::types::TraceId;

/// Samples at most `max_traces_per_second` traces per second, whatever the trace.
pub struct RateLimitingSampler {
    max_traces_per_second: f64,
    rate_limiter: RateLimiter,
    tags: SamplerTags,
}

impl fmt::Debug for RateLimitingSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitingSampler")
            .field("max_traces_per_second", &self.max_traces_per_second)
            .finish()
    }
}

impl RateLimitingSampler {
    /// Creates a sampler allowing `max_traces_per_second` traces per second.
    ///
    /// The burst is at least one trace, so rates below one trace per second (e.g. one trace
    /// every 10 minutes) still sample.
    pub fn new(max_traces_per_second: f64) -> Result<Self> {
        let rate_limiter = RateLimiter::new(
            max_traces_per_second,
            max_traces_per_second.max(MIN_MAX_BALANCE),
        )?;

        Ok(RateLimitingSampler {
            max_traces_per_second,
            rate_limiter,
            tags: SamplerTags::new(SamplerType::RateLimiting, max_traces_per_second),
        })
    }

    pub fn max_traces_per_second(&self) -> f64 {
        self.max_traces_per_second
    }

    pub(crate) fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

impl Sampler for RateLimitingSampler {
    fn is_sampled(&self, _trace_id: TraceId, _operation: &str) -> SamplingDecision {
        SamplingDecision::new(self.rate_limiter.check_credit(ITEM_COST), self.tags)
    }
}
