// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::constants::{numeric, rate};
use crate::decision::{SamplerTags, SamplerType, SamplingDecision};
use crate::error::{Error, Result};
use crate::sampler::Sampler;
use crate::types::TraceId;
use numeric::{KNUTH_FACTOR, MAX_UINT_64BITS};

/// Keeps (100 * `sampling_rate`)% of the traces.
///
/// The decision is a deterministic function of the trace id, so every service sampling the
/// same trace at the same rate agrees on it.
#[derive(Clone)]
pub struct ProbabilisticSampler {
    sampling_rate: f64,
    sampling_id_threshold: u64,
    tags: SamplerTags,
}

impl fmt::Debug for ProbabilisticSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbabilisticSampler")
            .field("sampling_rate", &self.sampling_rate)
            .finish()
    }
}

impl ProbabilisticSampler {
    // Helper method to calculate the threshold from a rate
    fn calculate_threshold(rate: f64) -> u64 {
        if rate >= rate::MAX_SAMPLE_RATE {
            MAX_UINT_64BITS
        } else {
            (rate * (MAX_UINT_64BITS as f64)) as u64
        }
    }

    /// `sampling_rate` is clamped between 0.0 and 1.0 inclusive.
    ///
    /// # Errors
    /// The rate must be a number.
    pub fn new(sampling_rate: f64) -> Result<Self> {
        if sampling_rate.is_nan() {
            return Err(Error::invalid_argument(
                "sampling_rate",
                sampling_rate,
                "must be a number",
            ));
        }
        let clamped_rate = sampling_rate.clamp(rate::MIN_SAMPLE_RATE, rate::MAX_SAMPLE_RATE);

        Ok(ProbabilisticSampler {
            sampling_rate: clamped_rate,
            sampling_id_threshold: Self::calculate_threshold(clamped_rate),
            tags: SamplerTags::new(SamplerType::Probabilistic, clamped_rate),
        })
    }

    /// Returns the sampling rate, after clamping
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    fn should_keep(&self, trace_id: TraceId) -> bool {
        // Fast-path for sample rate of 0.0 (always drop) or 1.0 (always sample)
        if self.sampling_rate <= rate::MIN_SAMPLE_RATE {
            return false;
        }
        if self.sampling_rate >= rate::MAX_SAMPLE_RATE {
            return true;
        }

        let hashed_id = trace_id.low_u64().wrapping_mul(KNUTH_FACTOR);
        hashed_id <= self.sampling_id_threshold
    }
}

impl PartialEq for ProbabilisticSampler {
    fn eq(&self, other: &Self) -> bool {
        self.sampling_id_threshold == other.sampling_id_threshold
    }
}

impl Sampler for ProbabilisticSampler {
    fn is_sampled(&self, trace_id: TraceId, _operation: &str) -> SamplingDecision {
        SamplingDecision::new(self.should_keep(trace_id), self.tags)
    }
}
