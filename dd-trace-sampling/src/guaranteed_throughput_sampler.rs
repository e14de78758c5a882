// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use dd_trace::{dd_debug, dd_warn};

use crate::constants::rate::RATE_TOLERANCE;
use crate::decision::{SamplerTags, SamplerType, SamplingDecision};
use crate::error::Result;
use crate::probabilistic_sampler::ProbabilisticSampler;
use crate::rate_limiting_sampler::RateLimitingSampler;
use crate::sampler::Sampler;
use crate::types::TraceId;

/// Samples traces probabilistically, while guaranteeing a minimum number of traces per second.
///
/// When the probabilistic sampler drops a trace, a rate limiting sampler configured with the
/// lower bound gets to keep it. Decisions made by the rate limiter are tagged `lowerbound`, with
/// the probabilistic sampling rate as parameter.
///
/// Both inner samplers can be reconfigured with [`GuaranteedThroughputProbabilisticSampler::update`]
/// while decisions are being made.
pub struct GuaranteedThroughputProbabilisticSampler {
    samplers: RwLock<Samplers>,
    closed: AtomicBool,
}

/// Inner samplers are never mutated, an update swaps them for new ones under the write lock
struct Samplers {
    probabilistic: Arc<ProbabilisticSampler>,
    lower_bound: Arc<RateLimitingSampler>,
    /// Always `lowerbound` tags with the rate of `probabilistic`
    tags: SamplerTags,
}

impl fmt::Debug for GuaranteedThroughputProbabilisticSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let samplers = self.read();
        f.debug_struct("GuaranteedThroughputProbabilisticSampler")
            .field("sampling_rate", &samplers.probabilistic.sampling_rate())
            .field("lower_bound", &samplers.lower_bound.max_traces_per_second())
            .finish()
    }
}

impl GuaranteedThroughputProbabilisticSampler {
    /// Creates a sampler keeping `sampling_rate` of the traces, and at least `lower_bound`
    /// traces per second.
    pub fn new(sampling_rate: f64, lower_bound: f64) -> Result<Self> {
        let probabilistic = ProbabilisticSampler::new(sampling_rate)?;
        let lower_bound = RateLimitingSampler::new(lower_bound)?;

        Ok(GuaranteedThroughputProbabilisticSampler {
            samplers: RwLock::new(Samplers {
                tags: lower_bound_tags(&probabilistic),
                probabilistic: Arc::new(probabilistic),
                lower_bound: Arc::new(lower_bound),
            }),
            closed: AtomicBool::new(false),
        })
    }

    pub fn sampling_rate(&self) -> f64 {
        self.read().probabilistic.sampling_rate()
    }

    pub fn lower_bound(&self) -> f64 {
        self.read().lower_bound.max_traces_per_second()
    }

    pub fn probabilistic_sampler(&self) -> Arc<ProbabilisticSampler> {
        self.read().probabilistic.clone()
    }

    pub fn rate_limiting_sampler(&self) -> Arc<RateLimitingSampler> {
        self.read().lower_bound.clone()
    }

    /// Returns both inner samplers, as set by the same update
    pub fn samplers(&self) -> (Arc<ProbabilisticSampler>, Arc<RateLimitingSampler>) {
        let samplers = self.read();
        (samplers.probabilistic.clone(), samplers.lower_bound.clone())
    }

    /// Replaces the inner samplers whose parameter changed.
    ///
    /// Returns `true` if at least one sampler was replaced. An invalid parameter is logged and
    /// leaves the corresponding sampler untouched.
    pub fn update(&self, sampling_rate: f64, lower_bound: f64) -> bool {
        let mut samplers = self
            .samplers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut updated = false;

        let current_rate = samplers.probabilistic.sampling_rate();
        if differs(current_rate, sampling_rate) {
            match ProbabilisticSampler::new(sampling_rate) {
                // the new rate may clamp to the current one
                Ok(sampler) if differs(current_rate, sampler.sampling_rate()) => {
                    dd_debug!(
                        "GuaranteedThroughputProbabilisticSampler: sampling rate updated from {current_rate} to {}",
                        sampler.sampling_rate()
                    );
                    samplers.tags = lower_bound_tags(&sampler);
                    samplers.probabilistic = Arc::new(sampler);
                    updated = true;
                }
                Ok(_) => {}
                Err(e) => {
                    dd_warn!("GuaranteedThroughputProbabilisticSampler: sampling rate not updated, {e}");
                }
            }
        }

        let current_bound = samplers.lower_bound.max_traces_per_second();
        if differs(current_bound, lower_bound) {
            match RateLimitingSampler::new(lower_bound) {
                Ok(sampler) => {
                    dd_debug!(
                        "GuaranteedThroughputProbabilisticSampler: lower bound updated from {current_bound} to {lower_bound}"
                    );
                    samplers.lower_bound = Arc::new(sampler);
                    updated = true;
                }
                Err(e) => {
                    dd_warn!("GuaranteedThroughputProbabilisticSampler: lower bound not updated, {e}");
                }
            }
        }

        updated
    }

    fn read(&self) -> RwLockReadGuard<'_, Samplers> {
        self.samplers.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sampler for GuaranteedThroughputProbabilisticSampler {
    fn is_sampled(&self, trace_id: TraceId, operation: &str) -> SamplingDecision {
        let samplers = self.read();

        let probabilistic = samplers.probabilistic.is_sampled(trace_id, operation);
        // The lower bound is charged for every trace, including those kept by the probabilistic
        // sampler
        let lower_bound = samplers.lower_bound.is_sampled(trace_id, operation);

        if probabilistic.sampled {
            probabilistic
        } else {
            SamplingDecision::new(lower_bound.sampled, samplers.tags)
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let samplers = self.read();
        samplers.probabilistic.close();
        samplers.lower_bound.close();
        dd_debug!("GuaranteedThroughputProbabilisticSampler: closed");
    }
}

fn lower_bound_tags(probabilistic: &ProbabilisticSampler) -> SamplerTags {
    SamplerTags::new(SamplerType::LowerBound, probabilistic.sampling_rate())
}

/// NaN always differs, so that it reaches validation
fn differs(current: f64, new: f64) -> bool {
    !((new - current).abs() <= RATE_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::TagValue;
    use dd_trace::log::{test_logger, Level};
    use std::thread;
    use std::time::Duration;

    /// Dropped by a probabilistic sampler at 0.5
    const DROPPED_AT_HALF: u64 = 0xFFFF_0000_0000_0000;

    #[test]
    fn test_first_decision_is_lower_bound() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.0, 1.0 / 600.0).unwrap();

        let decision = sampler.is_sampled(TraceId::from(1u64), "op");
        assert!(decision.sampled);
        assert_eq!(decision.tags.sampler_type, SamplerType::LowerBound);
        assert_eq!(decision.tags.param, TagValue::F64(0.0));

        let decision = sampler.is_sampled(TraceId::from(2u64), "op");
        assert!(!decision.sampled);
        assert_eq!(decision.tags.sampler_type, SamplerType::LowerBound);
    }

    #[test]
    fn test_probabilistic_decision_wins() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(1.0, 1.0).unwrap();

        // the lower bound is exhausted after the first call, the probabilistic decision still wins
        for i in 0..10u64 {
            let decision = sampler.is_sampled(TraceId::from(i), "op");
            assert!(decision.sampled);
            assert_eq!(decision.tags.sampler_type, SamplerType::Probabilistic);
            assert_eq!(decision.tags.param, TagValue::F64(1.0));
        }
    }

    #[test]
    fn test_probabilistic_hits_consume_lower_bound() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(1.0, 3.0).unwrap();
        let lower_bound = sampler.rate_limiting_sampler();

        for i in 0..3u64 {
            assert!(sampler.is_sampled(TraceId::from(i), "op").sampled);
        }

        assert!(lower_bound.rate_limiter().balance() < 1.0);
        assert!(!lower_bound.is_sampled(TraceId::from(4u64), "op").sampled);
    }

    #[test]
    fn test_lower_bound_floor() {
        let lower_bound = 10.0;
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.0, lower_bound).unwrap();

        let sampled = (0..50u64)
            .filter(|i| sampler.is_sampled(TraceId::from(*i), "op").sampled)
            .count();
        assert!((10..=11).contains(&sampled), "sampled {sampled} traces");

        thread::sleep(Duration::from_secs_f64(1.5 / lower_bound));

        let decision = sampler.is_sampled(TraceId::from(51u64), "op");
        assert!(decision.sampled);
        assert_eq!(decision.tags.sampler_type, SamplerType::LowerBound);
    }

    #[test]
    fn test_update_with_same_parameters() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.5, 2.0).unwrap();
        let (probabilistic, lower_bound) = sampler.samplers();

        assert!(!sampler.update(0.5, 2.0));

        let (new_probabilistic, new_lower_bound) = sampler.samplers();
        assert!(Arc::ptr_eq(&probabilistic, &new_probabilistic));
        assert!(Arc::ptr_eq(&lower_bound, &new_lower_bound));
    }

    #[test]
    fn test_update_sampling_rate() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.0, 1.0 / 600.0).unwrap();
        let lower_bound = sampler.rate_limiting_sampler();

        assert!(sampler.update(0.5, 1.0 / 600.0));
        assert_eq!(sampler.sampling_rate(), 0.5);
        assert!(Arc::ptr_eq(&lower_bound, &sampler.rate_limiting_sampler()));

        let decision = sampler.is_sampled(TraceId::from(DROPPED_AT_HALF), "op");
        assert!(decision.sampled);
        assert_eq!(decision.tags.sampler_type, SamplerType::LowerBound);
        assert_eq!(decision.tags.param, TagValue::F64(0.5));

        let decision = sampler.is_sampled(TraceId::from(0u64), "op");
        assert!(decision.sampled);
        assert_eq!(decision.tags.sampler_type, SamplerType::Probabilistic);
        assert_eq!(decision.tags.param, TagValue::F64(0.5));
    }

    #[test]
    fn test_update_lower_bound() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.0, 1.0).unwrap();
        let probabilistic = sampler.probabilistic_sampler();

        assert!(sampler.is_sampled(TraceId::from(1u64), "op").sampled);
        assert!(!sampler.is_sampled(TraceId::from(2u64), "op").sampled);

        assert!(sampler.update(0.0, 2.0));
        assert_eq!(sampler.lower_bound(), 2.0);
        assert!(Arc::ptr_eq(&probabilistic, &sampler.probabilistic_sampler()));

        // the new rate limiter starts full
        assert!(sampler.is_sampled(TraceId::from(3u64), "op").sampled);
        assert!(sampler.is_sampled(TraceId::from(4u64), "op").sampled);
        assert!(!sampler.is_sampled(TraceId::from(5u64), "op").sampled);
    }

    #[test]
    fn test_update_both() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.1, 1.0).unwrap();
        let (probabilistic, lower_bound) = sampler.samplers();

        assert!(sampler.update(0.2, 3.0));

        let (new_probabilistic, new_lower_bound) = sampler.samplers();
        assert!(!Arc::ptr_eq(&probabilistic, &new_probabilistic));
        assert!(!Arc::ptr_eq(&lower_bound, &new_lower_bound));
        assert_eq!(new_probabilistic.sampling_rate(), 0.2);
        assert_eq!(new_lower_bound.max_traces_per_second(), 3.0);
    }

    #[test]
    fn test_update_clamped_to_current_rate() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(1.0, 1.0).unwrap();
        let probabilistic = sampler.probabilistic_sampler();

        assert!(!sampler.update(1.5, 1.0));
        assert!(Arc::ptr_eq(&probabilistic, &sampler.probabilistic_sampler()));
    }

    #[test]
    fn test_update_with_invalid_parameters() {
        let _guard = test_logger::activate_test_logger();
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.5, 1.0).unwrap();

        assert!(!sampler.update(f64::NAN, -1.0));
        assert_eq!(sampler.sampling_rate(), 0.5);
        assert_eq!(sampler.lower_bound(), 1.0);

        // the valid side of an update still applies
        assert!(sampler.update(f64::NAN, 4.0));
        assert_eq!(sampler.lower_bound(), 4.0);

        let logs = test_logger::take_test_logs().unwrap();
        let warnings = logs.iter().filter(|(lvl, _)| *lvl == Level::Warn).count();
        assert_eq!(warnings, 3);
    }

    #[test]
    fn test_new_with_invalid_parameters() {
        assert!(GuaranteedThroughputProbabilisticSampler::new(f64::NAN, 1.0).is_err());
        assert!(GuaranteedThroughputProbabilisticSampler::new(0.5, -1.0).is_err());
        assert!(GuaranteedThroughputProbabilisticSampler::new(0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let _guard = test_logger::activate_test_logger();
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.5, 1.0).unwrap();

        sampler.close();
        sampler.close();

        let logs = test_logger::take_test_logs().unwrap();
        assert_eq!(
            logs,
            vec![(
                Level::Debug,
                "GuaranteedThroughputProbabilisticSampler: closed".to_string()
            )]
        );
    }

    #[test]
    fn test_update_with_tiny_difference() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.001, 0.001).unwrap();
        let nudged = 0.001 + 1e-17;
        assert_ne!(nudged, 0.001);

        assert!(sampler.update(nudged, 0.001));
        assert_eq!(sampler.sampling_rate(), nudged);

        assert!(sampler.update(nudged, nudged));
        assert_eq!(sampler.lower_bound(), nudged);

        assert!(!sampler.update(nudged, nudged));
    }

    #[test]
    fn check_debug_impl() {
        let sampler = GuaranteedThroughputProbabilisticSampler::new(0.5, 2.0).unwrap();
        let debug_output = format!("{:?}", sampler);
        assert!(debug_output.contains("sampling_rate: 0.5"));
        assert!(debug_output.contains("lower_bound: 2.0"));
    }
}
