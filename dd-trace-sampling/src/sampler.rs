// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Arc;

use crate::decision::{SamplerTags, SamplingDecision};
use crate::types::TraceId;

/// Decides whether a trace should be recorded.
///
/// Implementations are shared between all the threads creating spans, and must return a
/// decision for every input: sampling never fails.
pub trait Sampler: Send + Sync + fmt::Debug {
    /// Returns the decision for the trace `trace_id`, whose root span is `operation`
    fn is_sampled(&self, trace_id: TraceId, operation: &str) -> SamplingDecision;

    /// Releases the resources held by the sampler.
    ///
    /// Calling it more than once is a no-op.
    fn close(&self) {}
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn is_sampled(&self, trace_id: TraceId, operation: &str) -> SamplingDecision {
        (**self).is_sampled(trace_id, operation)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<S: Sampler + ?Sized> Sampler for Arc<S> {
    fn is_sampled(&self, trace_id: TraceId, operation: &str) -> SamplingDecision {
        (**self).is_sampled(trace_id, operation)
    }

    fn close(&self) {
        (**self).close()
    }
}

/// Always makes the same decision
#[derive(Debug, Clone, Copy)]
pub struct ConstSampler {
    decision: bool,
    tags: SamplerTags,
}

impl ConstSampler {
    pub fn new(decision: bool) -> Self {
        ConstSampler {
            decision,
            tags: SamplerTags::constant(decision),
        }
    }

    pub fn decision(&self) -> bool {
        self.decision
    }
}

impl Sampler for ConstSampler {
    fn is_sampled(&self, _trace_id: TraceId, _operation: &str) -> SamplingDecision {
        SamplingDecision::new(self.decision, self.tags)
    }
}
