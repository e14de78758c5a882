// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OpenTelemetry SDK integration

use std::sync::Arc;

use dd_trace::Config;
use opentelemetry::trace::{
    Link, SamplingDecision, SamplingResult, SpanKind, TraceContextExt, TraceState,
};
use opentelemetry::{Context, KeyValue, Value};
use opentelemetry_sdk::trace::ShouldSample;

use crate::config::SamplerConfig;
use crate::decision::{SamplerTags, TagValue};
use crate::error::Result;
use crate::sampler::Sampler;
use crate::types::TraceId;

/// Makes a [`Sampler`] usable as the sampler of an OpenTelemetry tracer provider.
///
/// Root spans are sampled by the wrapped sampler, and carry its tags as attributes. Child spans
/// follow the decision of their parent.
#[derive(Debug, Clone)]
pub struct OtelSampler {
    inner: Arc<dyn Sampler>,
}

impl OtelSampler {
    pub fn new(sampler: Arc<dyn Sampler>) -> Self {
        OtelSampler { inner: sampler }
    }

    /// Creates the sampler configured by the tracer configuration, and applies its log level
    pub fn from_config(config: &Config) -> Result<Self> {
        dd_trace::log::configure(config);
        let sampler = SamplerConfig::from_config(config).build_sampler()?;
        Ok(OtelSampler::new(Arc::from(sampler)))
    }

    pub fn sampler(&self) -> &Arc<dyn Sampler> {
        &self.inner
    }
}

fn tag_attributes(tags: &SamplerTags) -> Vec<KeyValue> {
    tags.iter()
        .map(|(key, value)| {
            let value = match value {
                TagValue::Str(s) => Value::from(s),
                TagValue::Bool(b) => Value::from(b),
                TagValue::F64(f) => Value::from(f),
            };
            KeyValue::new(key, value)
        })
        .collect()
}

impl ShouldSample for OtelSampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        trace_id: opentelemetry::trace::TraceId,
        name: &str,
        _span_kind: &SpanKind,
        _attributes: &[KeyValue],
        _links: &[Link],
    ) -> SamplingResult {
        if let Some(parent) = parent_context.filter(|c| c.has_active_span()) {
            let span = parent.span();
            let span_context = span.span_context();
            return SamplingResult {
                decision: if span_context.is_sampled() {
                    SamplingDecision::RecordAndSample
                } else {
                    SamplingDecision::Drop
                },
                attributes: Vec::new(),
                trace_state: span_context.trace_state().clone(),
            };
        }

        let decision = self.inner.is_sampled(TraceId::from(trace_id), name);
        SamplingResult {
            decision: if decision.sampled {
                SamplingDecision::RecordAndSample
            } else {
                SamplingDecision::Drop
            },
            attributes: tag_attributes(&decision.tags),
            trace_state: TraceState::default(),
        }
    }
}
