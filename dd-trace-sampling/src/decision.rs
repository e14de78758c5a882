// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use dd_trace::constants::{
    SAMPLER_PARAM_TAG_KEY, SAMPLER_TYPE_CONST, SAMPLER_TYPE_LOWER_BOUND,
    SAMPLER_TYPE_PROBABILISTIC, SAMPLER_TYPE_RATE_LIMITING, SAMPLER_TYPE_TAG_KEY,
};

/// Kind of sampler that produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerType {
    Const,
    Probabilistic,
    RateLimiting,
    /// The rate limited fallback of a guaranteed throughput sampler
    LowerBound,
}

impl SamplerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplerType::Const => SAMPLER_TYPE_CONST,
            SamplerType::Probabilistic => SAMPLER_TYPE_PROBABILISTIC,
            SamplerType::RateLimiting => SAMPLER_TYPE_RATE_LIMITING,
            SamplerType::LowerBound => SAMPLER_TYPE_LOWER_BOUND,
        }
    }
}

impl fmt::Display for SamplerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TagValue {
    Str(&'static str),
    Bool(bool),
    F64(f64),
}

impl TagValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::F64(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Str(s) => f.write_str(s),
            TagValue::Bool(b) => write!(f, "{b}"),
            TagValue::F64(v) => write!(f, "{v}"),
        }
    }
}

/// Tags describing which sampler made a decision and with which parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerTags {
    pub sampler_type: SamplerType,
    pub param: TagValue,
}

impl SamplerTags {
    pub fn new(sampler_type: SamplerType, param: f64) -> Self {
        SamplerTags {
            sampler_type,
            param: TagValue::F64(param),
        }
    }

    pub fn constant(decision: bool) -> Self {
        SamplerTags {
            sampler_type: SamplerType::Const,
            param: TagValue::Bool(decision),
        }
    }

    /// Iterates over the tags as `(key, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, TagValue)> {
        [
            (SAMPLER_TYPE_TAG_KEY, TagValue::Str(self.sampler_type.as_str())),
            (SAMPLER_PARAM_TAG_KEY, self.param),
        ]
        .into_iter()
    }
}

/// Result of a sampling decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingDecision {
    pub sampled: bool,
    pub tags: SamplerTags,
}

impl SamplingDecision {
    pub fn new(sampled: bool, tags: SamplerTags) -> Self {
        SamplingDecision { sampled, tags }
    }
}
