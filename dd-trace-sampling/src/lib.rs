// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace sampling with a guaranteed throughput
//!
//! This crate provides:
//! - A leaky bucket rate limiter
//! - Constant, probabilistic and rate limiting samplers
//! - A probabilistic sampler sampling at least a given number of traces per second
//! - Per-operation sampling driven by remote strategies
//! - An OpenTelemetry SDK sampler adapter

pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod guaranteed_throughput_sampler;
pub mod otel;
pub mod per_operation_sampler;
pub mod probabilistic_sampler;
pub mod rate_limiter;
pub mod rate_limiting_sampler;
pub mod sampler;
pub mod strategies;
pub mod types;

// Re-export key types for convenience
pub use config::SamplerConfig;
pub use decision::{SamplerTags, SamplerType, SamplingDecision, TagValue};
pub use error::{Error, Result};
pub use guaranteed_throughput_sampler::GuaranteedThroughputProbabilisticSampler;
pub use otel::OtelSampler;
pub use per_operation_sampler::PerOperationSampler;
pub use probabilistic_sampler::ProbabilisticSampler;
pub use rate_limiter::RateLimiter;
pub use rate_limiting_sampler::RateLimitingSampler;
pub use sampler::{ConstSampler, Sampler};
pub use strategies::{
    OperationSamplingStrategy, PerOperationSamplingStrategies, ProbabilisticSamplingStrategy,
    RateLimitingSamplingStrategy, SamplingStrategyResponse, SamplingStrategyType,
};
pub use types::TraceId;
