// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared constants for the dd-trace-sampling crate

/// Sampling rate limits
pub mod rate {
    /// Maximum sampling rate
    pub const MAX_SAMPLE_RATE: f64 = 1.0;
    /// Minimum sampling rate
    pub const MIN_SAMPLE_RATE: f64 = 0.0;
    /// Two rates closer than this are considered equal when updating samplers, any actual
    /// difference counts as a change
    pub const RATE_TOLERANCE: f64 = 0.0;
}

/// Rate limiting constants
pub mod limiter {
    /// Credits consumed by a single sampling decision
    pub const ITEM_COST: f64 = 1.0;
    /// Smallest burst a rate limiting sampler is built with, so that rates below one trace per
    /// second still let a trace through
    pub const MIN_MAX_BALANCE: f64 = 1.0;
}

/// Numeric constants used in sampling algorithms
pub mod numeric {
    /// Knuth's multiplicative hash factor for deterministic sampling
    pub const KNUTH_FACTOR: u64 = 1_111_111_111_111_111_111;
    /// Maximum 64-bit unsigned integer value
    pub const MAX_UINT_64BITS: u64 = u64::MAX;
}
