// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Type definitions for sampling

use std::fmt;

/// Identifier of the trace a sampling decision is made for.
///
/// Samplers never interpret the identifier, it is only used as the input of the
/// probabilistic hash. 64-bit identifiers are stored in the lower half.
///
/// # Examples
///
/// ```
/// use dd_trace_sampling::TraceId;
///
/// let id = TraceId::from(0xdead_beef_u64);
/// assert_eq!(id.low_u64(), 0xdead_beef);
/// assert_eq!(id.to_u128(), 0xdead_beef);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    pub const fn from_u128(id: u128) -> Self {
        TraceId(id)
    }

    /// Interprets the bytes as a big-endian integer
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(u128::from_be_bytes(bytes))
    }

    pub fn to_u128(&self) -> u128 {
        self.0
    }

    /// Returns the lower 64 bits of the trace id
    pub fn low_u64(&self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({:032x})", self.0)
    }
}

impl From<u128> for TraceId {
    fn from(id: u128) -> Self {
        TraceId(id)
    }
}

impl From<u64> for TraceId {
    fn from(id: u64) -> Self {
        TraceId(id as u128)
    }
}

impl From<opentelemetry::trace::TraceId> for TraceId {
    fn from(id: opentelemetry::trace::TraceId) -> Self {
        TraceId::from_bytes(id.to_bytes())
    }
}
