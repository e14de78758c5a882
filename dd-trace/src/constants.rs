// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Name of the sampler that made the sampling decision
pub const SAMPLER_TYPE_TAG_KEY: &str = "sampler.type";
/// Parameter of the sampler that made the sampling decision (rate, bound, or constant decision)
pub const SAMPLER_PARAM_TAG_KEY: &str = "sampler.param";

pub const SAMPLER_TYPE_CONST: &str = "const";
pub const SAMPLER_TYPE_PROBABILISTIC: &str = "probabilistic";
pub const SAMPLER_TYPE_RATE_LIMITING: &str = "ratelimiting";
pub const SAMPLER_TYPE_LOWER_BOUND: &str = "lowerbound";
