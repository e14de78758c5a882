// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#[allow(clippy::module_inception)]
mod configuration;
mod sources;

pub use configuration::{
    Config, ConfigBuilder, DEFAULT_LOWER_BOUND_TRACES_PER_SECOND, DEFAULT_MAX_OPERATIONS,
    DEFAULT_SAMPLING_PROBABILITY,
};
pub use sources::ConfigSourceOrigin;
