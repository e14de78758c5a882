// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

/// Source of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSourceOrigin {
    Default,
    EnvVar,
    Code,
}

impl fmt::Display for ConfigSourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigSourceOrigin::Default => "default",
            ConfigSourceOrigin::EnvVar => "environment",
            ConfigSourceOrigin::Code => "code",
        })
    }
}

/// A parsed configuration value and the source it was read from
#[derive(Debug, PartialEq)]
pub(crate) struct SourcedValue<T> {
    pub(crate) value: T,
    pub(crate) origin: ConfigSourceOrigin,
}

/// Somewhere raw configuration values can be read from
pub(crate) trait ConfigurationSource {
    fn origin(&self) -> ConfigSourceOrigin;

    fn raw(&self, key: &str) -> Option<String>;
}

pub(crate) struct EnvSource;

impl ConfigurationSource for EnvSource {
    fn origin(&self) -> ConfigSourceOrigin {
        ConfigSourceOrigin::EnvVar
    }

    fn raw(&self, key: &str) -> Option<String> {
        #[allow(clippy::disallowed_methods)]
        std::env::var(key).ok()
    }
}

/// Configuration sources, by decreasing precedence
pub(crate) struct ConfigSources {
    sources: Vec<Box<dyn ConfigurationSource>>,
}

impl ConfigSources {
    pub(crate) fn new() -> Self {
        ConfigSources {
            sources: Vec::new(),
        }
    }

    /// Only the process environment
    pub(crate) fn env() -> Self {
        let mut sources = Self::new();
        sources.push(EnvSource);
        sources
    }

    pub(crate) fn push<C: ConfigurationSource + 'static>(&mut self, source: C) {
        self.sources.push(Box::new(source));
    }

    /// Returns the first value of `key` that parses as a `T`.
    ///
    /// A value that doesn't parse is reported and the next source is tried.
    pub(crate) fn lookup<T>(&self, key: &'static str) -> Option<SourcedValue<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        for source in &self.sources {
            let Some(raw) = source.raw(key) else {
                continue;
            };
            match raw.trim().parse::<T>() {
                Ok(value) => {
                    return Some(SourcedValue {
                        value,
                        origin: source.origin(),
                    })
                }
                Err(e) => crate::dd_warn!(
                    "Configuration: ignoring {key}={raw:?} from {}, {e}",
                    source.origin()
                ),
            }
        }
        None
    }
}

/// Fixed key/value pairs, used by tests
#[cfg(test)]
pub(crate) struct MapSource {
    values: std::collections::HashMap<String, String>,
    origin: ConfigSourceOrigin,
}

#[cfg(test)]
impl MapSource {
    pub(crate) fn new<'a>(
        values: impl IntoIterator<Item = (&'a str, &'a str)>,
        origin: ConfigSourceOrigin,
    ) -> Self {
        MapSource {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            origin,
        }
    }
}

#[cfg(test)]
impl ConfigurationSource for MapSource {
    fn origin(&self) -> ConfigSourceOrigin {
        self.origin
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
