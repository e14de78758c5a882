// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A sampler or rate limiter was built with a parameter it can't work with
    #[error("invalid argument `{name}` ({value}): {reason}")]
    InvalidArgument {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A sampling strategy response carried none of the known strategies
    #[error("sampling strategy response does not contain any strategy")]
    EmptyStrategy,
}

impl Error {
    #[must_use]
    pub fn invalid_argument(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            value,
            reason,
        }
    }
}

/// Checks that `value` can be used as a rate or a balance
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_nan() {
        Err(Error::invalid_argument(name, value, "must be a number"))
    } else if value.is_infinite() {
        Err(Error::invalid_argument(name, value, "must be finite"))
    } else if value < 0.0 {
        Err(Error::invalid_argument(name, value, "must not be negative"))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_non_negative() {
        assert_eq!(ensure_non_negative("rate", 0.0), Ok(0.0));
        assert_eq!(ensure_non_negative("rate", 12.5), Ok(12.5));
        assert!(matches!(
            ensure_non_negative("rate", -1.0),
            Err(Error::InvalidArgument { name: "rate", .. })
        ));
        assert!(ensure_non_negative("rate", f64::NAN).is_err());
        assert!(ensure_non_negative("rate", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("max_balance", -2.0, "must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid argument `max_balance` (-2): must not be negative"
        );
    }
}
