// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use dd_trace::log::Level;
use thiserror::Error;

/// A contained propagation failure.
///
/// These never reach the caller of `extract`/`inject`: they are logged at
/// `log_level` and, for the tags header, mirrored as a diagnostic tag.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("Cannot {} `{}` with the {} propagator, {}", operation, header, propagator_name, message)]
pub struct Error {
    pub message: &'static str,
    // header the failure relates to
    pub header: &'static str,
    // which propagator this error comes from
    propagator_name: &'static str,
    // what operation was attempted
    operation: &'static str,
    // error log level
    pub log_level: Level,
}

impl Error {
    /// Error when extracting a value from a carrier
    #[must_use]
    pub fn extract(message: &'static str, header: &'static str, log_level: Level) -> Self {
        Self {
            message,
            header,
            propagator_name: "datadog",
            operation: "extract",
            log_level,
        }
    }

    /// Error when injecting a value into a carrier
    #[must_use]
    pub fn inject(message: &'static str, header: &'static str, log_level: Level) -> Self {
        Self {
            message,
            header,
            propagator_name: "datadog",
            operation: "inject",
            log_level,
        }
    }
}
