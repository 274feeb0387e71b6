// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Flat, string keyed header maps the propagator reads from and writes to.
//!
//! Header names are case insensitive: carriers are expected to normalize keys
//! on both sides, which the `HashMap` implementations do by lower-casing them.
//!
//! Modeled after the OpenTelemetry Rust propagation carriers.
//! <https://github.com/open-telemetry/opentelemetry-rust/blob/main/opentelemetry/src/propagation/mod.rs>
use std::collections::HashMap;

/// Injector provides an interface for a carrier to be used
/// with a Propagator to inject a trace digest into the carrier.
pub trait Injector {
    /// Set a value in the carrier.
    fn set(&mut self, key: &str, value: String);
}

/// Extractor provides an interface for a carrier to be used
/// with a Propagator to extract a trace digest from the carrier.
pub trait Extractor {
    /// Get a value from the carrier.
    fn get(&self, key: &str) -> Option<&str>;

    /// Get all keys from the carrier.
    fn keys(&self) -> Vec<&str>;
}

impl<S: std::hash::BuildHasher> Injector for HashMap<String, String, S> {
    /// Set a key and value in the `HashMap`.
    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_lowercase(), value);
    }
}

impl<S: std::hash::BuildHasher> Extractor for HashMap<String, String, S> {
    /// Get a value for a key from the `HashMap`.
    fn get(&self, key: &str) -> Option<&str> {
        self.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Collect all the keys from the `HashMap`.
    fn keys(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect::<Vec<_>>()
    }
}

#[cfg(feature = "opentelemetry")]
impl Extractor for &dyn opentelemetry::propagation::Extractor {
    fn get(&self, key: &str) -> Option<&str> {
        opentelemetry::propagation::Extractor::get(*self, key)
    }

    fn keys(&self) -> Vec<&str> {
        opentelemetry::propagation::Extractor::keys(*self)
    }
}

#[cfg(feature = "opentelemetry")]
impl Injector for &mut dyn opentelemetry::propagation::Injector {
    fn set(&mut self, key: &str, value: String) {
        opentelemetry::propagation::Injector::set(*self, key, value);
    }
}
