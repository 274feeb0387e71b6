// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Propagation of Datadog trace context through `x-datadog-*` headers.
//!
//! ```
//! use std::{collections::HashMap, sync::Mutex};
//!
//! use dd_trace_propagation::{DatadogHeadersPropagator, Propagator};
//!
//! let propagator = DatadogHeadersPropagator::default();
//! let incoming = HashMap::from([
//!     ("x-datadog-trace-id".to_string(), "123".to_string()),
//!     ("x-datadog-parent-id".to_string(), "456".to_string()),
//! ]);
//! let trace = Mutex::new(HashMap::<String, String>::new());
//!
//! let digest = propagator.extract(&incoming, &trace);
//!
//! let mut outgoing: HashMap<String, String> = HashMap::new();
//! propagator.inject(digest.as_ref(), &mut outgoing, &trace);
//! assert_eq!(outgoing.get("x-datadog-trace-id").map(String::as_str), Some("123"));
//! ```

pub mod carrier;
pub mod datadog;
pub mod digest;
mod error;
pub mod reader;
pub mod tags;
pub mod trace;

pub use carrier::{Extractor, Injector};
pub use datadog::DatadogHeadersPropagator;
pub use digest::TraceDigest;
pub use tags::{DatadogTagsCodec, TagsError};
pub use trace::{ActiveTrace, NoopTrace};

pub trait Propagator {
    /// Reads a digest from `carrier`. `None` when the carrier does not hold a
    /// valid trace context.
    fn extract(&self, carrier: &dyn Extractor, trace: &dyn ActiveTrace) -> Option<TraceDigest>;

    /// Writes `digest` into `carrier`. Never fails: diagnostics go to `trace`.
    fn inject(
        &self,
        digest: Option<&TraceDigest>,
        carrier: &mut dyn Injector,
        trace: &dyn ActiveTrace,
    );

    /// Header names read and written by this propagator
    fn keys(&self) -> &[String];
}
