// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

/// Propagated state of a trace: what a downstream service needs to continue it.
///
/// A digest is a value: it is built once and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TraceDigest {
    trace_id: u64,
    span_id: Option<u64>,
    trace_origin: Option<String>,
    trace_sampling_priority: Option<i64>,
    trace_distributed_tags: Option<HashMap<String, String>>,
}

impl TraceDigest {
    #[must_use]
    pub fn new(trace_id: u64, span_id: Option<u64>) -> Self {
        Self {
            trace_id,
            span_id,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.trace_origin = origin;
        self
    }

    #[must_use]
    pub fn with_sampling_priority(mut self, priority: Option<i64>) -> Self {
        self.trace_sampling_priority = priority;
        self
    }

    #[must_use]
    pub fn with_distributed_tags(mut self, tags: Option<HashMap<String, String>>) -> Self {
        self.trace_distributed_tags = tags;
        self
    }

    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    /// Id of the span to parent under
    pub fn span_id(&self) -> Option<u64> {
        self.span_id
    }

    pub fn trace_origin(&self) -> Option<&str> {
        self.trace_origin.as_deref()
    }

    pub fn trace_sampling_priority(&self) -> Option<i64> {
        self.trace_sampling_priority
    }

    /// `None` when no tags were propagated, which differs from an empty mapping
    pub fn trace_distributed_tags(&self) -> Option<&HashMap<String, String>> {
        self.trace_distributed_tags.as_ref()
    }
}
