// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashMap,
    hash::BuildHasher,
    sync::{Arc, Mutex},
};

/// Receives the diagnostics of a propagation call, usually the trace being
/// extracted into or injected from.
pub trait ActiveTrace {
    fn set_tag(&self, key: &str, value: &str);
}

/// Discards every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;

impl ActiveTrace for NoopTrace {
    fn set_tag(&self, _key: &str, _value: &str) {}
}

impl<S: BuildHasher> ActiveTrace for Mutex<HashMap<String, String, S>> {
    fn set_tag(&self, key: &str, value: &str) {
        if let Ok(mut tags) = self.lock() {
            tags.insert(key.to_string(), value.to_string());
        }
    }
}

impl<T: ActiveTrace + ?Sized> ActiveTrace for &T {
    fn set_tag(&self, key: &str, value: &str) {
        (**self).set_tag(key, value)
    }
}

impl<T: ActiveTrace + ?Sized> ActiveTrace for Arc<T> {
    fn set_tag(&self, key: &str, value: &str) {
        (**self).set_tag(key, value)
    }
}
