// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use dd_trace::{dd_debug, log::Level};

use crate::{carrier::Extractor, error::Error};

/// Typed, infallible accessors over an [`Extractor`].
///
/// Malformed values are reported as absent; the parse failure is only logged.
pub struct HeaderReader<'a> {
    carrier: &'a dyn Extractor,
}

impl<'a> HeaderReader<'a> {
    pub fn new(carrier: &'a dyn Extractor) -> Self {
        Self { carrier }
    }

    /// Raw header value
    pub fn header(&self, key: &str) -> Option<&'a str> {
        self.carrier.get(key)
    }

    /// A trace or span id. Zero is not a valid id and reads as absent.
    pub fn id(&self, key: &'static str) -> Option<u64> {
        self.parse::<u64>(key, "value is not an unsigned 64 bits integer")
            .filter(|id| *id != 0)
    }

    /// A signed decimal, zero included.
    pub fn number(&self, key: &'static str) -> Option<i64> {
        self.parse::<i64>(key, "value is not a signed 64 bits integer")
    }

    fn parse<T: FromStr>(&self, key: &'static str, message: &'static str) -> Option<T> {
        let raw = self.header(key)?;
        match raw
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .parse::<T>()
        {
            Ok(value) => Some(value),
            Err(_) => {
                let e = Error::extract(message, key, Level::Debug);
                dd_debug!("{e}: {raw:?}");
                None
            }
        }
    }
}
