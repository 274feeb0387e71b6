// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Codec of the `x-datadog-tags` header.
//!
//! The payload is a list of `key=value` entries separated by `,`. Keys are
//! printable ASCII without space, `,` or `=`. Values are printable ASCII
//! without `,` or `=`. The payload length is bounded by a maximum number of
//! bytes, checked before decoding and after encoding.

use std::{collections::HashMap, hash::BuildHasher, sync::LazyLock};

use dd_trace::configuration::DATADOG_TAGS_MAX_LENGTH;
use regex::Regex;
use thiserror::Error;

// printable ASCII, without space, `,` and `=`
static KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x21-\x2B\x2D-\x3C\x3E-\x7E]+$").expect("failed creating regex")
});
// printable ASCII, without `,` and `=`
static VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x20-\x2B\x2D-\x3C\x3E-\x7E]*$").expect("failed creating regex")
});

const ENTRY_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = '=';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagsError {
    #[error("tags payload is {length} bytes long, above the {max_length} bytes limit")]
    SizeLimit { length: usize, max_length: usize },
    #[error("cannot encode tags: {0}")]
    Encoding(&'static str),
    #[error("cannot decode tags: {0}")]
    Decode(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatadogTagsCodec {
    max_length: usize,
}

impl Default for DatadogTagsCodec {
    fn default() -> Self {
        Self::new(DATADOG_TAGS_MAX_LENGTH)
    }
}

impl DatadogTagsCodec {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Serializes `tags`, sorted by key.
    ///
    /// Nothing is returned unless every entry is valid and the whole payload
    /// fits in `max_length` bytes.
    pub fn encode<S: BuildHasher>(
        &self,
        tags: &HashMap<String, String, S>,
    ) -> Result<String, TagsError> {
        let mut entries = tags.iter().collect::<Vec<_>>();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        let mut encoded = String::new();
        for (key, value) in entries {
            if key.is_empty() {
                return Err(TagsError::Encoding("empty key"));
            }
            if !KEY_REGEX.is_match(key) {
                return Err(TagsError::Encoding("invalid character in key"));
            }
            if !VALUE_REGEX.is_match(value) {
                return Err(TagsError::Encoding("invalid character in value"));
            }

            if !encoded.is_empty() {
                encoded.push(ENTRY_SEPARATOR);
            }
            encoded.push_str(key);
            encoded.push(KEY_VALUE_SEPARATOR);
            encoded.push_str(value);
        }

        self.check_length(encoded.len())?;
        Ok(encoded)
    }

    /// Parses a raw `x-datadog-tags` value. A missing or empty header is an
    /// empty mapping.
    pub fn decode(&self, raw: Option<&str>) -> Result<HashMap<String, String>, TagsError> {
        let raw = match raw {
            None | Some("") => return Ok(HashMap::new()),
            Some(raw) => raw,
        };
        self.check_length(raw.len())?;

        let mut tags = HashMap::new();
        for entry in raw.split(ENTRY_SEPARATOR) {
            let (key, value) = entry
                .split_once(KEY_VALUE_SEPARATOR)
                .ok_or(TagsError::Decode("entry without `=`"))?;
            if key.is_empty() {
                return Err(TagsError::Decode("empty key"));
            }
            if !KEY_REGEX.is_match(key) {
                return Err(TagsError::Decode("invalid character in key"));
            }
            if !VALUE_REGEX.is_match(value) {
                return Err(TagsError::Decode("invalid character in value"));
            }
            tags.insert(key.to_string(), value.to_string());
        }

        Ok(tags)
    }

    fn check_length(&self, length: usize) -> Result<(), TagsError> {
        if length > self.max_length {
            return Err(TagsError::SizeLimit {
                length,
                max_length: self.max_length,
            });
        }
        Ok(())
    }
}
