// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, sync::LazyLock};

use dd_trace::{
    constants::{
        PROPAGATION_ERROR_DECODING, PROPAGATION_ERROR_ENCODING,
        PROPAGATION_ERROR_EXTRACT_MAX_SIZE, PROPAGATION_ERROR_INJECT_MAX_SIZE,
        PROPAGATION_ERROR_TAG,
    },
    dd_debug, dd_log,
    log::Level,
    Config,
};

use crate::{
    carrier::{Extractor, Injector},
    digest::TraceDigest,
    error::Error,
    reader::HeaderReader,
    tags::{DatadogTagsCodec, TagsError},
    trace::ActiveTrace,
    Propagator,
};

// Datadog Keys
pub const DATADOG_TRACE_ID_KEY: &str = "x-datadog-trace-id";
pub const DATADOG_PARENT_ID_KEY: &str = "x-datadog-parent-id";
pub const DATADOG_SAMPLING_PRIORITY_KEY: &str = "x-datadog-sampling-priority";
pub const DATADOG_ORIGIN_KEY: &str = "x-datadog-origin";
pub const DATADOG_TAGS_KEY: &str = "x-datadog-tags";

static DATADOG_HEADER_KEYS: LazyLock<[String; 5]> = LazyLock::new(|| {
    [
        DATADOG_TRACE_ID_KEY.to_owned(),
        DATADOG_ORIGIN_KEY.to_owned(),
        DATADOG_PARENT_ID_KEY.to_owned(),
        DATADOG_SAMPLING_PRIORITY_KEY.to_owned(),
        DATADOG_TAGS_KEY.to_owned(),
    ]
});

/// Extracts and injects trace digests through the `x-datadog-*` headers.
///
/// Failures of the `x-datadog-tags` sub-channel never abort the operation:
/// they are logged, recorded as `_dd.propagation_error` on the given
/// [`ActiveTrace`], and the tags are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatadogHeadersPropagator {
    codec: DatadogTagsCodec,
}

impl DatadogHeadersPropagator {
    /// `max_length` bounds the `x-datadog-tags` payload, in bytes
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            codec: DatadogTagsCodec::new(max_length),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.datadog_tags_max_length())
    }
}

impl Propagator for DatadogHeadersPropagator {
    fn extract(&self, carrier: &dyn Extractor, trace: &dyn ActiveTrace) -> Option<TraceDigest> {
        let headers = HeaderReader::new(carrier);
        let trace_id = headers.id(DATADOG_TRACE_ID_KEY);
        let parent_id = headers.id(DATADOG_PARENT_ID_KEY);
        let origin = headers.header(DATADOG_ORIGIN_KEY);
        let sampling_priority = headers.number(DATADOG_SAMPLING_PRIORITY_KEY);

        // a synthetics request only carries a trace id and an origin
        let trace_id = match (trace_id, parent_id, origin) {
            (Some(trace_id), Some(_), _) | (Some(trace_id), None, Some(_)) => trace_id,
            _ => {
                dd_debug!("Propagator (datadog): no valid trace context found, skipping extract");
                return None;
            }
        };

        let tags = headers
            .header(DATADOG_TAGS_KEY)
            .and_then(|raw| self.extract_tags(raw, trace));

        Some(
            TraceDigest::new(trace_id, parent_id)
                .with_origin(origin.map(str::to_string))
                .with_sampling_priority(sampling_priority)
                .with_distributed_tags(tags),
        )
    }

    fn inject(
        &self,
        digest: Option<&TraceDigest>,
        carrier: &mut dyn Injector,
        trace: &dyn ActiveTrace,
    ) {
        let Some(digest) = digest else {
            return;
        };

        carrier.set(DATADOG_TRACE_ID_KEY, digest.trace_id().to_string());
        carrier.set(
            DATADOG_PARENT_ID_KEY,
            digest.span_id().unwrap_or(0).to_string(),
        );

        if let Some(priority) = digest.trace_sampling_priority() {
            carrier.set(DATADOG_SAMPLING_PRIORITY_KEY, priority.to_string());
        }

        if let Some(origin) = digest.trace_origin() {
            carrier.set(DATADOG_ORIGIN_KEY, origin.to_string());
        }

        if let Some(tags) = digest.trace_distributed_tags() {
            match self.codec.encode(tags) {
                Ok(encoded) => carrier.set(DATADOG_TAGS_KEY, encoded),
                Err(e) => {
                    let (error, diagnostic) = match e {
                        TagsError::SizeLimit { .. } => (
                            Error::inject("tags are too large", DATADOG_TAGS_KEY, Level::Warn),
                            PROPAGATION_ERROR_INJECT_MAX_SIZE,
                        ),
                        TagsError::Encoding(_) | TagsError::Decode(_) => (
                            Error::inject("error encoding tags", DATADOG_TAGS_KEY, Level::Warn),
                            PROPAGATION_ERROR_ENCODING,
                        ),
                    };
                    trace.set_tag(PROPAGATION_ERROR_TAG, diagnostic);
                    dd_log!(error.log_level, "{error}: {e}");
                }
            }
        }
    }

    fn keys(&self) -> &[String] {
        DATADOG_HEADER_KEYS.as_slice()
    }
}

impl DatadogHeadersPropagator {
    fn extract_tags(
        &self,
        raw: &str,
        trace: &dyn ActiveTrace,
    ) -> Option<HashMap<String, String>> {
        match self.codec.decode(Some(raw)) {
            Ok(tags) => Some(tags),
            Err(e) => {
                let (error, diagnostic) = match e {
                    TagsError::SizeLimit { .. } => (
                        Error::extract("tags are too large", DATADOG_TAGS_KEY, Level::Warn),
                        PROPAGATION_ERROR_EXTRACT_MAX_SIZE,
                    ),
                    TagsError::Decode(_) | TagsError::Encoding(_) => (
                        Error::extract("failed to decode tags", DATADOG_TAGS_KEY, Level::Debug),
                        PROPAGATION_ERROR_DECODING,
                    ),
                };
                trace.set_tag(PROPAGATION_ERROR_TAG, diagnostic);
                dd_log!(error.log_level, "{error}: {e}, raw value {raw:?}");
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{LazyLock, Mutex};

    use dd_trace::log::{test_logger, Level};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::trace::NoopTrace;

    static VALID_DATADOG_HEADERS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
        HashMap::from([
            ("x-datadog-trace-id".to_string(), "123".to_string()),
            ("x-datadog-parent-id".to_string(), "456".to_string()),
            ("x-datadog-sampling-priority".to_string(), "1".to_string()),
        ])
    });

    static SYNTHETICS_HEADERS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
        HashMap::from([
            ("x-datadog-trace-id".to_string(), "123".to_string()),
            ("x-datadog-origin".to_string(), "synthetics".to_string()),
        ])
    });

    fn headers<const N: usize>(
        base: &HashMap<String, String>,
        entries: [(&str, &str); N],
    ) -> HashMap<String, String> {
        let mut h = base.clone();
        h.extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        h
    }

    fn string_map<const N: usize>(entries: [(&str, &str); N]) -> HashMap<String, String> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn recording_trace() -> Mutex<HashMap<String, String>> {
        Mutex::new(HashMap::new())
    }

    fn diagnostics(trace: Mutex<HashMap<String, String>>) -> HashMap<String, String> {
        trace.into_inner().unwrap_or_default()
    }

    macro_rules! test_datadog_extract {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (carrier, expected): (HashMap<String, String>, Option<TraceDigest>) = $value;
                    let propagator = DatadogHeadersPropagator::default();

                    let digest = propagator.extract(&carrier, &NoopTrace);

                    assert_eq!(digest, expected);
                }
            )*
        }
    }

    test_datadog_extract! {
        extract_valid: (
            VALID_DATADOG_HEADERS.clone(),
            Some(TraceDigest::new(123, Some(456)).with_sampling_priority(Some(1))),
        ),
        extract_all_headers: (
            headers(&VALID_DATADOG_HEADERS, [
                ("x-datadog-origin", "rum"),
                ("x-datadog-tags", "_dd.p.dm=-4,_dd.p.usr.id=baz64"),
            ]),
            Some(
                TraceDigest::new(123, Some(456))
                    .with_sampling_priority(Some(1))
                    .with_origin(Some("rum".to_string()))
                    .with_distributed_tags(Some(string_map([("_dd.p.dm", "-4"), ("_dd.p.usr.id", "baz64")])))
            ),
        ),
        extract_synthetics: (
            SYNTHETICS_HEADERS.clone(),
            Some(TraceDigest::new(123, None).with_origin(Some("synthetics".to_string()))),
        ),
        extract_zero_trace_id: (
            headers(&VALID_DATADOG_HEADERS, [("x-datadog-trace-id", "0")]),
            None,
        ),
        extract_zero_trace_id_with_origin: (
            headers(&SYNTHETICS_HEADERS, [("x-datadog-trace-id", "0")]),
            None,
        ),
        extract_negative_trace_id: (
            headers(&VALID_DATADOG_HEADERS, [("x-datadog-trace-id", "-1")]),
            None,
        ),
        extract_trace_id_only: (
            string_map([("x-datadog-trace-id", "123")]),
            None,
        ),
        extract_parent_id_only: (
            string_map([("x-datadog-parent-id", "456")]),
            None,
        ),
        extract_origin_only: (
            string_map([("x-datadog-origin", "synthetics")]),
            None,
        ),
        extract_zero_parent_id: (
            headers(&VALID_DATADOG_HEADERS, [("x-datadog-parent-id", "0")]),
            None,
        ),
        extract_zero_parent_id_with_origin: (
            headers(&SYNTHETICS_HEADERS, [("x-datadog-parent-id", "0")]),
            Some(TraceDigest::new(123, None).with_origin(Some("synthetics".to_string()))),
        ),
        extract_invalid_sampling_priority: (
            headers(&VALID_DATADOG_HEADERS, [("x-datadog-sampling-priority", "keep")]),
            Some(TraceDigest::new(123, Some(456))),
        ),
        extract_negative_sampling_priority: (
            headers(&VALID_DATADOG_HEADERS, [("x-datadog-sampling-priority", "-1")]),
            Some(TraceDigest::new(123, Some(456)).with_sampling_priority(Some(-1))),
        ),
        extract_empty_tags: (
            headers(&VALID_DATADOG_HEADERS, [("x-datadog-tags", "")]),
            Some(
                TraceDigest::new(123, Some(456))
                    .with_sampling_priority(Some(1))
                    .with_distributed_tags(Some(HashMap::new()))
            ),
        ),
        extract_empty_carrier: (
            HashMap::new(),
            None,
        ),
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let carrier = HashMap::from([
            ("X-Datadog-Trace-Id".to_string(), "123".to_string()),
            ("X-Datadog-Parent-Id".to_string(), "456".to_string()),
        ]);
        let mut normalized: HashMap<String, String> = HashMap::new();
        for (k, v) in carrier {
            Injector::set(&mut normalized, &k, v);
        }

        let digest = DatadogHeadersPropagator::default().extract(&normalized, &NoopTrace);

        assert_eq!(digest, Some(TraceDigest::new(123, Some(456))));
    }

    #[test]
    fn test_extract_tags_over_limit() {
        let _g = test_logger::activate_test_logger();
        let trace = recording_trace();
        let carrier = headers(&VALID_DATADOG_HEADERS, [("x-datadog-tags", "_dd.p.dm=-4")]);

        let digest = DatadogHeadersPropagator::new(5).extract(&carrier, &trace);

        assert_eq!(
            digest,
            Some(TraceDigest::new(123, Some(456)).with_sampling_priority(Some(1)))
        );
        assert_eq!(
            diagnostics(trace),
            string_map([("_dd.propagation_error", "extract_max_size")])
        );
        let logs = test_logger::take_test_logs().unwrap_or_default();
        assert!(
            logs.iter().any(|(lvl, log)| *lvl == Level::Warn && log.contains("x-datadog-tags")),
            "{logs:?}"
        );
    }

    #[test]
    fn test_extract_malformed_tags() {
        let _g = test_logger::activate_test_logger();
        let trace = recording_trace();
        let carrier = headers(&VALID_DATADOG_HEADERS, [("x-datadog-tags", "_dd.p.dm")]);

        let digest = DatadogHeadersPropagator::default().extract(&carrier, &trace);

        assert_eq!(
            digest,
            Some(TraceDigest::new(123, Some(456)).with_sampling_priority(Some(1)))
        );
        assert_eq!(
            diagnostics(trace),
            string_map([("_dd.propagation_error", "decoding_error")])
        );
        let logs = test_logger::take_test_logs().unwrap_or_default();
        assert!(
            logs.iter()
                .any(|(lvl, log)| *lvl == Level::Debug && log.contains("\"_dd.p.dm\"")),
            "{logs:?}"
        );
    }

    #[test]
    fn test_extract_tags_zero_limit() {
        let trace = recording_trace();
        let carrier = headers(&VALID_DATADOG_HEADERS, [("x-datadog-tags", "a=b")]);

        let digest = DatadogHeadersPropagator::new(0).extract(&carrier, &trace);

        assert_eq!(
            digest,
            Some(TraceDigest::new(123, Some(456)).with_sampling_priority(Some(1)))
        );
        assert_eq!(
            diagnostics(trace),
            string_map([("_dd.propagation_error", "extract_max_size")])
        );
    }

    #[test]
    fn test_extract_empty_tags_zero_limit() {
        let trace = recording_trace();
        let carrier = headers(&VALID_DATADOG_HEADERS, [("x-datadog-tags", "")]);

        let digest = DatadogHeadersPropagator::new(0).extract(&carrier, &trace);

        assert_eq!(
            digest.as_ref().and_then(TraceDigest::trace_distributed_tags),
            Some(&HashMap::new())
        );
        assert!(diagnostics(trace).is_empty());
    }

    #[test]
    fn test_extract_zero_limit_without_header() {
        let trace = recording_trace();

        let digest = DatadogHeadersPropagator::new(0).extract(&*VALID_DATADOG_HEADERS, &trace);

        assert!(digest.is_some());
        assert!(diagnostics(trace).is_empty());
    }

    #[test]
    fn test_extract_invalid_carrier_records_nothing() {
        let trace = recording_trace();
        let carrier = string_map([("x-datadog-tags", "garbage")]);

        let digest = DatadogHeadersPropagator::new(1).extract(&carrier, &trace);

        assert_eq!(digest, None);
        assert!(diagnostics(trace).is_empty());
    }

    #[test]
    fn test_inject_none() {
        let mut carrier: HashMap<String, String> = HashMap::new();
        let trace = recording_trace();

        DatadogHeadersPropagator::default().inject(None, &mut carrier, &trace);

        assert!(carrier.is_empty());
        assert!(diagnostics(trace).is_empty());
    }

    #[test]
    fn test_inject_all_fields() {
        let digest = TraceDigest::new(10, Some(20))
            .with_sampling_priority(Some(2))
            .with_origin(Some("synthetics".to_string()))
            .with_distributed_tags(Some(string_map([("_dd.p.dm", "-4"), ("a", "b")])));
        let mut carrier: HashMap<String, String> = HashMap::new();

        DatadogHeadersPropagator::default().inject(Some(&digest), &mut carrier, &NoopTrace);

        assert_eq!(
            carrier,
            string_map([
                ("x-datadog-trace-id", "10"),
                ("x-datadog-parent-id", "20"),
                ("x-datadog-sampling-priority", "2"),
                ("x-datadog-origin", "synthetics"),
                ("x-datadog-tags", "_dd.p.dm=-4,a=b"),
            ])
        );
    }

    #[test]
    fn test_inject_minimal() {
        let digest = TraceDigest::new(10, None);
        let mut carrier: HashMap<String, String> = HashMap::new();

        DatadogHeadersPropagator::default().inject(Some(&digest), &mut carrier, &NoopTrace);

        assert_eq!(
            carrier,
            string_map([("x-datadog-trace-id", "10"), ("x-datadog-parent-id", "0")])
        );
    }

    #[test]
    fn test_inject_empty_tags() {
        let digest = TraceDigest::new(10, Some(20)).with_distributed_tags(Some(HashMap::new()));
        let mut carrier: HashMap<String, String> = HashMap::new();

        DatadogHeadersPropagator::default().inject(Some(&digest), &mut carrier, &NoopTrace);

        assert_eq!(
            Extractor::get(&carrier, DATADOG_TAGS_KEY),
            Some(""),
        );
    }

    #[test]
    fn test_inject_tags_over_limit() {
        let _g = test_logger::activate_test_logger();
        let digest = TraceDigest::new(10, Some(20))
            .with_sampling_priority(Some(1))
            .with_origin(Some("rum".to_string()))
            .with_distributed_tags(Some(string_map([("_dd.p.dm", "-4")])));
        let mut carrier: HashMap<String, String> = HashMap::new();
        let trace = recording_trace();

        DatadogHeadersPropagator::new(4).inject(Some(&digest), &mut carrier, &trace);

        assert_eq!(
            carrier,
            string_map([
                ("x-datadog-trace-id", "10"),
                ("x-datadog-parent-id", "20"),
                ("x-datadog-sampling-priority", "1"),
                ("x-datadog-origin", "rum"),
            ])
        );
        assert_eq!(
            diagnostics(trace),
            string_map([("_dd.propagation_error", "inject_max_size")])
        );
        let logs = test_logger::take_test_logs().unwrap_or_default();
        assert!(
            logs.iter().any(|(lvl, _)| *lvl == Level::Warn),
            "{logs:?}"
        );
    }

    #[test]
    fn test_inject_unencodable_tags() {
        let digest =
            TraceDigest::new(10, Some(20)).with_distributed_tags(Some(string_map([("a", "b,c")])));
        let mut carrier: HashMap<String, String> = HashMap::new();
        let trace = recording_trace();

        DatadogHeadersPropagator::default().inject(Some(&digest), &mut carrier, &trace);

        assert_eq!(
            carrier,
            string_map([("x-datadog-trace-id", "10"), ("x-datadog-parent-id", "20")])
        );
        assert_eq!(
            diagnostics(trace),
            string_map([("_dd.propagation_error", "encoding_error")])
        );
    }

    #[test]
    fn test_inject_tags_zero_limit() {
        let digest =
            TraceDigest::new(10, Some(20)).with_distributed_tags(Some(string_map([("a", "b")])));
        let mut carrier: HashMap<String, String> = HashMap::new();
        let trace = recording_trace();

        DatadogHeadersPropagator::new(0).inject(Some(&digest), &mut carrier, &trace);

        assert_eq!(Extractor::get(&carrier, DATADOG_TAGS_KEY), None);
        assert_eq!(
            diagnostics(trace),
            string_map([("_dd.propagation_error", "inject_max_size")])
        );
    }

    #[test]
    fn test_inject_empty_tags_zero_limit() {
        let digest = TraceDigest::new(10, Some(20)).with_distributed_tags(Some(HashMap::new()));
        let mut carrier: HashMap<String, String> = HashMap::new();
        let trace = recording_trace();

        DatadogHeadersPropagator::new(0).inject(Some(&digest), &mut carrier, &trace);

        assert_eq!(Extractor::get(&carrier, DATADOG_TAGS_KEY), Some(""));
        assert!(diagnostics(trace).is_empty());
    }

    #[test]
    fn test_round_trip() {
        let propagator = DatadogHeadersPropagator::default();
        let digest = TraceDigest::new(10, Some(20))
            .with_sampling_priority(Some(-1))
            .with_origin(Some("synthetics".to_string()))
            .with_distributed_tags(Some(string_map([("a", "b")])));
        let mut carrier: HashMap<String, String> = HashMap::new();

        propagator.inject(Some(&digest), &mut carrier, &NoopTrace);
        assert_eq!(Extractor::get(&carrier, DATADOG_TAGS_KEY), Some("a=b"));

        assert_eq!(propagator.extract(&carrier, &NoopTrace), Some(digest));
    }

    #[test]
    fn test_keys() {
        assert_eq!(
            DatadogHeadersPropagator::default().keys(),
            &[
                "x-datadog-trace-id".to_string(),
                "x-datadog-origin".to_string(),
                "x-datadog-parent-id".to_string(),
                "x-datadog-sampling-priority".to_string(),
                "x-datadog-tags".to_string(),
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let mut builder = Config::builder();
        builder.set_datadog_tags_max_length(0);
        let propagator = DatadogHeadersPropagator::from_config(&builder.build());

        assert_eq!(propagator, DatadogHeadersPropagator::new(0));
    }
}
