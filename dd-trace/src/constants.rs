// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Tag set on the active trace when propagating the `x-datadog-tags` payload fails
pub const PROPAGATION_ERROR_TAG: &str = "_dd.propagation_error";

// Values of `_dd.propagation_error`
pub const PROPAGATION_ERROR_EXTRACT_MAX_SIZE: &str = "extract_max_size";
pub const PROPAGATION_ERROR_INJECT_MAX_SIZE: &str = "inject_max_size";
pub const PROPAGATION_ERROR_DECODING: &str = "decoding_error";
pub const PROPAGATION_ERROR_ENCODING: &str = "encoding_error";

