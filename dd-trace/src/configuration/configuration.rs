// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::sources::{CompositeConfigSourceResult, CompositeSource, ConfigSourceOrigin};
use super::supported_configurations::SupportedConfigurations;
use crate::{dd_warn, log::LevelFilter};

/// Upper bound, and default, of the `x-datadog-tags` payload length
pub const DATADOG_TAGS_MAX_LENGTH: usize = 512;

#[derive(Debug, Clone)]
#[non_exhaustive]
/// Configuration for the Datadog Tracer
///
/// # Usage
/// ```
/// use dd_trace::Config;
///
/// // This pulls configuration from the environment and other sources
/// let mut builder = Config::builder();
///
/// // Manual overrides
/// builder.set_datadog_tags_max_length(256);
///
/// // Finalize the configuration
/// let config = builder.build();
/// assert_eq!(config.datadog_tags_max_length(), 256);
/// ```
pub struct Config {
    /// The log level for the tracer
    log_level: LevelFilter,

    // # Propagation
    /// Maximum length of the `x-datadog-tags` header, both when injecting and extracting.
    /// With 0 only an empty payload fits.
    datadog_tags_max_length: usize,
    datadog_tags_max_length_origin: ConfigSourceOrigin,
}

impl Config {
    fn from_sources(sources: &CompositeSource) -> Self {
        let default = Config::default();

        /// Helper function to convert a CompositeConfigSourceResult<T> into an Option<T>
        /// Parsing errors are logged, the value falls back to the next source or default
        fn to_val<T>(res: CompositeConfigSourceResult<T>) -> Option<(T, ConfigSourceOrigin)> {
            for error in &res.errors {
                dd_warn!("Configuration {}: {error}", res.name.as_str());
            }
            res.value.map(|c| (c.value, c.origin))
        }

        let (datadog_tags_max_length, datadog_tags_max_length_origin) = to_val(
            sources.get_parse::<usize>(SupportedConfigurations::DD_TRACE_X_DATADOG_TAGS_MAX_LENGTH),
        )
        .map(|(max, origin)| (max.min(DATADOG_TAGS_MAX_LENGTH), origin))
        .unwrap_or((
            default.datadog_tags_max_length,
            default.datadog_tags_max_length_origin,
        ));

        Self {
            log_level: to_val(sources.get_parse(SupportedConfigurations::DD_LOG_LEVEL))
                .map(|(level, _)| level)
                .unwrap_or(default.log_level),
            datadog_tags_max_length,
            datadog_tags_max_length_origin,
        }
    }

    fn builder_with_sources(sources: &CompositeSource) -> ConfigBuilder {
        ConfigBuilder {
            config: Config::from_sources(sources),
        }
    }

    /// Creates a new builder to set overrides detected configuration
    pub fn builder() -> ConfigBuilder {
        Self::builder_with_sources(&CompositeSource::default_sources())
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn datadog_tags_max_length(&self) -> usize {
        self.datadog_tags_max_length
    }

    /// Where the current `datadog_tags_max_length` value comes from
    pub fn datadog_tags_max_length_origin(&self) -> ConfigSourceOrigin {
        self.datadog_tags_max_length_origin
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LevelFilter::default(),
            datadog_tags_max_length: DATADOG_TAGS_MAX_LENGTH,
            datadog_tags_max_length_origin: ConfigSourceOrigin::Default,
        }
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Finalizes the builder and returns the configuration
    pub fn build(self) -> Config {
        crate::log::set_max_level(self.config.log_level);
        self.config
    }

    pub fn set_log_level(&mut self, log_level: LevelFilter) -> &mut Self {
        self.config.log_level = log_level;
        self
    }

    /// Sets the maximum length of the `x-datadog-tags` header.
    /// Values above [`DATADOG_TAGS_MAX_LENGTH`] are capped.
    ///
    /// Env variable: `DD_TRACE_X_DATADOG_TAGS_MAX_LENGTH`
    pub fn set_datadog_tags_max_length(&mut self, length: usize) -> &mut Self {
        self.set_datadog_tags_max_length_with_no_limit(length.min(DATADOG_TAGS_MAX_LENGTH))
    }

    /// Same as [`ConfigBuilder::set_datadog_tags_max_length`], without the upper bound
    pub fn set_datadog_tags_max_length_with_no_limit(&mut self, length: usize) -> &mut Self {
        self.config.datadog_tags_max_length = length;
        self.config.datadog_tags_max_length_origin = ConfigSourceOrigin::Code;
        self
    }
}
