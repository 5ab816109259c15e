use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_cache_hit_total",
            Unit::Count,
            "Cache-aside reads answered from the cache store."
        );
        describe_counter!(
            "folio_cache_miss_total",
            Unit::Count,
            "Cache-aside reads that found no live entry and ran the producer."
        );
        describe_counter!(
            "folio_cache_read_error_total",
            Unit::Count,
            "Cache reads that failed or returned an undecodable value and bypassed the cache."
        );
        describe_counter!(
            "folio_cache_write_error_total",
            Unit::Count,
            "Fresh values that could not be written back to the cache store."
        );
        describe_counter!(
            "folio_page_data_fallback_total",
            Unit::Count,
            "Page data aggregations that failed and served the empty default."
        );
    });
}
