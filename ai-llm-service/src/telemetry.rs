//! Log output for the service: one layer for this crate, one for everything else.

use std::io::{self, IsTerminal};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_library_event(target: &str) -> bool {
    target.starts_with(TARGET_PREFIX)
}

/// Completion-client events only: compact lines with target and `file:line`,
/// plus span close timings.
pub fn library_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(filter::filter_fn(|meta| is_library_event(meta.target())))
}

/// Every other event (HTTP layer, pipeline, corpus). Span fields such as
/// the request id are printed with each line.
pub fn app_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_target(false)
        .with_ansi(io::stdout().is_terminal())
        .with_filter(filter::filter_fn(|meta| !is_library_event(meta.target())))
}

/// `RUST_LOG` when set and valid, otherwise `default`.
pub fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber: `filter` in front of both layers.
///
/// # Errors
/// Fails if a global subscriber is already set.
pub fn init(filter: EnvFilter) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(app_layer())
        .with(library_layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_targets_are_split_off() {
        assert!(is_library_event("ai_llm_service::services::open_ai_service"));
        assert!(!is_library_event("api::middleware_layer::request_id"));
        assert!(!is_library_event("query_pipeline::pipeline"));
    }
}
