//! Tracing setup for hosts embedding the scoring engine.
//!
//! The engine only emits events; installing a subscriber is the host's
//! job. `init_tracing` is idempotent, so test binaries can call it from
//! any test that wants log output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `default_filter` is a directive string (`"info"`, `"cigame=debug"`,
/// ...) used when `RUST_LOG` is not set; `RUST_LOG` always wins. With
/// `json` the output is newline-delimited JSON for log aggregation.
pub fn init_tracing(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .ok();
    }
}
