//! Tracing subscriber setup.
//!
//! The filter comes from `RUST_LOG` when set. `log` records emitted by
//! `astro-core` (frame decoding) are picked up by the subscriber as well.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LogFormat;

pub const DEFAULT_FILTER: &str = "astro_relay=info,astro_core=info,tower_http=info";

pub fn init(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .ok(),
    };
}
