//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL feeds the `EnvFilter` (a plain level like "debug" or full
//! per-target directives); LOG_FORMAT switches between human-readable
//! "pretty" output (the default) and "json" structured logs. Targets are
//! kept in the output so the practice/scoring/store sources stay
//! distinguishable from the HTTP layers.

use tracing_subscriber::EnvFilter;

/// Default directives when LOG_LEVEL is unset: our own targets at debug,
/// the HTTP plumbing at info.
const DEFAULT_DIRECTIVES: &str =
    "info,practice=debug,scoring=debug,store=debug,thinkfast_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The two builder variants have different types, so init in the match.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
