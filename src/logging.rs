//! Structured logging setup for the `score_report` binary.
//!
//! Filtering follows `RUST_LOG` (default `rubric_rs=info`). Set
//! `RUST_LOG_FORMAT=json` for one JSON object per line.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr. A second call is a
/// no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rubric_rs=info"));
    let is_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if is_json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
        tracing::info!(target: "rubric_rs", "logging initialised");
    }
}
