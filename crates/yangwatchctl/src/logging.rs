//! Log setup for yangwatchctl
//!
//! Check tables are emitted through `tracing`, so the default level is info.
//! Logs go to stderr; stdout is kept for the summary and `--json` output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `yangwatch_shared=debug`
pub const LOG_ENV: &str = "YANGWATCH_LOG";

/// Filter directive for a given `-v` count and `$YANGWATCH_LOG` value.
/// An explicit `-v` wins over the environment.
pub fn filter_directive(verbose: u8, env_value: Option<&str>) -> String {
    match (verbose, env_value.map(str::trim)) {
        (0, Some(value)) if !value.is_empty() => value.to_string(),
        (0, _) => "info".to_string(),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(verbose, env_value.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("ignoring invalid {}='{}': {}", LOG_ENV, directive, e);
        EnvFilter::new("info")
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
