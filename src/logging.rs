//! Structured logging setup, grounded on `tracing`/`tracing-subscriber` the way the rest of the
//! core already assumes them (`warn!`/`trace!` calls throughout `agent::*` resolve to the
//! `#[macro_use] extern crate tracing;` import at the crate root).

use ::tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber reading its filter from `RUST_LOG`, falling back to
/// `level` when the variable is unset or fails to parse. Safe to call once per process; a second
/// call returns an error rather than panicking.
pub fn init(default_level: &str) -> Result<(), ::tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = ::tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    ::tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_call_does_not_panic() {
        let _ = init("info");
        assert!(init("info").is_err());
    }
}
