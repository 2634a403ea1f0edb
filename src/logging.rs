//! Structured logging setup using the tracing crate

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for structured logging.
///
/// Respects `RUST_LOG` for filtering; defaults to `info` when unset.
/// Call once at application startup, before the first request.
pub fn init_subscriber() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_subscriber_is_idempotent_enough() {
        // First call wins; a second call reports the existing subscriber
        // rather than panicking.
        let _ = init_subscriber();
        assert!(init_subscriber().is_err());
    }
}
