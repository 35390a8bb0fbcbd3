//! Opt-in log output for the `reprit.generate` and `reprit.render` spans.
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them call [`init_tracing`] once at startup.

use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

const FALLBACK_DIRECTIVE: &str = "reprit=debug";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("cannot parse log filter `{directive}`: {source}")]
    InvalidFilter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("another global subscriber is already installed: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Sends `reprit` logs to stderr in the compact single-line format.
///
/// A valid `RUST_LOG` wins; without one the filter is `reprit=debug`. Only
/// the first successful call installs anything.
pub fn init_tracing() -> Result<(), TelemetryInitError> {
    init_tracing_with(FALLBACK_DIRECTIVE)
}

/// [`init_tracing`] with a caller-chosen fallback directive.
pub fn init_tracing_with(directive: &str) -> Result<(), TelemetryInitError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => parse_directive(directive)?,
    };
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )?;
    INSTALLED.get_or_init(|| ());
    Ok(())
}

fn parse_directive(directive: &str) -> Result<EnvFilter, TelemetryInitError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryInitError::InvalidFilter {
        directive: directive.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        init_tracing().unwrap();
        init_tracing().unwrap();
        init_tracing_with("reprit=trace").unwrap();
    }

    #[test]
    fn malformed_directives_are_reported() {
        let error = parse_directive("reprit=loud").unwrap_err();

        assert!(matches!(
            &error,
            TelemetryInitError::InvalidFilter { directive, .. } if directive == "reprit=loud"
        ));
    }
}
