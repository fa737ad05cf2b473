//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, ServerConfig};

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `server.log_level` when set. Returns `false` if a
/// global subscriber was already installed, which happens when several tests
/// initialize tracing in the same process.
pub fn init_tracing(config: &ServerConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(env_filter).with_target(true);

    let result = match config.effective_log_format() {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let config = ServerConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
