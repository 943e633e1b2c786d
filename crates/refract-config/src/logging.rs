//! Centralized logging initialization with environment variable support

use crate::{LogFormat, RefractConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: standard filter directives, take precedence over the config
/// - `LOG_FORMAT`: override format (json, pretty)
///
/// Output always goes to stderr; stdout belongs to the JSON-RPC stream.
/// Calling this twice is harmless: the second registration is ignored.
pub fn initialize(config: &RefractConfig) {
    let log_level = config
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let env_filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| parse_format(&f))
        .unwrap_or_else(|| config.logging.format.clone());

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}

fn parse_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" | "human" => Some(LogFormat::Pretty),
        _ => None,
    }
}

/// Create a request span with standard fields for context propagation
///
/// ```rust
/// use refract_config::logging::request_span;
///
/// let span = request_span(42, "workspace/willRenameFiles");
/// let _enter = span.enter();
/// tracing::info!("Processing request");
/// ```
pub fn request_span(request_id: u64, method: &str) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = request_id,
        method = %method
    )
}
