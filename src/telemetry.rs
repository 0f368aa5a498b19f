use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Output goes to stderr so the
/// instruction stream printed by the CLI stays clean on stdout.
pub fn init_telemetry(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    if json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    }

    tracing::debug!(level = level, json = json, "Telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the events of one session
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span carrying the session id and, once chosen, the target tooth
pub fn create_session_span(session_id: &str, tooth: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "procedure_session",
        session.id = session_id,
        tooth = tooth,
    )
}
