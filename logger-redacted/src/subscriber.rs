use tracing::{dispatcher, Span, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Configuration;
use crate::error::{LogError, Result};
use crate::level::Level;
use crate::logger::{configure_writer, Closer};
use crate::writer::SharedWriter;

/// JSON subscriber writing through `writer`. `RUST_LOG` overrides `level`.
pub fn json_subscriber(writer: SharedWriter, level: Level) -> impl Subscriber + Send + Sync {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.as_tracing()).into())
        .from_env_lossy();

    tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(writer),
    )
}

/// Identifiers of a `tracing` span, rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanIds {
    pub span_id: String,
    /// Id of the outermost span, shared by every span nested in it.
    pub trace_id: String,
}

/// Identifiers of the span entered on this thread, or `None` outside a span
/// or when the active subscriber keeps no span registry.
pub fn current_span_ids() -> Option<SpanIds> {
    let id = Span::current().id()?;

    dispatcher::get_default(|dispatch| {
        let registry = dispatch.downcast_ref::<Registry>()?;
        let span = registry.span(&id)?;
        let root = span.scope().from_root().next()?;

        Some(SpanIds {
            span_id: format!("{:016x}", id.into_u64()),
            trace_id: format!("{:032x}", root.id().into_u64()),
        })
    })
}

/// Route `tracing` events from dependencies through the writer chain
/// described by `cfg`, so they are masked like logger records.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init_tracing(cfg: &Configuration) -> Result<Closer> {
    let (writer, closer) = configure_writer(cfg)?;
    json_subscriber(writer, cfg.level())
        .try_init()
        .map_err(LogError::Subscriber)?;

    Ok(closer)
}
