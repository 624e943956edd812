//! SDK log output.
//!
//! Every line is prefixed with `SODA` and the level so SDK diagnostics stand
//! out in a host application's console:
//!
//! ```text
//! SODA | INFO | remote config initialized bundle_id="com.acme.game" transport="HttpTransport"
//! SODA | WARN | no config data found for key; using default value key="speed"
//! ```
//!
//! [`init`] installs a global subscriber using [`Formatter`]. SDK output can
//! be switched off and on at runtime with [`set_logging_enabled`] without
//! reinstalling the subscriber. The switch only gates events whose target
//! belongs to an SDK crate (`soda_*`); host events keep flowing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_core::{Event, Metadata, Subscriber};
use tracing_subscriber::filter::{filter_fn, ParseError};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Prefix written at the start of every line.
pub const LOG_PREFIX: &str = "SODA";

/// Target prefix shared by the SDK crates.
const SDK_TARGET_PREFIX: &str = "soda_";

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

/// Error raised by [`init`].
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log level directive: {0}")]
    Filter(#[from] ParseError),
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Enables or disables SDK log output.
pub fn set_logging_enabled(enabled: bool) {
    LOGGING_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn logging_enabled() -> bool {
    LOGGING_ENABLED.load(Ordering::Relaxed)
}

/// Installs the SDK subscriber as the global default.
///
/// `level` is an [`EnvFilter`] directive such as `info` or
/// `soda_remote_config=debug`. HTTP stack internals are silenced.
pub fn init(level: &str) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_new(format!("h2=off,hyper=off,rustls=off,{level}"))?;
    let subscriber = Registry::default()
        .with(filter)
        .with(switched_layer(&LOGGING_ENABLED));
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("logging subsystem enabled");
    Ok(())
}

/// The `fmt` layer using [`Formatter`], with SDK events gated by `switch`.
fn switched_layer<S>(switch: &'static AtomicBool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(Formatter)
        .with_filter(filter_fn(move |meta| passes_switch(switch, meta)))
}

fn passes_switch(switch: &AtomicBool, meta: &Metadata<'_>) -> bool {
    !meta.target().starts_with(SDK_TARGET_PREFIX) || switch.load(Ordering::Relaxed)
}

/// Event formatter producing `SODA | LEVEL | [spans: ]message fields`.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(&mut writer, "{LOG_PREFIX} | {} | ", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
