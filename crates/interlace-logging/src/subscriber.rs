//! Process-wide subscriber installation and filter reloading.

use std::io::{self, IsTerminal};

use interlace_config::LogFormat;
use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::{LOGGING_TARGET, LoggingError};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static SUBSCRIBER: OnceCell<FilterHandle> = OnceCell::new();
static LOG_BRIDGE: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber on first use, otherwise swaps its filter.
///
/// `format` only takes effect when the subscriber is installed; later calls
/// keep the original output format.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or the subscriber
/// cannot be installed or reloaded.
pub fn install(filter: &str, format: LogFormat) -> Result<(), LoggingError> {
    let mut installed_now = false;
    let handle = SUBSCRIBER.get_or_try_init(|| {
        installed_now = true;
        install_subscriber(filter, format)
    })?;
    if installed_now {
        return Ok(());
    }
    handle
        .reload(parse_filter(filter)?)
        .map_err(|error| LoggingError::Reload(error.to_string()))?;
    tracing::debug!(target: LOGGING_TARGET, filter, "log filter reloaded");
    Ok(())
}

/// Swaps the active filter, installing a subscriber with the default format
/// when none exists yet.
///
/// # Errors
///
/// Returns [`LoggingError`] under the same conditions as [`install`].
pub fn apply_filter(filter: &str) -> Result<(), LoggingError> {
    install(filter, LogFormat::default())
}

/// Bridges records emitted through the `log` facade into `tracing`.
///
/// The bridge is installed at most once per process.
pub fn bridge_log() {
    LOG_BRIDGE.get_or_init(|| {
        if let Err(error) = tracing_log::LogTracer::init() {
            tracing::debug!(target: LOGGING_TARGET, %error, "log bridge already present");
        }
    });
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|error| LoggingError::Filter {
        directive: directive.to_owned(),
        message: error.to_string(),
    })
}

fn install_subscriber(filter: &str, format: LogFormat) -> Result<FilterHandle, LoggingError> {
    let (filter_layer, handle) = reload::Layer::new(parse_filter(filter)?);
    let base = tracing_subscriber::registry().with(filter_layer);
    let output = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(base.with(output.json().flatten_event(true))),
        LogFormat::Compact => Box::new(base.with(output.compact())),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::Subscriber)?;
    Ok(handle)
}
