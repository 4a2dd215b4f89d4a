use std::io::{self, IsTerminal};

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Default directives when `RUST_LOG` is unset.
fn default_directives(debug: bool) -> &'static str {
    if debug {
        "debug,hyper=info,reqwest=info,h2=info"
    } else {
        "info,tower_http=warn"
    }
}

/// Installs the global subscriber: `RUST_LOG` if set, otherwise info (debug with `APP_DEBUG`).
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format, with target and `file:line` in debug mode
/// - ANSI colors only when stdout is a terminal
pub fn init(debug: bool) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    let ansi = io::stdout().is_terminal();
    let format = fmt::format()
        .compact()
        .with_timer(ChronoRfc3339Utc)
        .with_target(debug)
        .with_source_location(debug)
        .with_ansi(ansi);
    let layer = fmt::layer().with_ansi(ansi).event_format(format);

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)
}
