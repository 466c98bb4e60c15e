//! Log output for the crater tools.
//!
//! Without the `tracing` feature, records go through a stderr backend that
//! tags each line with seconds since startup, level and crate name. The CLI
//! turns its `-v` count into a level with [`level_from_verbosity`].

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record.target().split("::").next().unwrap_or_default();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Register the stderr backend as the global `log` sink at `level`.
///
/// Only the first call installs anything; the level of later calls is ignored.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// `0 -> Warn`, `1 -> Info`, `2 -> Debug`, anything above -> `Trace`.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a `tracing` fmt subscriber (plain or JSON lines) at `level`,
/// unless `RUST_LOG` says otherwise.
///
/// Events are written to stderr. `log` records are not bridged here;
/// binaries that want them install `tracing_log::LogTracer` first.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let installed = if json {
        tracing::subscriber::set_global_default(
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .json()
                .flatten_event(true)
                .finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_timer(fmt::time::Uptime::default())
                .finish(),
        )
    };
    if installed.is_err() {
        log::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn repeated_init_is_harmless() {
        assert!(init_with_level(LevelFilter::Warn).is_ok());
        assert!(init_with_level(LevelFilter::Debug).is_ok());
    }
}
