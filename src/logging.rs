//! Opt-in stderr logging for the `log` facade.
//!
//! The library only emits records; nothing is printed unless a binary installs a logger.
//! `HISTOGRAM_LOG` selects the level (`off|error|warn|info|debug|trace`, default `off`).

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

pub const LOG_ENV_VAR: &str = "HISTOGRAM_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Parse a level name; unknown names yield `None`.
pub fn parse_level(s: &str) -> Option<LevelFilter> {
    s.trim().parse::<LevelFilter>().ok()
}

/// Install the stderr logger at `level`. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Install the stderr logger with the level from `HISTOGRAM_LOG`, raised to at least `floor`.
pub fn init_from_env(floor: LevelFilter) {
    let from_env = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Off);
    init(from_env.max(floor));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels() {
        assert_eq!(parse_level("trace"), Some(LevelFilter::Trace));
        assert_eq!(parse_level(" DEBUG "), Some(LevelFilter::Debug));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
