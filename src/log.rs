//! Debug logger construction.
//!
//! The emulator reports everything it does not understand through its
//! logger; this module turns a [`LogType`] choice into a working
//! `slog::Logger`.

use slog::{Discard, Logger};
use sloggers::Build;
use sloggers::file::FileLoggerBuilder;
use sloggers::null::NullLoggerBuilder;
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
pub use sloggers::types::Severity;

/// Where emulator debug output goes. Mainly for developers.
#[derive(Clone, Debug)]
pub enum LogType {
    File((String, Severity, OpenMode)),
    Stdout(Severity),
    Stderr(Severity),
    None,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenMode {
    Truncate,
    Append,
}

/// Build the logger for `log_type`, falling back to a discard logger
/// when the destination cannot be opened.
pub fn build_logger(log_type: &LogType) -> Logger {
    let built = match *log_type {
        LogType::File((ref name, severity, open_mode)) => {
            let mut builder = FileLoggerBuilder::new(name);
            builder.level(severity);
            if open_mode == OpenMode::Truncate {
                builder.truncate();
            }
            builder.build()
        }
        LogType::Stdout(severity) => {
            let mut builder = TerminalLoggerBuilder::new();
            builder.destination(Destination::Stdout);
            builder.level(severity);
            builder.build()
        }
        LogType::Stderr(severity) => {
            let mut builder = TerminalLoggerBuilder::new();
            builder.destination(Destination::Stderr);
            builder.level(severity);
            builder.build()
        }
        LogType::None => NullLoggerBuilder {}.build(),
    };
    built.unwrap_or_else(|_| Logger::root(Discard, o!()))
}
