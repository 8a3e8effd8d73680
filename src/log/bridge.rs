//! Backend for the `log` crate facade.
//!
//! Once installed, `log::info!` and friends go through the same threshold,
//! line format and sink as direct [`Logger`] calls. `log` has no FATAL level,
//! so records never terminate the process.

use crate::log::{caller::CallSite, log_level::Level, logger::Logger};

impl From<::log::Level> for Level {
    fn from(level: ::log::Level) -> Self {
        match level {
            ::log::Level::Error => Level::Error,
            ::log::Level::Warn => Level::Warn,
            ::log::Level::Info => Level::Info,
            ::log::Level::Debug | ::log::Level::Trace => Level::Debug,
        }
    }
}

impl ::log::Log for Logger {
    fn enabled(&self, metadata: &::log::Metadata<'_>) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &::log::Record<'_>) {
        // Records built at runtime have no `'static` file; the resolver reports them as unknown.
        let site = CallSite {
            file: record.file_static().unwrap_or(""),
            line: record.line().unwrap_or(0),
            function: None,
        };
        self.emit_args(record.level().into(), *record.args(), site);
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

impl Logger {
    /// Installs this logger as the process-wide `log` backend.
    ///
    /// The logger is leaked so it lives for the rest of the process; the returned
    /// reference can still adjust its threshold or sink. Filtering is left to
    /// the logger, so `log`'s own max level is opened fully.
    ///
    /// # Errors
    ///
    /// Returns `log::SetLoggerError` if a `log` backend is already installed.
    pub fn install(self) -> Result<&'static Logger, ::log::SetLoggerError> {
        let logger: &'static Logger = Box::leak(Box::new(self));
        ::log::set_logger(logger)?;
        ::log::set_max_level(::log::LevelFilter::Trace);
        Ok(logger)
    }
}
