use crate::{
    config::{ConfigError, LogConfig},
    log::{
        caller::{self, BacktraceResolver, CallSite, CallerResolver},
        log_level::Level,
        log_sink::{Sink, stdout_sink},
        template::{self, Args},
    },
};

use std::{
    fmt::{self, Write as _},
    io::Write,
    process,
    sync::{
        Mutex, PoisonError, RwLock,
        atomic::{AtomicU8, Ordering},
    },
};

/// Layout of the timestamp that starts every line, e.g. `2024-01-15 10:30:00.123`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Exit status of the process after a FATAL message.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Synchronous, leveled logger writing one line per message to a single sink.
///
/// Every line looks like:
///
/// ```text
/// 2024-01-15 10:30:00.123 [INFO] [main.rs:42 main()] Server started on port 8080
/// ```
///
/// Messages below the threshold are dropped before any formatting, clock read or
/// caller lookup happens. Writes are best effort: sink errors are swallowed so a
/// log call never changes the outcome of the code that made it. Emitting at
/// [`Level::Fatal`] terminates the process with status 1 after the write.
///
/// The logger is `Send + Sync`. The threshold is atomic, and each line is
/// written under the sink lock so concurrent lines never interleave.
pub struct Logger {
    min_level: AtomicU8,
    sink: Mutex<Sink>,
    resolver: RwLock<Box<dyn CallerResolver>>,
}

impl Logger {
    /// Creates a logger. A `None` sink means standard output.
    ///
    /// Callers are resolved with [`BacktraceResolver`].
    #[must_use]
    pub fn new(min_level: Level, sink: Option<Sink>) -> Self {
        Self::with_resolver(min_level, sink, BacktraceResolver)
    }

    /// Creates a logger with a custom caller resolver.
    #[must_use]
    pub fn with_resolver<R>(min_level: Level, sink: Option<Sink>, resolver: R) -> Self
    where
        R: CallerResolver + 'static,
    {
        Self {
            min_level: AtomicU8::new(min_level as u8),
            sink: Mutex::new(sink.unwrap_or_else(stdout_sink)),
            resolver: RwLock::new(Box::new(resolver)),
        }
    }

    /// Builds a logger from a resolved [`LogConfig`], opening its output.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OpenOutput`] if the configured file cannot be opened.
    pub fn from_config(config: &LogConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.level, Some(config.open_sink()?)))
    }

    #[must_use]
    pub fn min_level(&self) -> Level {
        Level::from_ordinal(self.min_level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_min_level(&self, level: Level) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// Replaces the sink. The previous one is dropped untouched; every line is
    /// already flushed when written.
    pub fn set_sink(&self, sink: Sink) {
        *self.sink.lock().unwrap_or_else(PoisonError::into_inner) = sink;
    }

    pub fn set_resolver<R>(&self, resolver: R)
    where
        R: CallerResolver + 'static,
    {
        *self.resolver.write().unwrap_or_else(PoisonError::into_inner) = Box::new(resolver);
    }

    /// Whether a message at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level.is_emittable() && level >= self.min_level()
    }

    #[track_caller]
    pub fn debug(&self, template: &str, args: &Args<'_>) {
        self.emit(Level::Debug, template, args, CallSite::caller());
    }

    #[track_caller]
    pub fn info(&self, template: &str, args: &Args<'_>) {
        self.emit(Level::Info, template, args, CallSite::caller());
    }

    #[track_caller]
    pub fn warn(&self, template: &str, args: &Args<'_>) {
        self.emit(Level::Warn, template, args, CallSite::caller());
    }

    #[track_caller]
    pub fn error(&self, template: &str, args: &Args<'_>) {
        self.emit(Level::Error, template, args, CallSite::caller());
    }

    /// Logs at FATAL, then exits the process with status 1.
    ///
    /// The process exits even when the threshold is [`Level::Off`]; only the
    /// line is suppressed in that case.
    #[track_caller]
    pub fn fatal(&self, template: &str, args: &Args<'_>) -> ! {
        self.emit(Level::Fatal, template, args, CallSite::caller());
        terminate()
    }

    /// Core routine behind the per-level methods.
    ///
    /// The template is rendered with [`template::render_lossy`], so a mismatch
    /// between placeholders and arguments still produces a line.
    pub fn emit(&self, level: Level, template: &str, args: &Args<'_>, site: CallSite) {
        self.dispatch(level, site, || template::render_lossy(template, args));
    }

    /// Same as [`emit`](Self::emit) for pre-checked `format_args!` messages.
    pub fn emit_args(&self, level: Level, args: fmt::Arguments<'_>, site: CallSite) {
        self.dispatch(level, site, || {
            let mut message = String::new();
            if message.write_fmt(args).is_err() {
                message.push_str(" (format error: argument failed to format)");
            }
            message
        });
    }

    /// Flushes the sink, ignoring errors.
    pub fn flush(&self) {
        let _ = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }

    fn dispatch(&self, level: Level, site: CallSite, message: impl FnOnce() -> String) {
        if !self.enabled(level) {
            if level == Level::Fatal {
                terminate();
            }
            return;
        }

        let caller = {
            let resolver = self.resolver.read().unwrap_or_else(PoisonError::into_inner);
            caller::describe(resolver.as_ref(), &site)
        };
        let message = message();

        {
            // Clock is read under the sink lock so lines reach the sink in timestamp order.
            let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
            let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
            let line = format_line(&timestamp, level, &caller, &message);
            let _ = sink.write_all(line.as_bytes());
            let _ = sink.flush();
        }

        if level == Level::Fatal {
            terminate();
        }
    }
}

impl Default for Logger {
    /// INFO threshold, standard output.
    fn default() -> Self {
        Self::new(Level::Info, None)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level())
            .finish_non_exhaustive()
    }
}

/// Composes `<timestamp> [<LEVEL>] [<caller>] <message>\n`.
///
/// Trailing line breaks in `message` are dropped so the line ends with exactly
/// one newline.
#[must_use]
pub fn format_line(timestamp: &str, level: Level, caller: &str, message: &str) -> String {
    let message = message.trim_end_matches(['\n', '\r']);
    format!("{timestamp} [{level}] [{caller}] {message}\n")
}

/// Exits with [`FATAL_EXIT_CODE`].
#[doc(hidden)]
pub fn terminate() -> ! {
    process::exit(FATAL_EXIT_CODE)
}
