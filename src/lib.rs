//! RustyLog is a minimal leveled logger.
//!
//! Each call is filtered against a threshold, stamped with the local time and
//! the caller's location, and written as a single line to one sink:
//!
//! ```text
//! 2024-01-15 10:30:00.123 [INFO] [main.rs:42 main()] Server started on port 8080
//! ```
//!
//! Logging at FATAL writes the line and then exits the process with status 1.
//!
//! ```no_run
//! use rustylog::log::{Level, Logger};
//!
//! let logger = Logger::new(Level::Warn, None);
//! logger.info("not shown", &[]);
//! logger.warn("disk at {}%", &[&91]);
//! rustylog::logger_error!(logger, "request {} failed", 17);
//! ```

/// Config file loading and environment overrides for the logger.
pub mod config;
/// Levels, sinks, caller resolution and the logger itself.
pub mod log;
