//! Leveled logging macros for [`Logger`](crate::log::logger::Logger).
//!
//! Unlike the per-level methods, the macros check the format string at compile
//! time and record the name of the enclosing function in the caller segment.
//!
//! # Feature Flags
//! Levels are controlled by cargo features:
//! `log-debug`, `log-info`, `log-warn`, `log-error`.
//!
//! If a feature is disabled, the corresponding macro expands to `()`, removing
//! all formatting and allocation overhead at compile time. `logger_fatal!` is
//! never compiled out: it always terminates the process.

// ============================================================================
// 1. GENERIC INTERNAL MACRO (The "Worker")
// ============================================================================

#[macro_export]
macro_rules! logger_log {
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {{
        $logger.emit_args(
            $lvl,
            ::std::format_args!($($arg)*),
            $crate::log::caller::CallSite {
                file: ::std::file!(),
                line: ::std::line!(),
                function: ::std::option::Option::Some($crate::__function_name!()),
            },
        )
    }};
}

// ============================================================================
// 2. LEVEL-SPECIFIC MACROS (Feature Gated)
// ============================================================================

// ---------------------- DEBUG ----------------------
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! logger_debug { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::Level::Debug, $($arg)*) } }

#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! logger_debug {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- INFO ----------------------
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! logger_info { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::Level::Info, $($arg)*) } }

#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! logger_info {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- WARN ----------------------
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! logger_warn { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::Level::Warn, $($arg)*) } }

#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! logger_warn {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- ERROR ----------------------
// Generally always enabled, but consistent structure allows user to disable if really needed.
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! logger_error { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::Level::Error, $($arg)*) } }

#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! logger_error {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- FATAL ----------------------
#[macro_export]
macro_rules! logger_fatal {
    ($logger:expr, $($arg:tt)*) => {{
        $crate::logger_log!($logger, $crate::log::log_level::Level::Fatal, $($arg)*);
        $crate::log::logger::terminate()
    }};
}
