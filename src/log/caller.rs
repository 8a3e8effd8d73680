use std::{fmt, panic::Location};

/// Caller segment used when the resolver cannot say where a call came from.
pub const UNKNOWN_CALLER: &str = "???:0";

/// Function segment used when a call site carries no function name.
pub const UNKNOWN_FUNCTION: &str = "???";

/// Where a log call was made, as captured by the public entry point.
///
/// Per-level methods capture file and line through `#[track_caller]`; the
/// `logger_*!` macros additionally record the enclosing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub function: Option<&'static str>,
}

impl CallSite {
    /// The call site of the caller of the current `#[track_caller]` chain.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    #[must_use]
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            function: None,
        }
    }

    #[must_use]
    pub const fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }
}

/// Resolved caller details, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfo {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl fmt::Display for CallerInfo {
    /// `<file>:<line> <function>()`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}()", self.file, self.line, self.function)
    }
}

/// Turns a captured [`CallSite`] into printable [`CallerInfo`].
///
/// Returning `None` means "unavailable"; the logger then prints [`UNKNOWN_CALLER`].
pub trait CallerResolver: Send + Sync {
    fn resolve(&self, site: &CallSite) -> Option<CallerInfo>;
}

/// File basename, line, and the function recorded in the call site, if any.
/// Never walks the stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationResolver;

impl CallerResolver for LocationResolver {
    fn resolve(&self, site: &CallSite) -> Option<CallerInfo> {
        if site.file.is_empty() {
            return None;
        }
        Some(CallerInfo {
            file: basename(site.file).to_owned(),
            line: site.line,
            function: site
                .function
                .map_or(UNKNOWN_FUNCTION, bare_function_name)
                .to_owned(),
        })
    }
}

/// Symbols under this prefix belong to the logger itself and are skipped while
/// walking the stack.
const INTERNAL_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::log::");

/// Default resolver: like [`LocationResolver`], but when the call site carries
/// no function name it walks the stack and takes the first frame above the
/// logger's own frames.
///
/// File and line always come from the captured [`CallSite`]. If no frame can be
/// named, the caller is reported as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceResolver;

impl CallerResolver for BacktraceResolver {
    fn resolve(&self, site: &CallSite) -> Option<CallerInfo> {
        if site.function.is_some() {
            return LocationResolver.resolve(site);
        }
        if site.file.is_empty() {
            return None;
        }
        let function = calling_function()?;
        Some(CallerInfo {
            file: basename(site.file).to_owned(),
            line: site.line,
            function: bare_function_name(&function).to_owned(),
        })
    }
}

/// Demangled name of the first frame above the logger's internals.
fn calling_function() -> Option<String> {
    let mut seen_internal = false;
    let mut found: Option<String> = None;

    backtrace::trace(|frame| {
        // Inlined frames come back as several symbols, innermost first.
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let Some(name) = symbol.name() else {
                return;
            };
            let name = format!("{name:#}");
            if is_internal(&name) {
                seen_internal = true;
            } else if seen_internal {
                found = Some(name);
            }
        });
        found.is_none()
    });
    found
}

fn is_internal(symbol: &str) -> bool {
    let symbol = symbol.trim_start_matches('<');
    // The `log` facade sits between a `log::info!` call and `Log::log`.
    (symbol.starts_with(INTERNAL_PREFIX) && !symbol.contains("::tests::"))
        || symbol.starts_with("log::")
}

/// Caller segment for a log line: resolved info or [`UNKNOWN_CALLER`].
pub(crate) fn describe(resolver: &dyn CallerResolver, site: &CallSite) -> String {
    resolver
        .resolve(site)
        .map_or_else(|| UNKNOWN_CALLER.to_owned(), |info| info.to_string())
}

fn basename(file: &str) -> &str {
    // Paths recorded by rustc may use either separator regardless of host.
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

/// Strips module path and closure suffixes: `app::server::run::{{closure}}` -> `run`.
///
/// Both closure spellings are handled (`{{closure}}` and `{closure#0}`).
pub fn bare_function_name(path: &str) -> &str {
    path.rsplit("::")
        .find(|segment| !segment.starts_with('{'))
        .unwrap_or(path)
}

/// Fully qualified name of the enclosing function, for use by the logging macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __f() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__f);
        name.strip_suffix("::__f").unwrap_or(name)
    }};
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    struct Unavailable;

    impl CallerResolver for Unavailable {
        fn resolve(&self, _site: &CallSite) -> Option<CallerInfo> {
            None
        }
    }

    fn site(file: &'static str, function: Option<&'static str>) -> CallSite {
        CallSite {
            file,
            line: 42,
            function,
        }
    }

    #[test]
    fn resolves_basename_and_bare_function() {
        let info = LocationResolver
            .resolve(&site("src/bin/server.rs", Some("server::main")))
            .unwrap();
        assert_eq!(info.to_string(), "server.rs:42 main()");
    }

    #[test]
    fn windows_separators_are_stripped() {
        let info = LocationResolver
            .resolve(&site("src\\net\\conn.rs", None))
            .unwrap();
        assert_eq!(info.file, "conn.rs");
        assert_eq!(info.to_string(), "conn.rs:42 ???()");
    }

    #[test]
    fn empty_file_is_unavailable() {
        assert_eq!(LocationResolver.resolve(&site("", None)), None);
        assert_eq!(describe(&LocationResolver, &site("", None)), "???:0");
    }

    #[test]
    fn unavailable_resolver_yields_placeholder() {
        assert_eq!(describe(&Unavailable, &site("main.rs", None)), UNKNOWN_CALLER);
    }

    #[test]
    fn closures_are_unwrapped() {
        assert_eq!(bare_function_name("a::b::run::{{closure}}::{{closure}}"), "run");
        assert_eq!(bare_function_name("a::b::run::{closure#0}"), "run");
        assert_eq!(bare_function_name("main"), "main");
    }

    #[test]
    fn track_caller_points_here() {
        let here = line!() + 1;
        let site = CallSite::caller();
        assert_eq!(site.line, here);
        assert!(site.file.ends_with("caller.rs"));
    }

    #[test]
    fn internal_symbols_are_recognized() {
        assert!(is_internal("rustylog::log::logger::Logger::info"));
        assert!(is_internal(
            "<rustylog::log::caller::BacktraceResolver as rustylog::log::caller::CallerResolver>::resolve"
        ));
        assert!(is_internal("log::__private_api::log_impl"));
        assert!(!is_internal("rustylog::log::logger::tests::some_test"));
        assert!(!is_internal("server::handle_request"));
    }

    #[test]
    fn explicit_function_skips_the_stack_walk() {
        let info = BacktraceResolver
            .resolve(&site("src/main.rs", Some("app::main")))
            .unwrap();
        assert_eq!(info.to_string(), "main.rs:42 main()");
        assert_eq!(BacktraceResolver.resolve(&site("", None)), None);
    }

    #[test]
    fn macro_names_enclosing_function() {
        let name = crate::__function_name!();
        assert_eq!(bare_function_name(name), "macro_names_enclosing_function");
    }
}
