pub mod bridge;
pub mod caller;
pub mod log_level;
pub mod log_macros;
pub mod log_sink;
pub mod logger;
pub mod template;

pub use caller::{BacktraceResolver, CallSite, CallerInfo, CallerResolver, LocationResolver};
pub use log_level::Level;
pub use log_sink::{Output, SharedBuffer, Sink};
pub use logger::Logger;
