use rustylog::log::{Level, Logger, SharedBuffer};

// Installing a `log` backend is once per process, so this file holds a single test.
#[test]
fn facade_macros_route_through_the_logger() {
    let buf = SharedBuffer::new();
    let logger = Logger::new(Level::Debug, Some(Box::new(buf.clone())))
        .install()
        .unwrap();

    log::trace!("tracing {}", 1);
    log::info!("connected to {}", "db");
    assert_eq!(buf.lines().len(), 2);
    assert!(buf.lines()[0].contains(" [DEBUG] [log_bridge.rs:"));
    assert!(buf.contents().ends_with("] connected to db\n"));

    logger.set_min_level(Level::Warn);
    log::info!("quiet");
    log::error!("loud");
    assert_eq!(buf.lines().len(), 3);
    assert!(buf.lines()[2].contains(" [ERROR] [log_bridge.rs:"));
    assert!(buf.contents().ends_with("] loud\n"));

    assert!(Logger::default().install().is_err());
}
