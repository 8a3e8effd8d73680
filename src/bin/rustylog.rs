//! Command-line front end: logs a single message through a configured logger.

use std::{env, process};

use rustylog::{
    config::LogConfig,
    log::{Level, Logger},
};

const USAGE_EXIT_CODE: i32 = 2;

fn usage(program: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("  {program} [--level THRESHOLD] [--config PATH] LEVEL MESSAGE...");
    eprintln!();
    eprintln!("  LEVEL      one of debug, info, warn, error, fatal");
    eprintln!("  THRESHOLD  one of debug, info, warn, error, fatal, off");
    eprintln!();
    eprintln!("Without --config, RUSTYLOG_LEVEL and RUSTYLOG_OUTPUT are read from the environment.");
    eprintln!("Logging at fatal exits with status 1.");
    process::exit(USAGE_EXIT_CODE);
}

fn main() {
    // --- Parse CLI args ----------------------------------------------------
    //
    //   rustylog info "Server started on port 8080"
    //   rustylog --level error warn "suppressed"
    //   rustylog --config app.conf fatal "cannot bind"
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "rustylog".to_owned());

    let mut threshold: Option<Level> = None;
    let mut config_path: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--level" => match args.next() {
                Some(value) => threshold = Some(Level::parse(&value)),
                None => usage(&program),
            },
            "--config" => match args.next() {
                Some(value) => config_path = Some(value),
                None => usage(&program),
            },
            "-h" | "--help" => usage(&program),
            _ => positional.push(arg),
        }
    }

    let Some((level, words)) = positional.split_first() else {
        usage(&program);
    };
    let level = Level::parse(level);
    if !level.is_emittable() {
        usage(&program);
    }
    let message = words.join(" ");

    // --- Build logger ------------------------------------------------------
    let config = match config_path {
        Some(path) => LogConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {e}");
            process::exit(USAGE_EXIT_CODE);
        }),
        None => LogConfig::from_env(),
    };
    let config = LogConfig {
        level: threshold.unwrap_or(config.level),
        ..config
    };

    let logger = Logger::from_config(&config).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(USAGE_EXIT_CODE);
    });

    // --- Emit --------------------------------------------------------------
    match level {
        Level::Debug => logger.debug("{}", &[&message]),
        Level::Info => logger.info("{}", &[&message]),
        Level::Warn => logger.warn("{}", &[&message]),
        Level::Error => logger.error("{}", &[&message]),
        Level::Fatal => logger.fatal("{}", &[&message]),
        Level::Off => usage(&program),
    }
}
