use crate::log::{
    log_level::Level,
    log_sink::{Output, Sink},
};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Section of the config file holding logger settings.
pub const LOGGING_SECTION: &str = "Logging";

/// Environment variable overriding the threshold.
pub const LEVEL_ENV: &str = "RUSTYLOG_LEVEL";

/// Environment variable overriding the output.
pub const OUTPUT_ENV: &str = "RUSTYLOG_OUTPUT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot open log output {output}: {source}")]
    OpenOutput {
        output: Output,
        #[source]
        source: io::Error,
    },
}

/// INI-style key/value file: `# comments`, `[sections]`, `key = value`.
#[derive(Debug, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parses config text. Lines that are neither sections nor assignments are skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    /// Section value, then global value, then `default`. Empty values are skipped.
    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }
}

/// Resolved logger settings: threshold and output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub level: Level,
    pub output: Output,
}

impl LogConfig {
    /// Reads `level` and `output` from the `[Logging]` section (or globals).
    /// Level names are parsed leniently: unknown names mean INFO.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let level = config.get_non_empty_or_default(LOGGING_SECTION, "level", "INFO");
        let output = config.get_non_empty_or_default(LOGGING_SECTION, "output", "stdout");
        Self {
            level: Level::parse(level),
            output: Output::parse(output),
        }
    }

    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads a config file, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::from_config(&Config::load(path)?).with_env_overrides())
    }

    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overrides fields from `lookup(LEVEL_ENV)` and `lookup(OUTPUT_ENV)`;
    /// missing or blank values leave the field untouched.
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(level) = non_blank(LEVEL_ENV) {
            self.level = Level::parse(&level);
        }
        if let Some(output) = non_blank(OUTPUT_ENV) {
            self.output = Output::parse(&output);
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::OpenOutput`] if the output file cannot be opened.
    pub fn open_sink(&self) -> Result<Sink, ConfigError> {
        self.output.open().map_err(|source| ConfigError::OpenOutput {
            output: self.output.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# service settings
level = warn

[Logging]
output = "/tmp/app.log"

[Other]
level = debug
"#;

    #[test]
    fn parses_sections_and_globals() {
        let config = Config::parse(SAMPLE);
        assert_eq!(config.get_global("level"), Some("warn"));
        assert_eq!(config.get("Logging", "output"), Some("/tmp/app.log"));
        assert_eq!(config.get("Other", "level"), Some("debug"));
        assert_eq!(config.get("Logging", "missing"), None);
    }

    #[test]
    fn section_falls_back_to_globals() {
        let log = LogConfig::from_config(&Config::parse(SAMPLE));
        assert_eq!(log.level, Level::Warn);
        assert_eq!(log.output, Output::File(PathBuf::from("/tmp/app.log")));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let log = LogConfig::from_config(&Config::empty());
        assert_eq!(log, LogConfig::default());
        assert_eq!(log.level, Level::Info);
        assert_eq!(log.output, Output::Stdout);
    }

    #[test]
    fn unknown_level_is_info() {
        let log = LogConfig::from_config(&Config::parse("[Logging]\nlevel = loud\n"));
        assert_eq!(log.level, Level::Info);
    }

    #[test]
    fn overrides_beat_file_values() {
        let log = LogConfig::from_config(&Config::parse(SAMPLE)).apply_overrides(|key| match key {
            LEVEL_ENV => Some("error".into()),
            OUTPUT_ENV => Some("stderr".into()),
            _ => None,
        });
        assert_eq!(log.level, Level::Error);
        assert_eq!(log.output, Output::Stderr);
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let log = LogConfig::default().apply_overrides(|_| Some("  ".into()));
        assert_eq!(log, LogConfig::default());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load("/definitely/not/here.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.conf"));
    }

    #[test]
    fn unopenable_output_is_reported() {
        let log = LogConfig {
            level: Level::Info,
            output: Output::File(PathBuf::from("/definitely/not/here/app.log")),
        };
        let err = log.open_sink().err().unwrap();
        assert!(matches!(err, ConfigError::OpenOutput { .. }));
    }
}
