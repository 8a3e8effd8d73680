use std::{
    fmt,
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

/// Destination for formatted log lines.
pub type Sink = Box<dyn Write + Send>;

/// The process's standard output as a [`Sink`].
#[must_use]
pub fn stdout_sink() -> Sink {
    Box::new(io::stdout())
}

/// Cloneable in-memory sink.
///
/// Every clone shares the same buffer, so a test (or a UI) can keep one handle
/// while the logger owns another.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written lines, without their trailing newlines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn clear(&self) {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.bytes.lock().map(|b| b.len()).unwrap_or(0))
            .finish()
    }
}

/// Where a configured logger writes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    /// Appended to, created if missing.
    File(PathBuf),
}

impl Output {
    /// `stdout`, `-` and the empty string mean standard output, `stderr` means
    /// standard error, anything else is a file path (`~` is expanded).
    #[must_use]
    pub fn parse(text: &str) -> Output {
        let text = text.trim();
        if text.is_empty() || text == "-" || text.eq_ignore_ascii_case("stdout") {
            Output::Stdout
        } else if text.eq_ignore_ascii_case("stderr") {
            Output::Stderr
        } else {
            Output::File(expand_path(text))
        }
    }

    /// Opens the destination. Files are opened in create + append mode.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(&self) -> io::Result<Sink> {
        match self {
            Output::Stdout => Ok(stdout_sink()),
            Output::Stderr => Ok(Box::new(io::stderr())),
            Output::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Box::new(file))
            }
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::Stderr => f.write_str("stderr"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Expands tilde (`~`) in file paths to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    if path_str.starts_with('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);

        if let Some(mut home_path) = home {
            if path_str == "~" {
                return home_path;
            }
            if let Some(rest) = path_str
                .strip_prefix("~/")
                .or_else(|| path_str.strip_prefix("~\\"))
            {
                home_path.push(rest);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}
