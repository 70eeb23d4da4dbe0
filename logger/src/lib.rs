use std::{
    fs::File,
    io::{self, Write},
    sync::Mutex,
    time::Instant,
};

use chrono::Utc;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<Logger> = OnceCell::new();

struct LoggerImpl {
    sink: Box<dyn Write + Send>,
    start_instant: Instant,
}

impl LoggerImpl {
    fn new(kind: LogKind) -> Self {
        let start_instant = Instant::now();
        match kind {
            LogKind::Stdout => Self {
                sink: Box::new(io::stdout()),
                start_instant,
            },
            LogKind::File => {
                let now = Utc::now();
                let filename = format!("emu-{}.log", now.timestamp());
                let path = std::env::temp_dir().join(filename);
                Self {
                    sink: Box::new(File::create(path).unwrap()),
                    start_instant,
                }
            }
        }
    }

    fn log<T>(&mut self, level: &str, data: T)
    where
        T: std::fmt::Display,
    {
        let now = self.start_instant.elapsed();
        let seconds = now.as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds / 60) % 60;
        let seconds = seconds % 60;
        let milliseconds = now.subsec_millis();

        // A failing sink must not take the emulator down with it.
        let _ = writeln!(
            self.sink,
            "[{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}] {level} {data}"
        );
    }
}

/// `LogKind` selects the sink: `stdout` or a file in the temp directory.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum LogKind {
    /// Log to the console, the default choice.
    Stdout,

    /// Log to /tmp/emu-<timestamp>.log
    File,
}

struct Logger {
    inner_impl: Mutex<LoggerImpl>,
}

impl Logger {
    fn new(kind: LogKind) -> Self {
        Self {
            inner_impl: Mutex::new(LoggerImpl::new(kind)),
        }
    }

    fn log<T>(&self, level: &str, data: T)
    where
        T: std::fmt::Display,
    {
        if let Ok(ref mut inner) = self.inner_impl.lock() {
            inner.log(level, data);
        }
    }
}

pub fn init_logger(kind: LogKind) {
    LOGGER.set(Logger::new(kind)).ok();
}

/// Debug-level line; dropped entirely when the logger was never initialized.
pub fn debug<T>(data: T)
where
    T: std::fmt::Display,
{
    LOGGER.get().map_or((), |logger| logger.log("DEBUG", data));
}

/// Warning-level line; dropped entirely when the logger was never initialized.
pub fn warn<T>(data: T)
where
    T: std::fmt::Display,
{
    LOGGER.get().map_or((), |logger| logger.log("WARN", data));
}
