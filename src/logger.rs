//! Logging setup.
//!
//! Plain records go through the `log` facade (see the `log_*!` macros), span
//! timings from the pipeline go through `tracing`. Both end up in the same log
//! file. Nothing is echoed to the console, which carries command output.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::LazyLock;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
};

/// Targets from the HTTP stack that only pass in verbose mode
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "want", "mio"];

#[derive(Default)]
struct LogState {
    enabled: bool,
    verbose: bool,
    file: Option<File>,
}

static STATE: LazyLock<Mutex<LogState>> = LazyLock::new(|| Mutex::new(LogState::default()));

struct OrmForgeLogger;

static LOGGER: OrmForgeLogger = OrmForgeLogger;

/// Routes tracing output into the log file
#[derive(Clone)]
struct FileWriter;

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = STATE.lock().file.as_mut() {
            let _ = file.write_all(buf);
            let _ = file.flush();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = STATE.lock().file.as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter
    }
}

/// Whether a record from `target` should reach the log file
fn admits(target: &str) -> bool {
    let state = STATE.lock();
    if !state.enabled {
        return false;
    }

    target.starts_with("orm_forge")
        || state.verbose
        || !NOISY_TARGETS.iter().any(|noisy| target.starts_with(noisy))
}

impl log::Log for OrmForgeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug && admits(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!(
            "{} {} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        if let Some(file) = STATE.lock().file.as_mut() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }

    fn flush(&self) {}
}

/// Install the `log` and `tracing` backends. Safe to call more than once.
///
/// Both backends consult the same switches, so `disable_logging` and
/// `set_verbose_logging` take effect immediately. `RUST_LOG`, when set,
/// narrows the tracing side further.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::OnceLock;
    static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

    let result = INIT_RESULT.get_or_init(|| {
        if std::env::var("ORM_FORGE_VERBOSE").is_ok()
            || std::env::var("RUST_LOG").is_ok_and(|v| v.contains("debug") || v.contains("trace"))
        {
            set_verbose_logging(true);
        }

        let env_filter = EnvFilter::try_from_default_env().ok();

        let fmt_layer = fmt::Layer::new()
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(FileWriter)
            .with_filter(filter_fn(|metadata| {
                *metadata.level() <= tracing::Level::DEBUG && admits(metadata.target())
            }));

        // `set_global_default` leaves the `log` facade alone, so records from
        // `log` keep flowing through `OrmForgeLogger` instead of a LogTracer.
        let subscriber = Registry::default().with(env_filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| format!("Failed to initialize tracing: {e}"))?;
        log::set_logger(&LOGGER)
            .map(|()| log::set_max_level(LevelFilter::Debug))
            .map_err(|e| format!("Failed to initialize log facade: {e}"))
    });

    result.clone().map_err(Into::into)
}

pub fn enable_logging() {
    STATE.lock().enabled = true;
}

pub fn disable_logging() {
    STATE.lock().enabled = false;
}

pub fn set_verbose_logging(enabled: bool) {
    STATE.lock().verbose = enabled;
}

pub fn set_log_file(file_path: &str) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;
    STATE.lock().file = Some(file);
    Ok(())
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}
