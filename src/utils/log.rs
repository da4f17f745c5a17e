use std::fs::File;
use std::io::{Write, sink, stderr};
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

use chrono::Local;
use miette::{Context, IntoDiagnostic};
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug};
use tracing_appender::non_blocking;
use tracing_subscriber::reload;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, reload::Handle, util::SubscriberInitExt,
};

pub trait LogHandle: Send + Sync {
    fn set_filter(&self, new_filter: EnvFilter) -> miette::Result<()>;
}

impl<S> LogHandle for Handle<EnvFilter, S>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    fn set_filter(&self, new_filter: EnvFilter) -> miette::Result<()> {
        self.modify(|current| *current = new_filter)
            .into_diagnostic()
    }
}

pub struct LogHandles {
    console_handle: Mutex<Box<dyn LogHandle>>,
    file_handle: Mutex<Box<dyn LogHandle>>,
    log_file: Option<PathBuf>,
}

fn log_dir() -> PathBuf {
    std::env::temp_dir().join("castellan_logs")
}

/// Opens the timestamped log file, falling back to a sink when that fails
fn open_log_file() -> (Box<dyn Write + Send>, Option<PathBuf>) {
    let dir = log_dir();
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("castellan_{timestamp}.log"));

    let file = std::fs::create_dir_all(&dir).and_then(|_| File::create(&path));
    match file {
        Ok(file) => (Box::new(file), Some(path)),
        Err(e) => {
            eprintln!("Failed to create log file {}: {e}", path.display());
            (Box::new(sink()), None)
        }
    }
}

static LOG_HANDLES: LazyLock<LogHandles> = LazyLock::new(|| {
    #[cfg(feature = "dev-tools")]
    color_backtrace::install();

    // Console Layer with its own reloadable filter
    let console_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let (console_filter, console_handle) = reload::Layer::new(console_filter);
    let console_layer = fmt::layer()
        .without_time()
        .with_writer(stderr)
        .with_filter(console_filter);

    // File Layer with its own reloadable filter (initially off)
    let file_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy();
    let (file_filter, file_handle) = reload::Layer::new(file_filter);

    let (log_writer, log_file) = open_log_file();
    let (non_blocking_writer, guard) = non_blocking(log_writer);
    std::mem::forget(guard); // Keep the guard alive.

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false) // No colors in file
        .with_filter(file_filter);

    // Tests may race to install a subscriber; the first one wins
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();

    LogHandles {
        console_handle: Mutex::new(Box::new(console_handle)),
        file_handle: Mutex::new(Box::new(file_handle)),
        log_file,
    }
});

fn with_handle(
    handle: &Mutex<Box<dyn LogHandle>>,
    new_filter: EnvFilter,
) -> miette::Result<()> {
    handle
        .lock()
        .map_err(|_| miette::miette!("Log handle lock poisoned"))?
        .set_filter(new_filter)
}

pub fn set_log_level(level: Level) -> miette::Result<()> {
    let new_filter = EnvFilter::new(level.to_string());

    with_handle(&LOG_HANDLES.console_handle, new_filter)
        .with_context(|| format!("Failed to modify log filter to level: {level}"))
}

pub fn toggle_file_logging(enable: bool) -> miette::Result<()> {
    let new_filter = if enable {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("off")
    };

    with_handle(&LOG_HANDLES.file_handle, new_filter).context("Failed to modify log filter")?;
    if enable {
        match &LOG_HANDLES.log_file {
            Some(path) => debug!("File logging to {}", path.display()),
            None => debug!("File logging requested but no log file is open"),
        }
    }
    Ok(())
}

/// Initialize tracing and backtrace
pub fn init() {
    LazyLock::force(&LOG_HANDLES);
    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("APP_VERSION"));
}
