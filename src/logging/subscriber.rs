//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::{Event, Level, Metadata};

use super::STAGE_TARGET;
use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Environment variable overriding the console filter (`EnvFilter` syntax).
const LOG_ENV: &str = "MODMAN_LOG";

/// How an event is rendered, shared by the console and the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match *metadata.level() {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO if metadata.target() == STAGE_TARGET => Self::Stage,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// The `message` field of an event.
fn message(event: &Event<'_>) -> String {
    #[derive(Default)]
    struct Visitor(String);

    impl tracing::field::Visit for Visitor {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut visitor = Visitor::default();
    event.record(&mut visitor);
    visitor.0
}

/// A [`tracing_subscriber::Layer`] appending every event to the command's
/// log file, timestamped and without colour codes.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command` and write a run header.
    ///
    /// Returns `None` if the cache directory or file cannot be created; the
    /// run then logs to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command);
        fs::create_dir_all(path.parent()?).ok()?;
        let mut file = fs::File::create(&path).ok()?;
        let version =
            option_env!("MODMAN_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let cwd = std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        writeln!(
            file,
            "# modman {version} {command}\n# started {}\n# cwd {cwd}",
            format_utc_datetime()
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let msg = strip_ansi(&message(event));
        let tag = match Kind::of(event.metadata()) {
            Kind::Stage => "==> ",
            Kind::Error => "    [error] ",
            Kind::Warn => "    [warn] ",
            Kind::Info => "    ",
            Kind::Debug => "    [debug] ",
        };
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{}] {tag}{msg}", format_utc_time()).ok();
        }
    }
}

/// Console formatter: `==>` stage headers, coloured level tags for warnings
/// and errors, indented plain messages otherwise.
struct ModmanFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ModmanFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let msg = message(event);
        match Kind::of(event.metadata()) {
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::Error => writeln!(writer, "\x1b[31merror:\x1b[0m {msg}"),
            Kind::Warn => writeln!(writer, "\x1b[33mwarning:\x1b[0m {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console shows INFO and above (DEBUG with `verbose`), unless
/// `MODMAN_LOG` holds a filter directive.  Warnings and errors go to stderr.
/// The file layer records every event at DEBUG.  Call once at startup.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let console_layer = fmt::layer()
        .event_format(ModmanFormatter)
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

