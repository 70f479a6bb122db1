//! Console and file layers, and the one-time subscriber initialisation.
use std::fmt::{self, Write as _};
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::utils::{color_enabled, log_file_path, timestamp};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotsync::stage";

/// Environment variable holding an optional console filter directive,
/// e.g. `DOTSYNC_LOG=dotsync::sync=debug`.
const FILTER_ENV: &str = "DOTSYNC_LOG";

/// Renders an event's `message` followed by its other fields as
/// ` key=value`.
#[derive(Default)]
struct EventText {
    message: String,
    fields: String,
}

impl EventText {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut text = Self::default();
        event.record(&mut text);
        text
    }
}

impl fmt::Display for EventText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.message, self.fields)
    }
}

impl Visit for EventText {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Appends every event to `<cache dir>/<command>.log`, one timestamped line
/// per event.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create the cache directory, truncate the log file for `command` and
    /// write the run header.
    ///
    /// Returns `None` if the file cannot be created; file logging is then
    /// skipped for the run.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command);
        fs::create_dir_all(path.parent()?).ok()?;
        let version =
            option_env!("DOTSYNC_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!("# dotsync {version} {command} started {}\n", timestamp());
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

/// File form of one event: `<timestamp> <LEVEL> <text>`, with stage headers
/// written as `<timestamp> ==> <text>`.
fn file_line(ts: &str, level: Level, target: &str, text: &EventText) -> String {
    if level == Level::INFO && target == STAGE_TARGET {
        format!("{ts} ==> {text}")
    } else {
        format!("{ts} {level:<5} {text}")
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let line = file_line(
            &timestamp(),
            *metadata.level(),
            metadata.target(),
            &EventText::of(event),
        );
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console output: coloured `ERROR`/`WARN` tags, bold `==>` stage headers,
/// indented info lines and dimmed debug lines.
struct ConsoleFormat {
    color: bool,
}

impl ConsoleFormat {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let text = EventText::of(event).to_string();
        match *metadata.level() {
            Level::ERROR => writeln!(writer, "{} {text}", self.paint("31", "ERROR")),
            Level::WARN => writeln!(writer, "{}  {text}", self.paint("33", "WARN")),
            Level::INFO if metadata.target() == STAGE_TARGET => writeln!(
                writer,
                "{} {}",
                self.paint("1;34", "==>"),
                self.paint("1", &text)
            ),
            Level::INFO => writeln!(writer, "  {text}"),
            _ => writeln!(writer, "  {}", self.paint("2", &text)),
        }
    }
}

/// Initialise the global [`tracing`] subscriber for a run of `command`.
///
/// The console shows `info` and above (`debug` with `verbose`) unless
/// `DOTSYNC_LOG` holds a filter directive. Warnings and errors go to stderr,
/// the rest to stdout. Every event at `debug` and above also goes to
/// `$XDG_CACHE_HOME/dotsync/<command>.log`.
///
/// Call once, before anything is logged.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.into())
        .with_env_var(FILTER_ENV)
        .from_env_lossy();

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormat {
            color: color_enabled(),
        })
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(message: &str, fields: &str) -> EventText {
        EventText {
            message: message.to_string(),
            fields: fields.to_string(),
        }
    }

    #[test]
    fn stage_lines_use_arrow() {
        let line = file_line("T", Level::INFO, STAGE_TARGET, &text("Syncing", ""));
        assert_eq!(line, "T ==> Syncing");
    }

    #[test]
    fn other_lines_carry_padded_level() {
        let line = file_line("T", Level::INFO, "dotsync::sync", &text("pulled", ""));
        assert_eq!(line, "T INFO  pulled");
        let line = file_line("T", Level::ERROR, "dotsync", &text("broken", ""));
        assert_eq!(line, "T ERROR broken");
    }

    #[test]
    fn fields_follow_message() {
        let line = file_line(
            "T",
            Level::DEBUG,
            "dotsync::exec",
            &text("$ git fetch", " dir=/sync"),
        );
        assert_eq!(line, "T DEBUG $ git fetch dir=/sync");
    }

    #[test]
    fn paint_respects_color_flag() {
        assert_eq!(ConsoleFormat { color: false }.paint("31", "ERROR"), "ERROR");
        assert_eq!(
            ConsoleFormat { color: true }.paint("31", "ERROR"),
            "\x1b[31mERROR\x1b[0m"
        );
    }
}
