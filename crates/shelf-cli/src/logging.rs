use std::fmt::{self as stdfmt, Write as _};

use nu_ansi_term::Color::{Blue, DarkGray, Magenta, Red, Yellow};
use tracing::{
    field::{Field, Visit},
    Event, Level, Metadata, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

/// Collects the message of an event and, separately, its structured fields.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: String,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// Plain message output. Level tags are shown for everything but INFO, and
/// DEBUG/TRACE events also print their fields.
pub struct ShelfFormatter;

impl<S, N> FormatEvent<S, N> for ShelfFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = *event.metadata().level();
        let tag = match level {
            Level::TRACE => Some(Colored(Magenta, "[TRACE]")),
            Level::DEBUG => Some(Colored(Blue, "[DEBUG]")),
            Level::INFO => None,
            Level::WARN => Some(Colored(Yellow, "[WARN]")),
            Level::ERROR => Some(Colored(Red, "[ERROR]")),
        };
        if let Some(tag) = tag {
            write!(writer, "{tag} ")?;
        }

        write!(writer, "{}", visitor.message.unwrap_or_default())?;

        if level > Level::INFO && !visitor.fields.is_empty() {
            write!(writer, "{}", Colored(DarkGray, visitor.fields))?;
        }

        writeln!(writer)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stream {
    Stdout,
    Stderr,
}

/// Sends INFO to stdout and every other level to stderr. In JSON mode all
/// log lines go to stderr so stdout only carries the command's JSON output.
struct StreamRouter {
    json: bool,
}

impl StreamRouter {
    fn stream_for(&self, meta: &Metadata<'_>) -> Stream {
        if !self.json && *meta.level() == Level::INFO {
            Stream::Stdout
        } else {
            Stream::Stderr
        }
    }
}

/// Buffers one formatted event and prints it with progress bars suspended.
struct LineWriter {
    buffer: Vec<u8>,
    stream: Stream,
}

impl std::io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let output = String::from_utf8_lossy(&self.buffer)
            .trim_end_matches('\n')
            .to_string();
        let stream = self.stream;
        crate::progress::suspend(|| {
            match stream {
                Stream::Stdout => println!("{output}"),
                Stream::Stderr => eprintln!("{output}"),
            }
        });
    }
}

impl<'a> MakeWriter<'a> for StreamRouter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            buffer: Vec::new(),
            stream: if self.json {
                Stream::Stderr
            } else {
                Stream::Stdout
            },
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LineWriter {
            buffer: Vec::new(),
            stream: self.stream_for(meta),
        }
    }
}

fn filter_level(args: &Args) -> Level {
    match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Installs the global subscriber. Only events from the `shelf` crates pass.
pub fn setup_logging(args: &Args) {
    let level = filter_level(args);

    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("shelf={level}"))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(StreamRouter { json: args.json })
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(ShelfFormatter).finish())
    };

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {err}");
    }
}
