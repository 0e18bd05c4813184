use std::{env, fmt, io};

use tracing::{
    dispatcher::{set_default, set_global_default},
    subscriber::DefaultGuard,
    Dispatch, Event, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        format, writer::MakeWriterExt, FmtContext, FormatEvent, FormatFields, FormattedFields,
        MakeWriter,
    },
    prelude::__tracing_subscriber_SubscriberExt,
    registry::LookupSpan,
    EnvFilter,
};

pub use tracing::*;

/// Installs the process wide logger once the configuration is known.
pub fn init_global_default(level: Level) {
    let console_writer = io::stdout.with_max_level(level);
    let dispatch = make_dispatch(level, console_writer);

    if set_global_default(dispatch).is_err() {
        warn!("a global logger is already installed");
    }
}

/// Logger for the current thread, used until [`init_global_default`] runs.
pub fn default(console_level: Level) -> DefaultGuard {
    let console_writer = io::stdout.with_max_level(console_level);
    set_default(&make_dispatch(console_level, console_writer))
}

#[inline]
fn make_dispatch<W: for<'writer> MakeWriter<'writer> + 'static + Send + Sync>(
    level: tracing::Level,
    writer: W,
) -> Dispatch {
    let layer = tracing_subscriber::fmt::layer()
        .event_format(CompactFormatter)
        .with_writer(writer);

    Dispatch::from(
        tracing_subscriber::registry()
            .with(layer)
            .with(make_filter(level)),
    )
}

#[inline]
fn make_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .parse_lossy(directives(level))
}

/// Our own crate logs at `level`, anything in `RUST_LOG` is appended.
#[inline]
fn directives(level: impl ToString) -> String {
    format!(
        "mikrotik_dhcp_dns={},{}",
        level.to_string().to_uppercase(),
        get_env()
    )
}

#[inline]
fn get_env() -> String {
    env::var("RUST_LOG").unwrap_or_default()
}

struct CompactFormatter;

impl<S, N> FormatEvent<S, N> for CompactFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now();
        let now_msecs = now.timestamp_millis() % 1000;
        let date = now.format("%Y-%m-%d %H:%M:%S");

        let metadata = event.metadata();

        if metadata.level() == &tracing::Level::INFO {
            write!(&mut writer, "{}.{:03}:{}", date, now_msecs, metadata.level())?;
        } else {
            write!(
                &mut writer,
                "{}.{:03}:{}:{}",
                date,
                now_msecs,
                metadata.level(),
                metadata.target()
            )?;
            if let Some(line) = metadata.line() {
                write!(&mut writer, ":{}", line)?;
            }
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, ":{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
            }
        }

        write!(writer, ": ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
