use std::error::Error;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use error_common::{custom_data_fields, error_chain};
use serde_json::Value;
use tracing_appender::rolling::{Rotation, RollingFileAppender};

use crate::config::Configuration;
use crate::console::ConsoleWriter;
use crate::entry::Entry;
use crate::error::{LogError, Result};
use crate::fields;
use crate::level::Level;
use crate::monitor::{ErrorMonitor, RollbarMonitor};
use crate::redactor::FieldMasker;
use crate::subscriber::current_span_ids;
use crate::version::git_version;
use crate::writer::{ClosableWriter, Event, EventWriter, MultiWriter, SharedWriter};
use crate::xml_redactor::XmlFieldMasker;

/// Payload of the panic raised by [`Logger::panic`], so a panic hook can
/// tell an already logged panic apart from a fresh one.
#[derive(Debug, Clone)]
pub struct LoggedPanic(pub String);

impl fmt::Display for LoggedPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured JSON logger.
///
/// Clones share the writer chain and the error monitor. Every record is
/// written with a single write to the chain, so records from concurrent
/// clones never interleave.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    level: Level,
    sink: SharedWriter,
    context: Arc<Event>,
    monitor: Option<Arc<dyn ErrorMonitor>>,
}

impl Logger {
    /// Build a logger writing through the chain described by `cfg`. The
    /// returned [`Closer`] releases the log file and the error monitor.
    ///
    /// # Errors
    ///
    /// Fails when the log file cannot be opened or the error monitor cannot
    /// be started.
    pub fn new(name: &str, cfg: &Configuration) -> Result<(Self, Closer)> {
        let (writer, mut closer) = configure_writer(cfg)?;
        let mut logger = Self::with_shared_writer(name, cfg.level(), writer);

        if !cfg.rollbar_token.is_empty() {
            let monitor: Arc<dyn ErrorMonitor> = Arc::new(RollbarMonitor::new(&cfg.rollbar_token, &cfg.environment)?);
            let closing = Arc::clone(&monitor);
            closer.push(move || closing.close());
            logger.monitor = Some(monitor);
        }

        Ok((logger, closer))
    }

    pub fn with_writer<W: Write + Send + 'static>(name: &str, level: Level, writer: W) -> Self {
        Self::with_shared_writer(name, level, SharedWriter::new(writer))
    }

    pub fn with_shared_writer(name: &str, level: Level, sink: SharedWriter) -> Self {
        Self {
            name: Arc::from(name),
            level,
            sink,
            context: Arc::new(Event::new()),
            monitor: None,
        }
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<dyn ErrorMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Handle to the writer chain, for sharing it with a `tracing` layer.
    pub fn writer(&self) -> SharedWriter {
        self.sink.clone()
    }

    pub fn context(&self) -> &Event {
        &self.context
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Child logger sharing this logger's sink and fields.
    #[must_use]
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Child logger that adds `key` to every record.
    #[must_use]
    pub fn with_field<K: Into<String>, V: Into<Value>>(&self, key: K, value: V) -> Self {
        let mut child = self.clone();
        Arc::make_mut(&mut child.context).insert(key.into(), value.into());
        child
    }

    /// Child logger that adds `fields` to every record.
    #[must_use]
    pub fn with_fields<I: IntoIterator<Item = (String, Value)>>(&self, fields: I) -> Self {
        let mut child = self.clone();
        Arc::make_mut(&mut child.context).extend(fields);
        child
    }

    pub fn entry(&self) -> Entry {
        Entry::new(self.clone())
    }

    #[track_caller]
    pub fn trace(&self, msg: &str) {
        self.log_message(Level::Trace, msg, Event::new(), Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, msg: &str) {
        self.log_message(Level::Debug, msg, Event::new(), Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str) {
        self.log_message(Level::Info, msg, Event::new(), Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, err: &(dyn Error + 'static)) {
        self.log_error(Level::Warn, err, Event::new(), Location::caller());
    }

    #[track_caller]
    pub fn error(&self, err: &(dyn Error + 'static)) {
        self.log_error(Level::Error, err, Event::new(), Location::caller());
    }

    /// Log `err`, report it and exit with status 1.
    #[track_caller]
    pub fn fatal(&self, err: &(dyn Error + 'static)) -> ! {
        self.fatal_with(err, Event::new(), Location::caller())
    }

    /// Log `err`, report it and panic with a [`LoggedPanic`] payload.
    #[track_caller]
    pub fn panic(&self, err: &(dyn Error + 'static)) -> ! {
        self.panic_with(err, Event::new(), Location::caller())
    }

    pub(crate) fn log_message(&self, level: Level, msg: &str, extra: Event, caller: &Location<'_>) {
        if !self.enabled(level) {
            return;
        }

        let mut record = self.record(level, caller, extra);
        record.insert(fields::MSG.to_string(), Value::String(msg.to_string()));
        self.write(&record);
    }

    /// Log `err` with the custom data carried by its chain. Explicit fields
    /// win over custom data.
    pub(crate) fn log_error(&self, level: Level, err: &(dyn Error + 'static), extra: Event, caller: &Location<'_>) {
        let extra = custom_data_fields(err, extra);

        if self.enabled(level) {
            let mut record = self.record(level, caller, extra.clone());
            record.insert(fields::ERROR.to_string(), Value::String(error_chain(err)));
            self.write(&record);
        }

        if level >= Level::Error {
            self.notify(level, err, extra);
        }
    }

    pub(crate) fn fatal_with(&self, err: &(dyn Error + 'static), extra: Event, caller: &Location<'_>) -> ! {
        self.log_error(Level::Fatal, err, extra, caller);
        if let Some(monitor) = &self.monitor {
            monitor.close();
        }

        std::process::exit(1)
    }

    #[allow(clippy::panic)]
    pub(crate) fn panic_with(&self, err: &(dyn Error + 'static), extra: Event, caller: &Location<'_>) -> ! {
        self.log_error(Level::Panic, err, extra, caller);
        std::panic::panic_any(LoggedPanic(error_chain(err)))
    }

    fn notify(&self, level: Level, err: &(dyn Error + 'static), mut extra: Event) {
        let Some(monitor) = &self.monitor else {
            return;
        };

        extra.remove(fields::REQUEST_HEADERS);
        extra.remove(fields::REQUEST_BODY);
        monitor.notify(level, err, &extra);
    }

    fn record(&self, level: Level, caller: &Location<'_>, extra: Event) -> Event {
        let mut record = Event::new();
        record.insert(
            fields::TIME.to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        record.insert(fields::LEVEL.to_string(), Value::from(level.severity()));
        record.insert(fields::LEVEL_STRING.to_string(), Value::String(level.as_str().to_string()));
        record.insert(fields::LOGGER_NAME.to_string(), Value::String(self.name.to_string()));
        record.insert(fields::GIT_VERSION.to_string(), Value::String(git_version().to_string()));
        record.insert(
            fields::CALLER.to_string(),
            Value::String(format!("{}:{}", caller.file(), caller.line())),
        );
        if let Some(ids) = current_span_ids() {
            record.insert(fields::SPAN_ID.to_string(), Value::String(ids.span_id));
            record.insert(fields::TRACE_ID.to_string(), Value::String(ids.trace_id));
        }

        for (key, value) in self.context.iter() {
            record.insert(key.clone(), value.clone());
        }
        record.extend(extra);

        record
    }

    fn write(&self, record: &Event) {
        let result = serde_json::to_vec(record)
            .map_err(LogError::Encode)
            .and_then(|mut bytes| {
                bytes.push(b'\n');
                self.sink.clone().write_all(&bytes).map_err(LogError::Write)
            });

        if let Err(err) = result {
            // The chain itself is broken; stderr is the only place left.
            eprintln!("logger {}: could not write record: {}", self.name, error_chain(&err));
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("context", &self.context)
            .field("monitor", &self.monitor.is_some())
            .finish_non_exhaustive()
    }
}

/// Releases the resources acquired by [`Logger::new`] exactly once, either
/// through [`Closer::close`] or when dropped.
#[derive(Default)]
#[must_use = "dropping the closer releases the log file and the error monitor"]
pub struct Closer {
    actions: Vec<Box<dyn FnOnce() + Send>>,
}

impl Closer {
    pub fn push<F: FnOnce() + Send + 'static>(&mut self, action: F) {
        self.actions.push(Box::new(action));
    }

    pub fn close(mut self) {
        self.run();
    }

    fn run(&mut self) {
        for action in self.actions.drain(..) {
            action();
        }
    }
}

impl Drop for Closer {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Closer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closer").field("actions", &self.actions.len()).finish()
    }
}

/// Assemble the writer chain for `cfg` on top of stdout.
///
/// # Errors
///
/// Fails when the log file cannot be opened.
pub fn configure_writer(cfg: &Configuration) -> Result<(SharedWriter, Closer)> {
    configure_writer_to(cfg, io::stdout())
}

/// Assemble the writer chain for `cfg` on top of `out`:
/// `out`, optionally indented or replaced by the console writer, fanned out
/// together with the log file, behind the masking stage.
///
/// # Errors
///
/// Fails when the log file cannot be opened.
pub fn configure_writer_to<W: Write + Send + 'static>(cfg: &Configuration, out: W) -> Result<(SharedWriter, Closer)> {
    let mut writer: Box<dyn Write + Send> = if cfg.console_writer {
        Box::new(ConsoleWriter::new(out))
    } else if cfg.log_prettify {
        Box::new(EventWriter::new(out).indented(true))
    } else {
        Box::new(out)
    };

    let mut closer = Closer::default();

    if cfg.log_to_file && !cfg.log_file_name.is_empty() {
        let file = ClosableWriter::new(open_log_file(cfg)?);
        let closing = file.clone();
        closer.push(move || {
            if let Err(err) = closing.close() {
                tracing::warn!(error = %err, "closing log file failed");
            }
        });

        writer = Box::new(MultiWriter::new().with_writer(file).with_writer(writer));
    }

    if cfg.mask_sensitive_fields || cfg.xml_mask_sensitive_fields {
        let mut masking = EventWriter::new(writer);
        if cfg.xml_mask_sensitive_fields {
            masking.push_processor(Box::new(XmlFieldMasker::new()));
        }
        if cfg.mask_sensitive_fields {
            masking.push_processor(Box::new(FieldMasker::new()));
        }
        writer = Box::new(masking);
    }

    Ok((SharedWriter::new(writer), closer))
}

fn open_log_file(cfg: &Configuration) -> Result<Box<dyn Write + Send>> {
    let path = Path::new(&cfg.log_file_name);
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if cfg.is_development() {
        let prefix = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(prefix)
            .max_log_files(3)
            .build(directory)
            .map_err(|source| LogError::RollingFile {
                path: cfg.log_file_name.clone(),
                source,
            })?;

        return Ok(Box::new(appender));
    }

    fs::create_dir_all(directory).map_err(|source| LogError::CreateDirectory {
        directory: directory.display().to_string(),
        source,
    })?;

    let mut options = OpenOptions::new();
    options.read(true).append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path).map_err(|source| LogError::OpenFile {
        path: cfg.log_file_name.clone(),
        source,
    })?;

    Ok(Box::new(file))
}
