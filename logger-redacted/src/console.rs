use std::io::{self, Write};

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use serde_json::Value;

use crate::error::LogError;
use crate::fields;
use crate::level::Level;
use crate::writer::Event;

/// Keys rendered in the line prefix rather than as `key=value` pairs.
const HEADER_FIELDS: &[&str] = &[
    fields::TIME,
    "timestamp",
    fields::LEVEL,
    fields::LEVEL_STRING,
    fields::MSG,
    "message",
];

/// Final stage of the chain turning each JSON record into a colored line:
/// `15:04:05.000 [ INFO] message key=value ...`.
#[derive(Debug)]
pub struct ConsoleWriter<W> {
    out: W,
}

impl ConsoleWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for ConsoleWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let event: Event = serde_json::from_slice(buf).map_err(LogError::Decode)?;
        let line = format_line(&event);
        self.out
            .write_all(line.as_bytes())
            .map_err(LogError::Write)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn format_line(event: &Event) -> String {
    let mut parts = vec![
        format_time(event).bright_black().to_string(),
        format!("[{}]", format_level(event)),
    ];

    if let Some(msg) = message(event).filter(|msg| !msg.is_empty()) {
        parts.push(msg.to_string());
    }

    for (key, value) in event {
        if HEADER_FIELDS.contains(&key.as_str()) {
            continue;
        }

        let rendered = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        if key == fields::ERROR {
            parts.push(format!("{}={}", key.red(), rendered.bright_red()));
        } else {
            parts.push(format!("{}={}", key.cyan(), rendered));
        }
    }

    let mut line = parts.join(" ");
    line.push('\n');
    line
}

fn format_time(event: &Event) -> String {
    let raw = event
        .get(fields::TIME)
        .or_else(|| event.get("timestamp"))
        .and_then(Value::as_str);

    match raw.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok()) {
        Some(time) => time.format("%H:%M:%S%.3f").to_string(),
        None => Local::now().format("%H:%M:%S%.3f").to_string(),
    }
}

fn format_level(event: &Event) -> ColoredString {
    let raw = event
        .get(fields::LEVEL_STRING)
        .or_else(|| event.get(fields::LEVEL))
        .and_then(Value::as_str);

    match raw.and_then(|raw| raw.parse::<Level>().ok()) {
        Some(Level::Trace) => "TRACE".bright_purple(),
        Some(Level::Debug) => "DEBUG".bright_blue(),
        Some(Level::Info) => " INFO".bright_green(),
        Some(Level::Warn) => " WARN".bright_yellow(),
        Some(Level::Error) => "ERROR".bright_red(),
        Some(Level::Fatal) => "FATAL".red().bold(),
        Some(Level::Panic) => "PANIC".red().bold(),
        None => "  ???".normal(),
    }
}

fn message(event: &Event) -> Option<&str> {
    event
        .get(fields::MSG)
        .or_else(|| event.get("message"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        colored::control::set_override(false);
        let mut writer = ConsoleWriter::new(Vec::new());
        writer.write_all(input.as_bytes()).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_logger_record() {
        let line = render(
            r#"{"time":"2024-03-01T10:20:30.123456789Z","level":6,"level-string":"info","msg":"user logged in","user":"bob","attempt":2}"#,
        );

        assert_eq!(line, "10:20:30.123 [ INFO] user logged in user=bob attempt=2\n");
    }

    #[test]
    fn test_tracing_record() {
        let line = render(r#"{"timestamp":"2024-03-01T10:20:30.5Z","level":"WARN","message":"slow","target":"db"}"#);

        assert_eq!(line, "10:20:30.500 [ WARN] slow target=db\n");
    }

    #[test]
    fn test_error_field_is_rendered() {
        let line = render(r#"{"time":"2024-03-01T10:20:30Z","level-string":"error","error":"boom: io"}"#);

        assert_eq!(line, "10:20:30.000 [ERROR] error=boom: io\n");
    }

    #[test]
    fn test_invalid_record_is_rejected() {
        let mut writer = ConsoleWriter::new(Vec::new());
        let err = writer.write(b"plain").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
