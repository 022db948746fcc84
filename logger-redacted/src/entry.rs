use std::error::Error;
use std::panic::Location;

use error_common::CustomData;
use serde_json::Value;

use crate::fields;
use crate::level::Level;
use crate::logger::Logger;
use crate::writer::Event;

/// Builder for a single record with extra fields.
///
/// Nothing is written until one of the level methods is called:
///
/// ```rust
/// use logger_redacted::{Level, Logger};
///
/// let logger = Logger::with_writer("docs", Level::Info, std::io::sink());
/// logger.entry().string("foo", "bar").int("baz", 1).info("hello");
/// ```
#[derive(Debug)]
#[must_use = "an entry is discarded unless one of its level methods is called"]
pub struct Entry {
    logger: Logger,
    fields: Event,
}

impl Entry {
    pub(crate) fn new(logger: Logger) -> Self {
        Self {
            logger,
            fields: Event::new(),
        }
    }

    pub fn field<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn string<K: Into<String>, V: Into<String>>(self, name: K, value: V) -> Self {
        self.field(name, value.into())
    }

    pub fn int<K: Into<String>>(self, name: K, value: i64) -> Self {
        self.field(name, value)
    }

    pub fn float<K: Into<String>>(self, name: K, value: f64) -> Self {
        self.field(name, value)
    }

    pub fn bool<K: Into<String>>(self, name: K, value: bool) -> Self {
        self.field(name, value)
    }

    pub fn strings<K, S>(self, name: K, values: &[S]) -> Self
    where
        K: Into<String>,
        S: AsRef<str>,
    {
        let values: Vec<Value> = values
            .iter()
            .map(|value| Value::String(value.as_ref().to_string()))
            .collect();
        self.field(name, values)
    }

    /// Raw bytes, written as (lossy) UTF-8 text.
    pub fn bytes<K: Into<String>>(self, name: K, value: &[u8]) -> Self {
        self.field(name, String::from_utf8_lossy(value).into_owned())
    }

    pub fn map<I: IntoIterator<Item = (String, Value)>>(mut self, fields: I) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn custom_data(self, data: CustomData) -> Self {
        self.map(data.into_fields())
    }

    pub fn request_id<V: Into<String>>(self, value: V) -> Self {
        self.string(fields::REQUEST_ID, value)
    }

    #[track_caller]
    pub fn trace(self, msg: &str) {
        self.logger.log_message(Level::Trace, msg, self.fields, Location::caller());
    }

    #[track_caller]
    pub fn debug(self, msg: &str) {
        self.logger.log_message(Level::Debug, msg, self.fields, Location::caller());
    }

    #[track_caller]
    pub fn info(self, msg: &str) {
        self.logger.log_message(Level::Info, msg, self.fields, Location::caller());
    }

    #[track_caller]
    pub fn warn(self, err: &(dyn Error + 'static)) {
        self.logger.log_error(Level::Warn, err, self.fields, Location::caller());
    }

    #[track_caller]
    pub fn error(self, err: &(dyn Error + 'static)) {
        self.logger.log_error(Level::Error, err, self.fields, Location::caller());
    }

    #[track_caller]
    pub fn fatal(self, err: &(dyn Error + 'static)) -> ! {
        self.logger.fatal_with(err, self.fields, Location::caller())
    }

    #[track_caller]
    pub fn panic(self, err: &(dyn Error + 'static)) -> ! {
        self.logger.panic_with(err, self.fields, Location::caller())
    }

    /// Log `err` at error level and hand it back, for `return Err(...)`.
    #[track_caller]
    pub fn return_error<E: Error + 'static>(self, err: E) -> E {
        self.logger.log_error(Level::Error, &err, self.fields, Location::caller());
        err
    }

    /// Log `err` at warn level and hand it back.
    #[track_caller]
    pub fn return_warn<E: Error + 'static>(self, err: E) -> E {
        self.logger.log_error(Level::Warn, &err, self.fields, Location::caller());
        err
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::Arc;

    use error_common::{Annotated, CustomDataError};
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn last(&self) -> Event {
            let contents = String::from_utf8(self.0.lock().clone()).unwrap();
            serde_json::from_str(contents.lines().last().unwrap()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_typed_fields() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("entry", Level::Trace, buffer.clone());

        logger
            .entry()
            .string("name", "bob")
            .int("attempt", 3)
            .float("ratio", 0.5)
            .bool("retry", true)
            .strings("tags", &["a", "b"])
            .bytes("raw", b"abc")
            .request_id("req-9")
            .trace("checked");

        let record = buffer.last();
        assert_eq!(record["name"], json!("bob"));
        assert_eq!(record["attempt"], json!(3));
        assert_eq!(record["ratio"], json!(0.5));
        assert_eq!(record["retry"], json!(true));
        assert_eq!(record["tags"], json!(["a", "b"]));
        assert_eq!(record["raw"], json!("abc"));
        assert_eq!(record["request-id"], json!("req-9"));
        assert_eq!(record["msg"], json!("checked"));
    }

    #[test]
    fn test_entry_fields_win_over_custom_data() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("entry", Level::Info, buffer.clone());
        let err = CustomDataError::new("lookup failed", CustomData::new().user_id("from-error").string("kept", "yes"));

        logger.entry().field("user-id", "from-entry").warn(&err);

        let record = buffer.last();
        assert_eq!(record["user-id"], json!("from-entry"));
        assert_eq!(record["kept"], json!("yes"));
    }

    #[test]
    fn test_return_error_hands_error_back() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("entry", Level::Info, buffer.clone());

        let err = logger.entry().int("code", 422).return_error(Annotated::msg("validation failed"));

        assert_eq!(err.to_string(), "validation failed");
        let record = buffer.last();
        assert_eq!(record["error"], json!("validation failed"));
        assert_eq!(record["code"], json!(422));
    }

    #[test]
    fn test_return_warn() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("entry", Level::Info, buffer.clone());

        let err = logger.entry().return_warn(Annotated::msg("retrying"));

        assert_eq!(err.to_string(), "retrying");
        assert_eq!(buffer.last()["level-string"], json!("warn"));
    }
}
