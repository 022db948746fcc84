use std::any::Any;
use std::backtrace::Backtrace;
use std::panic;

use error_common::Annotated;
use serde_json::Value;

use crate::fields;
use crate::level::Level;
use crate::logger::{LoggedPanic, Logger};
use crate::writer::Event;

/// Log every panic at `panic` level, with the backtrace as
/// `original-trace`, and report it to the error monitor.
///
/// Panics raised by [`Logger::panic`] were logged already and are skipped.
pub fn install_panic_hook(logger: Logger) {
    panic::set_hook(Box::new(move |info| {
        if info.payload().downcast_ref::<LoggedPanic>().is_some() {
            return;
        }

        let err = Annotated::msg(panic_message(info.payload()));
        let mut extra = Event::new();
        extra.insert(
            fields::ORIGINAL_TRACE.to_string(),
            Value::String(Backtrace::force_capture().to_string()),
        );

        match info.location() {
            Some(location) => logger.log_error(Level::Panic, &err, extra, location),
            None => logger.log_error(Level::Panic, &err, extra, panic::Location::caller()),
        }
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "panic with non-string payload");
    }
}
