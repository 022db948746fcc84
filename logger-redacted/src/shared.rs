//! Process-wide shared logger and free logging functions.

use std::error::Error;
use std::io;

use error_common::Annotated;
use lazy_static::lazy_static;
use parking_lot::{Mutex, Once, RwLock};

use crate::config::Configuration;
use crate::entry::Entry;
use crate::error::Result;
use crate::level::Level;
use crate::logger::{Closer, Logger};

lazy_static! {
    static ref SHARED_LOGGER: RwLock<Option<Logger>> = RwLock::new(None);
    static ref CONFIGURE_LOCK: Mutex<()> = Mutex::new(());
}

static INITIALIZE_ONCE: Once = Once::new();

fn default_logger() -> Logger {
    Logger::with_writer("shared-default", Level::Trace, io::stdout())
}

/// The shared logger. Until [`configure_shared_logger`] is called this is a
/// default logger on stdout, which warns once that it is not configured.
pub fn shared_logger() -> Logger {
    INITIALIZE_ONCE.call_once(|| {
        let mut shared = SHARED_LOGGER.write();
        if shared.is_none() {
            let logger = default_logger();
            *shared = Some(logger.clone());
            drop(shared);

            logger.warn(&Annotated::msg("logger not configured, using default configuration"));
        }
    });

    SHARED_LOGGER.read().clone().unwrap_or_else(default_logger)
}

/// Replace the shared logger with one built from `cfg`.
///
/// # Errors
///
/// Fails when the logger cannot be built; the previous logger stays in place.
pub fn configure_shared_logger(cfg: &Configuration) -> Result<Closer> {
    let _guard = CONFIGURE_LOCK.lock();

    let (logger, closer) = Logger::new("shared-configured", cfg)?;
    *SHARED_LOGGER.write() = Some(logger.clone());
    logger.debug("shared logger configured");

    Ok(closer)
}

/// Replace the shared logger with `logger`.
pub fn set_shared_logger(logger: Logger) {
    let _guard = CONFIGURE_LOCK.lock();
    *SHARED_LOGGER.write() = Some(logger);
}

#[track_caller]
pub fn trace(msg: &str) {
    shared_logger().trace(msg);
}

#[track_caller]
pub fn debug(msg: &str) {
    shared_logger().debug(msg);
}

#[track_caller]
pub fn info(msg: &str) {
    shared_logger().info(msg);
}

#[track_caller]
pub fn warn(err: &(dyn Error + 'static)) {
    shared_logger().warn(err);
}

#[track_caller]
pub fn error(err: &(dyn Error + 'static)) {
    shared_logger().error(err);
}

#[track_caller]
pub fn fatal(err: &(dyn Error + 'static)) -> ! {
    shared_logger().fatal(err)
}

#[track_caller]
pub fn panic(err: &(dyn Error + 'static)) -> ! {
    shared_logger().panic(err)
}

pub fn entry() -> Entry {
    shared_logger().entry()
}
