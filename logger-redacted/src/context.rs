//! Task-scoped logger and query log level.

use std::future::Future;

use crate::level::Level;
use crate::logger::Logger;
use crate::shared::shared_logger;

tokio::task_local! {
    static LOGGER: Logger;
    static QUERY_LOG_LEVEL: Level;
}

/// Run `future` with `logger` as the current logger.
pub async fn with_logger<F: Future>(logger: Logger, future: F) -> F::Output {
    LOGGER.scope(logger, future).await
}

/// The logger of the current task scope, or the shared logger outside of one.
pub fn current_logger() -> Logger {
    LOGGER.try_with(Logger::clone).unwrap_or_else(|_| shared_logger())
}

/// Run `future` with database queries logged at `level`.
pub async fn with_query_log_level<F: Future>(level: Level, future: F) -> F::Output {
    QUERY_LOG_LEVEL.scope(level, future).await
}

pub async fn with_query_log_level_debug<F: Future>(future: F) -> F::Output {
    with_query_log_level(Level::Debug, future).await
}

pub fn query_log_level() -> Option<Level> {
    QUERY_LOG_LEVEL.try_with(|level| *level).ok()
}
