//! Structured JSON logging with sensitive-field masking.
//!
//! Records are rendered as one JSON object per line and pass through a
//! writer chain before reaching stdout or the log file. The masking stage of
//! that chain decodes each record and replaces sensitive values by `***`:
//!
//! - top-level fields named like a sensitive keyword (`password`, `pin`,
//!   `cvv`, `cvc`, `card_number`, `secret`);
//! - keyword keys inside string fields holding a JSON object;
//! - keyword parameters inside string fields holding a URL query string;
//! - keyword elements and attributes inside string fields holding an XML
//!   document.
//!
//! Values without anything sensitive are written byte-for-byte as given.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{EventWriter, FieldMasker, Level, Logger};
//!
//! let chain = EventWriter::new(std::io::stdout()).with_processor(FieldMasker::new());
//! let logger = Logger::with_writer("payments", Level::Info, chain);
//!
//! logger
//!     .entry()
//!     .string("card_number", "4111111111111111")
//!     .string("query", "user=bob&password=s3cret")
//!     .info("card added");
//! // {"time":"...","level":6,"level-string":"info",...,"card_number":"***","query":"password=***&user=bob","msg":"card added"}
//! ```
//!
//! # Configuration
//!
//! [`Configuration::from_env`] reads `<PREFIX>_GLOBAL_ENVIRONMENT`,
//! `<PREFIX>_LOG_LEVEL`, `<PREFIX>_LOG_TO_FILE`, `<PREFIX>_LOG_FILE_NAME`,
//! `<PREFIX>_LOG_PRETTIFY`, `<PREFIX>_MASK_SENSITIVE_FIELDS`,
//! `<PREFIX>_XML_MASK_SENSITIVE_FIELDS`, `<PREFIX>_CONSOLE_WRITER` and
//! `<PREFIX>_ROLLBAR_TOKEN`; [`Logger::new`] assembles the writer chain from it.

pub mod config;
pub mod console;
pub mod context;
pub mod entry;
pub mod error;
pub mod level;
pub mod logger;
pub mod macros;
pub mod monitor;
pub mod panic;
pub mod redactor;
pub mod shared;
pub mod subscriber;
pub mod version;
pub mod writer;
pub mod xml_redactor;

pub use error_common::fields;

pub use config::Configuration;
pub use console::ConsoleWriter;
pub use context::{current_logger, query_log_level, with_logger, with_query_log_level};
pub use entry::Entry;
pub use error::{LogError, MaskError, Result};
pub use level::Level;
pub use logger::{configure_writer, configure_writer_to, Closer, LoggedPanic, Logger};
pub use monitor::{ErrorMonitor, RollbarMonitor};
pub use panic::install_panic_hook;
pub use redactor::{FieldMasker, MASK, SENSITIVE_KEYWORDS};
pub use shared::{configure_shared_logger, set_shared_logger, shared_logger};
pub use subscriber::{current_span_ids, init_tracing, SpanIds};
pub use version::git_version;
pub use writer::{ClosableWriter, Event, EventProcessor, EventWriter, MultiWriter, SharedWriter};
pub use xml_redactor::XmlFieldMasker;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
