use std::io;

use thiserror::Error;

/// Errors raised while masking a single event.
#[derive(Error, Debug)]
pub enum MaskError {
    #[error("marshalling to JSON failed")]
    JsonEncode(#[source] serde_json::Error),

    #[error("encoding document as XML failed")]
    XmlEncode(#[source] quick_xml::Error),

    #[error("masking value failed: field={field}")]
    Field {
        field: String,
        #[source]
        source: Box<MaskError>,
    },
}

/// Errors raised by the logger and its writer chain.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("decoding event failed")]
    Decode(#[source] serde_json::Error),

    #[error("processing event failed")]
    Process(#[source] MaskError),

    #[error("encoding event failed")]
    Encode(#[source] serde_json::Error),

    #[error("writing output failed")]
    Write(#[source] io::Error),

    #[error("processing configuration with prefix failed: prefix={prefix}")]
    Config {
        prefix: String,
        #[source]
        source: config::ConfigError,
    },

    #[error("opening log file failed: path={path}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("creating log directory failed: directory={directory}")]
    CreateDirectory {
        directory: String,
        #[source]
        source: io::Error,
    },

    #[error("creating rolling log file failed: path={path}")]
    RollingFile {
        path: String,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error("starting error monitor failed")]
    Monitor(#[source] io::Error),

    #[error("installing tracing subscriber failed")]
    Subscriber(#[source] tracing_subscriber::util::TryInitError),
}

impl From<LogError> for io::Error {
    fn from(err: LogError) -> Self {
        let kind = match &err {
            LogError::Write(inner) => inner.kind(),
            LogError::Decode(_) => io::ErrorKind::InvalidData,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
