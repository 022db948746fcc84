use std::io;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevenvError {
    #[error("failed to read services file: path={path}")]
    ReadServices {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse services file")]
    ParseServices(#[source] serde_yaml::Error),

    #[error("failed to validate services file")]
    InvalidServices(#[source] Box<DevenvError>),

    #[error("duplicate service short name: {0}")]
    DuplicateShortName(String),

    #[error("duplicate service directory found: {0}")]
    DuplicateDirectory(String),

    #[error("unknown OS version: {0}")]
    UnsupportedOs(String),

    #[error("executing {program} failed")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {output}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("creating coverage directory failed: directory={directory}")]
    CreateDirectory {
        directory: String,
        #[source]
        source: io::Error,
    },

    #[error("checking service state failed")]
    State(#[source] Box<DevenvError>),

    #[error("building service failed")]
    Build(#[source] Box<DevenvError>),

    #[error("codesigning service failed")]
    CodeSign(#[source] Box<DevenvError>),

    #[error("running service failed")]
    Run(#[source] Box<DevenvError>),

    #[error("stopping service failed")]
    Stop(#[source] Box<DevenvError>),
}

impl DevenvError {
    /// The annotated error this one wraps, if any.
    pub fn cause(&self) -> Option<&DevenvError> {
        match self {
            Self::InvalidServices(inner)
            | Self::State(inner)
            | Self::Build(inner)
            | Self::CodeSign(inner)
            | Self::Run(inner)
            | Self::Stop(inner) => Some(inner),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DevenvError>;
