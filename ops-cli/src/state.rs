use std::fmt;

/// Outcome of a start or stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Unknown,
    /// Was not running, is now.
    Started,
    /// Was already running; nothing done.
    Running,
    /// Was not running; nothing done.
    NotRunning,
    /// Was running, is not any more.
    Stopped,
}

impl ServiceState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Started => "started",
            Self::Running => "running",
            Self::NotRunning => "not running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
