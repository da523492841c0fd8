/// Failure classes for crawl accounting
///
/// Every failed request ends in exactly one of these states.
use std::fmt;

/// Represents how a failed page request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    /// Page answered with a non-2xx status
    HttpError,

    /// Request exceeded the per-request timeout
    TimedOut,

    /// Connection could not be established (refused, DNS, TLS)
    Unreachable,

    /// Any other failure (body read, redirect policy, ...)
    Failed,
}

impl PageState {
    /// Converts the state to a string for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpError => "http_error",
            Self::TimedOut => "timed_out",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
