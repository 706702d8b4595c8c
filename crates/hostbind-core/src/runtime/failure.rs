use std::fmt;

/// How a recoverable failure surfaces in the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Reported as a warning; the call returns without a value
    Warning,
    /// Raised as a catchable exception
    Exception,
}

impl FailureKind {
    /// Failures from an exception-capable fetch are raised as exceptions.
    pub fn for_fetch(exception_capable: bool) -> Self {
        if exception_capable {
            FailureKind::Exception
        } else {
            FailureKind::Warning
        }
    }
}

/// An entry on the runtime's recoverable-failure channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverableFailure {
    pub kind: FailureKind,
    pub class: String,
    pub method: String,
    /// Zero-based argument position, when the failure concerns one argument
    pub position: Option<usize>,
    pub message: String,
}

impl fmt::Display for RecoverableFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FailureKind::Warning => "warning",
            FailureKind::Exception => "exception",
        };
        write!(f, "{kind}: {}", self.message)
    }
}
