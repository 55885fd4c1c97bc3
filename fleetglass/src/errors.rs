use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("WebDriver error: {0}")]
    PlatformError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AutomationError {
    fn from(e: std::io::Error) -> Self {
        AutomationError::Io(e.to_string())
    }
}

/// Outcome of driving the MVA search field and waiting for the vehicle to load.
///
/// `NotFound` is terminal for the MVA (the identifier is treated as invalid),
/// while `InputUnavailable` and wrapped automation errors are retryable at the
/// batch level.
#[derive(Error, Debug)]
pub enum NavigateError {
    #[error("MVA search input not available")]
    InputUnavailable,

    #[error("vehicle properties did not load; MVA treated as invalid")]
    NotFound,

    #[error(transparent)]
    Automation(#[from] AutomationError),
}
