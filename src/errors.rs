/// Errors raised while driving a simulated flow.
///
/// Every variant is fatal to the step that produced it. Flows never retry.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Expected cookie or header is absent or malformed
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Expected marker is absent from a response body
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload is present but does not match its expected schema
    #[error("Decode error: {0}")]
    Decode(String),

    /// An explicit check made on behalf of the test author failed
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// The request/response exchange itself failed
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        FlowError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
