/// Errors that can occur in the transport layer.
///
/// The message of each variant is the underlying client error's text,
/// unprefixed, because it ends up verbatim in the session's failure detail.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The URL could not be parsed.
    #[error("{0}")]
    InvalidUrl(String),

    /// Connecting, sending, or waiting for the response failed.
    #[error("{0}")]
    Unreachable(String),

    /// The response arrived but its body could not be read.
    #[error("{0}")]
    Body(String),

    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Setup(String),
}
