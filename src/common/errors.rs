//! Error types for the application

use thiserror::Error;

/// Result type alias using our ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Venue rejected the request or returned a non-2xx status
    #[error("venue request failed with status {status}: {message}")]
    Transport {
        status: u16,
        /// Venue error code, when the error body was decodable
        code: Option<String>,
        message: String,
    },

    /// Venue acknowledged the request but reported a failure status
    #[error("venue rejected the request: {0}")]
    Rejected(String),

    /// Malformed or undersized payload from the venue
    #[error("decode error: {0}")]
    Decode(String),

    /// Rate selection found no eligible lending offers in the book
    #[error("no eligible lending offers available")]
    NoOffersAvailable,

    /// Malformed outgoing offer request, raised before any network call
    #[error("invalid offer request: {0}")]
    Validation(String),

    /// WebSocket connection errors
    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    /// WebSocket send/receive errors
    #[error("WebSocket communication error: {0}")]
    WebSocketCommunication(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Configuration errors; no reasonable continuation
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Channel send errors
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::WebSocketCommunication(err.to_string())
    }
}
