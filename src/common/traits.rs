//! Trait definitions for the venue transport boundary

use async_trait::async_trait;
use serde_json::Value;

use super::errors::Result;

/// Authenticated transport to the lending venue.
///
/// This is the only contract the decision engine requires from the outside
/// world: sign a request, execute it, hand back the raw response body. The
/// real implementation wraps the venue's REST API; tests substitute a
/// scripted transport so a full decision cycle runs without the network.
///
/// Non-2xx responses surface as [`ClientError::Transport`] carrying the
/// status and, when the body decodes as `[_, code, message]`, the venue's
/// error code and message.
///
/// [`ClientError::Transport`]: crate::common::errors::ClientError::Transport
#[async_trait]
pub trait FundingTransport: Send + Sync {
    /// Sign and execute a request against the venue.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST)
    /// * `path` - API path relative to the base URL, including any query
    /// * `body` - JSON request body, or `None` for an empty body
    async fn signed_request(&self, method: &str, path: &str, body: Option<Value>)
        -> Result<Vec<u8>>;
}
