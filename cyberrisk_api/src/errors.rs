//! Error types for the API client.

/// Errors that can occur when fetching from the risk service or the geography provider.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, bad URL, or unparseable body).
    #[error("Request failed")]
    RequestFailed,
    /// The remote returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
}
