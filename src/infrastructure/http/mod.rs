//! HTTP plumbing: single-attempt transport and the retry layer around it.

pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use retry::{with_retry, RetryPolicy, RetryableResponse, RetryingTransport};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
