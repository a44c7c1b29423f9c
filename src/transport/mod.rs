//! Delivery of serialized documents to the registration service.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::Result;

/// Posts an already-serialized JSON document and returns the response body.
///
/// Implementations own their timeout and error policy; the gate never
/// imposes one.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `endpoint`. `signature` is passed through untouched.
    async fn post_json(&self, endpoint: &str, body: Vec<u8>, signature: &str) -> Result<String>;
}
