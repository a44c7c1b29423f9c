//! Rate-limited document submission.
//!
//! [`DocumentClient`] is the public surface: every submission goes through
//! the [`AdmissionGate`] first, and only admitted submissions are serialized
//! and handed to the [`Transport`]. Failures after admission never escape
//! `submit`; they reach the caller as a `None` result.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{GateConfig, OverLimitPolicy};
use crate::error::Result;
use crate::ratelimit::{AdmissionGate, Clock, Decision, SystemClock};
use crate::transport::{HttpTransport, Transport};

/// Lower bound on a single wait under [`OverLimitPolicy::Wait`].
const MIN_WAIT: Duration = Duration::from_millis(1);

/// A document to register, with its signature.
///
/// The signature is opaque: it is handed to the transport as-is.
#[derive(Debug, Clone)]
pub struct SubmissionRequest<D> {
    pub document: D,
    pub signature: String,
}

impl<D> SubmissionRequest<D> {
    pub fn new(document: D, signature: impl Into<String>) -> Self {
        Self {
            document,
            signature: signature.into(),
        }
    }
}

/// Receives the outcome of an admitted submission, exactly once.
///
/// `Some(body)` is the service response; `None` means the document could not
/// be delivered.
pub trait ResultHandler: Send {
    fn result(self, data: Option<String>);
}

impl<F> ResultHandler for F
where
    F: FnOnce(Option<String>) + Send,
{
    fn result(self, data: Option<String>) {
        self(data)
    }
}

/// Outcome of [`DocumentClient::submit_for_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Withheld by the gate; nothing was sent.
    Rejected,
    /// Admitted; carries the response body, or `None` on transport failure.
    Completed(Option<String>),
}

/// Client that bounds how often documents reach the registration service.
pub struct DocumentClient<T: Transport = HttpTransport, C: Clock = SystemClock> {
    gate: AdmissionGate<C>,
    transport: T,
    endpoint: String,
    over_limit: OverLimitPolicy,
}

impl DocumentClient<HttpTransport, SystemClock> {
    /// Build an HTTP client from configuration.
    ///
    /// Fails on invalid limit settings.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let gate = AdmissionGate::new(config.rate_limit.validate()?);
        let transport = HttpTransport::new(&config.transport)?;

        Ok(Self::new(gate, transport, config.transport.endpoint.clone())
            .with_over_limit(config.rate_limit.over_limit))
    }
}

impl<T: Transport, C: Clock> DocumentClient<T, C> {
    /// Assemble a client from its parts. Rejects over-limit calls by default.
    pub fn new(gate: AdmissionGate<C>, transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            gate,
            transport,
            endpoint: endpoint.into(),
            over_limit: OverLimitPolicy::Reject,
        }
    }

    /// Set what happens when the window is exhausted.
    pub fn with_over_limit(mut self, policy: OverLimitPolicy) -> Self {
        self.over_limit = policy;
        self
    }

    /// The gate guarding this client.
    pub fn gate(&self) -> &AdmissionGate<C> {
        &self.gate
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a document.
    ///
    /// On `Decision::Reject` nothing is sent and `handler` is dropped
    /// uncalled. On `Decision::Admit` `handler` is called exactly once, with
    /// `None` if serialization or delivery failed.
    pub async fn submit<D, H>(&self, request: SubmissionRequest<D>, handler: H) -> Decision
    where
        D: Serialize,
        H: ResultHandler,
    {
        if !self.admit().await.is_admitted() {
            return Decision::Reject;
        }

        let SubmissionRequest {
            document,
            signature,
        } = request;
        handler.result(self.deliver(document, signature).await);
        Decision::Admit
    }

    /// Submit a document and discard the response.
    pub async fn send<D: Serialize>(&self, document: D, signature: impl Into<String>) -> Decision {
        self.submit(SubmissionRequest::new(document, signature), |_| {})
            .await
    }

    /// Submit a document and return the outcome instead of calling back.
    pub async fn submit_for_result<D: Serialize>(&self, request: SubmissionRequest<D>) -> Submission {
        let mut outcome = None;
        let decision = self
            .submit(request, |data: Option<String>| outcome = Some(data))
            .await;

        match (decision, outcome) {
            (Decision::Admit, Some(data)) => Submission::Completed(data),
            _ => Submission::Rejected,
        }
    }

    /// Ask the gate for a slot, waiting for window resets if so configured.
    /// The gate lock is never held while sleeping.
    async fn admit(&self) -> Decision {
        loop {
            let decision = self.gate.try_admit();
            if decision.is_admitted() || self.over_limit == OverLimitPolicy::Reject {
                return decision;
            }

            let wait = self.gate.snapshot().resets_in.max(MIN_WAIT);
            debug!(wait = ?wait, "Window exhausted, waiting for reset");
            tokio::time::sleep(wait).await;
        }
    }

    async fn deliver<D: Serialize>(&self, document: D, signature: String) -> Option<String> {
        match self.post(document, signature).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Document submission failed");
                None
            }
        }
    }

    async fn post<D: Serialize>(&self, document: D, signature: String) -> Result<String> {
        let body = serde_json::to_vec(&document)?;
        self.transport
            .post_json(&self.endpoint, body, &signature)
            .await
    }
}
