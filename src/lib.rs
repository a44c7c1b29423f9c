//! Docgate - Rate-Limited Document Submission
//!
//! This crate implements a client-side gate that bounds how often a process
//! submits documents to an external registration service. Every submission
//! passes through a single in-process admission gate that allows at most N
//! requests per time window, shared safely across concurrent callers.

pub mod client;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod telemetry;
pub mod transport;

pub use client::{DocumentClient, ResultHandler, Submission, SubmissionRequest};
pub use config::{GateConfig, OverLimitPolicy};
pub use error::{GateError, Result};
pub use ratelimit::{AdmissionGate, Decision, RateLimitConfig, TimeUnit};
