//! SOAP transport to the SRI reception and authorization services.
//!
//! Two operations, parameterized by environment: submit a signed
//! comprobante (base64-encoded per the service contract) and query the
//! authorization status of an access key. All failures are classified
//! into [`TransportErrorKind`](crate::core::TransportErrorKind) before
//! they reach callers, so the orchestrator decides on retries purely
//! from the kind.

mod client;
mod endpoints;
pub mod soap;

pub use client::SriClient;
pub use endpoints::{
    ClientConfig, PRODUCTION_AUTHORIZATION_URL, PRODUCTION_RECEPTION_URL, ServiceEndpoints,
    TEST_AUTHORIZATION_URL, TEST_RECEPTION_URL,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Environment, TransportErrorKind};

/// One message from the service's own message list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMessage {
    /// identificador — the service's numeric message code.
    pub identifier: String,
    pub message: String,
    pub additional_info: Option<String>,
    /// tipo (ERROR, ADVERTENCIA).
    pub kind: Option<String>,
}

/// A classified transport failure: kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: TransportErrorKind,
    pub message: String,
}

/// Outcome of a submission call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceptionStatus {
    /// RECIBIDA — accepted for processing.
    Received,
    /// DEVUELTA — rejected at reception.
    Returned,
    /// The call itself failed; see the classified failure.
    ConnectionError,
}

/// Result of [`AuthorizationService::submit`].
#[derive(Debug, Clone)]
pub struct ReceptionResponse {
    pub status: ReceptionStatus,
    pub messages: Vec<ServiceMessage>,
    /// Present exactly when `status == ConnectionError`.
    pub failure: Option<TransportFailure>,
    /// Endpoint the call was made against (for the audit trail).
    pub endpoint: String,
    pub elapsed_ms: u64,
}

impl ReceptionResponse {
    pub(crate) fn failed(failure: TransportFailure, endpoint: String, elapsed_ms: u64) -> Self {
        Self {
            status: ReceptionStatus::ConnectionError,
            messages: Vec::new(),
            failure: Some(failure),
            endpoint,
            elapsed_ms,
        }
    }
}

/// Outcome of an authorization query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// AUTORIZADO — terminal.
    Authorized,
    /// NO AUTORIZADO — terminal.
    NotAuthorized,
    /// EN PROCESO — still working, ask again later.
    Processing,
    /// The service has no record for the key yet. Treated like
    /// `Processing` by the orchestrator.
    NoResponseYet,
    /// The call itself failed; see the classified failure.
    ConnectionError,
}

/// Result of [`AuthorizationService::query_authorization`].
#[derive(Debug, Clone)]
pub struct AuthorizationResponse {
    pub status: AuthorizationStatus,
    pub authorization_number: Option<String>,
    /// The service's own date string, verbatim.
    pub authorization_date: Option<String>,
    /// The authorized comprobante XML, verbatim.
    pub authorized_xml: Option<String>,
    pub messages: Vec<ServiceMessage>,
    /// Present exactly when `status == ConnectionError`.
    pub failure: Option<TransportFailure>,
    /// Endpoint the call was made against (for the audit trail).
    pub endpoint: String,
    pub elapsed_ms: u64,
}

impl AuthorizationResponse {
    pub(crate) fn failed(failure: TransportFailure, endpoint: String, elapsed_ms: u64) -> Self {
        Self {
            status: AuthorizationStatus::ConnectionError,
            authorization_number: None,
            authorization_date: None,
            authorized_xml: None,
            messages: Vec::new(),
            failure: Some(failure),
            endpoint,
            elapsed_ms,
        }
    }
}

/// The two service operations, injectable so the orchestrator can run
/// against fakes in tests.
#[async_trait]
pub trait AuthorizationService: Send + Sync {
    async fn submit(&self, signed_xml: &[u8], environment: Environment) -> ReceptionResponse;

    async fn query_authorization(
        &self,
        access_key: &str,
        environment: Environment,
    ) -> AuthorizationResponse;
}
