use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::{
    ComprobanteError, KeyRequest, LifecycleState, access_key, validate_document,
};
use crate::transport::{
    AuthorizationResponse, AuthorizationService, AuthorizationStatus, ReceptionResponse,
    ReceptionStatus, ServiceMessage,
};
use crate::xml::Encode;

use super::signer::DocumentSigner;
use super::store::{AuditRecord, DocumentStore, DocumentUpdate, ProtocolOperation, audit_excerpt};

/// Fixed ceiling of authorization-poll attempts per run.
pub const POLL_ATTEMPTS: u32 = 5;

/// Fixed delay between poll attempts.
pub const POLL_DELAY: Duration = Duration::from_millis(3000);

/// Result of one orchestration run: the last known lifecycle state plus,
/// where available, the service's own message list.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub state: LifecycleState,
    pub access_key: Option<String>,
    pub authorization_number: Option<String>,
    pub messages: Vec<ServiceMessage>,
    pub errors: Vec<String>,
}

impl ProcessOutcome {
    fn new(state: LifecycleState) -> Self {
        Self {
            state,
            access_key: None,
            authorization_number: None,
            messages: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Drives the validate → key → encode → sign → submit → poll pipeline
/// and owns all lifecycle transitions.
///
/// Collaborators are constructor-injected so tests can substitute fakes
/// without process-wide mutation. One run is strictly sequential;
/// independent documents may run concurrently with no shared state
/// beyond the stores.
pub struct Orchestrator<D, S, T> {
    documents: D,
    signer: S,
    service: T,
    poll_attempts: u32,
    poll_delay: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl<D, S, T> Orchestrator<D, S, T>
where
    D: DocumentStore,
    S: DocumentSigner,
    T: AuthorizationService,
{
    pub fn new(documents: D, signer: S, service: T) -> Self {
        Self {
            documents,
            signer,
            service,
            poll_attempts: POLL_ATTEMPTS,
            poll_delay: POLL_DELAY,
            clock: Utc::now,
        }
    }

    /// Override the poll ceiling and inter-attempt delay.
    pub fn with_polling(mut self, attempts: u32, delay: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_delay = delay;
        self
    }

    /// Inject a clock; signing time and audit timestamps come from it.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// The injected document store.
    pub fn documents(&self) -> &D {
        &self.documents
    }

    /// The injected authorization service.
    pub fn service(&self) -> &T {
        &self.service
    }

    /// Run the full authorization pipeline for one Draft document.
    ///
    /// The call blocks until a terminal state or the poll ceiling is
    /// reached; every state is persisted before the next network step,
    /// so an aborted run resumes from `Signed` or `Sent` rather than
    /// restarting from `Draft`.
    pub async fn process(&self, document_id: &str) -> Result<ProcessOutcome, ComprobanteError> {
        let stored = self.documents.fetch(document_id).await?;
        if stored.state != LifecycleState::Draft {
            return Err(ComprobanteError::Ordering(format!(
                "document {document_id} is {}; only draft documents may enter the pipeline",
                stored.state
            )));
        }
        let document = &stored.document;

        // Validation and key generation abort before any signing or
        // network cost is spent.
        let violations = validate_document(document);
        if !violations.is_empty() {
            debug!(document_id, count = violations.len(), "validation failed");
            let mut outcome = ProcessOutcome::new(LifecycleState::Draft);
            outcome.errors = violations.iter().map(ToString::to_string).collect();
            return Ok(outcome);
        }

        let access_key = access_key::generate(&KeyRequest::from_document(document))?;
        let unsigned_xml = document.encode(&access_key)?;

        let signed = self
            .signer
            .sign(&stored.company_id, &unsigned_xml, (self.clock)())
            .await?;

        self.documents
            .update(
                document_id,
                DocumentUpdate {
                    state: Some(LifecycleState::Signed),
                    access_key: Some(access_key.as_str().to_string()),
                    unsigned_xml: Some(unsigned_xml),
                    signed_xml: Some(signed.xml.clone()),
                    ..DocumentUpdate::default()
                },
            )
            .await?;
        info!(document_id, access_key = %access_key, "document signed");

        let environment = document.environment;
        let reception = self.service.submit(signed.xml.as_bytes(), environment).await;
        self.audit_reception(document_id, &reception).await?;

        let mut outcome = ProcessOutcome::new(LifecycleState::Signed);
        outcome.access_key = Some(access_key.as_str().to_string());
        outcome.messages = reception.messages.clone();

        match reception.status {
            ReceptionStatus::ConnectionError => {
                // Submission failures are surfaced immediately and never
                // retried: resubmitting an identical access key is
                // ambiguous to the external service.
                let failure = reception
                    .failure
                    .map(|f| f.message)
                    .unwrap_or_else(|| "submission failed".into());
                warn!(document_id, error = %failure, "submission failed, document stays signed");
                outcome.errors.push(failure);
                return Ok(outcome);
            }
            ReceptionStatus::Returned => {
                self.documents
                    .update(document_id, DocumentUpdate::state(LifecycleState::Returned))
                    .await?;
                info!(document_id, "comprobante returned at reception");
                outcome.state = LifecycleState::Returned;
                return Ok(outcome);
            }
            ReceptionStatus::Received => {
                self.documents
                    .update(document_id, DocumentUpdate::state(LifecycleState::Sent))
                    .await?;
                info!(document_id, "comprobante received, polling authorization");
            }
        }

        for attempt in 1..=self.poll_attempts {
            let response = self
                .service
                .query_authorization(access_key.as_str(), environment)
                .await;
            self.audit_authorization(document_id, &response).await?;
            debug!(document_id, attempt, status = ?response.status, "authorization poll");

            match response.status {
                AuthorizationStatus::Authorized => {
                    self.documents
                        .update(
                            document_id,
                            DocumentUpdate {
                                state: Some(LifecycleState::Authorized),
                                authorization_number: response.authorization_number.clone(),
                                authorization_date: response.authorization_date.clone(),
                                authorized_xml: response.authorized_xml.clone(),
                                ..DocumentUpdate::default()
                            },
                        )
                        .await?;
                    info!(document_id, "comprobante authorized");
                    outcome.state = LifecycleState::Authorized;
                    outcome.authorization_number = response.authorization_number;
                    outcome.messages = response.messages;
                    return Ok(outcome);
                }
                AuthorizationStatus::NotAuthorized => {
                    self.documents
                        .update(
                            document_id,
                            DocumentUpdate::state(LifecycleState::NotAuthorized),
                        )
                        .await?;
                    warn!(document_id, "comprobante not authorized");
                    outcome.state = LifecycleState::NotAuthorized;
                    outcome.messages = response.messages;
                    return Ok(outcome);
                }
                // "No response yet" is indistinguishable from "still
                // processing" for retry purposes; connection errors are
                // retried only here, inside the poll loop.
                AuthorizationStatus::Processing
                | AuthorizationStatus::NoResponseYet
                | AuthorizationStatus::ConnectionError => {
                    outcome.messages = response.messages;
                    if attempt < self.poll_attempts {
                        tokio::time::sleep(self.poll_delay).await;
                    }
                }
            }
        }

        // Ceiling exhausted without a terminal result. The engine does
        // not loop indefinitely; an external scheduler resumes from here.
        self.documents
            .update(document_id, DocumentUpdate::state(LifecycleState::Processing))
            .await?;
        info!(document_id, attempts = self.poll_attempts, "poll ceiling exhausted");
        outcome.state = LifecycleState::Processing;
        Ok(outcome)
    }

    async fn audit_reception(
        &self,
        document_id: &str,
        response: &ReceptionResponse,
    ) -> Result<(), ComprobanteError> {
        let status = match response.status {
            ReceptionStatus::Received => "RECIBIDA".to_string(),
            ReceptionStatus::Returned => "DEVUELTA".to_string(),
            ReceptionStatus::ConnectionError => failure_status(&response.failure),
        };
        let record = AuditRecord {
            operation: ProtocolOperation::Reception,
            endpoint: response.endpoint.clone(),
            status,
            payload_excerpt: audit_excerpt(&messages_payload(
                &response.messages,
                &response.failure,
            )),
            elapsed_ms: response.elapsed_ms,
            recorded_at: (self.clock)(),
        };
        self.documents.append_audit(document_id, record).await
    }

    async fn audit_authorization(
        &self,
        document_id: &str,
        response: &AuthorizationResponse,
    ) -> Result<(), ComprobanteError> {
        let status = match response.status {
            AuthorizationStatus::Authorized => "AUTORIZADO".to_string(),
            AuthorizationStatus::NotAuthorized => "NO AUTORIZADO".to_string(),
            AuthorizationStatus::Processing => "EN PROCESO".to_string(),
            AuthorizationStatus::NoResponseYet => "SIN RESPUESTA".to_string(),
            AuthorizationStatus::ConnectionError => failure_status(&response.failure),
        };
        let record = AuditRecord {
            operation: ProtocolOperation::AuthorizationQuery,
            endpoint: response.endpoint.clone(),
            status,
            payload_excerpt: audit_excerpt(&messages_payload(
                &response.messages,
                &response.failure,
            )),
            elapsed_ms: response.elapsed_ms,
            recorded_at: (self.clock)(),
        };
        self.documents.append_audit(document_id, record).await
    }
}

fn failure_status(failure: &Option<crate::transport::TransportFailure>) -> String {
    failure
        .as_ref()
        .map(|f| f.kind.to_string())
        .unwrap_or_else(|| "connection-error".into())
}

fn messages_payload(
    messages: &[ServiceMessage],
    failure: &Option<crate::transport::TransportFailure>,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(failure) = failure {
        parts.push(failure.message.clone());
    }
    for message in messages {
        parts.push(format!("[{}] {}", message.identifier, message.message));
    }
    parts.join("; ")
}
