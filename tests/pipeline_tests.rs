#![cfg(feature = "pipeline")]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use comprobante::core::*;
use comprobante::pipeline::*;
use comprobante::signature::SignedDocument;
use comprobante::transport::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 6, 15, 0, 0).unwrap()
}

fn emitter() -> Emitter {
    Emitter {
        legal_name: "COMERCIAL ANDINA S.A.".into(),
        trade_name: None,
        ruc: "1790016919001".into(),
        head_office_address: "Av. Amazonas N34-12, Quito".into(),
        establishment_address: None,
        special_taxpayer: None,
        keeps_accounting: true,
    }
}

fn draft_invoice() -> ElectronicDocument {
    DocumentBuilder::new(date(2026, 2, 6))
        .emitter(emitter())
        .sequence(1)
        .numeric_code("12345678")
        .payment(PaymentMethodCode::Cash, dec!(11.50))
        .detail(DocumentDetail::Invoice(InvoiceDetail {
            customer: CounterpartBuilder::final_consumer().build(),
            remission_guide: None,
            lines: vec![
                LineItemBuilder::new("PRD-001", "Venta mostrador", dec!(1), dec!(10))
                    .vat("4", dec!(15))
                    .build(),
            ],
        }))
        .build()
        .unwrap()
}

fn stored(state: LifecycleState) -> StoredDocument {
    StoredDocument {
        id: "doc-1".into(),
        company_id: "company-1".into(),
        state,
        document: draft_invoice(),
        access_key: None,
    }
}

// --- Fakes ---

#[derive(Default)]
struct FakeStoreState {
    document: Option<StoredDocument>,
    updates: Vec<DocumentUpdate>,
    audits: Vec<AuditRecord>,
}

struct FakeDocuments {
    state: Mutex<FakeStoreState>,
}

impl FakeDocuments {
    fn holding(document: StoredDocument) -> Self {
        Self {
            state: Mutex::new(FakeStoreState {
                document: Some(document),
                ..FakeStoreState::default()
            }),
        }
    }

    fn states(&self) -> Vec<LifecycleState> {
        self.state
            .lock()
            .unwrap()
            .updates
            .iter()
            .filter_map(|u| u.state)
            .collect()
    }

    fn audits(&self) -> Vec<AuditRecord> {
        self.state.lock().unwrap().audits.clone()
    }
}

#[async_trait]
impl DocumentStore for FakeDocuments {
    async fn fetch(&self, document_id: &str) -> Result<StoredDocument, ComprobanteError> {
        self.state
            .lock()
            .unwrap()
            .document
            .clone()
            .ok_or_else(|| ComprobanteError::Store(format!("unknown document {document_id}")))
    }

    async fn update(
        &self,
        _document_id: &str,
        update: DocumentUpdate,
    ) -> Result<(), ComprobanteError> {
        let mut state = self.state.lock().unwrap();
        if let (Some(document), Some(new_state)) = (state.document.as_mut(), update.state) {
            document.state = new_state;
        }
        state.updates.push(update);
        Ok(())
    }

    async fn append_audit(
        &self,
        _document_id: &str,
        record: AuditRecord,
    ) -> Result<(), ComprobanteError> {
        self.state.lock().unwrap().audits.push(record);
        Ok(())
    }
}

struct FakeSigner;

#[async_trait]
impl DocumentSigner for FakeSigner {
    async fn sign(
        &self,
        _company_id: &str,
        unsigned_xml: &str,
        signing_time: DateTime<Utc>,
    ) -> Result<SignedDocument, ComprobanteError> {
        Ok(SignedDocument {
            xml: format!("{unsigned_xml}<!--ds:Signature-->"),
            signing_time,
            certificate_fingerprint: "00".repeat(20),
            issuer_name: "CN=FAKE".into(),
            serial_number: "1".into(),
        })
    }
}

struct FailingSigner;

#[async_trait]
impl DocumentSigner for FailingSigner {
    async fn sign(
        &self,
        _company_id: &str,
        _unsigned_xml: &str,
        _signing_time: DateTime<Utc>,
    ) -> Result<SignedDocument, ComprobanteError> {
        Err(ComprobanteError::Certificate(
            "container MAC verification failed — wrong passphrase".into(),
        ))
    }
}

struct FakeService {
    reception: ReceptionStatus,
    polls: Mutex<VecDeque<AuthorizationStatus>>,
    poll_calls: Mutex<u32>,
}

impl FakeService {
    fn new(reception: ReceptionStatus, polls: Vec<AuthorizationStatus>) -> Self {
        Self {
            reception,
            polls: Mutex::new(polls.into()),
            poll_calls: Mutex::new(0),
        }
    }

    fn poll_count(&self) -> u32 {
        *self.poll_calls.lock().unwrap()
    }
}

#[async_trait]
impl AuthorizationService for FakeService {
    async fn submit(&self, _signed_xml: &[u8], _environment: Environment) -> ReceptionResponse {
        match self.reception {
            ReceptionStatus::ConnectionError => ReceptionResponse {
                status: ReceptionStatus::ConnectionError,
                messages: vec![],
                failure: Some(TransportFailure {
                    kind: TransportErrorKind::Timeout,
                    message: "deadline elapsed".into(),
                }),
                endpoint: "https://fake/recepcion".into(),
                elapsed_ms: 5,
            },
            status => ReceptionResponse {
                status,
                messages: vec![],
                failure: None,
                endpoint: "https://fake/recepcion".into(),
                elapsed_ms: 5,
            },
        }
    }

    async fn query_authorization(
        &self,
        access_key: &str,
        _environment: Environment,
    ) -> AuthorizationResponse {
        *self.poll_calls.lock().unwrap() += 1;
        let status = self
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AuthorizationStatus::Processing);
        AuthorizationResponse {
            status,
            authorization_number: matches!(status, AuthorizationStatus::Authorized)
                .then(|| access_key.to_string()),
            authorization_date: matches!(status, AuthorizationStatus::Authorized)
                .then(|| "2026-02-06T15:00:00-05:00".into()),
            authorized_xml: matches!(status, AuthorizationStatus::Authorized)
                .then(|| "<factura id=\"comprobante\" version=\"2.1.0\"></factura>".into()),
            messages: vec![],
            failure: None,
            endpoint: "https://fake/autorizacion".into(),
            elapsed_ms: 7,
        }
    }
}

fn orchestrator(
    documents: FakeDocuments,
    service: FakeService,
) -> Orchestrator<FakeDocuments, FakeSigner, FakeService> {
    Orchestrator::new(documents, FakeSigner, service)
        .with_polling(5, Duration::ZERO)
        .with_clock(fixed_now)
}

// --- State machine ---

#[tokio::test]
async fn returned_submission_is_terminal_with_zero_polls() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(ReceptionStatus::Returned, vec![]),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::Returned);
    assert_eq!(orchestrator.service().poll_count(), 0);
    let states = orchestrator.documents().states();
    assert_eq!(
        states,
        vec![LifecycleState::Signed, LifecycleState::Returned]
    );
}

#[tokio::test]
async fn authorized_on_first_poll() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(
            ReceptionStatus::Received,
            vec![AuthorizationStatus::Authorized],
        ),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::Authorized);
    assert!(outcome.authorization_number.is_some());
    assert_eq!(orchestrator.service().poll_count(), 1);
    let states = orchestrator.documents().states();
    assert_eq!(
        states,
        vec![
            LifecycleState::Signed,
            LifecycleState::Sent,
            LifecycleState::Authorized
        ]
    );
}

#[tokio::test]
async fn exhausted_polls_end_in_processing_not_error() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(
            ReceptionStatus::Received,
            vec![AuthorizationStatus::Processing; 5],
        ),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::Processing);
    assert_eq!(orchestrator.service().poll_count(), 5);
    assert_eq!(
        orchestrator.documents().states().last(),
        Some(&LifecycleState::Processing)
    );
}

#[tokio::test]
async fn rejection_mid_polling_is_terminal() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(
            ReceptionStatus::Received,
            vec![
                AuthorizationStatus::Processing,
                AuthorizationStatus::NotAuthorized,
            ],
        ),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::NotAuthorized);
    assert_eq!(orchestrator.service().poll_count(), 2);
}

#[tokio::test]
async fn no_response_yet_counts_like_processing() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(
            ReceptionStatus::Received,
            vec![
                AuthorizationStatus::NoResponseYet,
                AuthorizationStatus::NoResponseYet,
                AuthorizationStatus::Authorized,
            ],
        ),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::Authorized);
    assert_eq!(orchestrator.service().poll_count(), 3);
}

#[tokio::test]
async fn submission_connection_error_stays_signed_and_never_retries() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(ReceptionStatus::ConnectionError, vec![]),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::Signed);
    assert!(!outcome.errors.is_empty());
    assert_eq!(orchestrator.service().poll_count(), 0);
    // Stays signed so a later run resumes from submission.
    assert_eq!(
        orchestrator.documents().states(),
        vec![LifecycleState::Signed]
    );
}

// --- Ordering and pre-flight ---

#[tokio::test]
async fn only_draft_documents_enter_the_pipeline() {
    for state in [
        LifecycleState::Signed,
        LifecycleState::Sent,
        LifecycleState::Authorized,
        LifecycleState::Voided,
    ] {
        let orchestrator = orchestrator(
            FakeDocuments::holding(stored(state)),
            FakeService::new(ReceptionStatus::Received, vec![]),
        );
        let err = orchestrator.process("doc-1").await.unwrap_err();
        assert!(matches!(err, ComprobanteError::Ordering(_)), "{state:?}");
    }
}

#[tokio::test]
async fn validation_failure_reports_without_leaving_draft() {
    let mut document = stored(LifecycleState::Draft);
    document.document.payments.clear();
    let orchestrator = orchestrator(
        FakeDocuments::holding(document),
        FakeService::new(ReceptionStatus::Received, vec![]),
    );
    let outcome = orchestrator.process("doc-1").await.unwrap();

    assert_eq!(outcome.state, LifecycleState::Draft);
    assert!(!outcome.errors.is_empty());
    assert!(outcome.access_key.is_none());
    // Nothing persisted, nothing sent.
    assert!(orchestrator.documents().states().is_empty());
    assert_eq!(orchestrator.service().poll_count(), 0);
}

#[tokio::test]
async fn certificate_failure_is_fatal_and_precedes_submission() {
    let orchestrator = Orchestrator::new(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FailingSigner,
        FakeService::new(ReceptionStatus::Received, vec![]),
    )
    .with_polling(5, Duration::ZERO)
    .with_clock(fixed_now);

    let err = orchestrator.process("doc-1").await.unwrap_err();
    assert!(matches!(err, ComprobanteError::Certificate(_)));
}

// --- Audit trail ---

#[tokio::test]
async fn every_protocol_interaction_is_audited() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(
            ReceptionStatus::Received,
            vec![
                AuthorizationStatus::Processing,
                AuthorizationStatus::Authorized,
            ],
        ),
    );
    orchestrator.process("doc-1").await.unwrap();

    let audits = orchestrator.documents().audits();
    assert_eq!(audits.len(), 3); // 1 reception + 2 polls
    assert_eq!(audits[0].operation, ProtocolOperation::Reception);
    assert_eq!(audits[0].status, "RECIBIDA");
    assert_eq!(audits[0].endpoint, "https://fake/recepcion");
    assert_eq!(audits[1].operation, ProtocolOperation::AuthorizationQuery);
    assert_eq!(audits[1].status, "EN PROCESO");
    assert_eq!(audits[2].status, "AUTORIZADO");
    for audit in &audits {
        assert_eq!(audit.recorded_at, fixed_now());
    }
}

#[tokio::test]
async fn failed_submission_is_audited_with_its_kind() {
    let orchestrator = orchestrator(
        FakeDocuments::holding(stored(LifecycleState::Draft)),
        FakeService::new(ReceptionStatus::ConnectionError, vec![]),
    );
    orchestrator.process("doc-1").await.unwrap();

    let audits = orchestrator.documents().audits();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].status, "timeout");
    assert!(audits[0].payload_excerpt.contains("deadline elapsed"));
}

