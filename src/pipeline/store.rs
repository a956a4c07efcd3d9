use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ComprobanteError, ElectronicDocument, LifecycleState};

/// A persisted document as the store returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    /// Owner company, used to look up the active signing certificate.
    pub company_id: String,
    pub state: LifecycleState,
    pub document: ElectronicDocument,
    pub access_key: Option<String>,
}

/// Partial-field state update. `None` fields are left untouched by the
/// store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub state: Option<LifecycleState>,
    pub access_key: Option<String>,
    pub unsigned_xml: Option<String>,
    pub signed_xml: Option<String>,
    pub authorization_number: Option<String>,
    pub authorization_date: Option<String>,
    pub authorized_xml: Option<String>,
}

impl DocumentUpdate {
    pub fn state(state: LifecycleState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }
}

/// Protocol operation recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolOperation {
    Reception,
    AuthorizationQuery,
}

impl ProtocolOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reception => "reception",
            Self::AuthorizationQuery => "authorization-query",
        }
    }
}

/// One protocol interaction, append-only: the compliance trail is never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub operation: ProtocolOperation,
    pub endpoint: String,
    /// Response status as reported (RECIBIDA, AUTORIZADO, a failure kind…).
    pub status: String,
    /// Truncated, redacted response payload.
    pub payload_excerpt: String,
    pub elapsed_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Maximum audit payload excerpt length, in bytes.
pub(crate) const AUDIT_EXCERPT_MAX: usize = 2000;

/// Truncate at a char boundary; audit rows stay bounded regardless of
/// what the service sends back.
pub(crate) fn audit_excerpt(payload: &str) -> String {
    if payload.len() <= AUDIT_EXCERPT_MAX {
        return payload.into();
    }
    let mut end = AUDIT_EXCERPT_MAX;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &payload[..end])
}

/// Certificate container plus its decrypted passphrase.
///
/// The passphrase never appears in `Debug` output and must never be
/// logged.
#[derive(Clone)]
pub struct SigningCredentials {
    pub container: Vec<u8>,
    pub passphrase: String,
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("container_bytes", &self.container.len())
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// The single source of truth for persisted document state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the full nested document by id.
    async fn fetch(&self, document_id: &str) -> Result<StoredDocument, ComprobanteError>;

    /// Apply a partial-field update.
    async fn update(
        &self,
        document_id: &str,
        update: DocumentUpdate,
    ) -> Result<(), ComprobanteError>;

    /// Append one audit record to the document's trail.
    async fn append_audit(
        &self,
        document_id: &str,
        record: AuditRecord,
    ) -> Result<(), ComprobanteError>;
}

/// Source of the active signing certificate per company.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn active_certificate(
        &self,
        company_id: &str,
    ) -> Result<SigningCredentials, ComprobanteError>;
}
