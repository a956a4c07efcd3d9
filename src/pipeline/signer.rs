use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::ComprobanteError;
use crate::signature::{self, SignedDocument};

use super::store::CertificateStore;

/// Signs an encoded comprobante on behalf of a company.
///
/// Injected into the orchestrator so tests can substitute a fake without
/// a real certificate container.
#[async_trait]
pub trait DocumentSigner: Send + Sync {
    async fn sign(
        &self,
        company_id: &str,
        unsigned_xml: &str,
        signing_time: DateTime<Utc>,
    ) -> Result<SignedDocument, ComprobanteError>;
}

/// Production signer: pulls the company's active certificate container
/// from the [`CertificateStore`], extracts the key material, and produces
/// the XAdES-BES enveloped signature.
pub struct XadesSigner<C> {
    certificates: C,
}

impl<C> XadesSigner<C> {
    pub fn new(certificates: C) -> Self {
        Self { certificates }
    }
}

#[async_trait]
impl<C: CertificateStore> DocumentSigner for XadesSigner<C> {
    async fn sign(
        &self,
        company_id: &str,
        unsigned_xml: &str,
        signing_time: DateTime<Utc>,
    ) -> Result<SignedDocument, ComprobanteError> {
        let credentials = self.certificates.active_certificate(company_id).await?;
        let material = signature::extract(&credentials.container, &credentials.passphrase)?;
        signature::sign_enveloped(unsigned_xml, &material, signing_time)
    }
}
