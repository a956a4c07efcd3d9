//! Authorization pipeline orchestration.
//!
//! The orchestrator exclusively owns lifecycle transitions; the
//! [`DocumentStore`] is the single source of truth for persisted state,
//! and every protocol interaction leaves one append-only [`AuditRecord`].
//!
//! # Example
//!
//! ```ignore
//! use comprobante::pipeline::{Orchestrator, XadesSigner};
//! use comprobante::transport::SriClient;
//!
//! let orchestrator = Orchestrator::new(
//!     documents,
//!     XadesSigner::new(certificates),
//!     SriClient::with_defaults()?,
//! );
//! let outcome = orchestrator.process("doc-42").await?;
//! println!("{} -> {:?}", outcome.state, outcome.authorization_number);
//! ```

mod orchestrator;
mod signer;
mod store;

pub use orchestrator::{Orchestrator, POLL_ATTEMPTS, POLL_DELAY, ProcessOutcome};
pub use signer::{DocumentSigner, XadesSigner};
pub use store::{
    AuditRecord, CertificateStore, DocumentStore, DocumentUpdate, ProtocolOperation,
    SigningCredentials, StoredDocument,
};
