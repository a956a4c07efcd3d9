//! Core document types, access keys, checksums, and validation.
//!
//! This module provides the foundational types for Ecuadorian electronic
//! receipts (comprobantes electrónicos): the document model, the 49-digit
//! access key, RUC/cédula checksum validation, and pre-signature document
//! validation.

pub mod access_key;
mod builder;
mod error;
mod identification;
mod lifecycle;
mod types;
mod validation;

pub use access_key::{AccessKey, AccessKeyFields, AccessKeyIssue, KeyRequest};
pub use builder::{CounterpartBuilder, DocumentBuilder, LineItemBuilder};
pub use error::{ComprobanteError, TransportErrorKind, ValidationError};
pub use identification::{
    IdentificationError, validate_cedula, validate_identification, validate_ruc,
};
pub use lifecycle::LifecycleState;
pub use types::*;
pub use validation::{compute_totals, tax_amount, tax_summary, validate_document};
