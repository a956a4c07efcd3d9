//! # comprobante
//!
//! Ecuadorian e-invoicing library covering the authorization pipeline:
//! comprobante XML generation, XAdES-BES enveloped signing, and the SRI
//! reception/authorization web services.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Document types follow the SRI ficha técnica for comprobantes electrónicos
//! (esquema offline).
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use comprobante::core::*;
//!
//! let request = KeyRequest {
//!     issue_date: NaiveDate::from_ymd_opt(2026, 2, 6).unwrap(),
//!     kind: DocumentKind::Invoice,
//!     ruc: "1790016919001".into(),
//!     environment: Environment::Test,
//!     establishment: "001".into(),
//!     emission_point: "001".into(),
//!     sequence: 1,
//!     numeric_code: Some("12345678".into()),
//!     emission_type: EmissionType::Normal,
//! };
//!
//! let key = access_key::generate(&request).unwrap();
//! assert!(key.as_str().starts_with("06022026"));
//! assert!(access_key::validate(key.as_str()).is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, access keys, checksums, validation |
//! | `xml` | Per-variant comprobante XML encoders |
//! | `signature` | PKCS#12 key extraction, C14N, XAdES-BES signing |
//! | `transport` | SRI SOAP client with classified errors |
//! | `pipeline` | Stores, audit trail, and the orchestrator state machine |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "signature")]
pub mod signature;

#[cfg(feature = "transport")]
pub mod transport;

#[cfg(feature = "pipeline")]
pub mod pipeline;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
