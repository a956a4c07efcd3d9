//! Comprobante XML generation.
//!
//! One encoder per document-type variant, each serializing against its
//! pinned schema version. Dispatch happens on the [`DocumentDetail`]
//! discriminant through the [`Encode`] trait — no runtime type
//! inspection.
//!
//! # Example
//!
//! ```no_run
//! use comprobante::core::*;
//! use comprobante::xml::Encode;
//!
//! let document: ElectronicDocument = todo!(); // build via DocumentBuilder
//! let key = access_key::generate(&KeyRequest::from_document(&document)).unwrap();
//! let xml = document.encode(&key).unwrap();
//! ```

mod common;
mod credit_note;
mod debit_note;
mod invoice;
mod purchase_settlement;
mod shipping_guide;
mod withholding;
pub(crate) mod writer;

pub use writer::{format_amount, format_date, format_quantity};

use crate::core::{AccessKey, ComprobanteError, DocumentDetail, ElectronicDocument};

/// Value of the root `id` attribute, referenced by the enveloped
/// signature.
pub const DOCUMENT_ID_ATTR: &str = "comprobante";

/// Pinned schema versions — each variant pins its own version string.
pub const INVOICE_SCHEMA_VERSION: &str = "2.1.0";
pub const PURCHASE_SETTLEMENT_SCHEMA_VERSION: &str = "1.1.0";
pub const CREDIT_NOTE_SCHEMA_VERSION: &str = "1.1.0";
pub const DEBIT_NOTE_SCHEMA_VERSION: &str = "1.0.0";
pub const SHIPPING_GUIDE_SCHEMA_VERSION: &str = "1.1.0";
pub const WITHHOLDING_SCHEMA_VERSION: &str = "1.0.0";

/// Serialize a document against its variant's pinned schema.
pub trait Encode {
    /// Emit UTF-8 XML carrying the given access key. Output is
    /// deterministic: encoding the same document twice yields identical
    /// bytes.
    fn encode(&self, access_key: &AccessKey) -> Result<String, ComprobanteError>;
}

impl Encode for ElectronicDocument {
    fn encode(&self, access_key: &AccessKey) -> Result<String, ComprobanteError> {
        match &self.detail {
            DocumentDetail::Invoice(d) => invoice::encode(self, d, access_key),
            DocumentDetail::PurchaseSettlement(d) => {
                purchase_settlement::encode(self, d, access_key)
            }
            DocumentDetail::CreditNote(d) => credit_note::encode(self, d, access_key),
            DocumentDetail::DebitNote(d) => debit_note::encode(self, d, access_key),
            DocumentDetail::ShippingGuide(d) => shipping_guide::encode(self, d, access_key),
            DocumentDetail::WithholdingReceipt(d) => withholding::encode(self, d, access_key),
        }
    }
}
