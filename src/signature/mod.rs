//! XAdES-BES enveloped signing.
//!
//! Turns an unsigned comprobante plus a PKCS#12 certificate container
//! into a signed document whose signature is bound to a specific
//! certificate (digest, issuer, serial) rather than just a key.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use comprobante::signature;
//!
//! let container: Vec<u8> = std::fs::read("firma.p12").unwrap();
//! let material = signature::extract(&container, "passphrase").unwrap();
//! let unsigned = "<factura id=\"comprobante\" version=\"2.1.0\">...</factura>";
//! let signed = signature::sign_enveloped(unsigned, &material, Utc::now()).unwrap();
//! assert!(signed.xml.contains("<ds:Signature"));
//! ```

pub mod c14n;
mod keystore;
mod xades;

pub use c14n::canonicalize;
pub use keystore::{KeyMaterial, extract};
pub use xades::{SignedDocument, sign_enveloped};
