//! PKCS#12 certificate-container handling.

use p12::PFX;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use sha1::{Digest, Sha1};
use x509_parser::prelude::*;

use crate::core::ComprobanteError;

/// Key material extracted from a certificate container: the private key
/// plus the leaf certificate the signature will be bound to.
#[derive(Clone)]
pub struct KeyMaterial {
    pub private_key: RsaPrivateKey,
    /// DER bytes of the signing certificate.
    pub certificate_der: Vec<u8>,
    /// Formatted issuer distinguished name.
    pub issuer_name: String,
    /// Certificate serial number in decimal form.
    pub serial_decimal: String,
}

impl KeyMaterial {
    /// SHA-1 fingerprint of the certificate DER bytes, lowercase hex.
    pub fn fingerprint_hex(&self) -> String {
        let digest = Sha1::digest(&self.certificate_der);
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Debug for KeyMaterial {
    // The private key never appears in debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("issuer_name", &self.issuer_name)
            .field("serial_decimal", &self.serial_decimal)
            .field("fingerprint", &self.fingerprint_hex())
            .finish_non_exhaustive()
    }
}

/// Extract the RSA private key and its matching leaf certificate from a
/// PKCS#12 container.
///
/// Fails with [`ComprobanteError::Certificate`] on a malformed container,
/// a wrong passphrase, or when no certificate in the bundle matches the
/// private key.
pub fn extract(container: &[u8], passphrase: &str) -> Result<KeyMaterial, ComprobanteError> {
    let pfx = PFX::parse(container).map_err(|e| {
        ComprobanteError::Certificate(format!("malformed PKCS#12 container: {e}"))
    })?;

    if !pfx.verify_mac(passphrase) {
        return Err(ComprobanteError::Certificate(
            "container MAC verification failed — wrong passphrase".into(),
        ));
    }

    let key_bags = pfx
        .key_bags(passphrase)
        .map_err(|e| ComprobanteError::Certificate(format!("unreadable key bags: {e}")))?;
    let private_key = key_bags
        .iter()
        .find_map(|der| RsaPrivateKey::from_pkcs8_der(der).ok())
        .ok_or_else(|| {
            ComprobanteError::Certificate("container holds no RSA private key".into())
        })?;

    let cert_bags = pfx
        .cert_x509_bags(passphrase)
        .map_err(|e| ComprobanteError::Certificate(format!("unreadable certificate bags: {e}")))?;

    // The bundle usually carries the full chain; the signing certificate
    // is the one whose public key matches the private key.
    for der in &cert_bags {
        let Ok((_, cert)) = X509Certificate::from_der(der) else {
            continue;
        };
        let Ok(public_key) = rsa::RsaPublicKey::from_public_key_der(cert.public_key().raw) else {
            continue;
        };
        if public_key.n() == private_key.n() {
            return Ok(KeyMaterial {
                issuer_name: cert.issuer().to_string(),
                serial_decimal: cert.tbs_certificate.serial.to_string(),
                certificate_der: der.clone(),
                private_key,
            });
        }
    }

    Err(ComprobanteError::Certificate(
        "container holds no certificate matching the private key".into(),
    ))
}
