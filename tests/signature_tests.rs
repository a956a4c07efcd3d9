#![cfg(feature = "signature")]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{TimeZone, Utc};
use comprobante::signature::{self, KeyMaterial};
use rsa::RsaPrivateKey;
use sha1::{Digest, Sha1};

const UNSIGNED: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
    <factura id=\"comprobante\" version=\"2.1.0\">\
    <infoTributaria><ambiente>1</ambiente><ruc>1790016919001</ruc>\
    <claveAcceso>0602202601179001691900110010010000000011234567812</claveAcceso>\
    </infoTributaria></factura>";

fn material() -> KeyMaterial {
    // A generated key plus fixed certificate metadata: the signer digests
    // and embeds the DER bytes without reparsing them, so the container
    // round-trip is not needed here.
    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
    KeyMaterial {
        private_key,
        certificate_der: vec![0x30, 0x82, 0x01, 0x0a, 0x02, 0x82],
        issuer_name: "CN=AC PRUEBAS, O=ENTIDAD DE CERTIFICACION, C=EC".into(),
        serial_decimal: "8402317292846".into(),
    }
}

#[test]
fn signing_is_deterministic_for_fixed_inputs() {
    let material = material();
    let time = Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 0).unwrap();

    let first = signature::sign_enveloped(UNSIGNED, &material, time).unwrap();
    let second = signature::sign_enveloped(UNSIGNED, &material, time).unwrap();
    assert_eq!(first.xml, second.xml);
}

#[test]
fn signature_is_enveloped_as_last_child() {
    let material = material();
    let time = Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 0).unwrap();
    let signed = signature::sign_enveloped(UNSIGNED, &material, time).unwrap();

    let signature_at = signed.xml.find("<ds:Signature ").unwrap();
    let close_at = signed.xml.rfind("</factura>").unwrap();
    assert!(signature_at < close_at);
    assert!(signed.xml.ends_with("</ds:Signature></factura>"));
    // Everything before the signature is the original document.
    assert!(signed.xml.starts_with(&UNSIGNED[..signature_at]));
}

#[test]
fn content_digest_matches_canonical_body() {
    let material = material();
    let time = Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 0).unwrap();
    let signed = signature::sign_enveloped(UNSIGNED, &material, time).unwrap();

    let canonical = signature::canonicalize(UNSIGNED).unwrap();
    let expected = BASE64.encode(Sha1::digest(canonical.as_bytes()));

    let embedded = digest_for_reference(&signed.xml, "URI=\"#comprobante\"");
    assert_eq!(embedded, expected);
}

#[test]
fn certificate_digest_is_bound_into_signed_properties() {
    let material = material();
    let time = Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 0).unwrap();
    let signed = signature::sign_enveloped(UNSIGNED, &material, time).unwrap();

    let expected = BASE64.encode(Sha1::digest(&material.certificate_der));
    assert!(signed.xml.contains(&expected));
    assert!(
        signed
            .xml
            .contains("<ds:X509IssuerName>CN=AC PRUEBAS, O=ENTIDAD DE CERTIFICACION, C=EC</ds:X509IssuerName>")
    );
    assert!(signed.xml.contains("<ds:X509SerialNumber>8402317292846</ds:X509SerialNumber>"));
    assert!(signed.xml.contains("<etsi:SigningTime>2026-02-06T15:30:00Z</etsi:SigningTime>"));
}

#[test]
fn metadata_reflects_the_material() {
    let material = material();
    let time = Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 0).unwrap();
    let signed = signature::sign_enveloped(UNSIGNED, &material, time).unwrap();

    assert_eq!(signed.signing_time, time);
    assert_eq!(signed.certificate_fingerprint, material.fingerprint_hex());
    assert_eq!(signed.issuer_name, material.issuer_name);
    assert_eq!(signed.serial_number, material.serial_decimal);
    assert_eq!(signed.certificate_fingerprint.len(), 40);
}

#[test]
fn different_signing_times_change_the_signature() {
    let material = material();
    let first = signature::sign_enveloped(
        UNSIGNED,
        &material,
        Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 0).unwrap(),
    )
    .unwrap();
    let second = signature::sign_enveloped(
        UNSIGNED,
        &material,
        Utc.with_ymd_and_hms(2026, 2, 6, 15, 30, 1).unwrap(),
    )
    .unwrap();
    assert_ne!(first.xml, second.xml);
}

#[test]
fn extract_rejects_garbage_containers() {
    let err = signature::extract(b"definitely not pkcs12", "secret").unwrap_err();
    assert!(matches!(
        err,
        comprobante::core::ComprobanteError::Certificate(_)
    ));
}

/// Pull the DigestValue of the ds:Reference whose tag contains `marker`.
fn digest_for_reference(xml: &str, marker: &str) -> String {
    let reference_at = xml.find(marker).expect("reference present");
    let digest_open = "<ds:DigestValue>";
    let start = xml[reference_at..].find(digest_open).unwrap() + reference_at + digest_open.len();
    let end = xml[start..].find("</ds:DigestValue>").unwrap() + start;
    xml[start..end].to_string()
}
