//! XAdES-BES enveloped signature assembly.
//!
//! The signature block is built in canonical form directly: fixed ids,
//! attributes already in canonical order, no insignificant whitespace.
//! Fragments that get digested standalone (SignedProperties, KeyInfo,
//! SignedInfo) are rendered twice — once with the namespace declarations
//! an inclusive canonicalization of the assembled document would place on
//! them, once bare for embedding under `ds:Signature`, where the
//! declarations are inherited.
//!
//! Given identical unsigned XML, certificate, and signing time, the
//! output is byte-reproducible.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use rsa::Pkcs1v15Sign;
use rsa::traits::PublicKeyParts;
use sha1::{Digest, Sha1};

use crate::core::ComprobanteError;

use super::c14n::canonicalize;
use super::keystore::KeyMaterial;

const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
const ETSI_NS: &str = "http://uri.etsi.org/01903/v1.3.2#";

const C14N_ALGORITHM: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
const RSA_SHA1_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
const SHA1_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
const ENVELOPED_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
const SIGNED_PROPERTIES_TYPE: &str = "http://uri.etsi.org/01903#SignedProperties";

/// A signed document: the XML plus the signature metadata bound into it.
#[derive(Debug, Clone)]
pub struct SignedDocument {
    pub xml: String,
    pub signing_time: DateTime<Utc>,
    /// SHA-1 fingerprint of the signing certificate, lowercase hex.
    pub certificate_fingerprint: String,
    pub issuer_name: String,
    pub serial_number: String,
}

/// Sign an unsigned comprobante, inserting the XAdES-BES signature as the
/// last child of the document root.
pub fn sign_enveloped(
    unsigned_xml: &str,
    material: &KeyMaterial,
    signing_time: DateTime<Utc>,
) -> Result<SignedDocument, ComprobanteError> {
    // 1. Content digest over the canonical document body. The signature
    //    is not present yet, so the enveloped transform is a no-op here.
    let body_c14n = canonicalize(unsigned_xml)?;
    let document_digest = sha1_b64(body_c14n.as_bytes());

    let certificate_b64 = BASE64.encode(&material.certificate_der);
    let certificate_digest = sha1_b64(&material.certificate_der);
    let modulus_b64 = BASE64.encode(material.private_key.n().to_bytes_be());
    let exponent_b64 = BASE64.encode(material.private_key.e().to_bytes_be());
    let time = signing_time.to_rfc3339_opts(SecondsFormat::Secs, true);

    // 2. Key info, digested standalone.
    let key_info_digest = {
        let standalone = key_info(true, &certificate_b64, &modulus_b64, &exponent_b64);
        sha1_b64(standalone.as_bytes())
    };

    // 3. Signed properties, digested standalone.
    let properties_digest = {
        let standalone = signed_properties(
            true,
            &time,
            &certificate_digest,
            &material.issuer_name,
            &material.serial_decimal,
        );
        sha1_b64(standalone.as_bytes())
    };

    // 4. Signed info over the three digests; RSA-SHA1 over its canonical
    //    bytes yields the signature value.
    let signature_value = {
        let standalone = signed_info(true, &properties_digest, &key_info_digest, &document_digest);
        let digest = Sha1::digest(standalone.as_bytes());
        let signature = material
            .private_key
            .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
            .map_err(|e| ComprobanteError::Signature(format!("RSA signing failed: {e}")))?;
        BASE64.encode(signature)
    };

    // 5. Assemble and insert before the root's closing tag.
    let signature_block = format!(
        "<ds:Signature xmlns:ds=\"{DS_NS}\" xmlns:etsi=\"{ETSI_NS}\" Id=\"Signature\">\
         {signed_info}\
         <ds:SignatureValue Id=\"SignatureValue\">{signature_value}</ds:SignatureValue>\
         {key_info}\
         <ds:Object Id=\"Signature-Object\">\
         <etsi:QualifyingProperties Target=\"#Signature\">\
         {signed_properties}\
         </etsi:QualifyingProperties>\
         </ds:Object>\
         </ds:Signature>",
        signed_info = signed_info(false, &properties_digest, &key_info_digest, &document_digest),
        key_info = key_info(false, &certificate_b64, &modulus_b64, &exponent_b64),
        signed_properties = signed_properties(
            false,
            &time,
            &certificate_digest,
            &material.issuer_name,
            &material.serial_decimal,
        ),
    );

    let insert_at = unsigned_xml.rfind("</").ok_or_else(|| {
        ComprobanteError::Signature("unsigned document has no root closing tag".into())
    })?;
    let mut xml = String::with_capacity(unsigned_xml.len() + signature_block.len());
    xml.push_str(&unsigned_xml[..insert_at]);
    xml.push_str(&signature_block);
    xml.push_str(&unsigned_xml[insert_at..]);

    Ok(SignedDocument {
        xml,
        signing_time,
        certificate_fingerprint: material.fingerprint_hex(),
        issuer_name: material.issuer_name.clone(),
        serial_number: material.serial_decimal.clone(),
    })
}

fn ns_decls(with_ns: bool) -> &'static str {
    if with_ns {
        // Inclusive C14N of a subtree emits every in-scope declaration on
        // its apex element, sorted by prefix.
        r#" xmlns:ds="http://www.w3.org/2000/09/xmldsig#" xmlns:etsi="http://uri.etsi.org/01903/v1.3.2#""#
    } else {
        ""
    }
}

fn key_info(with_ns: bool, certificate_b64: &str, modulus_b64: &str, exponent_b64: &str) -> String {
    format!(
        "<ds:KeyInfo{ns} Id=\"Certificate\">\
         <ds:X509Data>\
         <ds:X509Certificate>{certificate_b64}</ds:X509Certificate>\
         </ds:X509Data>\
         <ds:KeyValue>\
         <ds:RSAKeyValue>\
         <ds:Modulus>{modulus_b64}</ds:Modulus>\
         <ds:Exponent>{exponent_b64}</ds:Exponent>\
         </ds:RSAKeyValue>\
         </ds:KeyValue>\
         </ds:KeyInfo>",
        ns = ns_decls(with_ns),
    )
}

fn signed_properties(
    with_ns: bool,
    signing_time: &str,
    certificate_digest: &str,
    issuer_name: &str,
    serial_decimal: &str,
) -> String {
    format!(
        "<etsi:SignedProperties{ns} Id=\"Signature-SignedProperties\">\
         <etsi:SignedSignatureProperties>\
         <etsi:SigningTime>{signing_time}</etsi:SigningTime>\
         <etsi:SigningCertificate>\
         <etsi:Cert>\
         <etsi:CertDigest>\
         <ds:DigestMethod Algorithm=\"{SHA1_ALGORITHM}\"></ds:DigestMethod>\
         <ds:DigestValue>{certificate_digest}</ds:DigestValue>\
         </etsi:CertDigest>\
         <etsi:IssuerSerial>\
         <ds:X509IssuerName>{issuer}</ds:X509IssuerName>\
         <ds:X509SerialNumber>{serial_decimal}</ds:X509SerialNumber>\
         </etsi:IssuerSerial>\
         </etsi:Cert>\
         </etsi:SigningCertificate>\
         </etsi:SignedSignatureProperties>\
         <etsi:SignedDataObjectProperties>\
         <etsi:DataObjectFormat ObjectReference=\"#Reference-ID\">\
         <etsi:Description>contenido comprobante</etsi:Description>\
         <etsi:MimeType>text/xml</etsi:MimeType>\
         </etsi:DataObjectFormat>\
         </etsi:SignedDataObjectProperties>\
         </etsi:SignedProperties>",
        ns = ns_decls(with_ns),
        issuer = xml_escape(issuer_name),
    )
}

fn signed_info(
    with_ns: bool,
    properties_digest: &str,
    key_info_digest: &str,
    document_digest: &str,
) -> String {
    format!(
        "<ds:SignedInfo{ns} Id=\"Signature-SignedInfo\">\
         <ds:CanonicalizationMethod Algorithm=\"{C14N_ALGORITHM}\"></ds:CanonicalizationMethod>\
         <ds:SignatureMethod Algorithm=\"{RSA_SHA1_ALGORITHM}\"></ds:SignatureMethod>\
         <ds:Reference Id=\"SignedPropertiesID\" Type=\"{SIGNED_PROPERTIES_TYPE}\" URI=\"#Signature-SignedProperties\">\
         <ds:DigestMethod Algorithm=\"{SHA1_ALGORITHM}\"></ds:DigestMethod>\
         <ds:DigestValue>{properties_digest}</ds:DigestValue>\
         </ds:Reference>\
         <ds:Reference URI=\"#Certificate\">\
         <ds:DigestMethod Algorithm=\"{SHA1_ALGORITHM}\"></ds:DigestMethod>\
         <ds:DigestValue>{key_info_digest}</ds:DigestValue>\
         </ds:Reference>\
         <ds:Reference Id=\"Reference-ID\" URI=\"#comprobante\">\
         <ds:Transforms>\
         <ds:Transform Algorithm=\"{ENVELOPED_ALGORITHM}\"></ds:Transform>\
         </ds:Transforms>\
         <ds:DigestMethod Algorithm=\"{SHA1_ALGORITHM}\"></ds:DigestMethod>\
         <ds:DigestValue>{document_digest}</ds:DigestValue>\
         </ds:Reference>\
         </ds:SignedInfo>",
        ns = ns_decls(with_ns),
    )
}

fn sha1_b64(bytes: &[u8]) -> String {
    BASE64.encode(Sha1::digest(bytes))
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
