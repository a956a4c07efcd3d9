//! 49-digit access key (clave de acceso) generation and validation.
//!
//! The access key is the idempotent external identifier of a document:
//! 48 digits of fixed-layout payload plus a Module-11 check digit.
//!
//! Layout (zero-based byte ranges):
//!
//! | Range | Field |
//! |-------|-------|
//! | 0..8  | issue date, ddmmyyyy |
//! | 8..10 | document-type code |
//! | 10..23 | emitter RUC |
//! | 23..24 | environment |
//! | 24..27 | establishment |
//! | 27..30 | emission point |
//! | 30..39 | sequence |
//! | 39..47 | numeric code |
//! | 47..48 | emission type |
//! | 48..49 | check digit |

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::ComprobanteError;
use super::types::{DocumentKind, ElectronicDocument, EmissionType, Environment};

/// A validated 49-digit access key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessKey(String);

impl AccessKey {
    /// Wrap a key string, checking length, digits, and check digit.
    pub fn new(key: impl Into<String>) -> Result<Self, AccessKeyIssue> {
        let key = key.into();
        validate(&key)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into the documented field ranges.
    pub fn fields(&self) -> AccessKeyFields {
        // Validated on construction, so decomposition cannot fail.
        decompose(&self.0).expect("validated key decomposes")
    }
}

impl std::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a key string failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessKeyIssue {
    #[error("access key must be 49 digits, got {0}")]
    Length(usize),
    #[error("access key must contain only ASCII digits")]
    NonDigit,
    #[error("check digit mismatch: expected {expected}, found {found}")]
    CheckDigit { expected: u8, found: u8 },
}

/// The named fields of a decomposed key, verbatim as embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyFields {
    /// ddmmyyyy.
    pub issue_date: String,
    pub document_code: String,
    pub ruc: String,
    pub environment: String,
    pub establishment: String,
    pub emission_point: String,
    pub sequence: String,
    pub numeric_code: String,
    pub emission_type: String,
    pub check_digit: u8,
}

/// Inputs for [`generate`].
#[derive(Debug, Clone)]
pub struct KeyRequest {
    pub issue_date: NaiveDate,
    pub kind: DocumentKind,
    pub ruc: String,
    pub environment: Environment,
    pub establishment: String,
    pub emission_point: String,
    pub sequence: u32,
    /// Fixed 8-digit entropy; a random code is drawn when absent.
    pub numeric_code: Option<String>,
    pub emission_type: EmissionType,
}

impl KeyRequest {
    /// Assemble a request from a document envelope.
    pub fn from_document(document: &ElectronicDocument) -> Self {
        Self {
            issue_date: document.issue_date,
            kind: document.kind(),
            ruc: document.emitter.ruc.clone(),
            environment: document.environment,
            establishment: document.establishment.clone(),
            emission_point: document.emission_point.clone(),
            sequence: document.sequence,
            numeric_code: document.numeric_code.clone(),
            emission_type: document.emission_type,
        }
    }
}

/// Generate an access key from its constituent fields.
///
/// Field-width violations are caller bugs, reported as
/// [`ComprobanteError::AccessKey`] before any concatenation is attempted.
pub fn generate(request: &KeyRequest) -> Result<AccessKey, ComprobanteError> {
    check_width("ruc", &request.ruc, 13)?;
    check_width("establishment", &request.establishment, 3)?;
    check_width("emission point", &request.emission_point, 3)?;
    if request.sequence == 0 || request.sequence > 999_999_999 {
        return Err(ComprobanteError::AccessKey(format!(
            "sequence {} out of range 1..=999999999",
            request.sequence
        )));
    }
    let numeric_code = match &request.numeric_code {
        Some(code) => {
            check_width("numeric code", code, 8)?;
            code.clone()
        }
        None => format!("{:08}", rand::thread_rng().gen_range(0..=99_999_999u32)),
    };

    let payload = format!(
        "{}{}{}{}{}{}{:09}{}{}",
        request.issue_date.format("%d%m%Y"),
        request.kind.code(),
        request.ruc,
        request.environment.code(),
        request.establishment,
        request.emission_point,
        request.sequence,
        numeric_code,
        request.emission_type.code(),
    );
    if payload.len() != 48 {
        return Err(ComprobanteError::AccessKey(format!(
            "assembled payload is {} digits, expected 48",
            payload.len()
        )));
    }

    let check = module11_check_digit(&payload).ok_or_else(|| {
        ComprobanteError::AccessKey("payload contains a non-digit character".into())
    })?;

    Ok(AccessKey(format!("{payload}{check}")))
}

fn check_width(field: &str, value: &str, width: usize) -> Result<(), ComprobanteError> {
    if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ComprobanteError::AccessKey(format!(
            "{field} must be exactly {width} digits, got '{value}'"
        )));
    }
    Ok(())
}

/// Module-11 check digit over a digit string.
///
/// Weights cycle 2,3,4,5,6,7 starting from the rightmost digit;
/// check = 11 − (sum mod 11), with 11 mapped to 0 and 10 mapped to 1.
/// The result is therefore always a single digit.
///
/// Returns `None` if the input contains a non-digit.
pub fn module11_check_digit(digits: &str) -> Option<u8> {
    let mut sum: u64 = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let d = c.to_digit(10)? as u64;
        let weight = 2 + (i as u64) % 6;
        sum += d * weight;
    }
    Some(match 11 - (sum % 11) as u8 {
        11 => 0,
        10 => 1,
        d => d,
    })
}

/// Validate a key string: length 49, all digits, matching check digit.
pub fn validate(key: &str) -> Result<(), AccessKeyIssue> {
    if key.len() != 49 {
        return Err(AccessKeyIssue::Length(key.len()));
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AccessKeyIssue::NonDigit);
    }
    let (payload, check) = key.split_at(48);
    let found = check.as_bytes()[0] - b'0';
    let expected = module11_check_digit(payload).ok_or(AccessKeyIssue::NonDigit)?;
    if expected != found {
        return Err(AccessKeyIssue::CheckDigit { expected, found });
    }
    Ok(())
}

/// Split a 49-digit key into its documented ranges.
///
/// Returns `None` when the length is not 49; the field contents are
/// returned verbatim without further interpretation.
pub fn decompose(key: &str) -> Option<AccessKeyFields> {
    if key.len() != 49 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(AccessKeyFields {
        issue_date: key[0..8].into(),
        document_code: key[8..10].into(),
        ruc: key[10..23].into(),
        environment: key[23..24].into(),
        establishment: key[24..27].into(),
        emission_point: key[27..30].into(),
        sequence: key[30..39].into(),
        numeric_code: key[39..47].into(),
        emission_type: key[47..48].into(),
        check_digit: key[48..49].parse().ok()?,
    })
}
