//! Taxpayer identification checksum validation (RUC and cédula).

use std::fmt;

use super::types::{FINAL_CONSUMER_ID, IdentificationType};

/// Error returned when an identification fails format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for IdentificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid identification '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for IdentificationError {}

fn err(value: &str, reason: impl Into<String>) -> IdentificationError {
    IdentificationError {
        value: value.into(),
        reason: reason.into(),
    }
}

fn digits_of(value: &str) -> Option<Vec<u32>> {
    value.chars().map(|c| c.to_digit(10)).collect()
}

/// Validate a 10-digit cédula (Module-10).
///
/// Coefficients 2,1,2,1,… over the first nine digits; products above 9
/// have 9 subtracted; the check digit is the distance from the sum to
/// the next multiple of ten.
pub fn validate_cedula(cedula: &str) -> Result<(), IdentificationError> {
    if cedula.len() != 10 {
        return Err(err(cedula, "cédula must be 10 digits"));
    }
    let Some(digits) = digits_of(cedula) else {
        return Err(err(cedula, "cédula must contain only digits"));
    };
    if digits[2] >= 6 {
        return Err(err(cedula, "third digit of a cédula must be below 6"));
    }

    let sum: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let product = d * if i % 2 == 0 { 2 } else { 1 };
            if product > 9 { product - 9 } else { product }
        })
        .sum();
    let expected = (10 - sum % 10) % 10;

    if expected != digits[9] {
        return Err(err(cedula, "cédula check digit mismatch"));
    }
    Ok(())
}

/// Validate a 13-digit RUC.
///
/// The third digit discriminates the checksum variant: below 6 the RUC
/// embeds a cédula (Module-10); 6 marks a public entity and 9 a private
/// company, each with its own Module-11 weight row.
pub fn validate_ruc(ruc: &str) -> Result<(), IdentificationError> {
    if ruc.len() != 13 {
        return Err(err(ruc, "RUC must be 13 digits"));
    }
    let Some(digits) = digits_of(ruc) else {
        return Err(err(ruc, "RUC must contain only digits"));
    };
    if ruc.ends_with("000") {
        return Err(err(ruc, "RUC establishment suffix must not be 000"));
    }

    match digits[2] {
        0..=5 => validate_cedula(&ruc[..10]).map_err(|_| err(ruc, "embedded cédula is invalid")),
        6 => validate_module11(ruc, &digits, &[3, 2, 7, 6, 5, 4, 3, 2], 8),
        9 => validate_module11(ruc, &digits, &[4, 3, 2, 7, 6, 5, 4, 3, 2], 9),
        _ => Err(err(ruc, "third digit of a RUC must be 0-5, 6, or 9")),
    }
}

/// Module-11 over the leading digits; the weighted sum's residue decides
/// the check digit at `check_index` (residue 0 keeps 0; residue 1 would
/// need check digit 10, which no valid RUC has).
fn validate_module11(
    ruc: &str,
    digits: &[u32],
    weights: &[u32],
    check_index: usize,
) -> Result<(), IdentificationError> {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let residue = sum % 11;
    let expected = match residue {
        0 => 0,
        1 => return Err(err(ruc, "RUC check digit mismatch")),
        r => 11 - r,
    };
    if expected != digits[check_index] {
        return Err(err(ruc, "RUC check digit mismatch"));
    }
    Ok(())
}

/// Validate a counterpart identification against its declared type.
///
/// Passports and foreign identifications carry no national checksum and
/// only need to be non-empty; the final-consumer type must match the
/// reserved sentinel exactly.
pub fn validate_identification(
    id_type: IdentificationType,
    value: &str,
) -> Result<(), IdentificationError> {
    match id_type {
        IdentificationType::Ruc => validate_ruc(value),
        IdentificationType::NationalId => validate_cedula(value),
        IdentificationType::FinalConsumer => {
            if value == FINAL_CONSUMER_ID {
                Ok(())
            } else {
                Err(err(value, "final-consumer identification must be thirteen nines"))
            }
        }
        IdentificationType::Passport | IdentificationType::Foreign => {
            if value.trim().is_empty() {
                Err(err(value, "identification must not be empty"))
            } else {
                Ok(())
            }
        }
    }
}
