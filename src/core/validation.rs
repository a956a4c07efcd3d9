use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::identification::{validate_identification, validate_ruc};
use super::types::*;

/// Validate a document before signing.
/// Returns all validation errors found (not just the first).
pub fn validate_document(document: &ElectronicDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // EMI-01: emitter RUC must pass its checksum
    if let Err(e) = validate_ruc(&document.emitter.ruc) {
        errors.push(ValidationError::with_rule("emitter.ruc", e.reason, "EMI-01"));
    }

    // EMI-02: legal name
    if document.emitter.legal_name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "emitter.legal_name",
            "legal name must not be empty",
            "EMI-02",
        ));
    }

    // EMI-03 / EMI-04: establishment and emission point are 3-digit codes
    validate_code3(&document.establishment, "establishment", "EMI-03", &mut errors);
    validate_code3(&document.emission_point, "emission_point", "EMI-04", &mut errors);

    // EMI-05: sequence starts at 1
    if document.sequence == 0 {
        errors.push(ValidationError::with_rule(
            "sequence",
            "sequence must be at least 1",
            "EMI-05",
        ));
    }

    // Environment is restricted to the two-value set by the type system.

    // KEY-01: a caller-provided numeric code must be 8 digits
    if let Some(code) = &document.numeric_code {
        if code.len() != 8 || !code.bytes().all(|b| b.is_ascii_digit()) {
            errors.push(ValidationError::with_rule(
                "numeric_code",
                "numeric code must be exactly 8 digits",
                "KEY-01",
            ));
        }
    }

    // PAY-01 / PAY-02: payment entries for the variants that carry them
    if document.detail.requires_payments() {
        if document.payments.is_empty() {
            errors.push(ValidationError::with_rule(
                "payments",
                "document must have at least one payment entry",
                "PAY-01",
            ));
        } else {
            let paid: Decimal = document.payments.iter().map(|p| p.total).sum();
            if paid != document.totals.grand_total {
                errors.push(ValidationError::with_rule(
                    "payments",
                    format!(
                        "payment totals {} do not cover the grand total {}",
                        paid, document.totals.grand_total
                    ),
                    "PAY-02",
                ));
            }
        }
    }

    validate_detail(document, &mut errors);

    errors
}

fn validate_code3(value: &str, field: &str, rule: &str, errors: &mut Vec<ValidationError>) {
    if value.len() != 3 || !value.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ValidationError::with_rule(
            field,
            format!("{field} must be a 3-digit code, got '{value}'"),
            rule,
        ));
    }
}

fn validate_counterpart(
    counterpart: &Counterpart,
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    if counterpart.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.name"),
            "name must not be empty",
            "CPT-01",
        ));
    }
    if let Err(e) = validate_identification(counterpart.id_type, &counterpart.identification) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.identification"),
            e.reason,
            "CPT-02",
        ));
    }
}

fn validate_detail(document: &ElectronicDocument, errors: &mut Vec<ValidationError>) {
    match &document.detail {
        DocumentDetail::Invoice(d) => {
            validate_counterpart(&d.customer, "customer", errors);
            validate_lines(&d.lines, errors);
            validate_line_totals(document, &d.lines, errors);
        }
        DocumentDetail::PurchaseSettlement(d) => {
            validate_counterpart(&d.supplier, "supplier", errors);
            validate_lines(&d.lines, errors);
            validate_line_totals(document, &d.lines, errors);
        }
        DocumentDetail::CreditNote(d) => {
            validate_counterpart(&d.customer, "customer", errors);
            validate_lines(&d.lines, errors);
            validate_line_totals(document, &d.lines, errors);
            if d.reason.trim().is_empty() {
                errors.push(ValidationError::with_rule(
                    "reason",
                    "credit note must state a reason",
                    "MOD-01",
                ));
            }
        }
        DocumentDetail::DebitNote(d) => {
            validate_counterpart(&d.customer, "customer", errors);
            if d.reasons.is_empty() {
                errors.push(ValidationError::with_rule(
                    "reasons",
                    "debit note must have at least one reason entry",
                    "DET-01",
                ));
            }
        }
        DocumentDetail::ShippingGuide(d) => {
            validate_counterpart(&d.carrier, "carrier", errors);
            if d.destinations.is_empty() {
                errors.push(ValidationError::with_rule(
                    "destinations",
                    "shipping guide must have at least one destination",
                    "DET-01",
                ));
            }
            for (i, dest) in d.destinations.iter().enumerate() {
                if dest.items.is_empty() {
                    errors.push(ValidationError::with_rule(
                        format!("destinations[{i}].items"),
                        "destination must list at least one item",
                        "DET-02",
                    ));
                }
            }
            if d.end_date < d.start_date {
                errors.push(ValidationError::with_rule(
                    "end_date",
                    "transport end date precedes its start date",
                    "GUI-01",
                ));
            }
        }
        DocumentDetail::WithholdingReceipt(d) => {
            validate_counterpart(&d.subject, "subject", errors);
            if d.withholdings.is_empty() {
                errors.push(ValidationError::with_rule(
                    "withholdings",
                    "withholding receipt must have at least one entry",
                    "DET-01",
                ));
            }
            if !is_fiscal_period(&d.fiscal_period) {
                errors.push(ValidationError::with_rule(
                    "fiscal_period",
                    "fiscal period must be MM/YYYY",
                    "RET-01",
                ));
            }
        }
    }
}

fn is_fiscal_period(period: &str) -> bool {
    let Some((month, year)) = period.split_once('/') else {
        return false;
    };
    month.len() == 2
        && year.len() == 4
        && period.bytes().all(|b| b.is_ascii_digit() || b == b'/')
        && matches!(month.parse::<u32>(), Ok(1..=12))
}

fn validate_lines(lines: &[LineItem], errors: &mut Vec<ValidationError>) {
    if lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "document must have at least one line item",
            "DET-01",
        ));
    }
    for (i, line) in lines.iter().enumerate() {
        if line.quantity <= Decimal::ZERO {
            errors.push(ValidationError::with_rule(
                format!("lines[{i}].quantity"),
                "quantity must be positive",
                "LIN-01",
            ));
        }
        if line.unit_price < Decimal::ZERO {
            errors.push(ValidationError::with_rule(
                format!("lines[{i}].unit_price"),
                "unit price must not be negative",
                "LIN-02",
            ));
        }
        // VAT bases must match the line subtotal; ICE/IRBPNR bases differ.
        for (j, tax) in line.taxes.iter().enumerate() {
            if tax.tax == TaxCode::Vat && tax.base != line.subtotal() {
                errors.push(ValidationError::with_rule(
                    format!("lines[{i}].taxes[{j}].base"),
                    format!(
                        "VAT base {} does not match line subtotal {}",
                        tax.base,
                        line.subtotal()
                    ),
                    "LIN-03",
                ));
            }
        }
    }
}

fn validate_line_totals(
    document: &ElectronicDocument,
    lines: &[LineItem],
    errors: &mut Vec<ValidationError>,
) {
    let totals = &document.totals;

    // TOT-01: totalSinImpuestos equals the sum of line subtotals
    let line_total: Decimal = lines.iter().map(LineItem::subtotal).sum();
    if totals.total_without_tax != line_total {
        errors.push(ValidationError::with_rule(
            "totals.total_without_tax",
            format!(
                "total without tax {} does not match sum of line subtotals {}",
                totals.total_without_tax, line_total
            ),
            "TOT-01",
        ));
    }

    // TOT-02: totalDescuento equals the sum of line discounts
    let discounts: Decimal = lines.iter().map(|l| l.discount).sum();
    if totals.total_discount != discounts {
        errors.push(ValidationError::with_rule(
            "totals.total_discount",
            format!(
                "total discount {} does not match sum of line discounts {}",
                totals.total_discount, discounts
            ),
            "TOT-02",
        ));
    }

    // TOT-03: importeTotal = totalSinImpuestos + taxes + propina
    let tax_total: Decimal = tax_summary(lines).iter().map(|t| t.amount).sum();
    let expected = totals.total_without_tax + tax_total + totals.tip;
    if totals.grand_total != expected {
        errors.push(ValidationError::with_rule(
            "totals.grand_total",
            format!(
                "grand total {} does not match calculation {}",
                totals.grand_total, expected
            ),
            "TOT-03",
        ));
    }
}

/// Aggregate line-level tax entries into totalImpuesto groups.
///
/// Entries are grouped by (codigo, codigoPorcentaje) with bases and
/// amounts summed per group, independently of but consistent with the
/// per-line figures. The result is sorted for deterministic output.
pub fn tax_summary(lines: &[LineItem]) -> Vec<TaxTotal> {
    let mut groups: HashMap<(TaxCode, String), TaxTotal> = HashMap::new();

    for line in lines {
        for tax in &line.taxes {
            groups
                .entry((tax.tax, tax.rate_code.clone()))
                .and_modify(|total| {
                    total.base += tax.base;
                    total.amount += tax.amount;
                })
                .or_insert_with(|| TaxTotal {
                    tax: tax.tax,
                    rate_code: tax.rate_code.clone(),
                    rate: tax.rate,
                    base: tax.base,
                    amount: tax.amount,
                });
        }
    }

    let mut summary: Vec<TaxTotal> = groups.into_values().collect();
    summary.sort_by(|a, b| {
        a.tax
            .code()
            .cmp(b.tax.code())
            .then_with(|| a.rate_code.cmp(&b.rate_code))
    });
    summary
}

/// Compute envelope totals from a payload's line items.
///
/// For payloads without line items (debit notes, guides, withholdings)
/// the taxes are taken from the payload's own entries where present.
pub fn compute_totals(detail: &DocumentDetail, tip: Decimal) -> Totals {
    match detail.lines() {
        Some(lines) => {
            let total_without_tax: Decimal = lines.iter().map(LineItem::subtotal).sum();
            let total_discount: Decimal = lines.iter().map(|l| l.discount).sum();
            let tax_total: Decimal = tax_summary(lines).iter().map(|t| t.amount).sum();
            Totals {
                total_without_tax,
                total_discount,
                tip,
                grand_total: total_without_tax + tax_total + tip,
            }
        }
        None => match detail {
            DocumentDetail::DebitNote(d) => {
                let base: Decimal = d.reasons.iter().map(|r| r.value).sum();
                let tax_total: Decimal = d.taxes.iter().map(|t| t.amount).sum();
                Totals {
                    total_without_tax: base,
                    total_discount: Decimal::ZERO,
                    tip: Decimal::ZERO,
                    grand_total: base + tax_total,
                }
            }
            _ => Totals {
                total_without_tax: Decimal::ZERO,
                total_discount: Decimal::ZERO,
                tip: Decimal::ZERO,
                grand_total: Decimal::ZERO,
            },
        },
    }
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Convenience: VAT amount for a base at a percentage rate, rounded to 2 dp.
pub fn tax_amount(base: Decimal, rate: Decimal) -> Decimal {
    round_half_up(base * rate / dec!(100), 2)
}
