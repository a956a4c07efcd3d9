use crate::core::*;

use super::common::*;
use super::writer::{XmlResult, XmlWriter, format_date};
use super::{DEBIT_NOTE_SCHEMA_VERSION, DOCUMENT_ID_ATTR};

/// Generate nota de débito XML.
pub(crate) fn encode(
    document: &ElectronicDocument,
    detail: &DebitNoteDetail,
    access_key: &AccessKey,
) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "notaDebito",
        &[
            ("id", DOCUMENT_ID_ATTR),
            ("version", DEBIT_NOTE_SCHEMA_VERSION),
        ],
    )?;

    write_info_tributaria(&mut w, document, access_key)?;

    let emitter = &document.emitter;
    let customer = &detail.customer;
    w.start_element("infoNotaDebito")?;
    w.text_element("fechaEmision", &format_date(document.issue_date))?;
    w.opt_text_element(
        "dirEstablecimiento",
        emitter.establishment_address.as_deref(),
    )?;
    w.text_element("tipoIdentificacionComprador", customer.id_type.code())?;
    w.text_element("razonSocialComprador", &customer.name)?;
    w.text_element("identificacionComprador", &customer.identification)?;
    w.opt_text_element("contribuyenteEspecial", emitter.special_taxpayer.as_deref())?;
    w.text_element("obligadoContabilidad", si_no(emitter.keeps_accounting))?;
    write_document_reference(&mut w, &detail.modified_document)?;
    w.amount_element("totalSinImpuestos", document.totals.total_without_tax)?;
    write_line_taxes(&mut w, &detail.taxes)?;
    w.amount_element("valorTotal", document.totals.grand_total)?;
    write_payments(&mut w, &document.payments)?;
    w.end_element("infoNotaDebito")?;

    w.start_element("motivos")?;
    for reason in &detail.reasons {
        w.start_element("motivo")?;
        w.text_element("razon", &reason.reason)?;
        w.amount_element("valor", reason.value)?;
        w.end_element("motivo")?;
    }
    w.end_element("motivos")?;

    write_additional_fields(&mut w, &document.additional_fields)?;

    w.end_element("notaDebito")?;
    w.into_string()
}
