use crate::core::*;

use super::common::*;
use super::writer::{XmlResult, XmlWriter, format_date};
use super::{CREDIT_NOTE_SCHEMA_VERSION, DOCUMENT_ID_ATTR};

/// Generate nota de crédito XML.
pub(crate) fn encode(
    document: &ElectronicDocument,
    detail: &CreditNoteDetail,
    access_key: &AccessKey,
) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "notaCredito",
        &[
            ("id", DOCUMENT_ID_ATTR),
            ("version", CREDIT_NOTE_SCHEMA_VERSION),
        ],
    )?;

    write_info_tributaria(&mut w, document, access_key)?;

    let emitter = &document.emitter;
    let customer = &detail.customer;
    w.start_element("infoNotaCredito")?;
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
    // valorModificacion is the total value being credited back
    w.amount_element("valorModificacion", document.totals.grand_total)?;
    w.text_element("moneda", &document.currency)?;
    write_tax_totals(&mut w, &tax_summary(&detail.lines))?;
    w.text_element("motivo", &detail.reason)?;
    w.end_element("infoNotaCredito")?;

    write_detalles(&mut w, &detail.lines, "codigoInterno", "codigoAdicional")?;
    write_additional_fields(&mut w, &document.additional_fields)?;

    w.end_element("notaCredito")?;
    w.into_string()
}
