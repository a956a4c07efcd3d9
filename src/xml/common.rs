//! Section writers shared across document-type encoders.

use crate::core::*;

use super::writer::XmlWriter;

/// `<infoTributaria>` — the common fiscal header of every comprobante.
pub(crate) fn write_info_tributaria(
    w: &mut XmlWriter,
    document: &ElectronicDocument,
    access_key: &AccessKey,
) -> Result<(), ComprobanteError> {
    let emitter = &document.emitter;
    w.start_element("infoTributaria")?;
    w.text_element("ambiente", document.environment.code())?;
    w.text_element("tipoEmision", document.emission_type.code())?;
    w.text_element("razonSocial", &emitter.legal_name)?;
    w.opt_text_element("nombreComercial", emitter.trade_name.as_deref())?;
    w.text_element("ruc", &emitter.ruc)?;
    w.text_element("claveAcceso", access_key.as_str())?;
    w.text_element("codDoc", document.kind().code())?;
    w.text_element("estab", &document.establishment)?;
    w.text_element("ptoEmi", &document.emission_point)?;
    w.text_element("secuencial", &format!("{:09}", document.sequence))?;
    w.text_element("dirMatriz", &emitter.head_office_address)?;
    w.end_element("infoTributaria")?;
    Ok(())
}

/// `<totalConImpuestos>` — aggregated tax totals.
pub(crate) fn write_tax_totals(
    w: &mut XmlWriter,
    summary: &[TaxTotal],
) -> Result<(), ComprobanteError> {
    w.start_element("totalConImpuestos")?;
    for total in summary {
        w.start_element("totalImpuesto")?;
        w.text_element("codigo", total.tax.code())?;
        w.text_element("codigoPorcentaje", &total.rate_code)?;
        w.amount_element("baseImponible", total.base)?;
        w.amount_element("valor", total.amount)?;
        w.end_element("totalImpuesto")?;
    }
    w.end_element("totalConImpuestos")?;
    Ok(())
}

/// `<pagos>`.
pub(crate) fn write_payments(
    w: &mut XmlWriter,
    payments: &[Payment],
) -> Result<(), ComprobanteError> {
    w.start_element("pagos")?;
    for payment in payments {
        w.start_element("pago")?;
        w.text_element("formaPago", payment.method.code())?;
        w.amount_element("total", payment.total)?;
        if let Some(term) = payment.term {
            w.text_element("plazo", &term.to_string())?;
            w.opt_text_element("unidadTiempo", payment.time_unit.as_deref())?;
        }
        w.end_element("pago")?;
    }
    w.end_element("pagos")?;
    Ok(())
}

/// `<detalles>` for the line-item variants. The item-code element names
/// differ between schemas, so they are passed in.
pub(crate) fn write_detalles(
    w: &mut XmlWriter,
    lines: &[LineItem],
    code_tag: &str,
    aux_tag: &str,
) -> Result<(), ComprobanteError> {
    w.start_element("detalles")?;
    for line in lines {
        w.start_element("detalle")?;
        w.text_element(code_tag, &line.code)?;
        w.opt_text_element(aux_tag, line.auxiliary_code.as_deref())?;
        w.text_element("descripcion", &line.description)?;
        w.quantity_element("cantidad", line.quantity)?;
        w.quantity_element("precioUnitario", line.unit_price)?;
        w.amount_element("descuento", line.discount)?;
        w.amount_element("precioTotalSinImpuesto", line.subtotal())?;
        write_line_taxes(w, &line.taxes)?;
        w.end_element("detalle")?;
    }
    w.end_element("detalles")?;
    Ok(())
}

/// `<impuestos>` of one line (or of a debit note).
pub(crate) fn write_line_taxes(
    w: &mut XmlWriter,
    taxes: &[TaxEntry],
) -> Result<(), ComprobanteError> {
    w.start_element("impuestos")?;
    for tax in taxes {
        w.start_element("impuesto")?;
        w.text_element("codigo", tax.tax.code())?;
        w.text_element("codigoPorcentaje", &tax.rate_code)?;
        w.amount_element("tarifa", tax.rate)?;
        w.amount_element("baseImponible", tax.base)?;
        w.amount_element("valor", tax.amount)?;
        w.end_element("impuesto")?;
    }
    w.end_element("impuestos")?;
    Ok(())
}

/// `<infoAdicional>` — omitted entirely when there are no fields.
pub(crate) fn write_additional_fields(
    w: &mut XmlWriter,
    fields: &[AdditionalField],
) -> Result<(), ComprobanteError> {
    if fields.is_empty() {
        return Ok(());
    }
    w.start_element("infoAdicional")?;
    for field in fields {
        w.text_element_with_attrs(
            "campoAdicional",
            &field.value,
            &[("nombre", field.name.as_str())],
        )?;
    }
    w.end_element("infoAdicional")?;
    Ok(())
}

/// Modified/supporting document reference triple.
pub(crate) fn write_document_reference(
    w: &mut XmlWriter,
    reference: &DocumentReference,
) -> Result<(), ComprobanteError> {
    w.text_element("codDocModificado", reference.kind.code())?;
    w.text_element("numDocModificado", &reference.number)?;
    w.date_element("fechaEmisionDocSustento", reference.issue_date)?;
    Ok(())
}

/// SI/NO flag form used by obligadoContabilidad.
pub(crate) fn si_no(flag: bool) -> &'static str {
    if flag { "SI" } else { "NO" }
}
