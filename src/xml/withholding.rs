use crate::core::*;

use super::common::*;
use super::writer::{XmlResult, XmlWriter, format_date};
use super::{DOCUMENT_ID_ATTR, WITHHOLDING_SCHEMA_VERSION};

/// Generate comprobante de retención XML.
pub(crate) fn encode(
    document: &ElectronicDocument,
    detail: &WithholdingDetail,
    access_key: &AccessKey,
) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "comprobanteRetencion",
        &[
            ("id", DOCUMENT_ID_ATTR),
            ("version", WITHHOLDING_SCHEMA_VERSION),
        ],
    )?;

    write_info_tributaria(&mut w, document, access_key)?;

    let emitter = &document.emitter;
    let subject = &detail.subject;
    w.start_element("infoCompRetencion")?;
    w.text_element("fechaEmision", &format_date(document.issue_date))?;
    w.opt_text_element(
        "dirEstablecimiento",
        emitter.establishment_address.as_deref(),
    )?;
    w.opt_text_element("contribuyenteEspecial", emitter.special_taxpayer.as_deref())?;
    w.text_element("obligadoContabilidad", si_no(emitter.keeps_accounting))?;
    w.text_element(
        "tipoIdentificacionSujetoRetenido",
        subject.id_type.code(),
    )?;
    w.text_element("razonSocialSujetoRetenido", &subject.name)?;
    w.text_element("identificacionSujetoRetenido", &subject.identification)?;
    w.text_element("periodoFiscal", &detail.fiscal_period)?;
    w.end_element("infoCompRetencion")?;

    w.start_element("impuestos")?;
    for entry in &detail.withholdings {
        w.start_element("impuesto")?;
        w.text_element("codigo", entry.tax.code())?;
        w.text_element("codigoRetencion", &entry.code)?;
        w.amount_element("baseImponible", entry.base)?;
        w.amount_element("porcentajeRetener", entry.rate)?;
        w.amount_element("valorRetenido", entry.amount)?;
        if let Some(reference) = &entry.document {
            w.text_element("codDocSustento", reference.kind.code())?;
            w.text_element("numDocSustento", &reference.number)?;
            w.text_element(
                "fechaEmisionDocSustento",
                &format_date(reference.issue_date),
            )?;
        }
        w.end_element("impuesto")?;
    }
    w.end_element("impuestos")?;

    write_additional_fields(&mut w, &document.additional_fields)?;

    w.end_element("comprobanteRetencion")?;
    w.into_string()
}
