use crate::core::*;

use super::common::*;
use super::writer::{XmlResult, XmlWriter, format_date};
use super::{DOCUMENT_ID_ATTR, SHIPPING_GUIDE_SCHEMA_VERSION};

/// Generate guía de remisión XML.
pub(crate) fn encode(
    document: &ElectronicDocument,
    detail: &ShippingGuideDetail,
    access_key: &AccessKey,
) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "guiaRemision",
        &[
            ("id", DOCUMENT_ID_ATTR),
            ("version", SHIPPING_GUIDE_SCHEMA_VERSION),
        ],
    )?;

    write_info_tributaria(&mut w, document, access_key)?;

    let emitter = &document.emitter;
    let carrier = &detail.carrier;
    w.start_element("infoGuiaRemision")?;
    w.opt_text_element(
        "dirEstablecimiento",
        emitter.establishment_address.as_deref(),
    )?;
    w.text_element("dirPartida", &detail.origin)?;
    w.text_element("razonSocialTransportista", &carrier.name)?;
    w.text_element("tipoIdentificacionTransportista", carrier.id_type.code())?;
    w.text_element("rucTransportista", &carrier.identification)?;
    w.opt_text_element("contribuyenteEspecial", emitter.special_taxpayer.as_deref())?;
    w.text_element("obligadoContabilidad", si_no(emitter.keeps_accounting))?;
    w.text_element("fechaIniTransporte", &format_date(detail.start_date))?;
    w.text_element("fechaFinTransporte", &format_date(detail.end_date))?;
    w.text_element("placa", &detail.license_plate)?;
    w.end_element("infoGuiaRemision")?;

    w.start_element("destinatarios")?;
    for destination in &detail.destinations {
        let recipient = &destination.recipient;
        w.start_element("destinatario")?;
        w.text_element("identificacionDestinatario", &recipient.identification)?;
        w.text_element("razonSocialDestinatario", &recipient.name)?;
        w.text_element("dirDestinatario", &destination.address)?;
        w.text_element("motivoTraslado", &destination.reason)?;
        if let Some(reference) = &destination.supporting_document {
            w.text_element("codDocSustento", reference.kind.code())?;
            w.text_element("numDocSustento", &reference.number)?;
            w.date_element("fechaEmisionDocSustento", reference.issue_date)?;
        }
        w.start_element("detalles")?;
        for item in &destination.items {
            w.start_element("detalle")?;
            w.opt_text_element("codigoInterno", item.code.as_deref())?;
            w.text_element("descripcion", &item.description)?;
            w.quantity_element("cantidad", item.quantity)?;
            w.end_element("detalle")?;
        }
        w.end_element("detalles")?;
        w.end_element("destinatario")?;
    }
    w.end_element("destinatarios")?;

    write_additional_fields(&mut w, &document.additional_fields)?;

    w.end_element("guiaRemision")?;
    w.into_string()
}
