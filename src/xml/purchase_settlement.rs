use crate::core::*;

use super::common::*;
use super::writer::{XmlResult, XmlWriter, format_date};
use super::{DOCUMENT_ID_ATTR, PURCHASE_SETTLEMENT_SCHEMA_VERSION};

/// Generate liquidación de compra XML.
pub(crate) fn encode(
    document: &ElectronicDocument,
    detail: &PurchaseSettlementDetail,
    access_key: &AccessKey,
) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "liquidacionCompra",
        &[
            ("id", DOCUMENT_ID_ATTR),
            ("version", PURCHASE_SETTLEMENT_SCHEMA_VERSION),
        ],
    )?;

    write_info_tributaria(&mut w, document, access_key)?;

    let emitter = &document.emitter;
    let supplier = &detail.supplier;
    w.start_element("infoLiquidacionCompra")?;
    w.text_element("fechaEmision", &format_date(document.issue_date))?;
    w.opt_text_element(
        "dirEstablecimiento",
        emitter.establishment_address.as_deref(),
    )?;
    w.opt_text_element("contribuyenteEspecial", emitter.special_taxpayer.as_deref())?;
    w.text_element("obligadoContabilidad", si_no(emitter.keeps_accounting))?;
    w.text_element("tipoIdentificacionProveedor", supplier.id_type.code())?;
    w.text_element("razonSocialProveedor", &supplier.name)?;
    w.text_element("identificacionProveedor", &supplier.identification)?;
    w.opt_text_element("direccionProveedor", supplier.address.as_deref())?;
    w.amount_element("totalSinImpuestos", document.totals.total_without_tax)?;
    w.amount_element("totalDescuento", document.totals.total_discount)?;
    write_tax_totals(&mut w, &tax_summary(&detail.lines))?;
    w.amount_element("importeTotal", document.totals.grand_total)?;
    w.text_element("moneda", &document.currency)?;
    write_payments(&mut w, &document.payments)?;
    w.end_element("infoLiquidacionCompra")?;

    write_detalles(&mut w, &detail.lines, "codigoPrincipal", "codigoAuxiliar")?;
    write_additional_fields(&mut w, &document.additional_fields)?;

    w.end_element("liquidacionCompra")?;
    w.into_string()
}
