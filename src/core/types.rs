use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identification reserved for anonymous final-consumer sales
/// (tipoIdentificacion 07): thirteen nines.
pub const FINAL_CONSUMER_ID: &str = "9999999999999";

/// An electronic document before signing: common envelope plus the
/// type-specific payload in [`DocumentDetail`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectronicDocument {
    /// Issuing taxpayer.
    pub emitter: Emitter,
    /// ambiente — SRI environment the document is destined for.
    pub environment: Environment,
    /// tipoEmision — emission modality.
    pub emission_type: EmissionType,
    /// estab — 3-digit establishment code ("001").
    pub establishment: String,
    /// ptoEmi — 3-digit emission-point code ("001").
    pub emission_point: String,
    /// secuencial — per-point sequence number, serialized as 9 digits.
    pub sequence: u32,
    /// fechaEmision.
    pub issue_date: NaiveDate,
    /// moneda (e.g. "DOLAR").
    pub currency: String,
    /// Fixed 8-digit numeric code for the access key. Generated randomly
    /// when absent.
    pub numeric_code: Option<String>,
    /// Document totals.
    pub totals: Totals,
    /// pagos — at least one entry for the variants that carry payments.
    pub payments: Vec<Payment>,
    /// infoAdicional — free-text extras, omitted from the XML when empty.
    pub additional_fields: Vec<AdditionalField>,
    /// Type-specific payload.
    pub detail: DocumentDetail,
}

impl ElectronicDocument {
    /// Document-type discriminant of the payload.
    pub fn kind(&self) -> DocumentKind {
        self.detail.kind()
    }

    /// Human-readable document number: `estab-ptoEmi-secuencial`.
    pub fn document_number(&self) -> String {
        format!(
            "{}-{}-{:09}",
            self.establishment, self.emission_point, self.sequence
        )
    }
}

/// Tagged union over the supported document variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentDetail {
    /// factura (codDoc 01).
    Invoice(InvoiceDetail),
    /// liquidación de compra de bienes y prestación de servicios (codDoc 03).
    PurchaseSettlement(PurchaseSettlementDetail),
    /// nota de crédito (codDoc 04).
    CreditNote(CreditNoteDetail),
    /// nota de débito (codDoc 05).
    DebitNote(DebitNoteDetail),
    /// guía de remisión (codDoc 06).
    ShippingGuide(ShippingGuideDetail),
    /// comprobante de retención (codDoc 07).
    WithholdingReceipt(WithholdingDetail),
}

impl DocumentDetail {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Invoice(_) => DocumentKind::Invoice,
            Self::PurchaseSettlement(_) => DocumentKind::PurchaseSettlement,
            Self::CreditNote(_) => DocumentKind::CreditNote,
            Self::DebitNote(_) => DocumentKind::DebitNote,
            Self::ShippingGuide(_) => DocumentKind::ShippingGuide,
            Self::WithholdingReceipt(_) => DocumentKind::WithholdingReceipt,
        }
    }

    /// Whether this variant's schema carries a `<pagos>` block.
    pub fn requires_payments(&self) -> bool {
        matches!(
            self,
            Self::Invoice(_) | Self::PurchaseSettlement(_) | Self::DebitNote(_)
        )
    }

    /// Line items of the payload, for the variants that have them.
    pub fn lines(&self) -> Option<&[LineItem]> {
        match self {
            Self::Invoice(d) => Some(&d.lines),
            Self::PurchaseSettlement(d) => Some(&d.lines),
            Self::CreditNote(d) => Some(&d.lines),
            _ => None,
        }
    }
}

/// Issuing taxpayer identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emitter {
    /// razonSocial.
    pub legal_name: String,
    /// nombreComercial.
    pub trade_name: Option<String>,
    /// 13-digit RUC.
    pub ruc: String,
    /// dirMatriz — head-office address.
    pub head_office_address: String,
    /// dirEstablecimiento — issuing-establishment address.
    pub establishment_address: Option<String>,
    /// contribuyenteEspecial — special-taxpayer resolution number.
    pub special_taxpayer: Option<String>,
    /// obligadoContabilidad — serialized as SI/NO.
    pub keeps_accounting: bool,
}

/// A counterpart identity (customer, supplier, carrier, withheld subject).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterpart {
    pub id_type: IdentificationType,
    pub identification: String,
    /// razonSocial of the counterpart.
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A sale/purchase line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// codigoPrincipal.
    pub code: String,
    /// codigoAuxiliar.
    pub auxiliary_code: Option<String>,
    pub description: String,
    /// cantidad — serialized with 6 decimal places.
    pub quantity: Decimal,
    /// precioUnitario — serialized with 6 decimal places.
    pub unit_price: Decimal,
    /// descuento.
    pub discount: Decimal,
    /// Per-line tax entries.
    pub taxes: Vec<TaxEntry>,
}

impl LineItem {
    /// precioTotalSinImpuesto = cantidad × precioUnitario − descuento.
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price - self.discount
    }
}

/// One tax applied to a line (or to a debit note as a whole).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxEntry {
    /// codigo — tax kind.
    pub tax: TaxCode,
    /// codigoPorcentaje — rate code within the tax kind.
    pub rate_code: String,
    /// tarifa — percentage.
    pub rate: Decimal,
    /// baseImponible.
    pub base: Decimal,
    /// valor.
    pub amount: Decimal,
}

/// One aggregated totalImpuesto entry: all line taxes with the same
/// (codigo, codigoPorcentaje), bases and values summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTotal {
    pub tax: TaxCode,
    pub rate_code: String,
    pub rate: Decimal,
    pub base: Decimal,
    pub amount: Decimal,
}

/// Document totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Totals {
    /// totalSinImpuestos.
    pub total_without_tax: Decimal,
    /// totalDescuento.
    pub total_discount: Decimal,
    /// propina.
    pub tip: Decimal,
    /// importeTotal — grand total including taxes and tip.
    pub grand_total: Decimal,
}

/// One pago entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// formaPago.
    pub method: PaymentMethodCode,
    pub total: Decimal,
    /// plazo.
    pub term: Option<u32>,
    /// unidadTiempo (e.g. "dias").
    pub time_unit: Option<String>,
}

/// One campoAdicional name/value pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalField {
    pub name: String,
    pub value: String,
}

/// Reference to a previously issued document (docSustento / doc modificado).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReference {
    pub kind: DocumentKind,
    /// Full number in estab-ptoEmi-secuencial form, e.g. "001-001-000000123".
    pub number: String,
    pub issue_date: NaiveDate,
}

/// factura payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub customer: Counterpart,
    /// guiaRemision — number of the supporting shipping guide.
    pub remission_guide: Option<String>,
    pub lines: Vec<LineItem>,
}

/// liquidación de compra payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseSettlementDetail {
    pub supplier: Counterpart,
    pub lines: Vec<LineItem>,
}

/// nota de crédito payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditNoteDetail {
    pub customer: Counterpart,
    /// Document being credited.
    pub modified_document: DocumentReference,
    /// motivo.
    pub reason: String,
    pub lines: Vec<LineItem>,
}

/// nota de débito payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebitNoteDetail {
    pub customer: Counterpart,
    /// Document being debited.
    pub modified_document: DocumentReference,
    /// motivos — at least one.
    pub reasons: Vec<DebitReason>,
    /// Document-level taxes over the debited value.
    pub taxes: Vec<TaxEntry>,
}

/// One motivo of a debit note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebitReason {
    pub reason: String,
    pub value: Decimal,
}

/// guía de remisión payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingGuideDetail {
    /// transportista.
    pub carrier: Counterpart,
    /// placa.
    pub license_plate: String,
    /// fechaIniTransporte.
    pub start_date: NaiveDate,
    /// fechaFinTransporte.
    pub end_date: NaiveDate,
    /// dirPartida.
    pub origin: String,
    /// destinatarios — at least one.
    pub destinations: Vec<Destination>,
}

/// One destinatario of a shipping guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub recipient: Counterpart,
    pub address: String,
    /// motivoTraslado.
    pub reason: String,
    /// Supporting document (e.g. the invoice that motivated the transfer).
    pub supporting_document: Option<DocumentReference>,
    pub items: Vec<GuideItem>,
}

/// One transported item inside a destinatario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideItem {
    pub code: Option<String>,
    pub description: String,
    pub quantity: Decimal,
}

/// comprobante de retención payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithholdingDetail {
    /// Withheld subject.
    pub subject: Counterpart,
    /// periodoFiscal in MM/YYYY form.
    pub fiscal_period: String,
    /// impuestos — at least one.
    pub withholdings: Vec<WithholdingEntry>,
}

/// One retención entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithholdingEntry {
    /// codigo — withheld tax kind.
    pub tax: WithholdingTaxCode,
    /// codigoRetencion — concept code within the tax kind (e.g. "312").
    pub code: String,
    /// baseImponible.
    pub base: Decimal,
    /// porcentajeRetener.
    pub rate: Decimal,
    /// valorRetenido.
    pub amount: Decimal,
    /// docSustento reference.
    pub document: Option<DocumentReference>,
}

/// SRI environments (ambiente). The engine accepts exactly these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// 1 — pruebas.
    Test,
    /// 2 — producción.
    Production,
}

impl Environment {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Test => "1",
            Self::Production => "2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Test),
            "2" => Some(Self::Production),
            _ => None,
        }
    }
}

/// tipoEmision. Only normal emission survives in the current scheme; the
/// contingency modality was retired with the offline scheme revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionType {
    /// 1 — emisión normal.
    Normal,
}

impl EmissionType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Normal => "1",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Normal),
            _ => None,
        }
    }
}

/// codDoc — document-type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// 01 — factura.
    Invoice,
    /// 03 — liquidación de compra.
    PurchaseSettlement,
    /// 04 — nota de crédito.
    CreditNote,
    /// 05 — nota de débito.
    DebitNote,
    /// 06 — guía de remisión.
    ShippingGuide,
    /// 07 — comprobante de retención.
    WithholdingReceipt,
}

impl DocumentKind {
    /// Two-digit codDoc value.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invoice => "01",
            Self::PurchaseSettlement => "03",
            Self::CreditNote => "04",
            Self::DebitNote => "05",
            Self::ShippingGuide => "06",
            Self::WithholdingReceipt => "07",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Invoice),
            "03" => Some(Self::PurchaseSettlement),
            "04" => Some(Self::CreditNote),
            "05" => Some(Self::DebitNote),
            "06" => Some(Self::ShippingGuide),
            "07" => Some(Self::WithholdingReceipt),
            _ => None,
        }
    }
}

/// tipoIdentificacion — counterpart identification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentificationType {
    /// 04 — RUC.
    Ruc,
    /// 05 — cédula.
    NationalId,
    /// 06 — pasaporte.
    Passport,
    /// 07 — consumidor final.
    FinalConsumer,
    /// 08 — identificación del exterior.
    Foreign,
}

impl IdentificationType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ruc => "04",
            Self::NationalId => "05",
            Self::Passport => "06",
            Self::FinalConsumer => "07",
            Self::Foreign => "08",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "04" => Some(Self::Ruc),
            "05" => Some(Self::NationalId),
            "06" => Some(Self::Passport),
            "07" => Some(Self::FinalConsumer),
            "08" => Some(Self::Foreign),
            _ => None,
        }
    }
}

/// formaPago — payment method codes (SRI table 24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethodCode {
    /// 01 — sin utilización del sistema financiero.
    Cash,
    /// 15 — compensación de deudas.
    DebtCompensation,
    /// 16 — tarjeta de débito.
    DebitCard,
    /// 17 — dinero electrónico.
    ElectronicMoney,
    /// 18 — tarjeta prepago.
    PrepaidCard,
    /// 19 — tarjeta de crédito.
    CreditCard,
    /// 20 — otros con utilización del sistema financiero.
    FinancialSystem,
    /// 21 — endoso de títulos.
    Endorsement,
}

impl PaymentMethodCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cash => "01",
            Self::DebtCompensation => "15",
            Self::DebitCard => "16",
            Self::ElectronicMoney => "17",
            Self::PrepaidCard => "18",
            Self::CreditCard => "19",
            Self::FinancialSystem => "20",
            Self::Endorsement => "21",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Cash),
            "15" => Some(Self::DebtCompensation),
            "16" => Some(Self::DebitCard),
            "17" => Some(Self::ElectronicMoney),
            "18" => Some(Self::PrepaidCard),
            "19" => Some(Self::CreditCard),
            "20" => Some(Self::FinancialSystem),
            "21" => Some(Self::Endorsement),
            _ => None,
        }
    }
}

/// codigo — tax kinds on sale documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCode {
    /// 2 — IVA.
    Vat,
    /// 3 — ICE.
    Ice,
    /// 5 — IRBPNR.
    Irbpnr,
}

impl TaxCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vat => "2",
            Self::Ice => "3",
            Self::Irbpnr => "5",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "2" => Some(Self::Vat),
            "3" => Some(Self::Ice),
            "5" => Some(Self::Irbpnr),
            _ => None,
        }
    }
}

/// codigo — tax kinds on withholding receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithholdingTaxCode {
    /// 1 — renta.
    IncomeTax,
    /// 2 — IVA.
    Vat,
    /// 6 — ISD.
    Isd,
}

impl WithholdingTaxCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::IncomeTax => "1",
            Self::Vat => "2",
            Self::Isd => "6",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::IncomeTax),
            "2" => Some(Self::Vat),
            "6" => Some(Self::Isd),
            _ => None,
        }
    }
}
