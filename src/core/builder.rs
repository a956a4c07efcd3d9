use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ComprobanteError;
use super::types::*;
use super::validation;

/// Builder for constructing electronic documents.
///
/// ```
/// use chrono::NaiveDate;
/// use comprobante::core::*;
/// use rust_decimal_macros::dec;
///
/// let emitter = Emitter {
///     legal_name: "COMERCIAL ANDINA S.A.".into(),
///     trade_name: None,
///     ruc: "1790016919001".into(),
///     head_office_address: "Av. Amazonas N34-12, Quito".into(),
///     establishment_address: None,
///     special_taxpayer: None,
///     keeps_accounting: true,
/// };
///
/// let invoice = DocumentBuilder::new(NaiveDate::from_ymd_opt(2026, 2, 6).unwrap())
///     .emitter(emitter)
///     .sequence(1)
///     .payment(PaymentMethodCode::Cash, dec!(11.50))
///     .detail(DocumentDetail::Invoice(InvoiceDetail {
///         customer: CounterpartBuilder::new(
///             IdentificationType::NationalId,
///             "1710034065",
///             "Juan Pérez",
///         )
///         .build(),
///         remission_guide: None,
///         lines: vec![
///             LineItemBuilder::new("SKU-1", "Servicio", dec!(1), dec!(10))
///                 .vat("4", dec!(15))
///                 .build(),
///         ],
///     }))
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.grand_total, dec!(11.50));
/// ```
pub struct DocumentBuilder {
    emitter: Option<Emitter>,
    environment: Environment,
    emission_type: EmissionType,
    establishment: String,
    emission_point: String,
    sequence: u32,
    issue_date: NaiveDate,
    currency: String,
    numeric_code: Option<String>,
    tip: Decimal,
    totals: Option<Totals>,
    payments: Vec<Payment>,
    additional_fields: Vec<AdditionalField>,
    detail: Option<DocumentDetail>,
}

impl DocumentBuilder {
    pub fn new(issue_date: NaiveDate) -> Self {
        Self {
            emitter: None,
            environment: Environment::Test,
            emission_type: EmissionType::Normal,
            establishment: "001".into(),
            emission_point: "001".into(),
            sequence: 1,
            issue_date,
            currency: "DOLAR".into(),
            numeric_code: None,
            tip: Decimal::ZERO,
            totals: None,
            payments: Vec::new(),
            additional_fields: Vec::new(),
            detail: None,
        }
    }

    pub fn emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn establishment(mut self, code: impl Into<String>) -> Self {
        self.establishment = code.into();
        self
    }

    pub fn emission_point(mut self, code: impl Into<String>) -> Self {
        self.emission_point = code.into();
        self
    }

    pub fn sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Pin the access-key numeric code instead of drawing a random one.
    pub fn numeric_code(mut self, code: impl Into<String>) -> Self {
        self.numeric_code = Some(code.into());
        self
    }

    pub fn tip(mut self, tip: Decimal) -> Self {
        self.tip = tip;
        self
    }

    /// Override the computed totals.
    pub fn totals(mut self, totals: Totals) -> Self {
        self.totals = Some(totals);
        self
    }

    pub fn payment(mut self, method: PaymentMethodCode, total: Decimal) -> Self {
        self.payments.push(Payment {
            method,
            total,
            term: None,
            time_unit: None,
        });
        self
    }

    pub fn add_payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn additional_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.additional_fields.push(AdditionalField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn detail(mut self, detail: DocumentDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Assemble the document, computing totals from the payload unless
    /// they were set explicitly.
    pub fn build(self) -> Result<ElectronicDocument, ComprobanteError> {
        let emitter = self
            .emitter
            .ok_or_else(|| ComprobanteError::Validation("builder: emitter is required".into()))?;
        let detail = self
            .detail
            .ok_or_else(|| ComprobanteError::Validation("builder: detail is required".into()))?;
        let totals = self
            .totals
            .unwrap_or_else(|| validation::compute_totals(&detail, self.tip));

        Ok(ElectronicDocument {
            emitter,
            environment: self.environment,
            emission_type: self.emission_type,
            establishment: self.establishment,
            emission_point: self.emission_point,
            sequence: self.sequence,
            issue_date: self.issue_date,
            currency: self.currency,
            numeric_code: self.numeric_code,
            totals,
            payments: self.payments,
            additional_fields: self.additional_fields,
            detail,
        })
    }
}

/// Builder for counterpart identities.
pub struct CounterpartBuilder {
    id_type: IdentificationType,
    identification: String,
    name: String,
    address: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl CounterpartBuilder {
    pub fn new(
        id_type: IdentificationType,
        identification: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id_type,
            identification: identification.into(),
            name: name.into(),
            address: None,
            email: None,
            phone: None,
        }
    }

    /// Anonymous final-consumer counterpart.
    pub fn final_consumer() -> Self {
        Self::new(
            IdentificationType::FinalConsumer,
            FINAL_CONSUMER_ID,
            "CONSUMIDOR FINAL",
        )
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn build(self) -> Counterpart {
        Counterpart {
            id_type: self.id_type,
            identification: self.identification,
            name: self.name,
            address: self.address,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Builder for line items.
pub struct LineItemBuilder {
    code: String,
    auxiliary_code: Option<String>,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Decimal,
    taxes: Vec<TaxEntry>,
}

impl LineItemBuilder {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            auxiliary_code: None,
            description: description.into(),
            quantity,
            unit_price,
            discount: Decimal::ZERO,
            taxes: Vec::new(),
        }
    }

    pub fn auxiliary_code(mut self, code: impl Into<String>) -> Self {
        self.auxiliary_code = Some(code.into());
        self
    }

    pub fn discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    /// Add a VAT entry whose base is the line subtotal and whose amount
    /// is derived from the rate, rounded half-up to 2 decimal places.
    pub fn vat(mut self, rate_code: impl Into<String>, rate: Decimal) -> Self {
        let base = self.quantity * self.unit_price - self.discount;
        self.taxes.push(TaxEntry {
            tax: TaxCode::Vat,
            rate_code: rate_code.into(),
            rate,
            base,
            amount: validation::tax_amount(base, rate),
        });
        self
    }

    /// Add a raw tax entry with explicit base and amount.
    pub fn tax(mut self, entry: TaxEntry) -> Self {
        self.taxes.push(entry);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            code: self.code,
            auxiliary_code: self.auxiliary_code,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            taxes: self.taxes,
        }
    }
}
