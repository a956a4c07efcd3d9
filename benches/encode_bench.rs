use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use comprobante::core::*;
use comprobante::xml::Encode;

fn bench_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 6).unwrap()
}

fn bench_emitter() -> Emitter {
    Emitter {
        legal_name: "COMERCIAL ANDINA S.A.".into(),
        trade_name: Some("Andina".into()),
        ruc: "1790016919001".into(),
        head_office_address: "Av. Amazonas N34-12, Quito".into(),
        establishment_address: Some("Av. Amazonas N34-12, Quito".into()),
        special_taxpayer: None,
        keeps_accounting: true,
    }
}

fn build_20_line_invoice() -> ElectronicDocument {
    let lines: Vec<LineItem> = (0..20)
        .map(|i| {
            LineItemBuilder::new(
                format!("PRD-{i:03}"),
                format!("Producto de catálogo {i}"),
                dec!(3),
                dec!(12.75),
            )
            .vat("4", dec!(15))
            .build()
        })
        .collect();

    DocumentBuilder::new(bench_date())
        .emitter(bench_emitter())
        .sequence(42)
        .numeric_code("12345678")
        .payment(PaymentMethodCode::CreditCard, dec!(879.80))
        .detail(DocumentDetail::Invoice(InvoiceDetail {
            customer: CounterpartBuilder::new(
                IdentificationType::Ruc,
                "1790016919001",
                "DISTRIBUIDORA DEL PACIFICO S.A.",
            )
            .build(),
            remission_guide: None,
            lines,
        }))
        .build()
        .unwrap()
}

fn key_generation(c: &mut Criterion) {
    let document = build_20_line_invoice();
    let request = KeyRequest::from_document(&document);
    c.bench_function("access_key_generate", |b| {
        b.iter(|| access_key::generate(black_box(&request)).unwrap())
    });
}

fn invoice_encoding(c: &mut Criterion) {
    let document = build_20_line_invoice();
    let key = access_key::generate(&KeyRequest::from_document(&document)).unwrap();
    c.bench_function("encode_invoice_20_lines", |b| {
        b.iter(|| document.encode(black_box(&key)).unwrap())
    });
}

fn document_validation(c: &mut Criterion) {
    let document = build_20_line_invoice();
    c.bench_function("validate_invoice_20_lines", |b| {
        b.iter(|| validate_document(black_box(&document)))
    });
}

criterion_group!(benches, key_generation, invoice_encoding, document_validation);
criterion_main!(benches);
