use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::ComprobanteError;

pub type XmlResult = Result<String, ComprobanteError>;

fn xml_io(e: std::io::Error) -> ComprobanteError {
    ComprobanteError::Xml(format!("XML write error: {e}"))
}

pub(crate) struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, ComprobanteError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, ComprobanteError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| ComprobanteError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, ComprobanteError> {
        let elem = BytesStart::new(name);
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ComprobanteError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, ComprobanteError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, ComprobanteError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ComprobanteError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write the element only when a value is present; absent optionals
    /// are omitted entirely, never emitted as empty elements.
    pub fn opt_text_element(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, ComprobanteError> {
        if let Some(text) = text {
            self.text_element(name, text)?;
        }
        Ok(self)
    }

    /// Monetary element, fixed 2 decimal places.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
    ) -> Result<&mut Self, ComprobanteError> {
        self.text_element(name, &format_amount(amount))
    }

    /// Quantity/unit-price element, fixed 6 decimal places.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
    ) -> Result<&mut Self, ComprobanteError> {
        self.text_element(name, &format_quantity(qty))
    }

    pub fn date_element(
        &mut self,
        name: &str,
        date: NaiveDate,
    ) -> Result<&mut Self, ComprobanteError> {
        self.text_element(name, &format_date(date))
    }
}

/// Format a monetary value with exactly 2 decimal places.
///
/// The receiving schemas validate fixed-precision decimal types, so the
/// width is part of the wire contract rather than a style choice.
pub fn format_amount(value: Decimal) -> String {
    format_fixed(value, 2)
}

/// Format a quantity or unit price with exactly 6 decimal places.
pub fn format_quantity(value: Decimal) -> String {
    format_fixed(value, 6)
}

fn format_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded =
        value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

/// fechaEmision wire form: dd/mm/yyyy.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_is_2dp() {
        assert_eq!(format_amount(dec!(21)), "21.00");
        assert_eq!(format_amount(dec!(21.5)), "21.50");
        assert_eq!(format_amount(dec!(21.005)), "21.01");
        assert_eq!(format_amount(dec!(0)), "0.00");
    }

    #[test]
    fn quantity_is_6dp() {
        assert_eq!(format_quantity(dec!(2)), "2.000000");
        assert_eq!(format_quantity(dec!(10.5)), "10.500000");
        assert_eq!(format_quantity(dec!(0.1234567)), "0.123457");
    }

    #[test]
    fn date_is_slash_separated() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
        assert_eq!(format_date(date), "06/02/2026");
    }

    #[test]
    fn optional_elements_are_omitted() {
        let mut w = XmlWriter::new().unwrap();
        w.start_element("root").unwrap();
        w.opt_text_element("present", Some("x")).unwrap();
        w.opt_text_element("absent", None).unwrap();
        w.end_element("root").unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.contains("<present>x</present>"));
        assert!(!xml.contains("absent"));
    }
}
