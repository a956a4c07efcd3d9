//! Canonical XML 1.0 serialization.
//!
//! Deterministic byte form used before hashing and signing, so logically
//! equivalent documents hash identically: the XML declaration is dropped,
//! empty elements are expanded to start/end pairs, attributes are emitted
//! in canonical order, and text/attribute escaping follows the canonical
//! forms.
//!
//! The comprobante schemas declare no namespaces on the document side, so
//! attribute ordering reduces to namespace declarations first (sorted by
//! prefix), then attributes sorted by name — sufficient for every document
//! this crate produces and digests.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::ComprobanteError;

/// Canonicalize an XML document (or element subtree serialized as a
/// document) into its C14N 1.0 byte form.
pub fn canonicalize(xml: &str) -> Result<String, ComprobanteError> {
    let mut reader = Reader::from_str(xml);
    // Whitespace-only text nodes are significant in canonical XML.
    reader.config_mut().trim_text(false);

    let mut out = String::with_capacity(xml.len());

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => write_start(&mut out, e)?,
            Ok(Event::Empty(ref e)) => {
                // Canonical form has no self-closing elements.
                write_start(&mut out, e)?;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            Ok(Event::End(ref e)) => {
                out.push_str("</");
                out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
                out.push('>');
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ComprobanteError::Xml(format!("canonicalization: {err}")))?;
                escape_text(&mut out, &text);
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                escape_text(&mut out, &text);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ComprobanteError::Xml(format!("canonicalization: {err}")));
            }
            // Declarations, PIs, comments, and doctype are dropped.
            Ok(_) => {}
        }
    }

    Ok(out)
}

fn write_start(out: &mut String, e: &BytesStart<'_>) -> Result<(), ComprobanteError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    out.push('<');
    out.push_str(&name);

    let mut ns_decls: Vec<(String, String)> = Vec::new();
    let mut attrs: Vec<(String, String)> = Vec::new();
    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| ComprobanteError::Xml(format!("canonicalization: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ComprobanteError::Xml(format!("canonicalization: {err}")))?
            .into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            ns_decls.push((key, value));
        } else {
            attrs.push((key, value));
        }
    }
    ns_decls.sort();
    attrs.sort();

    for (key, value) in ns_decls.into_iter().chain(attrs) {
        out.push(' ');
        out.push_str(&key);
        out.push_str("=\"");
        escape_attr(out, &value);
        out.push('"');
    }
    out.push('>');
    Ok(())
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}
