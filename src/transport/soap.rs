//! SOAP envelope construction and response parsing for the SRI services.
//!
//! The parsers match on local element names and ignore envelope
//! namespacing, which varies between service versions.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::ComprobanteError;

use super::ServiceMessage;

const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const RECEPTION_NS: &str = "http://ec.gob.sri.ws.recepcion";
const AUTHORIZATION_NS: &str = "http://ec.gob.sri.ws.autorizacion";

/// validarComprobante request carrying the base64-encoded signed XML.
pub fn reception_envelope(signed_xml_b64: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{SOAP_NS}\" xmlns:ec=\"{RECEPTION_NS}\">\
         <soapenv:Header/>\
         <soapenv:Body>\
         <ec:validarComprobante>\
         <xml>{signed_xml_b64}</xml>\
         </ec:validarComprobante>\
         </soapenv:Body>\
         </soapenv:Envelope>"
    )
}

/// autorizacionComprobante request for one access key.
pub fn authorization_envelope(access_key: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{SOAP_NS}\" xmlns:ec=\"{AUTHORIZATION_NS}\">\
         <soapenv:Header/>\
         <soapenv:Body>\
         <ec:autorizacionComprobante>\
         <claveAccesoComprobante>{access_key}</claveAccesoComprobante>\
         </ec:autorizacionComprobante>\
         </soapenv:Body>\
         </soapenv:Envelope>"
    )
}

/// Parsed RespuestaRecepcionComprobante.
#[derive(Debug, Clone, Default)]
pub struct ParsedReception {
    /// RECIBIDA or DEVUELTA.
    pub state: Option<String>,
    pub messages: Vec<ServiceMessage>,
    /// faultstring of a SOAP fault, if the service answered with one.
    pub fault: Option<String>,
}

/// Parsed RespuestaAutorizacionComprobante.
#[derive(Debug, Clone, Default)]
pub struct ParsedAuthorization {
    /// AUTORIZADO, NO AUTORIZADO, or EN PROCESO.
    pub state: Option<String>,
    pub authorization_number: Option<String>,
    pub authorization_date: Option<String>,
    /// The authorized comprobante XML, returned verbatim.
    pub document_xml: Option<String>,
    pub messages: Vec<ServiceMessage>,
    pub fault: Option<String>,
    /// True when the response carries no autorizacion block at all —
    /// the service has not registered the key yet.
    pub empty: bool,
}

fn local_name(qname: &[u8]) -> String {
    let name = String::from_utf8_lossy(qname);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.into_owned(),
    }
}

fn parse_error(e: impl std::fmt::Display) -> ComprobanteError {
    ComprobanteError::Xml(format!("unparseable service response: {e}"))
}

fn is_in(path: &[String], container: &str) -> bool {
    path.iter().any(|p| p == container)
}

pub fn parse_reception(xml: &str) -> Result<ParsedReception, ComprobanteError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedReception::default();
    let mut current: Option<ServiceMessage> = None;
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => path.push(local_name(e.name().as_ref())),
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(parse_error)?.to_string();
                if text.is_empty() {
                    continue;
                }
                let Some(leaf) = path.last() else { continue };
                match leaf.as_str() {
                    "faultstring" => parsed.fault = Some(text),
                    "estado" => parsed.state = Some(text),
                    "identificador" if is_in(&path, "mensaje") => {
                        current.get_or_insert_with(ServiceMessage::default).identifier = text;
                    }
                    "mensaje" if is_in(&path, "mensajes") => {
                        current.get_or_insert_with(ServiceMessage::default).message = text;
                    }
                    "informacionAdicional" => {
                        current
                            .get_or_insert_with(ServiceMessage::default)
                            .additional_info = Some(text);
                    }
                    "tipo" if is_in(&path, "mensaje") => {
                        current.get_or_insert_with(ServiceMessage::default).kind = Some(text);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("mensaje") {
                    if let Some(message) = current.take() {
                        parsed.messages.push(message);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error(e)),
            _ => {}
        }
    }

    if parsed.state.is_none() && parsed.fault.is_none() {
        return Err(parse_error("response carries neither estado nor fault"));
    }
    Ok(parsed)
}

pub fn parse_authorization(xml: &str) -> Result<ParsedAuthorization, ComprobanteError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedAuthorization::default();
    let mut current: Option<ServiceMessage> = None;
    let mut seen_authorization = false;
    let mut declared_count: Option<u32> = None;
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => path.push(local_name(e.name().as_ref())),
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(parse_error)?.to_string();
                if text.is_empty() {
                    continue;
                }
                let Some(leaf) = path.last() else { continue };
                match leaf.as_str() {
                    "faultstring" => parsed.fault = Some(text),
                    "numeroComprobantes" => declared_count = text.trim().parse().ok(),
                    "estado" if is_in(&path, "autorizacion") => parsed.state = Some(text),
                    "numeroAutorizacion" => parsed.authorization_number = Some(text),
                    "fechaAutorizacion" => parsed.authorization_date = Some(text),
                    "comprobante" if is_in(&path, "autorizacion") => {
                        parsed.document_xml = Some(text);
                    }
                    "identificador" if is_in(&path, "mensaje") => {
                        current.get_or_insert_with(ServiceMessage::default).identifier = text;
                    }
                    "mensaje" if is_in(&path, "mensajes") => {
                        current.get_or_insert_with(ServiceMessage::default).message = text;
                    }
                    "informacionAdicional" => {
                        current
                            .get_or_insert_with(ServiceMessage::default)
                            .additional_info = Some(text);
                    }
                    "tipo" if is_in(&path, "mensaje") => {
                        current.get_or_insert_with(ServiceMessage::default).kind = Some(text);
                    }
                    _ => {}
                }
            }
            Ok(Event::CData(ref e)) => {
                // The authorized comprobante arrives as CDATA.
                if path.last().map(String::as_str) == Some("comprobante")
                    && is_in(&path, "autorizacion")
                {
                    parsed.document_xml = Some(String::from_utf8_lossy(e.as_ref()).into_owned());
                }
            }
            Ok(Event::End(_)) => match path.pop().as_deref() {
                Some("mensaje") => {
                    if let Some(message) = current.take() {
                        parsed.messages.push(message);
                    }
                }
                Some("autorizacion") => seen_authorization = true,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error(e)),
            _ => {}
        }
    }

    if parsed.fault.is_none() {
        parsed.empty = !seen_authorization || declared_count == Some(0);
        if !parsed.empty && parsed.state.is_none() {
            return Err(parse_error("autorizacion block carries no estado"));
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reception_envelope_embeds_payload() {
        let envelope = reception_envelope("QkFTRTY0");
        assert!(envelope.contains("<ec:validarComprobante><xml>QkFTRTY0</xml>"));
        assert!(envelope.contains(RECEPTION_NS));
    }

    #[test]
    fn parses_received_state() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
            <soap:Body><ns2:validarComprobanteResponse xmlns:ns2="http://ec.gob.sri.ws.recepcion">
            <RespuestaRecepcionComprobante><estado>RECIBIDA</estado><comprobantes/></RespuestaRecepcionComprobante>
            </ns2:validarComprobanteResponse></soap:Body></soap:Envelope>"#;
        let parsed = parse_reception(xml).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("RECIBIDA"));
        assert!(parsed.messages.is_empty());
        assert!(parsed.fault.is_none());
    }

    #[test]
    fn parses_returned_state_with_messages() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
            <RespuestaRecepcionComprobante><estado>DEVUELTA</estado>
            <comprobantes><comprobante><claveAcceso>0602202601179001691900110010010000000011234567812</claveAcceso>
            <mensajes><mensaje><identificador>35</identificador><mensaje>ARCHIVO NO CUMPLE ESTRUCTURA XML</mensaje>
            <informacionAdicional>detalle</informacionAdicional><tipo>ERROR</tipo></mensaje></mensajes>
            </comprobante></comprobantes></RespuestaRecepcionComprobante></soap:Body></soap:Envelope>"#;
        let parsed = parse_reception(xml).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("DEVUELTA"));
        assert_eq!(parsed.messages.len(), 1);
        let message = &parsed.messages[0];
        assert_eq!(message.identifier, "35");
        assert_eq!(message.message, "ARCHIVO NO CUMPLE ESTRUCTURA XML");
        assert_eq!(message.additional_info.as_deref(), Some("detalle"));
        assert_eq!(message.kind.as_deref(), Some("ERROR"));
    }

    #[test]
    fn parses_soap_fault() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
            <soap:Fault><faultcode>soap:Server</faultcode><faultstring>Internal Error</faultstring></soap:Fault>
            </soap:Body></soap:Envelope>"#;
        let parsed = parse_reception(xml).unwrap();
        assert_eq!(parsed.fault.as_deref(), Some("Internal Error"));
    }

    #[test]
    fn parses_authorized_response() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
            <RespuestaAutorizacionComprobante><claveAccesoConsultada>0602202601179001691900110010010000000011234567812</claveAccesoConsultada>
            <numeroComprobantes>1</numeroComprobantes><autorizaciones><autorizacion>
            <estado>AUTORIZADO</estado><numeroAutorizacion>0602202601179001691900110010010000000011234567812</numeroAutorizacion>
            <fechaAutorizacion>2026-02-06T12:00:00-05:00</fechaAutorizacion><ambiente>PRUEBAS</ambiente>
            <comprobante><![CDATA[<factura id="comprobante" version="2.1.0"></factura>]]></comprobante>
            <mensajes/></autorizacion></autorizaciones></RespuestaAutorizacionComprobante></soap:Body></soap:Envelope>"#;
        let parsed = parse_authorization(xml).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("AUTORIZADO"));
        assert!(
            parsed
                .authorization_number
                .as_deref()
                .unwrap()
                .starts_with("06022026")
        );
        assert_eq!(
            parsed.document_xml.as_deref(),
            Some(r#"<factura id="comprobante" version="2.1.0"></factura>"#)
        );
        assert!(!parsed.empty);
    }

    #[test]
    fn parses_rejection_with_messages() {
        let xml = r#"<e><Body><RespuestaAutorizacionComprobante><numeroComprobantes>1</numeroComprobantes>
            <autorizaciones><autorizacion><estado>NO AUTORIZADO</estado>
            <mensajes><mensaje><identificador>56</identificador><mensaje>ERROR SECUENCIAL REGISTRADO</mensaje><tipo>ERROR</tipo></mensaje></mensajes>
            </autorizacion></autorizaciones></RespuestaAutorizacionComprobante></Body></e>"#;
        let parsed = parse_authorization(xml).unwrap();
        assert_eq!(parsed.state.as_deref(), Some("NO AUTORIZADO"));
        assert_eq!(parsed.messages.len(), 1);
        assert_eq!(parsed.messages[0].identifier, "56");
    }

    #[test]
    fn empty_authorization_list_is_no_response_yet() {
        let xml = r#"<e><Body><RespuestaAutorizacionComprobante>
            <claveAccesoConsultada>0602202601179001691900110010010000000011234567812</claveAccesoConsultada>
            <numeroComprobantes>0</numeroComprobantes><autorizaciones/>
            </RespuestaAutorizacionComprobante></Body></e>"#;
        let parsed = parse_authorization(xml).unwrap();
        assert!(parsed.empty);
        assert!(parsed.state.is_none());
    }
}
