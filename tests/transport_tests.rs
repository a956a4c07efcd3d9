#![cfg(feature = "transport")]

use comprobante::core::Environment;
use comprobante::transport::{ClientConfig, ServiceEndpoints, SriClient, soap};

// --- Configuration ---

#[test]
fn default_config_covers_both_environments() {
    let config = ClientConfig::default();
    let test = config.endpoints(Environment::Test).unwrap();
    let production = config.endpoints(Environment::Production).unwrap();
    assert!(test.reception.contains("celcer.sri.gob.ec"));
    assert!(production.reception.contains("cel.sri.gob.ec"));
    assert_ne!(test.authorization, production.authorization);
}

#[test]
fn client_builds_from_custom_endpoints() {
    let config = ClientConfig {
        test: Some(ServiceEndpoints {
            reception: "https://localhost:8443/recepcion".into(),
            authorization: "https://localhost:8443/autorizacion".into(),
        }),
        production: None,
        ..ClientConfig::default()
    };
    assert!(SriClient::new(config).is_ok());
}

// --- Request envelopes ---

#[test]
fn reception_envelope_wraps_base64_payload() {
    let envelope = soap::reception_envelope("UEFZTE9BRA==");
    assert!(envelope.starts_with("<soapenv:Envelope"));
    assert!(envelope.contains("xmlns:ec=\"http://ec.gob.sri.ws.recepcion\""));
    assert!(envelope.contains("<ec:validarComprobante><xml>UEFZTE9BRA==</xml></ec:validarComprobante>"));
}

#[test]
fn authorization_envelope_carries_the_access_key() {
    let key = "0602202601179001691900110010010000000011234567812";
    let envelope = soap::authorization_envelope(key);
    assert!(envelope.contains("xmlns:ec=\"http://ec.gob.sri.ws.autorizacion\""));
    assert!(envelope.contains(&format!("<claveAccesoComprobante>{key}</claveAccesoComprobante>")));
}

// --- Response parsing ---

#[test]
fn reception_received() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
        <ns2:validarComprobanteResponse xmlns:ns2="http://ec.gob.sri.ws.recepcion">
        <RespuestaRecepcionComprobante><estado>RECIBIDA</estado><comprobantes/></RespuestaRecepcionComprobante>
        </ns2:validarComprobanteResponse></soap:Body></soap:Envelope>"#;
    let parsed = soap::parse_reception(xml).unwrap();
    assert_eq!(parsed.state.as_deref(), Some("RECIBIDA"));
    assert!(parsed.fault.is_none());
}

#[test]
fn reception_returned_collects_messages() {
    let xml = r#"<e><Body><RespuestaRecepcionComprobante><estado>DEVUELTA</estado>
        <comprobantes><comprobante>
        <claveAcceso>0602202601179001691900110010010000000011234567812</claveAcceso>
        <mensajes>
        <mensaje><identificador>45</identificador><mensaje>ERROR SECUENCIAL REGISTRADO</mensaje><tipo>ERROR</tipo></mensaje>
        <mensaje><identificador>52</identificador><mensaje>ERROR EN DIFERENCIAS DE FECHAS</mensaje>
        <informacionAdicional>La fecha de emisión está fuera de rango</informacionAdicional><tipo>ADVERTENCIA</tipo></mensaje>
        </mensajes></comprobante></comprobantes></RespuestaRecepcionComprobante></Body></e>"#;
    let parsed = soap::parse_reception(xml).unwrap();
    assert_eq!(parsed.state.as_deref(), Some("DEVUELTA"));
    assert_eq!(parsed.messages.len(), 2);
    assert_eq!(parsed.messages[0].identifier, "45");
    assert_eq!(parsed.messages[1].kind.as_deref(), Some("ADVERTENCIA"));
    assert_eq!(
        parsed.messages[1].additional_info.as_deref(),
        Some("La fecha de emisión está fuera de rango")
    );
}

#[test]
fn reception_garbage_is_an_error() {
    assert!(soap::parse_reception("<html>Bad Gateway</html>").is_err());
    assert!(soap::parse_reception("not xml at all").is_err());
}

#[test]
fn authorization_authorized_carries_the_comprobante() {
    let xml = r#"<e><Body><RespuestaAutorizacionComprobante>
        <claveAccesoConsultada>0602202601179001691900110010010000000011234567812</claveAccesoConsultada>
        <numeroComprobantes>1</numeroComprobantes>
        <autorizaciones><autorizacion><estado>AUTORIZADO</estado>
        <numeroAutorizacion>0602202601179001691900110010010000000011234567812</numeroAutorizacion>
        <fechaAutorizacion>2026-02-06T12:00:00-05:00</fechaAutorizacion>
        <ambiente>PRUEBAS</ambiente>
        <comprobante><![CDATA[<factura id="comprobante" version="2.1.0"><infoTributaria/></factura>]]></comprobante>
        <mensajes/></autorizacion></autorizaciones>
        </RespuestaAutorizacionComprobante></Body></e>"#;
    let parsed = soap::parse_authorization(xml).unwrap();
    assert_eq!(parsed.state.as_deref(), Some("AUTORIZADO"));
    assert_eq!(
        parsed.authorization_date.as_deref(),
        Some("2026-02-06T12:00:00-05:00")
    );
    // The authorized XML comes back verbatim.
    assert!(parsed.document_xml.unwrap().starts_with("<factura"));
    assert!(!parsed.empty);
}

#[test]
fn authorization_in_process() {
    let xml = r#"<e><Body><RespuestaAutorizacionComprobante>
        <numeroComprobantes>1</numeroComprobantes>
        <autorizaciones><autorizacion><estado>EN PROCESO</estado><mensajes/></autorizacion></autorizaciones>
        </RespuestaAutorizacionComprobante></Body></e>"#;
    let parsed = soap::parse_authorization(xml).unwrap();
    assert_eq!(parsed.state.as_deref(), Some("EN PROCESO"));
    assert!(!parsed.empty);
}

#[test]
fn authorization_empty_list_means_no_response_yet() {
    let xml = r#"<e><Body><RespuestaAutorizacionComprobante>
        <claveAccesoConsultada>0602202601179001691900110010010000000011234567812</claveAccesoConsultada>
        <numeroComprobantes>0</numeroComprobantes><autorizaciones/>
        </RespuestaAutorizacionComprobante></Body></e>"#;
    let parsed = soap::parse_authorization(xml).unwrap();
    assert!(parsed.empty);
}

#[test]
fn soap_fault_is_surfaced() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
        <soap:Fault><faultcode>soap:Client</faultcode><faultstring>Policy Falsified</faultstring></soap:Fault>
        </soap:Body></soap:Envelope>"#;
    let reception = soap::parse_reception(xml).unwrap();
    assert_eq!(reception.fault.as_deref(), Some("Policy Falsified"));
    let authorization = soap::parse_authorization(xml).unwrap();
    assert_eq!(authorization.fault.as_deref(), Some("Policy Falsified"));
}
