use std::time::Duration;

use crate::core::Environment;

/// SRI test-environment (pruebas) service endpoints.
pub const TEST_RECEPTION_URL: &str =
    "https://celcer.sri.gob.ec/comprobantes-electronicos-ws/RecepcionComprobantesOffline";
pub const TEST_AUTHORIZATION_URL: &str =
    "https://celcer.sri.gob.ec/comprobantes-electronicos-ws/AutorizacionComprobantesOffline";

/// SRI production service endpoints.
pub const PRODUCTION_RECEPTION_URL: &str =
    "https://cel.sri.gob.ec/comprobantes-electronicos-ws/RecepcionComprobantesOffline";
pub const PRODUCTION_AUTHORIZATION_URL: &str =
    "https://cel.sri.gob.ec/comprobantes-electronicos-ws/AutorizacionComprobantesOffline";

/// The endpoint pair of one environment.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    /// validarComprobante service.
    pub reception: String,
    /// autorizacionComprobante service.
    pub authorization: String,
}

/// Transport client configuration. Endpoints are injected per environment
/// so tests can point the client anywhere; an environment with no
/// configured pair yields a classified config error, not a panic.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub test: Option<ServiceEndpoints>,
    pub production: Option<ServiceEndpoints>,
    /// Per-call deadline. Exceeding it is a classified timeout failure.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            test: Some(ServiceEndpoints {
                reception: TEST_RECEPTION_URL.into(),
                authorization: TEST_AUTHORIZATION_URL.into(),
            }),
            production: Some(ServiceEndpoints {
                reception: PRODUCTION_RECEPTION_URL.into(),
                authorization: PRODUCTION_AUTHORIZATION_URL.into(),
            }),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn endpoints(&self, environment: Environment) -> Option<&ServiceEndpoints> {
        match environment {
            Environment::Test => self.test.as_ref(),
            Environment::Production => self.production.as_ref(),
        }
    }
}
