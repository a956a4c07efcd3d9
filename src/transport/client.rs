use std::time::Instant;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use crate::core::{ComprobanteError, Environment, TransportErrorKind};

use super::endpoints::ClientConfig;
use super::soap;
use super::{
    AuthorizationResponse, AuthorizationService, AuthorizationStatus, ReceptionResponse,
    ReceptionStatus, TransportFailure,
};

/// SOAP client for the SRI reception and authorization services.
///
/// All failures are translated into the closed [`TransportErrorKind`]
/// taxonomy; raw HTTP errors never reach the caller. Every call is
/// bounded by the configured timeout — exceeding it is itself a
/// classified failure, not a hang.
pub struct SriClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SriClient {
    pub fn new(config: ClientConfig) -> Result<Self, ComprobanteError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ComprobanteError::Transport {
                kind: TransportErrorKind::Config,
                message: format!("HTTP client construction failed: {e}"),
            })?;
        Ok(Self { http, config })
    }

    /// Client with the default SRI endpoints and timeout.
    pub fn with_defaults() -> Result<Self, ComprobanteError> {
        Self::new(ClientConfig::default())
    }

    async fn call(&self, endpoint: &str, envelope: String) -> Result<String, TransportFailure> {
        let response = self
            .http
            .post(endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(envelope)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify(&e))?;

        if !status.is_success() {
            return Err(TransportFailure {
                kind: TransportErrorKind::ProtocolFault,
                message: format!("HTTP {status}: {}", excerpt(&body)),
            });
        }
        Ok(body)
    }
}

fn classify(error: &reqwest::Error) -> TransportFailure {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::ConnectionRefused
    } else {
        TransportErrorKind::ConnectionReset
    };
    TransportFailure {
        kind,
        message: error.to_string(),
    }
}

fn config_failure(environment: Environment) -> TransportFailure {
    TransportFailure {
        kind: TransportErrorKind::Config,
        message: format!(
            "no endpoints configured for environment {}",
            environment.code()
        ),
    }
}

fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.into()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

#[async_trait]
impl AuthorizationService for SriClient {
    async fn submit(&self, signed_xml: &[u8], environment: Environment) -> ReceptionResponse {
        let started = Instant::now();
        let Some(endpoints) = self.config.endpoints(environment) else {
            return ReceptionResponse::failed(config_failure(environment), String::new(), 0);
        };
        let endpoint = endpoints.reception.clone();

        let envelope = soap::reception_envelope(&BASE64.encode(signed_xml));
        debug!(endpoint = %endpoint, bytes = signed_xml.len(), "submitting comprobante");

        let body = match self.call(&endpoint, envelope).await {
            Ok(body) => body,
            Err(failure) => {
                warn!(endpoint = %endpoint, kind = %failure.kind, "submission failed");
                return ReceptionResponse::failed(failure, endpoint, elapsed_ms(started));
            }
        };

        let parsed = match soap::parse_reception(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return ReceptionResponse::failed(
                    TransportFailure {
                        kind: TransportErrorKind::ProtocolFault,
                        message: e.to_string(),
                    },
                    endpoint,
                    elapsed_ms(started),
                );
            }
        };

        if let Some(fault) = parsed.fault {
            return ReceptionResponse::failed(
                TransportFailure {
                    kind: TransportErrorKind::ProtocolFault,
                    message: format!("SOAP fault: {fault}"),
                },
                endpoint,
                elapsed_ms(started),
            );
        }

        let status = match parsed.state.as_deref() {
            Some("RECIBIDA") => ReceptionStatus::Received,
            Some("DEVUELTA") => ReceptionStatus::Returned,
            other => {
                return ReceptionResponse::failed(
                    TransportFailure {
                        kind: TransportErrorKind::ProtocolFault,
                        message: format!("unexpected reception state {other:?}"),
                    },
                    endpoint,
                    elapsed_ms(started),
                );
            }
        };

        debug!(endpoint = %endpoint, ?status, "reception answered");
        ReceptionResponse {
            status,
            messages: parsed.messages,
            failure: None,
            endpoint,
            elapsed_ms: elapsed_ms(started),
        }
    }

    async fn query_authorization(
        &self,
        access_key: &str,
        environment: Environment,
    ) -> AuthorizationResponse {
        let started = Instant::now();
        let Some(endpoints) = self.config.endpoints(environment) else {
            return AuthorizationResponse::failed(config_failure(environment), String::new(), 0);
        };
        let endpoint = endpoints.authorization.clone();

        let envelope = soap::authorization_envelope(access_key);
        debug!(endpoint = %endpoint, access_key, "querying authorization");

        let body = match self.call(&endpoint, envelope).await {
            Ok(body) => body,
            Err(failure) => {
                warn!(endpoint = %endpoint, kind = %failure.kind, "authorization query failed");
                return AuthorizationResponse::failed(failure, endpoint, elapsed_ms(started));
            }
        };

        let parsed = match soap::parse_authorization(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return AuthorizationResponse::failed(
                    TransportFailure {
                        kind: TransportErrorKind::ProtocolFault,
                        message: e.to_string(),
                    },
                    endpoint,
                    elapsed_ms(started),
                );
            }
        };

        if let Some(fault) = parsed.fault {
            return AuthorizationResponse::failed(
                TransportFailure {
                    kind: TransportErrorKind::ProtocolFault,
                    message: format!("SOAP fault: {fault}"),
                },
                endpoint,
                elapsed_ms(started),
            );
        }

        let status = if parsed.empty {
            AuthorizationStatus::NoResponseYet
        } else {
            match parsed.state.as_deref() {
                Some("AUTORIZADO") => AuthorizationStatus::Authorized,
                Some("NO AUTORIZADO") => AuthorizationStatus::NotAuthorized,
                // EN PROCESO and its variants all mean "ask again later".
                Some(_) => AuthorizationStatus::Processing,
                None => AuthorizationStatus::NoResponseYet,
            }
        };

        debug!(endpoint = %endpoint, ?status, "authorization answered");
        AuthorizationResponse {
            status,
            authorization_number: parsed.authorization_number,
            authorization_date: parsed.authorization_date,
            authorized_xml: parsed.document_xml,
            messages: parsed.messages,
            failure: None,
            endpoint,
            elapsed_ms: elapsed_ms(started),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
