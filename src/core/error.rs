use thiserror::Error;

/// Errors that can occur while generating, signing, or authorizing a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComprobanteError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Access-key construction received malformed inputs (a caller bug,
    /// not bad document data).
    #[error("access key error: {0}")]
    AccessKey(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Certificate container could not be opened or holds no usable
    /// signing certificate. Requires operator action, never retried.
    #[error("certificate error: {0}")]
    Certificate(String),

    /// Signature computation failed.
    #[error("signature error: {0}")]
    Signature(String),

    /// Classified failure of a web-service call.
    #[error("transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    /// Document or certificate store failure.
    #[error("store error: {0}")]
    Store(String),

    /// A document entered the pipeline from a state other than Draft.
    #[error("ordering error: {0}")]
    Ordering(String),
}

/// Closed taxonomy of transport failures. The orchestrator decides on
/// retries purely from this kind — raw HTTP errors never reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The configured per-call deadline elapsed.
    Timeout,
    /// Connection could not be established (refused, DNS failure).
    ConnectionRefused,
    /// Connection dropped mid-exchange.
    ConnectionReset,
    /// The service answered, but not with a parseable success payload
    /// (SOAP fault, HTTP error status, malformed body).
    ProtocolFault,
    /// No endpoints are configured for the requested environment.
    Config,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::ConnectionRefused => "connection-refused",
            Self::ConnectionReset => "connection-reset",
            Self::ProtocolFault => "protocol-fault",
            Self::Config => "config",
        };
        f.write_str(s)
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "emitter.ruc").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Internal rule ID if applicable (e.g. "EMI-01").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
