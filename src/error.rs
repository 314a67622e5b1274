//! Error types and the SOAP fault representation.

use crate::value::Value;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the interpreter.
#[derive(Error, Debug)]
pub enum SoapError {
    /// The operation name or arguments cannot be mapped to a declared
    /// operation, or a mandatory option is missing in WSDL-less mode.
    #[error("binding error: {0}")]
    Binding(String),

    /// The response encodes a SOAP fault (raised unless the interpreter was
    /// constructed with `exceptions: false`).
    #[error("SOAP fault: {0}")]
    Fault(SoapFault),

    /// The response text is not a parseable SOAP envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid interpreter construction.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The SOAP protocol's standard error payload.
///
/// Populated from a 1.1 `Fault` element (`faultcode`/`faultstring`/
/// `faultactor`/`detail`) or its 1.2 equivalent (`Code/Value`, `Reason/Text`,
/// `Detail`), normalized to the 1.1 field names.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapFault {
    /// Fault code, as qualified text (e.g. `SOAP-ENV:Server`).
    pub code: String,
    /// Human-readable fault string.
    pub fault_string: String,
    /// Fault actor URI, if present.
    pub actor: Option<String>,
    /// Application-specific detail payload, if present.
    pub detail: Option<Value>,
}

impl SoapFault {
    pub fn new(code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            fault_string: fault_string.into(),
            actor: None,
            detail: None,
        }
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.fault_string)
    }
}
