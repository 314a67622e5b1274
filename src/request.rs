//! The captured request message.

use crate::config::SoapVersion;

/// An immutable record of a prepared outbound SOAP call.
///
/// Constructed only by the adapter after a successful capture; the four
/// fields are exactly what the engine handed the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    endpoint: String,
    soap_action: String,
    soap_version: SoapVersion,
    message: String,
}

impl SoapRequest {
    pub(crate) fn new(
        endpoint: String,
        soap_action: String,
        soap_version: SoapVersion,
        message: String,
    ) -> Self {
        Self {
            endpoint,
            soap_action,
            soap_version,
            message,
        }
    }

    /// Destination endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// SOAP action URI (may be empty).
    pub fn soap_action(&self) -> &str {
        &self.soap_action
    }

    /// Protocol version of the envelope.
    pub fn soap_version(&self) -> SoapVersion {
        self.soap_version
    }

    /// Protocol version wire tag: `"1"` or `"2"`.
    pub fn version_tag(&self) -> &'static str {
        self.soap_version.wire_tag()
    }

    /// The serialized envelope text.
    pub fn message(&self) -> &str {
        &self.message
    }
}
