//! Interpreter options and per-call options.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// SOAP protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SoapVersion {
    /// SOAP 1.1 (namespace: http://schemas.xmlsoap.org/soap/envelope/)
    #[serde(rename = "1.1")]
    #[default]
    Soap11,
    /// SOAP 1.2 (namespace: http://www.w3.org/2003/05/soap-envelope)
    #[serde(rename = "1.2")]
    Soap12,
}

impl SoapVersion {
    /// Envelope namespace URI for this version.
    pub fn namespace_uri(&self) -> &'static str {
        match self {
            Self::Soap11 => "http://schemas.xmlsoap.org/soap/envelope/",
            Self::Soap12 => "http://www.w3.org/2003/05/soap-envelope",
        }
    }

    /// Wire tag reported on captured requests: `"1"` or `"2"`.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Soap11 => "1",
            Self::Soap12 => "2",
        }
    }

    /// Resolve a version from an envelope namespace URI.
    pub fn from_namespace(uri: &str) -> Option<Self> {
        match uri {
            "http://schemas.xmlsoap.org/soap/envelope/" => Some(Self::Soap11),
            "http://www.w3.org/2003/05/soap-envelope" => Some(Self::Soap12),
            _ => None,
        }
    }
}

/// Options for constructing an [`Interpreter`](crate::Interpreter).
///
/// The transport-level options (`login`, `proxy_host`, `compression`, ...)
/// exist only so that option sets written for a networked SOAP client can be
/// accepted unchanged; [`InterpreterOptions::sanitize`] strips them before
/// engine construction because no transport I/O ever happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Target namespace of the SOAP service (mandatory in WSDL-less mode).
    pub uri: Option<String>,

    /// Endpoint URL of the service (mandatory in WSDL-less mode).
    pub location: Option<String>,

    /// Protocol version for generated envelopes.
    pub soap_version: SoapVersion,

    /// When true (default), a SOAP fault in a response is raised as an
    /// error; when false, it is returned as a fault value instead.
    pub exceptions: bool,

    /// Character encoding declared on generated envelopes.
    pub encoding: String,

    // Transport-level options, accepted and discarded.
    pub login: Option<String>,
    pub password: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_login: Option<String>,
    pub proxy_password: Option<String>,
    pub local_cert: Option<String>,
    pub passphrase: Option<String>,
    pub authentication: Option<String>,
    pub compression: Option<String>,
    pub trace: Option<bool>,
    pub connection_timeout: Option<u64>,
    pub user_agent: Option<String>,
    pub keep_alive: Option<bool>,
    pub ssl_method: Option<String>,
    pub stream_context: Option<String>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            uri: None,
            location: None,
            soap_version: SoapVersion::Soap11,
            exceptions: true,
            encoding: "UTF-8".to_string(),
            login: None,
            password: None,
            proxy_host: None,
            proxy_port: None,
            proxy_login: None,
            proxy_password: None,
            local_cert: None,
            passphrase: None,
            authentication: None,
            compression: None,
            trace: None,
            connection_timeout: None,
            user_agent: None,
            keep_alive: None,
            ssl_method: None,
            stream_context: None,
        }
    }
}

impl InterpreterOptions {
    /// Options for WSDL-less mode with the two mandatory fields set.
    pub fn wsdl_less(uri: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Set the protocol version.
    pub fn soap_version(mut self, version: SoapVersion) -> Self {
        self.soap_version = version;
        self
    }

    /// Disable fault-raising: faults come back as values.
    pub fn without_exceptions(mut self) -> Self {
        self.exceptions = false;
        self
    }

    /// Strip every transport-level option.
    ///
    /// The engine never performs network I/O, so these options can only
    /// mislead or fail validation downstream. Each dropped option is logged.
    pub fn sanitize(&mut self) {
        macro_rules! strip {
            ($($field:ident),+ $(,)?) => {
                $(
                    if self.$field.take().is_some() {
                        debug!(option = stringify!($field), "Discarding transport option");
                    }
                )+
            };
        }
        strip!(
            login,
            password,
            proxy_host,
            proxy_port,
            proxy_login,
            proxy_password,
            local_cert,
            passphrase,
            authentication,
            compression,
            trace,
            connection_timeout,
            user_agent,
            keep_alive,
            ssl_method,
            stream_context,
        );
    }
}

/// Per-call option overrides, forwarded verbatim to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    /// Override the endpoint URL for this call.
    pub location: Option<String>,
    /// Override the target namespace for this call.
    pub uri: Option<String>,
    /// Override the SOAP action for this call.
    pub soapaction: Option<String>,
}

impl CallOptions {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.uri.is_none() && self.soapaction.is_none()
    }
}
