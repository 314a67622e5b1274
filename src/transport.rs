//! Loopback transport: the pluggable send/receive hook, minus the network.
//!
//! The engine's call path assumes it owns the transport and performs the
//! exchange as a single opaque step. [`LoopbackTransport`] intercepts that
//! step: in capture mode it records the outbound envelope and acknowledges
//! with an empty body; in replay mode it hands back a preloaded response
//! without looking at the outbound envelope at all.

use crate::config::SoapVersion;
use crate::error::SoapError;
use tracing::debug;

/// The binding engine's single transport extension point.
///
/// Invoked exactly once per engine call with the serialized envelope and its
/// delivery metadata; returns the response body.
pub trait Transport {
    fn send(
        &mut self,
        request: &str,
        endpoint: &str,
        action: &str,
        version: SoapVersion,
    ) -> Result<String, SoapError>;
}

/// Transport state, owned and transitioned exclusively by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No capture or replay pending.
    #[default]
    Idle,
    /// The next send is captured and acknowledged with an empty response.
    AwaitingCapture,
    /// The next send is ignored; the contained text is returned instead.
    Replaying(String),
}

/// A captured outbound call: the four fields the engine hands the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub endpoint: String,
    pub action: String,
    pub version: SoapVersion,
    pub envelope: String,
}

/// A transport that never touches the network.
///
/// The capture buffer and the replay payload are mutually exclusive per call;
/// [`reset`](LoopbackTransport::reset) clears both so a faulted call can
/// never poison the next one.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    state: TransportState,
    capture: Option<CapturedCall>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the transport to capture the next send.
    pub fn arm_capture(&mut self) {
        self.state = TransportState::AwaitingCapture;
        self.capture = None;
    }

    /// Preload a response for the next send to return.
    pub fn preload(&mut self, response: impl Into<String>) {
        self.state = TransportState::Replaying(response.into());
        self.capture = None;
    }

    /// Take the captured call, leaving the buffer empty.
    pub fn take_capture(&mut self) -> Option<CapturedCall> {
        self.capture.take()
    }

    /// Return to `Idle`, dropping any capture or replay payload.
    pub fn reset(&mut self) {
        self.state = TransportState::Idle;
        self.capture = None;
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &TransportState {
        &self.state
    }
}

impl Transport for LoopbackTransport {
    fn send(
        &mut self,
        request: &str,
        endpoint: &str,
        action: &str,
        version: SoapVersion,
    ) -> Result<String, SoapError> {
        match &self.state {
            TransportState::Replaying(response) => {
                debug!(len = response.len(), "Replaying preloaded response");
                Ok(response.clone())
            }
            TransportState::AwaitingCapture => {
                debug!(endpoint, action, version = version.wire_tag(), "Capturing outbound envelope");
                self.capture = Some(CapturedCall {
                    endpoint: endpoint.to_string(),
                    action: action.to_string(),
                    version,
                    envelope: request.to_string(),
                });
                // The engine must see an empty body, not something it could
                // mistake for a response to parse.
                Ok(String::new())
            }
            TransportState::Idle => Err(SoapError::Binding(
                "transport invoked while idle; no capture or replay was armed".to_string(),
            )),
        }
    }
}
