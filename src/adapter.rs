//! The binding-engine adapter: sequences engine calls against the loopback
//! transport so that `request` and `response` behave as pure functions.
//!
//! The transport state is shared, mutable, instance-scoped data, so a single
//! adapter supports one logical call at a time; both operations take
//! `&mut self`, which lets the borrow checker enforce that. The one
//! correctness property added here on top of the engine is state hygiene:
//! whatever the engine does — succeed, raise a binding error, raise a
//! fault — the transport is back in `Idle` before the call returns, so one
//! failed call can never corrupt the next.

use crate::config::{CallOptions, InterpreterOptions};
use crate::description::ServiceDescription;
use crate::engine::{DecodedResponse, SoapEngine};
use crate::error::SoapError;
use crate::request::SoapRequest;
use crate::transport::LoopbackTransport;
use crate::value::{SoapHeader, Value};
use tracing::debug;

/// Owns one engine wired to one loopback transport.
pub struct SoapAdapter {
    engine: SoapEngine,
    transport: LoopbackTransport,
}

impl SoapAdapter {
    pub fn new(
        description: Option<ServiceDescription>,
        options: InterpreterOptions,
    ) -> Result<Self, SoapError> {
        Ok(Self {
            engine: SoapEngine::new(description, options)?,
            transport: LoopbackTransport::new(),
        })
    }

    /// Mutable access to the engine, for extension registration.
    pub fn engine_mut(&mut self) -> &mut SoapEngine {
        &mut self.engine
    }

    /// Drive the engine's call path and capture the outbound message instead
    /// of sending it.
    pub fn request(
        &mut self,
        operation: &str,
        args: &[Value],
        call_options: &CallOptions,
        input_headers: &[SoapHeader],
    ) -> Result<SoapRequest, SoapError> {
        self.transport.arm_capture();
        let outcome = self.engine.invoke(
            &mut self.transport,
            operation,
            args,
            call_options,
            input_headers,
        );
        let capture = self.transport.take_capture();
        self.transport.reset();

        // Engine errors propagate unchanged, but only after the reset above.
        outcome?;

        let capture = capture.ok_or_else(|| {
            SoapError::Binding("engine completed without invoking the transport".to_string())
        })?;
        debug!(
            endpoint = %capture.endpoint,
            action = %capture.action,
            "Captured outbound request"
        );
        Ok(SoapRequest::new(
            capture.endpoint,
            capture.action,
            capture.version,
            capture.envelope,
        ))
    }

    /// Drive the engine's call path with the given text preloaded as the
    /// transport's response, and return the decoded value and output headers.
    ///
    /// Arguments are irrelevant to decoding — only the operation's output
    /// binding matters — so the engine is invoked with an empty argument
    /// list; the replay short-circuit guarantees the placeholder arguments
    /// are never interpreted by anything.
    pub fn response(
        &mut self,
        response: &str,
        operation: &str,
        call_options: &CallOptions,
    ) -> Result<(DecodedResponse, Vec<SoapHeader>), SoapError> {
        self.transport.preload(response);
        let outcome = self
            .engine
            .invoke(&mut self.transport, operation, &[], call_options, &[]);
        // Reset on success and on failure alike: a faulted decode must never
        // poison a later call on this adapter.
        self.transport.reset();
        outcome
    }
}
