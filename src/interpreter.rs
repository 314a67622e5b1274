//! The public facade.

use crate::adapter::SoapAdapter;
use crate::config::{CallOptions, InterpreterOptions};
use crate::description::ServiceDescription;
use crate::engine::DecodedResponse;
use crate::error::SoapError;
use crate::request::SoapRequest;
use crate::typemap::TypeEntry;
use crate::value::{SoapHeader, Value};

/// Interprets remote-procedure calls to SOAP request messages and SOAP
/// response messages back to native values, without any network I/O.
///
/// ```
/// use soap_interpreter::{Interpreter, InterpreterOptions, StructValue, Value};
///
/// let mut interpreter = Interpreter::new(
///     None,
///     InterpreterOptions::wsdl_less("www.uri.com", "www.location.com"),
/// )?;
///
/// let request = interpreter.request(
///     "ConversionRate",
///     &[Value::Struct(StructValue::new(vec![
///         ("FromCurrency".to_string(), Value::from("AFA")),
///         ("ToCurrency".to_string(), Value::from("ALL")),
///     ]))],
/// )?;
/// assert_eq!(request.endpoint(), "www.location.com");
/// assert_eq!(request.soap_action(), "www.uri.com#ConversionRate");
/// # Ok::<(), soap_interpreter::SoapError>(())
/// ```
pub struct Interpreter {
    adapter: SoapAdapter,
}

impl Interpreter {
    /// Create an interpreter for a described service, or in WSDL-less mode
    /// when `description` is `None` (then the `uri` and `location` options
    /// are mandatory).
    ///
    /// Transport-level options are stripped before engine construction: no
    /// transport exchange ever happens, so they could only cause the engine
    /// to misbehave.
    pub fn new(
        description: Option<ServiceDescription>,
        mut options: InterpreterOptions,
    ) -> Result<Self, SoapError> {
        options.sanitize();
        Ok(Self {
            adapter: SoapAdapter::new(description, options)?,
        })
    }

    /// Register a custom per-type encode/decode strategy.
    pub fn register_type(&mut self, entry: TypeEntry) -> &mut Self {
        self.adapter.engine_mut().typemap_mut().register(entry);
        self
    }

    /// Map a response element name to a native type name.
    pub fn map_class(
        &mut self,
        element: impl Into<String>,
        type_name: impl Into<String>,
    ) -> &mut Self {
        self.adapter.engine_mut().classmap_mut().insert(element, type_name);
        self
    }

    /// Interpret an operation and its arguments to a SOAP request message.
    pub fn request(
        &mut self,
        operation: &str,
        args: &[Value],
    ) -> Result<SoapRequest, SoapError> {
        self.request_with(operation, args, &CallOptions::default(), &[])
    }

    /// [`request`](Self::request) with per-call options and input headers.
    pub fn request_with(
        &mut self,
        operation: &str,
        args: &[Value],
        call_options: &CallOptions,
        input_headers: &[SoapHeader],
    ) -> Result<SoapRequest, SoapError> {
        self.adapter
            .request(operation, args, call_options, input_headers)
    }

    /// Interpret a SOAP response message to a native value, along with any
    /// decoded output headers.
    pub fn response(
        &mut self,
        response: &str,
        operation: &str,
    ) -> Result<(DecodedResponse, Vec<SoapHeader>), SoapError> {
        self.response_with(response, operation, &CallOptions::default())
    }

    /// [`response`](Self::response) with per-call options.
    pub fn response_with(
        &mut self,
        response: &str,
        operation: &str,
        call_options: &CallOptions,
    ) -> Result<(DecodedResponse, Vec<SoapHeader>), SoapError> {
        self.adapter.response(response, operation, call_options)
    }
}
