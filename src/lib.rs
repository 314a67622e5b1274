//! Offline SOAP message interpreter.
//!
//! Obtains the exact wire-level SOAP request message that would be sent for
//! a given remote-procedure call, and decodes SOAP response messages
//! (supplied as text, never fetched) back into native values. No network
//! I/O ever happens: the binding engine is wired to a loopback transport
//! that captures outbound envelopes and replays caller-supplied responses.
//!
//! # Features
//!
//! - Request interpretation: operation + arguments + headers to an envelope,
//!   endpoint, action, and protocol version
//! - Response interpretation: envelope text to native values and output
//!   headers, SOAP 1.1 and 1.2
//! - Fault decoding: raised as an error, or returned as a value with
//!   `exceptions: false`
//! - WSDL-less mode and programmatic service descriptions
//! - Custom per-type serializers/deserializers and class mapping
//!
//! # Example
//!
//! ```
//! use soap_interpreter::{Interpreter, InterpreterOptions, StructValue, Value};
//!
//! let mut interpreter = Interpreter::new(
//!     None,
//!     InterpreterOptions::wsdl_less("www.uri.com", "www.location.com"),
//! )?;
//! let request = interpreter.request("anything", &[Value::Struct(
//!     StructValue::new(vec![("one".to_string(), Value::from("two"))]),
//! )])?;
//! assert!(request.message().contains("one"));
//! # Ok::<(), soap_interpreter::SoapError>(())
//! ```

pub mod adapter;
pub mod config;
pub mod description;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod request;
pub mod transport;
pub mod typemap;
pub mod value;
pub mod xml;

pub use adapter::SoapAdapter;
pub use config::{CallOptions, InterpreterOptions, SoapVersion};
pub use description::{OperationBinding, ServiceDescription};
pub use engine::{DecodedResponse, SoapEngine};
pub use error::{SoapError, SoapFault};
pub use interpreter::Interpreter;
pub use request::SoapRequest;
pub use transport::{LoopbackTransport, Transport, TransportState};
pub use typemap::{ClassMap, TypeEntry, TypeMap};
pub use value::{SoapHeader, StructValue, Value};
