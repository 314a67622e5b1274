//! The SOAP binding engine: argument serialization, envelope generation,
//! response decoding, and fault construction.
//!
//! The engine has one call entry point, [`SoapEngine::invoke`], which
//! serializes the call into an envelope, hands it to the transport exactly
//! once, and decodes whatever comes back. It never knows whether the
//! transport is real; pairing it with a
//! [`LoopbackTransport`](crate::transport::LoopbackTransport) is what makes
//! the interpreter offline.

use crate::config::{CallOptions, InterpreterOptions, SoapVersion};
use crate::description::{join_namespace, ServiceDescription};
use crate::error::{SoapError, SoapFault};
use crate::transport::Transport;
use crate::typemap::{ClassMap, TypeMap};
use crate::value::{SoapHeader, StructValue, Value};
use crate::xml::{self, escape, XmlElement};
use tracing::debug;

/// Outcome of a decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    /// The transport returned an empty body (capture acknowledgment) or the
    /// response body carried no element.
    Empty,
    /// A decoded native value.
    Value(Value),
    /// A SOAP fault, returned as a value because fault-raising is disabled.
    Fault(SoapFault),
}

impl DecodedResponse {
    /// The decoded value, if this is a value outcome.
    pub fn value(&self) -> Option<&Value> {
        match self {
            DecodedResponse::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The fault, if this is a fault outcome.
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            DecodedResponse::Fault(f) => Some(f),
            _ => None,
        }
    }
}

/// Call metadata after applying per-call overrides.
struct ResolvedCall {
    endpoint: String,
    action: String,
    namespace: String,
    version: SoapVersion,
    /// Declared output parameter names, empty when undescribed.
    output_parts: Vec<String>,
    /// Whether the call is bound against a service description.
    described: bool,
}

/// The binding engine. Owns the (sanitized) options, the optional service
/// description, and the extension registries.
pub struct SoapEngine {
    options: InterpreterOptions,
    description: Option<ServiceDescription>,
    typemap: TypeMap,
    classmap: ClassMap,
}

impl SoapEngine {
    /// Construct an engine. In WSDL-less mode (no description) the `uri` and
    /// `location` options are mandatory.
    pub fn new(
        description: Option<ServiceDescription>,
        options: InterpreterOptions,
    ) -> Result<Self, SoapError> {
        if description.is_none() {
            if options.uri.is_none() {
                return Err(SoapError::Config(
                    "the 'uri' option is required in WSDL-less mode".to_string(),
                ));
            }
            if options.location.is_none() {
                return Err(SoapError::Config(
                    "the 'location' option is required in WSDL-less mode".to_string(),
                ));
            }
        }
        Ok(Self {
            options,
            description,
            typemap: TypeMap::new(),
            classmap: ClassMap::new(),
        })
    }

    pub fn typemap_mut(&mut self) -> &mut TypeMap {
        &mut self.typemap
    }

    pub fn classmap_mut(&mut self) -> &mut ClassMap {
        &mut self.classmap
    }

    /// The single call entry point: serialize, send once, decode.
    pub fn invoke(
        &self,
        transport: &mut dyn Transport,
        operation: &str,
        args: &[Value],
        call_options: &CallOptions,
        input_headers: &[SoapHeader],
    ) -> Result<(DecodedResponse, Vec<SoapHeader>), SoapError> {
        let resolved = self.resolve(operation, call_options)?;
        let envelope = self.encode_envelope(&resolved, operation, args, input_headers);

        debug!(
            endpoint = %resolved.endpoint,
            action = %resolved.action,
            version = resolved.version.wire_tag(),
            "Invoking transport"
        );
        let response = transport.send(
            &envelope,
            &resolved.endpoint,
            &resolved.action,
            resolved.version,
        )?;

        if response.trim().is_empty() {
            // Capture acknowledgment; nothing to parse.
            return Ok((DecodedResponse::Empty, Vec::new()));
        }
        self.decode(&response, &resolved)
    }

    /// Apply per-call overrides on top of the description or the WSDL-less
    /// options.
    fn resolve(&self, operation: &str, call: &CallOptions) -> Result<ResolvedCall, SoapError> {
        if operation.is_empty() {
            return Err(SoapError::Binding(
                "operation name must not be empty".to_string(),
            ));
        }

        if let Some(desc) = &self.description {
            let binding = desc.get(operation);
            if binding.is_none() && call.uri.is_none() {
                return Err(SoapError::Binding(format!(
                    "unknown operation '{}'",
                    operation
                )));
            }
            let namespace = call
                .uri
                .clone()
                .unwrap_or_else(|| desc.target_namespace.clone());
            let endpoint = call.location.clone().unwrap_or_else(|| desc.endpoint.clone());
            let action = match &call.soapaction {
                Some(action) => action.clone(),
                None => match binding {
                    Some(b) => desc.action_for(b),
                    None => join_namespace(&namespace, operation),
                },
            };
            Ok(ResolvedCall {
                endpoint,
                action,
                namespace,
                version: self.options.soap_version,
                output_parts: binding.map(|b| b.output_parts.clone()).unwrap_or_default(),
                described: true,
            })
        } else {
            let namespace = call
                .uri
                .clone()
                .or_else(|| self.options.uri.clone())
                .ok_or_else(|| {
                    SoapError::Binding("no target namespace available for the call".to_string())
                })?;
            let endpoint = call
                .location
                .clone()
                .or_else(|| self.options.location.clone())
                .ok_or_else(|| {
                    SoapError::Binding("no endpoint available for the call".to_string())
                })?;
            let action = call
                .soapaction
                .clone()
                .unwrap_or_else(|| format!("{}#{}", namespace, operation));
            Ok(ResolvedCall {
                endpoint,
                action,
                namespace,
                version: self.options.soap_version,
                output_parts: Vec::new(),
                described: false,
            })
        }
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    fn encode_envelope(
        &self,
        resolved: &ResolvedCall,
        operation: &str,
        args: &[Value],
        input_headers: &[SoapHeader],
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>\n",
            self.options.encoding
        ));
        out.push_str(&format!(
            "<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"{}\" xmlns:ns1=\"{}\" \
             xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            resolved.version.namespace_uri(),
            escape(&resolved.namespace)
        ));

        if !input_headers.is_empty() {
            out.push_str("<SOAP-ENV:Header>");
            for (i, header) in input_headers.iter().enumerate() {
                // ns1 is the body namespace; header prefixes start at ns2.
                let prefix = format!("ns{}", i + 2);
                let must_understand = if header.must_understand {
                    " SOAP-ENV:mustUnderstand=\"1\""
                } else {
                    ""
                };
                out.push_str(&format!(
                    "<{prefix}:{name} xmlns:{prefix}=\"{ns}\"{must_understand}>",
                    name = header.name,
                    ns = escape(&header.namespace),
                ));
                serialize_content(&mut out, &header.value);
                out.push_str(&format!("</{prefix}:{name}>", name = header.name));
            }
            out.push_str("</SOAP-ENV:Header>");
        }

        out.push_str("<SOAP-ENV:Body>");
        match self.typemap.to_xml(&resolved.namespace, operation) {
            Some(to_xml) => {
                // Strategy output replaces the whole wrapper element.
                let value = match args {
                    [single] => single.clone(),
                    _ => Value::Seq(args.to_vec()),
                };
                out.push_str(&to_xml(&value));
            }
            None => {
                out.push_str(&format!("<ns1:{}>", operation));
                for (i, arg) in args.iter().enumerate() {
                    match arg {
                        // Struct arguments flatten to named parameter elements.
                        Value::Struct(s) => {
                            for (name, value) in &s.fields {
                                serialize_element(&mut out, name, value);
                            }
                        }
                        // Anything else serializes positionally.
                        other => serialize_element(&mut out, &format!("param{}", i), other),
                    }
                }
                out.push_str(&format!("</ns1:{}>", operation));
            }
        }
        out.push_str("</SOAP-ENV:Body></SOAP-ENV:Envelope>");
        out
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    fn decode(
        &self,
        text: &str,
        resolved: &ResolvedCall,
    ) -> Result<(DecodedResponse, Vec<SoapHeader>), SoapError> {
        let root = xml::parse(text)?;

        // Any protocol version is accepted on decode, regardless of the
        // version configured for encoding.
        let env_ns = match root.namespace.as_deref() {
            Some(ns) if root.local_name == "Envelope" && SoapVersion::from_namespace(ns).is_some() => {
                ns.to_string()
            }
            _ => {
                return Err(SoapError::MalformedResponse(
                    "root element is not a SOAP Envelope in a recognized namespace".to_string(),
                ))
            }
        };

        let mut output_headers = Vec::new();
        if let Some(header) = root
            .children
            .iter()
            .find(|c| c.local_name == "Header" && c.namespace.as_deref() == Some(env_ns.as_str()))
        {
            for element in &header.children {
                output_headers.push(SoapHeader {
                    namespace: element.namespace.clone().unwrap_or_default(),
                    name: element.local_name.clone(),
                    value: decode_element(element),
                    must_understand: element.must_understand(),
                });
            }
        }

        let body = root
            .children
            .iter()
            .find(|c| c.local_name == "Body" && c.namespace.as_deref() == Some(env_ns.as_str()))
            .ok_or_else(|| SoapError::MalformedResponse("envelope has no Body".to_string()))?;

        let first = match body.children.first() {
            Some(first) => first,
            None => return Ok((DecodedResponse::Empty, output_headers)),
        };

        // Fault detection comes before any custom decoding.
        if first.local_name == "Fault" && first.namespace.as_deref() == Some(env_ns.as_str()) {
            let fault = parse_fault(first);
            debug!(code = %fault.code, "Response carries a SOAP fault");
            if self.options.exceptions {
                return Err(SoapError::Fault(fault));
            }
            return Ok((DecodedResponse::Fault(fault), output_headers));
        }

        // Custom deserializer, then class map, then structural binding.
        let element_ns = first.namespace.clone().unwrap_or_default();
        if let Some(from_xml) = self.typemap.from_xml(&element_ns, &first.local_name) {
            debug!(element = %first.local_name, "Decoding via typemap strategy");
            return Ok((DecodedResponse::Value(from_xml(first)), output_headers));
        }

        if let Some(type_name) = self.classmap.get(&first.local_name) {
            let mut decoded = struct_from_children(first);
            decoded.type_name = Some(type_name.to_string());
            return Ok((
                DecodedResponse::Value(Value::Struct(decoded)),
                output_headers,
            ));
        }

        let value = if resolved.described {
            // Described output: a struct of the declared output parameters.
            let mut decoded = StructValue::default();
            for part in &resolved.output_parts {
                if let Some(child) = first.child(part) {
                    decoded.push(part.clone(), decode_element(child));
                }
            }
            if decoded.is_empty() {
                decoded = struct_from_children(first);
            }
            Value::Struct(decoded)
        } else if first.children.len() == 1 {
            // WSDL-less: a single-child wrapper unwraps to the child's value.
            decode_element(&first.children[0])
        } else {
            decode_element(first)
        };

        Ok((DecodedResponse::Value(value), output_headers))
    }
}

/// Serialize a named element, recursively.
fn serialize_element(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Null => out.push_str(&format!("<{} xsi:nil=\"true\"/>", name)),
        // A sequence repeats the element per item.
        Value::Seq(items) => {
            for item in items {
                serialize_element(out, name, item);
            }
        }
        _ => {
            out.push_str(&format!("<{}>", name));
            serialize_content(out, value);
            out.push_str(&format!("</{}>", name));
        }
    }
}

/// Serialize element content: text for scalars, child elements otherwise.
fn serialize_content(out: &mut String, value: &Value) {
    match value {
        Value::Struct(s) => {
            for (name, field) in &s.fields {
                serialize_element(out, name, field);
            }
        }
        Value::Seq(items) => {
            for item in items {
                serialize_element(out, "item", item);
            }
        }
        scalar => out.push_str(&escape(&scalar.scalar_text())),
    }
}

/// Decode an element to a value: leaf text stays a string, nested elements
/// become a struct.
fn decode_element(element: &XmlElement) -> Value {
    if element.is_leaf() {
        Value::String(element.text.clone())
    } else {
        Value::Struct(struct_from_children(element))
    }
}

/// Build a struct from child elements; repeated names collapse into a
/// sequence.
fn struct_from_children(element: &XmlElement) -> StructValue {
    let mut decoded = StructValue::default();
    for child in &element.children {
        let value = decode_element(child);
        match decoded
            .fields
            .iter_mut()
            .find(|(name, _)| *name == child.local_name)
        {
            Some((_, Value::Seq(items))) => items.push(value),
            Some((_, existing)) => {
                let prior = std::mem::replace(existing, Value::Null);
                *existing = Value::Seq(vec![prior, value]);
            }
            None => decoded.push(child.local_name.clone(), value),
        }
    }
    decoded
}

/// Normalize a 1.1 or 1.2 fault element to [`SoapFault`].
fn parse_fault(element: &XmlElement) -> SoapFault {
    if let Some(code_element) = element.child("Code") {
        // SOAP 1.2: Code/Value, Reason/Text, Detail.
        let code = code_element
            .child_text("Value")
            .unwrap_or_default()
            .to_string();
        let reason = element
            .child("Reason")
            .and_then(|r| r.child_text("Text"))
            .unwrap_or_default()
            .to_string();
        let mut fault = SoapFault::new(code, reason);
        fault.detail = element.child("Detail").map(decode_element);
        fault
    } else {
        // SOAP 1.1: faultcode, faultstring, faultactor, detail.
        let mut fault = SoapFault::new(
            element.child_text("faultcode").unwrap_or_default(),
            element.child_text("faultstring").unwrap_or_default(),
        );
        fault.actor = element
            .child_text("faultactor")
            .map(str::to_string)
            .filter(|s| !s.is_empty());
        fault.detail = element.child("detail").map(decode_element);
        fault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;

    fn wsdl_less_engine() -> SoapEngine {
        SoapEngine::new(
            None,
            InterpreterOptions::wsdl_less("www.uri.com", "www.location.com"),
        )
        .unwrap()
    }

    fn conversion_args() -> Vec<Value> {
        vec![Value::Struct(StructValue::new(vec![
            ("FromCurrency".to_string(), Value::from("AFA")),
            ("ToCurrency".to_string(), Value::from("ALL")),
        ]))]
    }

    #[test]
    fn test_wsdl_less_construction_requires_uri_and_location() {
        let result = SoapEngine::new(None, InterpreterOptions::default());
        assert!(matches!(result, Err(SoapError::Config(_))));

        let mut options = InterpreterOptions::default();
        options.uri = Some("www.uri.com".to_string());
        let result = SoapEngine::new(None, options);
        assert!(matches!(result, Err(SoapError::Config(_))));
    }

    #[test]
    fn test_encode_struct_argument_flattens_to_named_elements() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.arm_capture();

        engine
            .invoke(
                &mut transport,
                "ConversionRate",
                &conversion_args(),
                &CallOptions::default(),
                &[],
            )
            .unwrap();

        let capture = transport.take_capture().unwrap();
        assert_eq!(capture.endpoint, "www.location.com");
        assert_eq!(capture.action, "www.uri.com#ConversionRate");
        assert_eq!(capture.version, SoapVersion::Soap11);
        assert!(capture.envelope.contains("http://schemas.xmlsoap.org/soap/envelope/"));
        assert!(capture.envelope.contains("<ns1:ConversionRate>"));
        assert!(capture.envelope.contains("<FromCurrency>AFA</FromCurrency>"));
        assert!(capture.envelope.contains("<ToCurrency>ALL</ToCurrency>"));
    }

    #[test]
    fn test_encode_scalar_arguments_are_positional() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.arm_capture();

        engine
            .invoke(
                &mut transport,
                "Echo",
                &[Value::from("one"), Value::from("two")],
                &CallOptions::default(),
                &[],
            )
            .unwrap();

        let envelope = transport.take_capture().unwrap().envelope;
        assert!(envelope.contains("<param0>one</param0>"));
        assert!(envelope.contains("<param1>two</param1>"));
    }

    #[test]
    fn test_encode_escapes_text() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.arm_capture();

        engine
            .invoke(
                &mut transport,
                "Echo",
                &[Value::from("<a&b>")],
                &CallOptions::default(),
                &[],
            )
            .unwrap();

        let envelope = transport.take_capture().unwrap().envelope;
        assert!(envelope.contains("&lt;a&amp;b&gt;"));
        assert!(!envelope.contains("<a&b>"));
    }

    #[test]
    fn test_call_options_override_everything() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.arm_capture();

        let call = CallOptions {
            location: Some("www.elsewhere.com".to_string()),
            uri: Some("www.other.com".to_string()),
            soapaction: Some("urn:custom-action".to_string()),
        };
        engine
            .invoke(&mut transport, "Echo", &[], &call, &[])
            .unwrap();

        let capture = transport.take_capture().unwrap();
        assert_eq!(capture.endpoint, "www.elsewhere.com");
        assert_eq!(capture.action, "urn:custom-action");
        assert!(capture.envelope.contains("www.other.com"));
    }

    #[test]
    fn test_decode_single_child_unwraps() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.preload(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ConversionRateResponse xmlns="http://www.webserviceX.NET/">
      <ConversionRateResult>-1</ConversionRateResult>
    </ConversionRateResponse>
  </soap:Body>
</soap:Envelope>"#,
        );

        let (decoded, headers) = engine
            .invoke(
                &mut transport,
                "ConversionRate",
                &[],
                &CallOptions::default(),
                &[],
            )
            .unwrap();
        assert_eq!(decoded.value(), Some(&Value::from("-1")));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_decode_fault_raised_by_default() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.preload(
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>SOAP-ENV:Server</faultcode>
      <faultstring>Server Error</faultstring>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        );

        let result = engine.invoke(
            &mut transport,
            "AnyMethod",
            &[],
            &CallOptions::default(),
            &[],
        );
        match result {
            Err(SoapError::Fault(fault)) => {
                assert_eq!(fault.code, "SOAP-ENV:Server");
                assert_eq!(fault.fault_string, "Server Error");
            }
            other => panic!("expected fault error, got {:?}", other.map(|(d, _)| d)),
        }
    }

    #[test]
    fn test_decode_soap_12_fault() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.preload(
            r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code><env:Value>env:Sender</env:Value></env:Code>
      <env:Reason><env:Text xml:lang="en">Bad request</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#,
        );

        let result = engine.invoke(
            &mut transport,
            "AnyMethod",
            &[],
            &CallOptions::default(),
            &[],
        );
        match result {
            Err(SoapError::Fault(fault)) => {
                assert_eq!(fault.code, "env:Sender");
                assert_eq!(fault.fault_string, "Bad request");
            }
            _ => panic!("expected fault error"),
        }
    }

    #[test]
    fn test_decode_malformed_response() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.preload("<NotAnEnvelope/>");

        let result = engine.invoke(
            &mut transport,
            "AnyMethod",
            &[],
            &CallOptions::default(),
            &[],
        );
        assert!(matches!(result, Err(SoapError::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_repeated_elements_collapse_to_seq() {
        let engine = wsdl_less_engine();
        let mut transport = LoopbackTransport::new();
        transport.preload(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ListResponse>
      <Item>a</Item>
      <Item>b</Item>
      <Count>2</Count>
    </ListResponse>
  </soap:Body>
</soap:Envelope>"#,
        );

        let (decoded, _) = engine
            .invoke(&mut transport, "List", &[], &CallOptions::default(), &[])
            .unwrap();
        let value = decoded.value().unwrap().as_struct().unwrap();
        assert_eq!(
            value.get("Item"),
            Some(&Value::Seq(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(value.get("Count"), Some(&Value::from("2")));
    }

    #[test]
    fn test_unknown_operation_under_description() {
        use crate::description::{OperationBinding, ServiceDescription};

        let description = ServiceDescription::new("http://www.webserviceX.NET/", "http://svc")
            .operation(OperationBinding::new("ConversionRate"));
        let engine = SoapEngine::new(Some(description), InterpreterOptions::default()).unwrap();
        let mut transport = LoopbackTransport::new();
        transport.arm_capture();

        let result = engine.invoke(
            &mut transport,
            "NoSuchOperation",
            &[],
            &CallOptions::default(),
            &[],
        );
        assert!(matches!(result, Err(SoapError::Binding(_))));
    }
}
