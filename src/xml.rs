//! XML parsing support for response decoding.
//!
//! Uses quick-xml which is safe against XXE by default (doesn't expand
//! entities); DOCTYPE and entity declarations are additionally rejected up
//! front. Envelope *generation* does not go through this module: the engine
//! builds request XML by string formatting with [`escape`].

use crate::error::SoapError;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// A parsed XML element with resolved namespaces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Local (unprefixed) element name.
    pub local_name: String,
    /// Resolved namespace URI, if the element is in a namespace.
    pub namespace: Option<String>,
    /// Attributes as raw `(qualified-name, value)` pairs.
    pub attributes: Vec<(String, String)>,
    /// Direct text content, entity-unescaped and whitespace-trimmed.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// First child with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name == local_name)
    }

    /// Text content of the first child with the given local name.
    pub fn child_text(&self, local_name: &str) -> Option<&str> {
        self.child(local_name).map(|c| c.text.as_str())
    }

    /// Whether the element carries a truthy `mustUnderstand` attribute
    /// (any prefix).
    pub fn must_understand(&self) -> bool {
        self.attributes.iter().any(|(key, value)| {
            key.ends_with("mustUnderstand") && (value == "1" || value == "true")
        })
    }

    /// Whether the element has no child elements.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parse a document into its root element.
pub fn parse(xml: &str) -> Result<XmlElement, SoapError> {
    check_xxe_patterns(xml)?;

    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let element = element_from_start(resolve_namespace(ns), &e)?;
                stack.push(element);
            }
            Ok((ns, Event::Empty(e))) => {
                let element = element_from_start(resolve_namespace(ns), &e)?;
                attach(&mut stack, &mut root, element);
            }
            Ok((_, Event::End(_))) => {
                let element = stack.pop().ok_or_else(|| {
                    SoapError::MalformedResponse("unbalanced closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, element);
            }
            Ok((_, Event::Text(t))) => {
                let text = t.unescape().map_err(|e| {
                    SoapError::MalformedResponse(format!("text unescape error: {}", e))
                })?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok((_, Event::CData(t))) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SoapError::MalformedResponse(format!(
                    "XML parse error: {}",
                    e
                )));
            }
        }
    }

    if !stack.is_empty() {
        return Err(SoapError::MalformedResponse(
            "unexpected end of document".to_string(),
        ));
    }
    root.ok_or_else(|| SoapError::MalformedResponse("no root element found".to_string()))
}

fn element_from_start(
    namespace: Option<String>,
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<XmlElement, SoapError> {
    let local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| {
            SoapError::MalformedResponse(format!("malformed attribute: {}", e))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SoapError::MalformedResponse(format!("attribute unescape error: {}", e)))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        local_name,
        namespace,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn resolve_namespace(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(ns) => {
            Some(String::from_utf8_lossy(ns.into_inner()).into_owned())
        }
        _ => None,
    }
}

fn attach(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Reject XXE attack patterns before handing text to the reader.
fn check_xxe_patterns(xml: &str) -> Result<(), SoapError> {
    if xml.contains("<!DOCTYPE") || xml.contains("<!doctype") {
        return Err(SoapError::MalformedResponse(
            "DOCTYPE declarations are not allowed".to_string(),
        ));
    }
    if xml.contains("<!ENTITY") || xml.contains("<!entity") {
        return Err(SoapError::MalformedResponse(
            "entity declarations are not allowed".to_string(),
        ));
    }
    Ok(())
}

/// Escape text for inclusion in generated XML.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ConversionRateResponse xmlns="http://www.webserviceX.NET/">
      <ConversionRateResult>-1</ConversionRateResult>
    </ConversionRateResponse>
  </soap:Body>
</soap:Envelope>"#;

        let root = parse(xml).unwrap();
        assert_eq!(root.local_name, "Envelope");
        assert_eq!(
            root.namespace.as_deref(),
            Some("http://schemas.xmlsoap.org/soap/envelope/")
        );
        let body = root.child("Body").unwrap();
        let response = body.child("ConversionRateResponse").unwrap();
        assert_eq!(
            response.namespace.as_deref(),
            Some("http://www.webserviceX.NET/")
        );
        assert_eq!(response.child_text("ConversionRateResult"), Some("-1"));
    }

    #[test]
    fn test_parse_self_closing_element() {
        let root = parse("<a><b/></a>").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name, "b");
        assert!(root.children[0].is_leaf());
    }

    #[test]
    fn test_text_is_unescaped() {
        let root = parse("<a>&lt;NewDataSet /&gt;</a>").unwrap();
        assert_eq!(root.text, "<NewDataSet />");
    }

    #[test]
    fn test_must_understand_attribute() {
        let xml = r#"<m:Trans xmlns:m="http://example.org/" soap:mustUnderstand="1" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">234</m:Trans>"#;
        let root = parse(xml).unwrap();
        assert!(root.must_understand());
        assert_eq!(root.text, "234");
    }

    #[test]
    fn test_doctype_rejected() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<a>&xxe;</a>"#;
        let result = parse(xml);
        assert!(matches!(result, Err(SoapError::MalformedResponse(_))));
    }

    #[test]
    fn test_truncated_document_rejected() {
        let result = parse("<a><b>");
        assert!(result.is_err());
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&apos;");
    }
}
