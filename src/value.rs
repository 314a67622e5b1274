//! Native value tree exchanged with the binding engine.
//!
//! Arguments going into a request and values decoded out of a response are
//! both expressed as [`Value`] trees. Decoding never guesses scalar types:
//! leaf text always comes back as [`Value::String`], so `<Result>-1</Result>`
//! decodes to the string `"-1"`, not an integer.

use std::fmt;

/// A native value: scalar, sequence, or structured.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered sequence of values.
    Seq(Vec<Value>),
    /// Structured value with ordered, named fields.
    Struct(StructValue),
}

impl Value {
    /// Shorthand for a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// The string content if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The structured content if this is a struct value.
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Render a scalar as envelope text. Non-scalars render empty; they are
    /// serialized element-wise by the engine instead.
    pub fn scalar_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Seq(_) | Value::Struct(_) => String::new(),
        }
    }

    /// Whether this value serializes as bare text content.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Seq(_) | Value::Struct(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A structured value: ordered `(name, value)` fields.
///
/// The optional `type_name` is populated by the class map when a response
/// element has a registered native type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    /// Native type name assigned via the class map, if any.
    pub type_name: Option<String>,
    /// Fields in document order.
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    /// Create an anonymous struct from fields.
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self {
            type_name: None,
            fields,
        }
    }

    /// Look up a field by name (first match).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Struct(s) => {
                write!(f, "{{")?;
                for (i, (name, value)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            other => write!(f, "{}", other.scalar_text()),
        }
    }
}

/// A SOAP header element.
///
/// Used both as an input header attached to a request and as a decoded
/// output header returned from a response. The decode path returns output
/// headers as an ordinary tuple element rather than filling a by-reference
/// slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapHeader {
    /// Namespace URI of the header element.
    pub namespace: String,
    /// Local name of the header element.
    pub name: String,
    /// Header payload.
    pub value: Value,
    /// SOAP `mustUnderstand` flag.
    pub must_understand: bool,
}

impl SoapHeader {
    /// Create a header without the `mustUnderstand` flag.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value,
            must_understand: false,
        }
    }

    /// Set the `mustUnderstand` flag.
    pub fn must_understand(mut self) -> Self {
        self.must_understand = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_field_lookup() {
        let s = StructValue::new(vec![
            ("FromCurrency".to_string(), Value::from("AFA")),
            ("ToCurrency".to_string(), Value::from("ALL")),
        ]);
        assert_eq!(s.get("FromCurrency").and_then(Value::as_str), Some("AFA"));
        assert_eq!(s.get("Missing"), None);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(Value::from("abc").scalar_text(), "abc");
        assert_eq!(Value::Int(-1).scalar_text(), "-1");
        assert_eq!(Value::Bool(true).scalar_text(), "true");
        assert_eq!(Value::Null.scalar_text(), "");
    }

    #[test]
    fn test_display_struct() {
        let v = Value::Struct(StructValue::new(vec![(
            "Result".to_string(),
            Value::from("-1"),
        )]));
        assert_eq!(v.to_string(), "{Result: -1}");
    }

    #[test]
    fn test_header_builder() {
        let h = SoapHeader::new("www.namespace.com", "test_header", Value::from("header_data"))
            .must_understand();
        assert!(h.must_understand);
        assert_eq!(h.name, "test_header");
    }
}
