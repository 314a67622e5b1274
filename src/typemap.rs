//! Pluggable per-type encode/decode strategies.
//!
//! A [`TypeMap`] maps a `(namespace, type name)` key to custom serialize and
//! deserialize functions, consulted before structural binding. A [`ClassMap`]
//! maps a response element name to a native type name, recorded on the
//! decoded struct.

use crate::value::Value;
use crate::xml::XmlElement;
use std::collections::HashMap;
use std::fmt;

/// Custom serializer: value to raw XML for the mapped type.
pub type ToXmlFn = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Custom deserializer: parsed element to value for the mapped type.
pub type FromXmlFn = Box<dyn Fn(&XmlElement) -> Value + Send + Sync>;

/// One type-map registration.
pub struct TypeEntry {
    type_ns: String,
    type_name: String,
    to_xml: Option<ToXmlFn>,
    from_xml: Option<FromXmlFn>,
}

impl TypeEntry {
    pub fn new(type_ns: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_ns: type_ns.into(),
            type_name: type_name.into(),
            to_xml: None,
            from_xml: None,
        }
    }

    /// Register a serialize strategy.
    pub fn to_xml(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.to_xml = Some(Box::new(f));
        self
    }

    /// Register a deserialize strategy.
    pub fn from_xml(mut self, f: impl Fn(&XmlElement) -> Value + Send + Sync + 'static) -> Self {
        self.from_xml = Some(Box::new(f));
        self
    }
}

/// Registry of per-type strategies, consulted before structural binding.
#[derive(Default)]
pub struct TypeMap {
    entries: Vec<TypeEntry>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: TypeEntry) {
        self.entries.push(entry);
    }

    /// Find a serialize strategy for a type.
    pub fn to_xml(&self, type_ns: &str, type_name: &str) -> Option<&ToXmlFn> {
        self.entries
            .iter()
            .find(|e| e.type_ns == type_ns && e.type_name == type_name)
            .and_then(|e| e.to_xml.as_ref())
    }

    /// Find a deserialize strategy for a type.
    pub fn from_xml(&self, type_ns: &str, type_name: &str) -> Option<&FromXmlFn> {
        self.entries
            .iter()
            .find(|e| e.type_ns == type_ns && e.type_name == type_name)
            .and_then(|e| e.from_xml.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}:{}", e.type_ns, e.type_name))
            .collect();
        f.debug_struct("TypeMap").field("entries", &keys).finish()
    }
}

/// Response element name to native type name.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    map: HashMap<String, String>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: impl Into<String>, type_name: impl Into<String>) {
        self.map.insert(element.into(), type_name.into());
    }

    pub fn get(&self, element: &str) -> Option<&str> {
        self.map.get(element).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typemap_lookup_requires_both_keys() {
        let mut typemap = TypeMap::new();
        typemap.register(
            TypeEntry::new("http://www.webserviceX.NET/", "ConversionRate")
                .to_xml(|_| "<ConversionRate/>".to_string()),
        );

        assert!(typemap
            .to_xml("http://www.webserviceX.NET/", "ConversionRate")
            .is_some());
        assert!(typemap
            .to_xml("http://other.example.org/", "ConversionRate")
            .is_none());
        assert!(typemap
            .to_xml("http://www.webserviceX.NET/", "OtherType")
            .is_none());
        // No deserialize strategy was registered.
        assert!(typemap
            .from_xml("http://www.webserviceX.NET/", "ConversionRate")
            .is_none());
    }

    #[test]
    fn test_from_xml_strategy_invoked() {
        let mut typemap = TypeMap::new();
        typemap.register(
            TypeEntry::new("urn:example", "Mocked").from_xml(|_| Value::from("mocked")),
        );

        let f = typemap.from_xml("urn:example", "Mocked").unwrap();
        let element = XmlElement::default();
        assert_eq!(f(&element), Value::from("mocked"));
    }

    #[test]
    fn test_classmap() {
        let mut classmap = ClassMap::new();
        classmap.insert("ConversionRateResponse", "ConversionRateResponse");
        assert_eq!(
            classmap.get("ConversionRateResponse"),
            Some("ConversionRateResponse")
        );
        assert_eq!(classmap.get("Other"), None);
    }
}
