//! Service descriptions: the already-interpreted analog of a parsed WSDL.
//!
//! WSDL parsing itself is out of scope; callers that have a service contract
//! express it as a [`ServiceDescription`] with one [`OperationBinding`] per
//! operation. Without a description the interpreter runs in WSDL-less mode
//! and the caller supplies `uri` and `location` options instead.

use std::collections::HashMap;

/// A described SOAP service: endpoint, target namespace, operations.
#[derive(Debug, Clone, Default)]
pub struct ServiceDescription {
    /// Target namespace of the service.
    pub target_namespace: String,
    /// Endpoint URL of the service.
    pub endpoint: String,
    operations: HashMap<String, OperationBinding>,
}

impl ServiceDescription {
    pub fn new(target_namespace: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            target_namespace: target_namespace.into(),
            endpoint: endpoint.into(),
            operations: HashMap::new(),
        }
    }

    /// Add an operation binding.
    pub fn operation(mut self, binding: OperationBinding) -> Self {
        self.operations.insert(binding.name.clone(), binding);
        self
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&OperationBinding> {
        self.operations.get(name)
    }

    /// SOAP action for an operation: the declared action, or the target
    /// namespace joined with the operation name.
    pub fn action_for(&self, binding: &OperationBinding) -> String {
        match &binding.action {
            Some(action) => action.clone(),
            None => join_namespace(&self.target_namespace, &binding.name),
        }
    }
}

/// One operation of a described service.
#[derive(Debug, Clone)]
pub struct OperationBinding {
    /// Operation name (the wrapper element of the request body).
    pub name: String,
    /// Explicit SOAP action, if the contract declares one.
    pub action: Option<String>,
    /// Declared input parameter names, in order.
    pub input_parts: Vec<String>,
    /// Declared output parameter names, in order.
    pub output_parts: Vec<String>,
}

impl OperationBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: None,
            input_parts: Vec::new(),
            output_parts: Vec::new(),
        }
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn input(mut self, part: impl Into<String>) -> Self {
        self.input_parts.push(part.into());
        self
    }

    pub fn output(mut self, part: impl Into<String>) -> Self {
        self.output_parts.push(part.into());
        self
    }
}

/// Join a namespace and a local name without doubling separators.
pub(crate) fn join_namespace(namespace: &str, name: &str) -> String {
    if namespace.ends_with('/') || namespace.ends_with('#') {
        format!("{}{}", namespace, name)
    } else {
        format!("{}/{}", namespace, name)
    }
}
