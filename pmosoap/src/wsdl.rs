//! WSDL 1.1 resolution.
//!
//! Only the `service`/`port`/`binding`/`operation` skeleton is read: message
//! and type definitions are ignored, request and response structure is
//! inferred from the data at call time.

use indexmap::IndexMap;
use tracing::{debug, warn};
use xmltree::Element;

use crate::errors::{Result, SoapClientError};
use crate::soap::{WSDL_NS, WSDL_SOAP11_NS, WSDL_SOAP12_NS, find_descendants};

/// Everything needed to call one operation, resolved once from the WSDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: String,
    /// Default namespace of the request envelope.
    pub target_namespace: String,
    pub port: String,
    pub binding: String,
    pub endpoint: String,
    /// Empty when the binding declares no `soapAction`.
    pub soap_action: String,
    /// Local name of the WSDL output, stripped from decoded responses.
    /// Empty means no unwrapping.
    pub response_name: String,
}

/// Operations discovered in one WSDL document, keyed by operation name.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub source: String,
    pub target_namespace: String,
    pub operations: IndexMap<String, OperationDescriptor>,
}

impl ServiceDescriptor {
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }
}

/// Parse a WSDL document and resolve all its operations.
///
/// `source` only identifies the document in logs and in the descriptor.
///
/// # Errors
///
/// [`SoapClientError::Wsdl`] if the document is not XML, or if a port has no
/// SOAP 1.1/1.2 address. A port whose binding has no matching `<binding>`
/// element contributes no operation and is not an error.
pub fn resolve(source: &str, wsdl: &[u8]) -> Result<ServiceDescriptor> {
    let root = Element::parse(wsdl)
        .map_err(|e| SoapClientError::wsdl(format!("Cannot parse {source}: {e}")))?;

    let target_namespace = root
        .attributes
        .get("targetNamespace")
        .cloned()
        .unwrap_or_default();

    let mut descriptor = ServiceDescriptor {
        source: source.to_string(),
        target_namespace,
        operations: IndexMap::new(),
    };

    for service in find_descendants(&root, Some(WSDL_NS), "service") {
        for port in find_descendants(service, Some(WSDL_NS), "port") {
            resolve_port(&root, port, &mut descriptor)?;
        }
    }

    debug!(
        source = %descriptor.source,
        operations = descriptor.operations.len(),
        "WSDL resolved"
    );

    Ok(descriptor)
}

fn resolve_port(root: &Element, port: &Element, descriptor: &mut ServiceDescriptor) -> Result<()> {
    let port_name = attribute(port, "name");
    let binding_name = strip_ns(&attribute(port, "binding")).to_string();

    let address = find_descendants(port, Some(WSDL_SOAP11_NS), "address")
        .into_iter()
        .chain(find_descendants(port, Some(WSDL_SOAP12_NS), "address"))
        .next()
        .ok_or_else(|| SoapClientError::wsdl("No service addresses found"))?;

    let endpoint = address
        .attributes
        .get("location")
        .cloned()
        .ok_or_else(|| {
            SoapClientError::wsdl(format!("Address of port {port_name} has no location"))
        })?;

    let bindings: Vec<&Element> = find_descendants(root, Some(WSDL_NS), "binding")
        .into_iter()
        .filter(|binding| attribute(binding, "name") == binding_name)
        .collect();

    if bindings.is_empty() {
        warn!(
            port = %port_name,
            binding = %binding_name,
            "Port references an undefined binding, skipping"
        );
        return Ok(());
    }

    for binding in bindings {
        for operation in find_descendants(binding, Some(WSDL_NS), "operation") {
            let resolved = resolve_operation(
                operation,
                &descriptor.target_namespace,
                &port_name,
                &binding_name,
                &endpoint,
            );

            debug!(
                operation = %resolved.name,
                endpoint = %resolved.endpoint,
                soap_action = %resolved.soap_action,
                "Discovered operation"
            );

            if descriptor.operations.contains_key(&resolved.name) {
                debug!(operation = %resolved.name, port = %port_name, "Operation redefined, keeping the latest");
            }
            descriptor
                .operations
                .insert(resolved.name.clone(), resolved);
        }
    }

    Ok(())
}

fn resolve_operation(
    operation: &Element,
    target_namespace: &str,
    port: &str,
    binding: &str,
    endpoint: &str,
) -> OperationDescriptor {
    let soap_action = find_descendants(operation, Some(WSDL_SOAP11_NS), "operation")
        .into_iter()
        .chain(find_descendants(operation, Some(WSDL_SOAP12_NS), "operation"))
        .next()
        .map(|op| attribute(op, "soapAction"))
        .unwrap_or_default();

    let response_name = find_descendants(operation, Some(WSDL_NS), "output")
        .first()
        .map(|output| attribute(output, "name"))
        .unwrap_or_default();

    OperationDescriptor {
        name: attribute(operation, "name"),
        target_namespace: target_namespace.to_string(),
        port: port.to_string(),
        binding: binding.to_string(),
        endpoint: endpoint.to_string(),
        soap_action,
        response_name,
    }
}

fn attribute(element: &Element, name: &str) -> String {
    element.attributes.get(name).cloned().unwrap_or_default()
}

/// Strip a namespace prefix: `tns:FooBinding` → `FooBinding`.
pub fn strip_ns(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}
