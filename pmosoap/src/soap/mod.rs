//! # Module SOAP - Codec d'enveloppes document/literal
//!
//! Ce module convertit une structure [`SoapValue`](crate::SoapValue) en
//! enveloppe SOAP 1.1 et inversement, sans aucune connaissance du schéma.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction d'enveloppes avec en-tête optionnel
//! - ✅ Attributs via les clés préfixées par `@`
//! - ✅ Éléments répétés à partir de listes
//! - ✅ Décodage avec coalescence des éléments répétés
//! - ✅ Détection des SOAP Faults (`faultstring`)
//!
//! ## Example
//!
//! ```
//! use pmosoap::soap::{decode, encode, DEFAULT_FAULT_ELEMENT};
//! use pmosoap::{soap_map, SoapMap, SoapValue};
//!
//! let body = SoapValue::from(soap_map! { "query" => "rust" });
//! let xml = encode("Search", "urn:example", &Default::default(), &SoapMap::new(), &body).unwrap();
//! assert!(xml.contains("<Search><query>rust</query></Search>"));
//!
//! let response = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soap:Body><SearchResponse><result>42</result></SearchResponse></soap:Body>
//! </soap:Envelope>"#;
//! let value = decode(response.as_bytes(), DEFAULT_FAULT_ELEMENT, "SearchResponse").unwrap();
//! assert_eq!(value, SoapValue::from("42"));
//! ```

mod decode;
mod encode;

use xmltree::{Element, XMLNode};

pub use decode::{decode, decode_literal, decode_response};
pub use encode::{encode, render_literal};

/// Namespace des enveloppes SOAP 1.1
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace WSDL 1.1
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";

/// Extensions WSDL pour le binding SOAP 1.1
pub const WSDL_SOAP11_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";

/// Extensions WSDL pour le binding SOAP 1.2
pub const WSDL_SOAP12_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";

/// Nom local de l'élément portant le message d'un SOAP Fault
pub const DEFAULT_FAULT_ELEMENT: &str = "faultstring";

/// Collecte, dans l'ordre du document, les descendants de `root` (hors
/// `root` lui-même) portant le nom local `name`.
///
/// Si `namespace` vaut `None`, le namespace de l'élément est ignoré.
pub(crate) fn find_descendants<'a>(
    root: &'a Element,
    namespace: Option<&str>,
    name: &str,
) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_descendants(root, namespace, name, &mut found);
    found
}

fn collect_descendants<'a>(
    parent: &'a Element,
    namespace: Option<&str>,
    name: &str,
    found: &mut Vec<&'a Element>,
) {
    for child in parent.children.iter().filter_map(XMLNode::as_element) {
        let ns_matches = match namespace {
            Some(ns) => child.namespace.as_deref() == Some(ns),
            None => true,
        };
        if ns_matches && child.name == name {
            found.push(child);
        }
        collect_descendants(child, namespace, name, found);
    }
}

/// Vrai si `element` est lui-même l'élément recherché.
pub(crate) fn is_element(element: &Element, namespace: &str, name: &str) -> bool {
    element.name == name && element.namespace.as_deref() == Some(namespace)
}
