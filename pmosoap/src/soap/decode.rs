//! Parser des réponses SOAP

use tracing::debug;
use xml::attribute::OwnedAttribute;
use xml::name::OwnedName;
use xml::namespace::Namespace;
use xml::reader::{EventReader, ParserConfig, XmlEvent};
use xmltree::{Element, XMLNode};

use super::{DEFAULT_FAULT_ELEMENT, SOAP_ENV_NS, find_descendants, is_element};
use crate::errors::{Result, SoapClientError};
use crate::value::{SoapMap, SoapValue};

/// Décode une réponse SOAP en [`SoapValue`]
///
/// # Arguments
///
/// * `xml` - Document XML brut de la réponse
/// * `fault_element` - Nom local de l'élément signalant un fault (`faultstring`)
/// * `unwrap_name` - Nom de l'élément de réponse à retirer (vide : aucun)
///
/// # Errors
///
/// - [`SoapClientError::Soap`] si le document n'est pas du XML ou n'a pas de `soap:Body`
/// - [`SoapClientError::Service`] si un fault est présent sous le corps
pub fn decode(xml: &[u8], fault_element: &str, unwrap_name: &str) -> Result<SoapValue> {
    let root = parse_document(xml)?;

    let body = find_body(&root).ok_or_else(|| SoapClientError::soap("No body in response"))?;

    if let Some(fault) = find_descendants(body, None, fault_element).first() {
        let message = fault
            .get_text()
            .map(|text| text.into_owned())
            .unwrap_or_default();
        debug!(fault = %message, "SOAP fault in response");
        return Err(SoapClientError::Service(message));
    }

    let data = decode_literal(&body.children);
    Ok(unwrap_response(data, unwrap_name))
}

/// [`decode`] avec l'élément de fault standard.
pub fn decode_response(xml: &[u8], unwrap_name: &str) -> Result<SoapValue> {
    decode(xml, DEFAULT_FAULT_ELEMENT, unwrap_name)
}

/// Convertit une liste de nœuds en table, en coalesçant les éléments répétés
///
/// Un élément dont l'unique enfant est un texte (espaces seuls compris) devient
/// un texte ; tout autre élément (y compris vide) devient une table. Les nœuds
/// non-élément sont ignorés. Les commentaires sont retirés au parsing :
/// `<x><!--c-->v</x>` vaut `"v"`.
pub fn decode_literal(nodes: &[XMLNode]) -> SoapMap {
    let mut data = SoapMap::new();

    for element in nodes.iter().filter_map(XMLNode::as_element) {
        let value = match element.children.as_slice() {
            [XMLNode::Text(text)] | [XMLNode::CData(text)] => SoapValue::Text(text.clone()),
            children => SoapValue::Map(decode_literal(children)),
        };
        insert_coalesced(&mut data, &element.name, value);
    }

    data
}

/// Parse la réponse en conservant les textes faits uniquement d'espaces
///
/// `Element::parse` jette les événements `Whitespace` de xml-rs, ce qui
/// transformerait `<x> </x>` en élément vide.
fn parse_document(xml: &[u8]) -> Result<Element> {
    let config = ParserConfig::new()
        .whitespace_to_characters(true)
        .ignore_comments(true);
    let mut reader = EventReader::new_with_config(xml, config);

    loop {
        match reader.next().map_err(malformed)? {
            XmlEvent::StartElement {
                name,
                attributes,
                namespace,
            } => return build(&mut reader, new_element(name, attributes, namespace)),
            XmlEvent::EndDocument => return Err(SoapClientError::soap("Empty response")),
            _ => {}
        }
    }
}

fn build(reader: &mut EventReader<&[u8]>, mut element: Element) -> Result<Element> {
    loop {
        match reader.next().map_err(malformed)? {
            XmlEvent::StartElement {
                name,
                attributes,
                namespace,
            } => {
                let child = build(reader, new_element(name, attributes, namespace))?;
                element.children.push(XMLNode::Element(child));
            }
            XmlEvent::EndElement { .. } => return Ok(element),
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) => {
                element.children.push(XMLNode::Text(text))
            }
            XmlEvent::CData(text) => element.children.push(XMLNode::CData(text)),
            XmlEvent::EndDocument => {
                return Err(SoapClientError::soap("Malformed response: truncated document"));
            }
            _ => {}
        }
    }
}

fn new_element(name: OwnedName, attributes: Vec<OwnedAttribute>, namespace: Namespace) -> Element {
    let mut element = Element::new(&name.local_name);
    element.prefix = name.prefix;
    element.namespace = name.namespace;
    if !namespace.is_essentially_empty() {
        element.namespaces = Some(namespace);
    }
    for attribute in attributes {
        element
            .attributes
            .insert(attribute.name.local_name, attribute.value);
    }
    element
}

fn malformed(err: xml::reader::Error) -> SoapClientError {
    SoapClientError::soap(format!("Malformed response: {err}"))
}

fn insert_coalesced(data: &mut SoapMap, name: &str, value: SoapValue) {
    match data.get_mut(name) {
        Some(SoapValue::List(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::replace(existing, SoapValue::List(Vec::new()));
            *existing = SoapValue::List(vec![first, value]);
        }
        None => {
            data.insert(name.to_string(), value);
        }
    }
}

fn find_body(root: &Element) -> Option<&Element> {
    if is_element(root, SOAP_ENV_NS, "Body") {
        return Some(root);
    }
    find_descendants(root, Some(SOAP_ENV_NS), "Body")
        .into_iter()
        .next()
}

fn unwrap_response(mut data: SoapMap, unwrap_name: &str) -> SoapValue {
    if unwrap_name.is_empty() {
        return SoapValue::Map(data);
    }

    match data.shift_remove(unwrap_name) {
        Some(SoapValue::Map(inner)) if inner.len() == 1 => inner
            .into_iter()
            .next()
            .map(|(_, value)| value)
            .unwrap_or_else(SoapValue::empty_map),
        Some(inner) => inner,
        None => SoapValue::Map(data),
    }
}
