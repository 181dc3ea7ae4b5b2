//! Construction des requêtes SOAP

use indexmap::IndexMap;
use xmltree::{Element, EmitterConfig, XMLNode};

use super::SOAP_ENV_NS;
use crate::errors::{Result, SoapClientError};
use crate::value::{ATTRIBUTE_MARKER, SoapMap, SoapValue};

/// Construit et sérialise une enveloppe SOAP 1.1
///
/// # Arguments
///
/// * `operation` - Nom de l'élément racine du corps (nom de l'opération)
/// * `target_namespace` - Namespace par défaut déclaré sur l'enveloppe
/// * `namespaces` - Déclarations `xmlns:<préfixe>` supplémentaires
/// * `headers` - Contenu de `soap:Header` (omis s'il est vide)
/// * `body` - Paramètres de l'opération ; seule une table produit du contenu
///
/// # Returns
///
/// Le document XML de la requête
pub fn encode(
    operation: &str,
    target_namespace: &str,
    namespaces: &IndexMap<String, String>,
    headers: &SoapMap,
    body: &SoapValue,
) -> Result<String> {
    validate_name(operation)?;

    let mut envelope = Element::new("soap:Envelope");
    envelope
        .attributes
        .insert("xmlns:soap".to_string(), SOAP_ENV_NS.to_string());
    for (prefix, uri) in namespaces {
        envelope
            .attributes
            .insert(format!("xmlns:{prefix}"), uri.clone());
    }
    envelope
        .attributes
        .insert("xmlns".to_string(), target_namespace.to_string());

    // En-tête seulement si des champs sont configurés
    if !headers.is_empty() {
        let mut header = Element::new("soap:Header");
        render_literal(&mut header, headers)?;
        envelope.children.push(XMLNode::Element(header));
    }

    let mut operation_elem = Element::new(operation);
    if let SoapValue::Map(params) = body {
        render_literal(&mut operation_elem, params)?;
    }

    let mut body_elem = Element::new("soap:Body");
    body_elem.children.push(XMLNode::Element(operation_elem));
    envelope.children.push(XMLNode::Element(body_elem));

    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);
    envelope.write_with_config(&mut buf, config)?;

    String::from_utf8(buf).map_err(|e| SoapClientError::encode(e.to_string()))
}

/// Ajoute le contenu d'une table comme enfants (ou attributs) de `parent`
///
/// - `@nom` devient un attribut de `parent`
/// - une liste produit un élément par valeur
/// - une table produit un élément imbriqué
/// - un texte produit un élément feuille
pub fn render_literal(parent: &mut Element, data: &SoapMap) -> Result<()> {
    for (key, value) in data {
        if let Some(attribute) = key.strip_prefix(ATTRIBUTE_MARKER) {
            validate_name(attribute)?;
            let text = value.as_text().ok_or_else(|| {
                SoapClientError::encode(format!("attribute {key} must be a scalar value"))
            })?;
            parent
                .attributes
                .insert(attribute.to_string(), text.to_string());
        } else {
            render_element(parent, key, value)?;
        }
    }
    Ok(())
}

fn render_element(parent: &mut Element, name: &str, value: &SoapValue) -> Result<()> {
    match value {
        SoapValue::List(items) => {
            for item in items {
                render_element(parent, name, item)?;
            }
        }
        SoapValue::Map(children) => {
            validate_name(name)?;
            let mut child = Element::new(name);
            render_literal(&mut child, children)?;
            parent.children.push(XMLNode::Element(child));
        }
        SoapValue::Text(text) => {
            validate_name(name)?;
            let mut child = Element::new(name);
            child.children.push(XMLNode::Text(text.clone()));
            parent.children.push(XMLNode::Element(child));
        }
    }
    Ok(())
}

// Les noms sont repris tels quels : on refuse seulement ce qui casserait le document
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '&' | '"' | '\'' | '=' | '/'));

    if invalid {
        return Err(SoapClientError::encode(format!(
            "'{name}' is not a valid XML name"
        )));
    }
    Ok(())
}
