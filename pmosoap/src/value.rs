//! Représentation universelle des données SOAP
//!
//! Les paramètres d'une requête comme les réponses décodées partagent la même
//! forme : un texte, une table ordonnée nom → valeur, ou une liste de valeurs
//! portant le même nom d'élément.
//!
//! ## Example
//!
//! ```
//! use pmosoap::{soap_map, SoapValue};
//!
//! let params = soap_map! {
//!     "@id" => "7",
//!     "name" => "x",
//!     "item" => vec!["a", "b"],
//! };
//!
//! let value = SoapValue::from(params);
//! assert_eq!(value.get("name").and_then(SoapValue::as_text), Some("x"));
//! ```

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

use crate::datetime::{format_datetime, iso_to_datetime};

/// Préfixe réservé marquant une clé comme attribut XML de l'élément parent.
pub const ATTRIBUTE_MARKER: char = '@';

/// Table ordonnée nom d'élément → valeur
pub type SoapMap = IndexMap<String, SoapValue>;

/// Valeur SOAP : texte, table ou liste coalescée
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SoapValue {
    /// Valeur scalaire, toujours transportée sous forme de texte
    Text(String),

    /// Éléments enfants, dans l'ordre du document
    Map(SoapMap),

    /// Occurrences répétées d'un même élément
    List(Vec<SoapValue>),
}

impl SoapValue {
    /// Table vide (forme décodée d'un élément sans enfant)
    pub fn empty_map() -> Self {
        SoapValue::Map(SoapMap::new())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SoapValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SoapMap> {
        match self {
            SoapValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SoapValue]> {
        match self {
            SoapValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Accède à un enfant par nom lorsque la valeur est une table.
    pub fn get(&self, key: &str) -> Option<&SoapValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn is_empty_map(&self) -> bool {
        matches!(self, SoapValue::Map(map) if map.is_empty())
    }

    /// Interprète le texte comme une date ISO-8601 (`2006-01-02T15:04:05Z`).
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        self.as_text().and_then(|text| iso_to_datetime(text).ok())
    }

    /// Retourne la valeur sous forme de liste, qu'elle ait été coalescée ou non.
    ///
    /// Utile côté appelant lorsqu'un élément peut apparaître une ou plusieurs
    /// fois dans la réponse.
    pub fn to_list(&self) -> Vec<&SoapValue> {
        match self {
            SoapValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// Vrai si la clé désigne un attribut (`@nom`).
pub fn is_attribute_key(key: &str) -> bool {
    key.starts_with(ATTRIBUTE_MARKER)
}

impl From<&str> for SoapValue {
    fn from(value: &str) -> Self {
        SoapValue::Text(value.to_string())
    }
}

impl From<String> for SoapValue {
    fn from(value: String) -> Self {
        SoapValue::Text(value)
    }
}

impl From<&String> for SoapValue {
    fn from(value: &String) -> Self {
        SoapValue::Text(value.clone())
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for SoapValue {
                fn from(value: $ty) -> Self {
                    SoapValue::Text(value.to_string())
                }
            }
        )+
    };
}

impl_from_display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, bool, char);

impl From<NaiveDateTime> for SoapValue {
    fn from(value: NaiveDateTime) -> Self {
        SoapValue::Text(format_datetime(&value))
    }
}

impl From<SoapMap> for SoapValue {
    fn from(value: SoapMap) -> Self {
        SoapValue::Map(value)
    }
}

impl<T: Into<SoapValue>> From<Vec<T>> for SoapValue {
    fn from(values: Vec<T>) -> Self {
        SoapValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for SoapValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => SoapValue::empty_map(),
            Value::Bool(b) => SoapValue::from(b),
            Value::Number(n) => SoapValue::Text(n.to_string()),
            Value::String(s) => SoapValue::Text(s),
            Value::Array(items) => SoapValue::List(items.into_iter().map(SoapValue::from).collect()),
            Value::Object(fields) => SoapValue::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, SoapValue::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Construit une [`SoapMap`] à partir de paires `clé => valeur`.
#[macro_export]
macro_rules! soap_map {
    () => {
        $crate::SoapMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::SoapMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::SoapValue::from($value));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions_are_text() {
        assert_eq!(SoapValue::from(42), SoapValue::Text("42".to_string()));
        assert_eq!(SoapValue::from(true), SoapValue::Text("true".to_string()));
        assert_eq!(SoapValue::from(1.5), SoapValue::Text("1.5".to_string()));
    }

    #[test]
    fn test_soap_map_macro_keeps_order() {
        let map = soap_map! {
            "b" => "2",
            "a" => "1",
            "items" => vec![1, 2],
        };

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "items"]);
        assert_eq!(
            map["items"],
            SoapValue::List(vec![SoapValue::from("1"), SoapValue::from("2")])
        );
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({
            "query": "rust",
            "max": 10,
            "tags": ["a", "b"],
            "empty": null,
        });

        let value = SoapValue::from(json);
        assert_eq!(value.get("query").and_then(SoapValue::as_text), Some("rust"));
        assert_eq!(value.get("max").and_then(SoapValue::as_text), Some("10"));
        assert_eq!(value.get("tags").and_then(SoapValue::as_list).map(|l| l.len()), Some(2));
        assert!(value.get("empty").is_some_and(SoapValue::is_empty_map));
    }

    #[test]
    fn test_serialize_as_plain_json() {
        let value = SoapValue::from(soap_map! {
            "result" => "42",
            "item" => vec!["a", "b"],
        });

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"result":"42","item":["a","b"]}"#);
    }

    #[test]
    fn test_to_list_wraps_single_value() {
        let single = SoapValue::from("a");
        assert_eq!(single.to_list(), vec![&SoapValue::from("a")]);

        let many = SoapValue::from(vec!["a", "b"]);
        assert_eq!(many.to_list().len(), 2);
    }

    #[test]
    fn test_attribute_key() {
        assert!(is_attribute_key("@id"));
        assert!(!is_attribute_key("id"));
        assert!(!is_attribute_key(""));
    }
}
