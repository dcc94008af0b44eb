//! Attribute value types.
//!
//! [`AttrValue`] is the single runtime representation for everything a
//! [`Dto`](crate::dto::Dto) holds: the loosely-typed raw values kept in the
//! store, the typed values produced by casting, and the plain tree produced
//! by serialization.
//!
//! JSON is bridged through serde: [`AttrValue::decode_json`] parses text into
//! a value (objects become [`AttrValue::Map`], keys keep their order) and
//! [`AttrValue::encode_json`] renders compact JSON.

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::dto::Dto;
use crate::error::Result;
use crate::moment::Moment;

/// Insertion-ordered mapping from attribute name to value.
pub type Attributes = IndexMap<String, AttrValue>;

/// Runtime representation of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),

    /// Ordered collection; may hold nested containers.
    List(Vec<AttrValue>),

    /// Plain associative structure (what `array`/`json` casts decode into).
    Map(Attributes),

    /// Opaque keyed object (what the `object` cast produces).
    Object(Attributes),

    /// Date/time value produced by the `date`/`datetime` casts.
    Date(Moment),

    /// A nested container.
    Dto(Box<Dto>),
}

impl AttrValue {
    /// Decode JSON text. Objects decode to [`AttrValue::Map`].
    pub fn decode_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<serde_json::Value>(text).map(Self::from)
    }

    /// Encode to compact JSON.
    pub fn encode_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Fields of a mapping or an opaque object.
    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            AttrValue::Map(map) | AttrValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_moment(&self) -> Option<&Moment> {
        match self {
            AttrValue::Date(m) => Some(m),
            _ => None,
        }
    }

    /// Short name of the variant, used in log fields.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
            AttrValue::Map(_) => "map",
            AttrValue::Object(_) => "object",
            AttrValue::Date(_) => "date",
            AttrValue::Dto(_) => "dto",
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AttrValue::Null => serializer.serialize_unit(),
            AttrValue::Bool(v) => serializer.serialize_bool(*v),
            AttrValue::Int(v) => serializer.serialize_i64(*v),
            AttrValue::Float(v) => serializer.serialize_f64(*v),
            AttrValue::String(s) => serializer.serialize_str(s),
            AttrValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AttrValue::Map(map) | AttrValue::Object(map) => serialize_attributes(map, serializer),
            AttrValue::Date(m) => serializer.serialize_str(&m.to_date_time_string()),
            AttrValue::Dto(dto) => {
                let exported = dto.to_array().map_err(S::Error::custom)?;
                serialize_attributes(&exported, serializer)
            }
        }
    }
}

pub(crate) fn serialize_attributes<S: Serializer>(
    map: &Attributes,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        out.serialize_entry(key, value)?;
    }
    out.end()
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttrValue::Null,
            serde_json::Value::Bool(b) => AttrValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Int(i),
                None => AttrValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => AttrValue::String(s),
            serde_json::Value::Array(items) => {
                AttrValue::List(items.into_iter().map(AttrValue::from).collect())
            }
            serde_json::Value::Object(map) => AttrValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, AttrValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v.into())
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Int(v.into())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<Moment> for AttrValue {
    fn from(m: Moment) -> Self {
        AttrValue::Date(m)
    }
}

impl From<Dto> for AttrValue {
    fn from(dto: Dto) -> Self {
        AttrValue::Dto(Box::new(dto))
    }
}

impl From<Attributes> for AttrValue {
    fn from(map: Attributes) -> Self {
        AttrValue::Map(map)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(items: Vec<T>) -> Self {
        AttrValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttrValue::Null, Into::into)
    }
}

/// Build an [`Attributes`] mapping from `(key, value)` pairs.
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
