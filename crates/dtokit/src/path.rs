//! Path keys for `fill`.
//!
//! A fill key is either a plain attribute name (`"name"`) or a path into a
//! JSON-encoded attribute (`"meta->size->width"`). Paths are grouped by their
//! leading attribute so each attribute is decoded, merged and written back
//! once per fill call.
//!
//! Merging descends through the existing mapping, creating intermediate
//! mappings where a segment is missing or holds a non-mapping value, and sets
//! the leaf. Keys the fill does not touch are left in place.

use indexmap::IndexMap;
use tracing::debug;

use crate::value::{AttrValue, Attributes};

pub const PATH_SEPARATOR: &str = "->";

/// A parsed fill key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKey {
    pub attribute: String,
    /// Empty for plain keys.
    pub segments: Vec<String>,
}

impl PathKey {
    pub fn parse(key: &str) -> Self {
        let mut parts = key.split(PATH_SEPARATOR).map(str::to_string);
        // split always yields at least one item
        let attribute = parts.next().unwrap_or_default();
        Self {
            attribute,
            segments: parts.collect(),
        }
    }

    pub fn is_path(&self) -> bool {
        !self.segments.is_empty()
    }
}

/// One fill entry, with the leading attribute stripped off.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEntry {
    pub segments: Vec<String>,
    pub value: AttrValue,
}

impl FillEntry {
    pub fn is_path(&self) -> bool {
        !self.segments.is_empty()
    }
}

/// Group fill input by leading attribute, keeping first-seen attribute order
/// and input order within each group.
pub fn group_by_attribute<K, I>(entries: I) -> IndexMap<String, Vec<FillEntry>>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, AttrValue)>,
{
    let mut groups: IndexMap<String, Vec<FillEntry>> = IndexMap::new();
    for (key, value) in entries {
        let PathKey {
            attribute,
            segments,
        } = PathKey::parse(key.as_ref());
        groups
            .entry(attribute)
            .or_default()
            .push(FillEntry { segments, value });
    }
    groups
}

/// Read the current value of a JSON attribute as a mapping to merge into.
///
/// JSON text that does not decode to an object, and any other raw value,
/// start from an empty mapping.
pub fn decode_mapping(attribute: &str, raw: Option<&AttrValue>) -> Attributes {
    match raw {
        Some(AttrValue::String(text)) => match AttrValue::decode_json(text) {
            Ok(AttrValue::Map(map)) => map,
            Ok(other) => {
                debug!(
                    attribute,
                    found = other.type_name(),
                    "JSON attribute is not an object, starting from an empty mapping"
                );
                Attributes::new()
            }
            Err(e) => {
                debug!(attribute, error = %e, "malformed JSON attribute, starting from an empty mapping");
                Attributes::new()
            }
        },
        Some(AttrValue::Map(map)) | Some(AttrValue::Object(map)) => map.clone(),
        _ => Attributes::new(),
    }
}

/// Set `value` at `segments` inside `target`.
pub fn merge_path(target: &mut Attributes, segments: &[String], value: AttrValue) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        let child = current.entry(segment.clone()).or_insert(AttrValue::Null);
        let replacement = match &mut *child {
            AttrValue::Map(_) => None,
            AttrValue::Object(fields) => Some(std::mem::take(fields)),
            _ => Some(Attributes::new()),
        };
        if let Some(fields) = replacement {
            *child = AttrValue::Map(fields);
        }
        let AttrValue::Map(next) = child else {
            return;
        };
        current = next;
    }
    current.insert(leaf.clone(), value);
}
