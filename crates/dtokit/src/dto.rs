//! # The Container
//!
//! [`Dto`] is a typed attribute container. It holds loosely-typed raw values
//! under named keys and applies the casts declared by its [`Schema`] whenever
//! an attribute is read or written.
//!
//! ## Lifecycle
//!
//! - **Construction**: empty ([`Dto::new`]) or from raw values
//!   ([`Dto::with_attributes`]). Raw values are stored verbatim; casting is
//!   deferred to access time.
//! - **Access**: [`Dto::get`] casts on read, [`Dto::set`] normalizes on write,
//!   [`Dto::has`] and [`Dto::unset`] work on the raw store.
//! - **Bulk**: [`Dto::fill`] assigns many keys, including `attr->a->b` paths
//!   into JSON attributes. [`Dto::set_raw_attributes`] and [`Dto::attributes`]
//!   move raw state in and out without casting.
//! - **Export**: [`Dto::to_array`] produces a plain tree, recursing into
//!   nested containers and collections of containers.
//!
//! ## Example
//!
//! ```
//! use dtokit::{AttrValue, CastKind, Dto, Schema};
//!
//! let schema = Schema::builder()
//!     .cast("age", CastKind::Int)
//!     .cast("meta", CastKind::Json)
//!     .build();
//!
//! let mut dto = Dto::new(schema);
//! dto.set("age", "42").unwrap();
//! dto.fill([("meta->color", "red")]).unwrap();
//!
//! assert_eq!(dto.get("age").unwrap(), Some(AttrValue::Int(42)));
//! assert_eq!(dto.raw("meta"), Some(&AttrValue::from(r#"{"color":"red"}"#)));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::cast::{cast_read, cast_write};
use crate::error::Result;
use crate::path::{decode_mapping, group_by_attribute, merge_path};
use crate::schema::Schema;
use crate::serialize::export_attributes;
use crate::store::AttributeStore;
use crate::value::{serialize_attributes, AttrValue, Attributes};

#[derive(Debug, Clone, PartialEq)]
pub struct Dto {
    schema: Arc<Schema>,
    store: AttributeStore,
    date_format: String,
}

impl Default for Dto {
    fn default() -> Self {
        Self::new(Schema::default())
    }
}

impl Dto {
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self::with_attributes(schema, Attributes::new())
    }

    /// Create a container holding `attributes` verbatim.
    pub fn with_attributes(schema: impl Into<Arc<Schema>>, attributes: Attributes) -> Self {
        let schema = schema.into();
        let date_format = schema.date_format().to_string();
        Self {
            schema,
            store: AttributeStore::with_attributes(attributes),
            date_format,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Read an attribute, cast according to the schema.
    ///
    /// Returns `Ok(None)` when the attribute is absent and `Ok(Some(Null))`
    /// when it holds null. Fails only when a date attribute cannot be parsed.
    pub fn get(&self, name: &str) -> Result<Option<AttrValue>> {
        let Some(raw) = self.store.get(name) else {
            return Ok(None);
        };
        match self.schema.cast_kind_for(name) {
            Some(kind) => cast_read(kind, raw, &self.date_format).map(Some),
            None => Ok(Some(raw.clone())),
        }
    }

    /// Borrow the raw stored value.
    pub fn raw(&self, name: &str) -> Option<&AttrValue> {
        self.store.get(name)
    }

    /// Assign an attribute. `array`/`json` attributes are stored as JSON text.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        let stored = match self.schema.cast_kind_for(&name) {
            Some(kind) => cast_write(kind, value)?,
            None => value,
        };
        self.store.set(name, stored);
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.store.has(name)
    }

    pub fn unset(&mut self, name: &str) -> Option<AttrValue> {
        self.store.unset(name)
    }

    /// Assign many attributes at once.
    ///
    /// Keys are plain names or `attr->seg->...` paths into a JSON attribute.
    /// Paths are grouped by attribute; each group decodes the current value,
    /// merges every path into it and writes it back through [`Dto::set`].
    /// Groups are committed one after another, so a failure part-way leaves
    /// earlier groups applied.
    pub fn fill<K, V, I>(&mut self, entries: I) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<AttrValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let groups = group_by_attribute(entries.into_iter().map(|(k, v)| (k, v.into())));

        for (attribute, group) in groups {
            let mut merged: Option<Attributes> = None;
            let mut paths = 0usize;

            for entry in group {
                if entry.is_path() {
                    let target = merged.get_or_insert_with(|| {
                        decode_mapping(&attribute, self.store.get(&attribute))
                    });
                    merge_path(target, &entry.segments, entry.value);
                    paths += 1;
                } else {
                    if let Some(pending) = merged.take() {
                        self.commit_mapping(&attribute, pending)?;
                    }
                    self.set(attribute.clone(), entry.value)?;
                }
            }

            if let Some(pending) = merged {
                self.commit_mapping(&attribute, pending)?;
            }
            debug!(attribute = %attribute, paths, "filled attribute");
        }
        Ok(())
    }

    /// Write a merged mapping back. Attributes cast as `array`/`json` get the
    /// mapping itself so the write path encodes it once; others get JSON text.
    fn commit_mapping(&mut self, attribute: &str, merged: Attributes) -> Result<()> {
        let mapping = AttrValue::Map(merged);
        let value = match self.schema.cast_kind_for(attribute) {
            Some(kind) if kind.encodes_on_write() => mapping,
            _ => AttrValue::String(mapping.encode_json()?),
        };
        self.set(attribute, value)
    }

    /// Replace the raw store without casting, e.g. to restore saved state.
    pub fn set_raw_attributes(&mut self, attributes: Attributes) {
        trace!(attributes = attributes.len(), "replaced raw attributes");
        self.store.replace_all(attributes);
    }

    /// The raw store, in insertion order.
    pub fn attributes(&self) -> &Attributes {
        self.store.as_map()
    }

    /// A copy of the raw store.
    pub fn get_attributes(&self) -> Attributes {
        self.store.to_map()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Export as a plain tree. See [`crate::serialize`].
    pub fn to_array(&self) -> Result<Attributes> {
        export_attributes(self)
    }

    /// [`Dto::to_array`] rendered as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        AttrValue::Map(self.to_array()?).encode_json()
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Change the format used when exporting dates from this instance.
    pub fn set_date_format(&mut self, format: impl Into<String>) {
        self.date_format = format.into();
    }
}

impl Serialize for Dto {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let exported = self.to_array().map_err(S::Error::custom)?;
        serialize_attributes(&exported, serializer)
    }
}

impl fmt::Display for Dto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::CastKind;
    use crate::error::DtoError;
    use crate::fixtures::casting_schema;
    use crate::value::attributes;

    #[test]
    fn absent_and_null_are_distinct() {
        let mut dto = Dto::default();
        assert_eq!(dto.get("name").unwrap(), None);
        dto.set("name", AttrValue::Null).unwrap();
        assert_eq!(dto.get("name").unwrap(), Some(AttrValue::Null));
        assert!(dto.has("name"));
    }

    #[test]
    fn construction_stores_verbatim() {
        let dto = Dto::with_attributes(casting_schema(), attributes([("jsonAttribute", "[1")]));
        assert_eq!(dto.raw("jsonAttribute"), Some(&AttrValue::from("[1")));
        assert!(dto.get("jsonAttribute").unwrap().unwrap().is_null());
    }

    #[test]
    fn set_encodes_json_attributes_once() {
        let mut dto = Dto::new(casting_schema());
        dto.set("jsonAttribute", AttrValue::Map(attributes([("foo", "bar")])))
            .unwrap();
        assert_eq!(dto.raw("jsonAttribute"), Some(&AttrValue::from(r#"{"foo":"bar"}"#)));
    }

    #[test]
    fn unset_returns_raw_value() {
        let mut dto = Dto::new(casting_schema());
        dto.set("intAttribute", "7").unwrap();
        assert_eq!(dto.unset("intAttribute"), Some(AttrValue::from("7")));
        assert_eq!(dto.unset("intAttribute"), None);
    }

    #[test]
    fn fill_into_json_cast_attribute_is_not_double_encoded() {
        let schema = Schema::builder().cast("meta", CastKind::Json).build();
        let mut dto = Dto::new(schema);
        dto.fill([("meta->name", "foo"), ("meta->size->width", "baz")])
            .unwrap();
        assert_eq!(
            dto.raw("meta"),
            Some(&AttrValue::from(r#"{"name":"foo","size":{"width":"baz"}}"#))
        );
        assert_eq!(
            dto.get("meta").unwrap(),
            Some(AttrValue::Map(attributes([
                ("name", AttrValue::from("foo")),
                ("size", AttrValue::Map(attributes([("width", "baz")]))),
            ])))
        );
    }

    #[test]
    fn fill_plain_then_path_on_same_attribute() {
        let mut dto = Dto::default();
        dto.fill([
            ("meta", AttrValue::from(r#"{"keep":1}"#)),
            ("meta->add", AttrValue::Int(2)),
        ])
        .unwrap();
        assert_eq!(dto.raw("meta"), Some(&AttrValue::from(r#"{"keep":1,"add":2}"#)));
    }

    #[test]
    fn fill_plain_keys_go_through_casts() {
        let mut dto = Dto::new(casting_schema());
        dto.fill([("arrayAttribute", AttrValue::from(vec![1, 2]))])
            .unwrap();
        assert_eq!(dto.raw("arrayAttribute"), Some(&AttrValue::from("[1,2]")));
    }

    #[test]
    fn fill_over_malformed_json_starts_fresh() {
        let mut dto = Dto::with_attributes(Schema::default(), attributes([("meta", "{nope")]));
        dto.fill([("meta->a", 1)]).unwrap();
        assert_eq!(dto.raw("meta"), Some(&AttrValue::from(r#"{"a":1}"#)));
    }

    #[test]
    fn date_format_is_per_instance() {
        let schema = casting_schema();
        let mut first = Dto::new(schema.clone());
        let mut second = Dto::new(schema);
        first.set("dateAttribute", "1969-07-20").unwrap();
        second.set("dateAttribute", "1969-07-20").unwrap();
        first.set_date_format("%d/%m/%Y");

        assert_eq!(
            first.to_array().unwrap()["dateAttribute"],
            AttrValue::from("20/07/1969")
        );
        assert_eq!(
            second.to_array().unwrap()["dateAttribute"],
            AttrValue::from("1969-07-20 00:00:00")
        );
    }

    #[test]
    fn to_array_does_not_mutate() {
        let mut dto = Dto::new(casting_schema());
        dto.set("intAttribute", "3").unwrap();
        let before = dto.get_attributes();
        let first = dto.to_array().unwrap();
        let second = dto.to_array().unwrap();
        assert_eq!(first, second);
        assert_eq!(dto.get_attributes(), before);
    }

    #[test]
    fn unparseable_date_surfaces_from_get_and_to_array() {
        let mut dto = Dto::new(casting_schema());
        dto.set("dateAttribute", "not a date").unwrap();
        assert!(matches!(dto.get("dateAttribute"), Err(DtoError::InvalidDate { .. })));
        assert!(matches!(dto.to_array(), Err(DtoError::InvalidDate { .. })));
    }

    #[test]
    fn serialize_and_display_match_to_json() {
        let mut dto = Dto::default();
        dto.set("name", "foo").unwrap();
        dto.set("count", 2).unwrap();
        let json = dto.to_json().unwrap();
        assert_eq!(json, r#"{"name":"foo","count":2}"#);
        assert_eq!(serde_json::to_string(&dto).unwrap(), json);
        assert_eq!(dto.to_string(), json);
    }
}
