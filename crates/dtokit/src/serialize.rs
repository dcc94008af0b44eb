//! Recursive export to plain data.
//!
//! Every nested value that is not plain data knows how to export itself
//! through [`Export`]: a [`Dto`] becomes the mapping of its own `to_array`,
//! a [`Moment`] becomes a string in the requested date format. The walker in
//! [`export_value`] calls it uniformly and only special-cases collections,
//! mappings and objects, recursing into their elements. `null` stays `null`
//! at every position.

use tracing::trace;

use crate::dto::Dto;
use crate::error::Result;
use crate::moment::Moment;
use crate::value::{AttrValue, Attributes};

/// Conversion of a structured value into plain data.
pub trait Export {
    fn export(&self, date_format: &str) -> Result<AttrValue>;
}

impl Export for Moment {
    fn export(&self, date_format: &str) -> Result<AttrValue> {
        Ok(AttrValue::String(self.format(date_format)?))
    }
}

impl Export for Dto {
    /// Nested containers format their dates with their own date format.
    fn export(&self, _date_format: &str) -> Result<AttrValue> {
        Ok(AttrValue::Map(self.to_array()?))
    }
}

/// Turn a typed value into plain data.
pub fn export_value(value: AttrValue, date_format: &str) -> Result<AttrValue> {
    match value {
        AttrValue::Dto(dto) => dto.export(date_format),
        AttrValue::Date(moment) => moment.export(date_format),
        AttrValue::List(items) => items
            .into_iter()
            .map(|item| export_value(item, date_format))
            .collect::<Result<Vec<_>>>()
            .map(AttrValue::List),
        AttrValue::Map(fields) => export_fields(fields, date_format).map(AttrValue::Map),
        AttrValue::Object(fields) => export_fields(fields, date_format).map(AttrValue::Object),
        plain => Ok(plain),
    }
}

fn export_fields(fields: Attributes, date_format: &str) -> Result<Attributes> {
    fields
        .into_iter()
        .map(|(key, value)| export_value(value, date_format).map(|v| (key, v)))
        .collect()
}

/// Export every visible attribute of `dto`, cast and flattened.
///
/// With a `visible` list on the schema, attributes are exported in that
/// order and only if present; otherwise in store order. `hidden` names are
/// always skipped.
pub fn export_attributes(dto: &Dto) -> Result<Attributes> {
    let schema = dto.schema();
    let names: Vec<&str> = if schema.visible().is_empty() {
        dto.keys().collect()
    } else {
        schema
            .visible()
            .iter()
            .map(String::as_str)
            .filter(|name| dto.has(name))
            .collect()
    };

    let mut out = Attributes::with_capacity(names.len());
    for name in names.into_iter().filter(|name| !schema.is_hidden(name)) {
        let typed = dto.get(name)?.unwrap_or(AttrValue::Null);
        out.insert(name.to_string(), export_value(typed, dto.date_format())?);
    }
    trace!(attributes = out.len(), "exported container");
    Ok(out)
}
