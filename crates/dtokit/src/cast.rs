//! The cast engine.
//!
//! Casting runs in two directions:
//!
//! - **Read** ([`cast_read`]): raw stored value to typed value, every time an
//!   attribute with a declared cast is accessed.
//! - **Write** ([`cast_write`]): assigned value to storable form. Only `array`
//!   and `json` do work here, encoding the value to JSON text; every other
//!   kind is stored as given and coerced lazily on read.
//!
//! `null` is preserved in both directions for every kind: casting never turns
//! a null raw value into anything else.
//!
//! ## Coercion Table (read direction)
//!
//! | Kind | Input | Output |
//! |------|-------|--------|
//! | `int` | `"3"`, `3.9`, `true` | `3`, `3`, `1` |
//! | `float` | `"4.0"`, `4`, `false` | `4.0`, `4.0`, `0.0` |
//! | `string` | `2.5`, `4.0`, `true` | `"2.5"`, `"4"`, `"1"` |
//! | `bool`/`boolean` | `1`, `0`, `"0"`, `""` | `true`, `false`, `false`, `false` |
//! | `object` | JSON text, mapping | opaque object |
//! | `array`/`json` | JSON text, opaque object | mapping |
//! | `date`/`datetime` | date string, unix timestamp | [`Moment`] |
//! | `timestamp` | date string, unix timestamp | integer seconds |

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{DtoError, Result};
use crate::moment::Moment;
use crate::value::AttrValue;

/// The closed set of cast kinds.
///
/// `bool` and `boolean` both parse to [`CastKind::Bool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Int,
    Float,
    String,
    Bool,
    Object,
    Array,
    Json,
    Date,
    DateTime,
    Timestamp,
}

impl CastKind {
    pub const ALL: [CastKind; 10] = [
        CastKind::Int,
        CastKind::Float,
        CastKind::String,
        CastKind::Bool,
        CastKind::Object,
        CastKind::Array,
        CastKind::Json,
        CastKind::Date,
        CastKind::DateTime,
        CastKind::Timestamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CastKind::Int => "int",
            CastKind::Float => "float",
            CastKind::String => "string",
            CastKind::Bool => "bool",
            CastKind::Object => "object",
            CastKind::Array => "array",
            CastKind::Json => "json",
            CastKind::Date => "date",
            CastKind::DateTime => "datetime",
            CastKind::Timestamp => "timestamp",
        }
    }

    /// Whether assignments are stored as JSON text.
    pub fn encodes_on_write(&self) -> bool {
        matches!(self, CastKind::Array | CastKind::Json)
    }
}

impl FromStr for CastKind {
    type Err = DtoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(CastKind::Int),
            "float" => Ok(CastKind::Float),
            "string" => Ok(CastKind::String),
            "bool" | "boolean" => Ok(CastKind::Bool),
            "object" => Ok(CastKind::Object),
            "array" => Ok(CastKind::Array),
            "json" => Ok(CastKind::Json),
            "date" => Ok(CastKind::Date),
            "datetime" => Ok(CastKind::DateTime),
            "timestamp" => Ok(CastKind::Timestamp),
            other => Err(DtoError::UnknownCastKind(other.to_string())),
        }
    }
}

impl fmt::Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a raw value into its typed form.
///
/// `date_format` is tried first when parsing date strings. Malformed JSON in
/// `object`/`array`/`json` attributes reads as `null`; unparseable dates are
/// returned as [`DtoError::InvalidDate`].
pub fn cast_read(kind: CastKind, raw: &AttrValue, date_format: &str) -> Result<AttrValue> {
    if raw.is_null() {
        return Ok(AttrValue::Null);
    }

    let typed = match kind {
        CastKind::Int => AttrValue::Int(to_int(raw)),
        CastKind::Float => AttrValue::Float(to_float(raw)),
        CastKind::String => AttrValue::String(to_string(raw, date_format)?),
        CastKind::Bool => AttrValue::Bool(truthy(raw)),
        CastKind::Object => to_object(kind, raw),
        CastKind::Array | CastKind::Json => to_structure(kind, raw),
        CastKind::Date | CastKind::DateTime => AttrValue::Date(to_moment(raw, date_format)?),
        CastKind::Timestamp => AttrValue::Int(to_moment(raw, date_format)?.timestamp()),
    };
    Ok(typed)
}

/// Normalize an assigned value into its storable form.
pub fn cast_write(kind: CastKind, value: AttrValue) -> Result<AttrValue> {
    if value.is_null() || !kind.encodes_on_write() {
        return Ok(value);
    }
    Ok(AttrValue::String(value.encode_json()?))
}

/// Build a [`Moment`] from a raw value: integers and floats are unix
/// timestamps, strings are parsed.
pub fn to_moment(raw: &AttrValue, date_format: &str) -> Result<Moment> {
    match raw {
        AttrValue::Date(m) => Ok(*m),
        AttrValue::Int(secs) => Moment::from_timestamp(*secs),
        AttrValue::Float(secs) => Moment::from_timestamp(secs.trunc() as i64),
        AttrValue::String(text) => Moment::parse_with_format(text, date_format),
        other => Err(DtoError::InvalidDate {
            value: other.type_name().to_string(),
            reason: "not a date/time value".to_string(),
        }),
    }
}

fn to_int(raw: &AttrValue) -> i64 {
    match raw {
        AttrValue::Null => 0,
        AttrValue::Bool(b) => i64::from(*b),
        AttrValue::Int(i) => *i,
        AttrValue::Float(f) => f.trunc() as i64,
        AttrValue::String(s) => {
            let prefix = numeric_prefix(s);
            prefix
                .parse::<i64>()
                .unwrap_or_else(|_| prefix.parse::<f64>().map_or(0, |f| f.trunc() as i64))
        }
        AttrValue::List(items) => i64::from(!items.is_empty()),
        AttrValue::Map(map) | AttrValue::Object(map) => i64::from(!map.is_empty()),
        AttrValue::Date(m) => m.timestamp(),
        AttrValue::Dto(_) => 1,
    }
}

fn to_float(raw: &AttrValue) -> f64 {
    match raw {
        AttrValue::Float(f) => *f,
        AttrValue::String(s) => numeric_prefix(s).parse::<f64>().unwrap_or(0.0),
        other => to_int(other) as f64,
    }
}

fn to_string(raw: &AttrValue, date_format: &str) -> Result<String> {
    let s = match raw {
        AttrValue::Null => String::new(),
        AttrValue::Bool(true) => "1".to_string(),
        AttrValue::Bool(false) => String::new(),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::Float(f) => float_to_string(*f),
        AttrValue::String(s) => s.clone(),
        AttrValue::Date(m) => m.format(date_format)?,
        structured => structured.encode_json()?,
    };
    Ok(s)
}

/// Floats render with 14 significant digits, so binary noise such as
/// `0.1 + 0.2` prints as `0.3`.
fn float_to_string(f: f64) -> String {
    if !f.is_finite() {
        return f.to_string();
    }
    let rounded: f64 = format!("{f:.13e}").parse().unwrap_or(f);
    rounded.to_string()
}

fn truthy(raw: &AttrValue) -> bool {
    match raw {
        AttrValue::Null => false,
        AttrValue::Bool(b) => *b,
        AttrValue::Int(i) => *i != 0,
        AttrValue::Float(f) => *f != 0.0,
        AttrValue::String(s) => !(s.is_empty() || s == "0"),
        AttrValue::List(items) => !items.is_empty(),
        AttrValue::Map(map) => !map.is_empty(),
        AttrValue::Object(_) | AttrValue::Date(_) | AttrValue::Dto(_) => true,
    }
}

fn to_object(kind: CastKind, raw: &AttrValue) -> AttrValue {
    match raw {
        AttrValue::String(text) => match decode_recovering(kind, text) {
            AttrValue::Map(fields) => AttrValue::Object(fields),
            other => other,
        },
        AttrValue::Map(fields) => AttrValue::Object(fields.clone()),
        AttrValue::Object(_) | AttrValue::Dto(_) => raw.clone(),
        _ => AttrValue::Null,
    }
}

fn to_structure(kind: CastKind, raw: &AttrValue) -> AttrValue {
    match raw {
        AttrValue::String(text) => decode_recovering(kind, text),
        AttrValue::Object(fields) => AttrValue::Map(fields.clone()),
        AttrValue::Dto(dto) => AttrValue::Map(dto.attributes().clone()),
        other => other.clone(),
    }
}

fn decode_recovering(kind: CastKind, text: &str) -> AttrValue {
    match AttrValue::decode_json(text) {
        Ok(value) => value,
        Err(e) => {
            debug!(cast = %kind, error = %e, "malformed JSON attribute read as null");
            AttrValue::Null
        }
    }
}

/// Longest leading slice of `s` (after trimming whitespace) that reads as a
/// decimal number, e.g. `"12.5kg"` gives `"12.5"`.
fn numeric_prefix(s: &str) -> &str {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 || end > digits_start {
            end = frac;
        }
    }
    if end < bytes.len() && end > digits_start && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'-') | Some(b'+')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }
    if end == digits_start {
        return "";
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moment::DATE_TIME_FORMAT;
    use crate::value::attributes;

    fn read(kind: CastKind, raw: impl Into<AttrValue>) -> AttrValue {
        cast_read(kind, &raw.into(), DATE_TIME_FORMAT).unwrap()
    }

    #[test]
    fn parses_every_spelling() {
        for kind in CastKind::ALL {
            assert_eq!(kind.as_str().parse::<CastKind>().unwrap(), kind);
        }
        assert_eq!("boolean".parse::<CastKind>().unwrap(), CastKind::Bool);
    }

    #[test]
    fn unknown_spelling_is_rejected() {
        match "integer".parse::<CastKind>() {
            Err(DtoError::UnknownCastKind(name)) => assert_eq!(name, "integer"),
            other => panic!("Expected UnknownCastKind, got {other:?}"),
        }
    }

    #[test]
    fn null_is_preserved_for_every_kind() {
        for kind in CastKind::ALL {
            assert!(read(kind, AttrValue::Null).is_null(), "read {kind}");
            assert!(cast_write(kind, AttrValue::Null).unwrap().is_null(), "write {kind}");
        }
    }

    #[test]
    fn int_cast() {
        assert_eq!(read(CastKind::Int, "3"), AttrValue::Int(3));
        assert_eq!(read(CastKind::Int, " 42abc"), AttrValue::Int(42));
        assert_eq!(read(CastKind::Int, "4.9"), AttrValue::Int(4));
        assert_eq!(read(CastKind::Int, "abc"), AttrValue::Int(0));
        assert_eq!(read(CastKind::Int, -3.7), AttrValue::Int(-3));
        assert_eq!(read(CastKind::Int, true), AttrValue::Int(1));
    }

    #[test]
    fn float_cast() {
        assert_eq!(read(CastKind::Float, "4.0"), AttrValue::Float(4.0));
        assert_eq!(read(CastKind::Float, "1e3"), AttrValue::Float(1000.0));
        assert_eq!(read(CastKind::Float, ".5"), AttrValue::Float(0.5));
        assert_eq!(read(CastKind::Float, 7), AttrValue::Float(7.0));
        assert_eq!(read(CastKind::Float, "x"), AttrValue::Float(0.0));
    }

    #[test]
    fn string_cast() {
        assert_eq!(read(CastKind::String, 2.5), AttrValue::from("2.5"));
        assert_eq!(read(CastKind::String, 4.0), AttrValue::from("4"));
        assert_eq!(read(CastKind::String, 12), AttrValue::from("12"));
        assert_eq!(read(CastKind::String, 0.1 + 0.2), AttrValue::from("0.3"));
        assert_eq!(read(CastKind::String, 1.0 / 3.0), AttrValue::from("0.33333333333333"));
        assert_eq!(read(CastKind::String, true), AttrValue::from("1"));
        assert_eq!(read(CastKind::String, false), AttrValue::from(""));
        assert_eq!(
            read(CastKind::String, AttrValue::Map(attributes([("a", 1)]))),
            AttrValue::from(r#"{"a":1}"#)
        );
    }

    #[test]
    fn bool_cast() {
        assert_eq!(read(CastKind::Bool, 1), AttrValue::Bool(true));
        assert_eq!(read(CastKind::Bool, 0), AttrValue::Bool(false));
        assert_eq!(read(CastKind::Bool, "0"), AttrValue::Bool(false));
        assert_eq!(read(CastKind::Bool, ""), AttrValue::Bool(false));
        assert_eq!(read(CastKind::Bool, "false"), AttrValue::Bool(true));
        assert_eq!(read(CastKind::Bool, 0.0), AttrValue::Bool(false));
        assert_eq!(read(CastKind::Bool, AttrValue::List(vec![])), AttrValue::Bool(false));
    }

    #[test]
    fn object_cast_decodes_json_text() {
        assert_eq!(
            read(CastKind::Object, r#"{"foo":"bar"}"#),
            AttrValue::Object(attributes([("foo", "bar")]))
        );
    }

    #[test]
    fn object_cast_promotes_mappings() {
        let fields = attributes([("foo", "bar")]);
        assert_eq!(
            read(CastKind::Object, AttrValue::Map(fields.clone())),
            AttrValue::Object(fields.clone())
        );
        assert_eq!(
            read(CastKind::Object, AttrValue::Object(fields.clone())),
            AttrValue::Object(fields)
        );
        assert!(read(CastKind::Object, 5).is_null());
    }

    #[test]
    fn array_and_json_casts_decode_json_text() {
        for kind in [CastKind::Array, CastKind::Json] {
            assert_eq!(
                read(kind, r#"{"foo":"bar"}"#),
                AttrValue::Map(attributes([("foo", "bar")]))
            );
            assert_eq!(read(kind, "[1,2]"), AttrValue::from(vec![1, 2]));
        }
    }

    #[test]
    fn array_cast_flattens_objects() {
        let fields = attributes([("foo", "bar")]);
        assert_eq!(
            read(CastKind::Array, AttrValue::Object(fields.clone())),
            AttrValue::Map(fields)
        );
    }

    #[test]
    fn malformed_json_reads_as_null() {
        for kind in [CastKind::Object, CastKind::Array, CastKind::Json] {
            assert!(read(kind, "{oops").is_null(), "{kind}");
        }
    }

    #[test]
    fn date_casts_produce_moments() {
        let value = read(CastKind::Date, "1969-07-20");
        assert_eq!(value.as_moment().unwrap().to_date_string(), "1969-07-20");

        let value = read(CastKind::DateTime, "1969-07-20 22:56:00");
        assert_eq!(
            value.as_moment().unwrap().to_date_time_string(),
            "1969-07-20 22:56:00"
        );

        let value = read(CastKind::DateTime, 1_354_579_200_i64);
        assert_eq!(value.as_moment().unwrap().to_date_string(), "2012-12-04");
    }

    #[test]
    fn timestamp_cast_yields_integer() {
        assert_eq!(
            read(CastKind::Timestamp, "1969-07-20 22:56:00"),
            AttrValue::Int(-14173440)
        );
        assert_eq!(read(CastKind::Timestamp, 86_400), AttrValue::Int(86_400));
    }

    #[test]
    fn unparseable_date_is_an_error() {
        let err = cast_read(CastKind::Date, &AttrValue::from("soon"), DATE_TIME_FORMAT);
        assert!(matches!(err, Err(DtoError::InvalidDate { .. })));

        let err = cast_read(CastKind::Timestamp, &AttrValue::Bool(true), DATE_TIME_FORMAT);
        assert!(matches!(err, Err(DtoError::InvalidDate { .. })));
    }

    #[test]
    fn write_encodes_array_and_json() {
        let value = AttrValue::Map(attributes([("foo", "bar")]));
        for kind in [CastKind::Array, CastKind::Json] {
            assert_eq!(
                cast_write(kind, value.clone()).unwrap(),
                AttrValue::from(r#"{"foo":"bar"}"#)
            );
        }
    }

    #[test]
    fn write_leaves_other_kinds_alone() {
        for kind in CastKind::ALL.iter().filter(|k| !k.encodes_on_write()) {
            assert_eq!(cast_write(*kind, AttrValue::from("3")).unwrap(), AttrValue::from("3"));
        }
    }

    #[test]
    fn numeric_prefix_edges() {
        assert_eq!(numeric_prefix("12.5kg"), "12.5");
        assert_eq!(numeric_prefix("-7"), "-7");
        assert_eq!(numeric_prefix("3."), "3.");
        assert_eq!(numeric_prefix("2e"), "2");
        assert_eq!(numeric_prefix("."), "");
        assert_eq!(numeric_prefix("-"), "");
        assert_eq!(numeric_prefix("abc"), "");
    }
}
