//! Shared test fixtures.

use std::sync::Arc;

use crate::cast::CastKind;
use crate::schema::{CastSpec, Schema};

/// One attribute per cast spelling.
pub const CASTING_STUB: &[CastSpec] = &[
    CastSpec::new("intAttribute", CastKind::Int),
    CastSpec::new("floatAttribute", CastKind::Float),
    CastSpec::new("stringAttribute", CastKind::String),
    CastSpec::new("boolAttribute", CastKind::Bool),
    CastSpec::new("booleanAttribute", CastKind::Bool),
    CastSpec::new("objectAttribute", CastKind::Object),
    CastSpec::new("arrayAttribute", CastKind::Array),
    CastSpec::new("jsonAttribute", CastKind::Json),
    CastSpec::new("dateAttribute", CastKind::Date),
    CastSpec::new("datetimeAttribute", CastKind::DateTime),
    CastSpec::new("timestampAttribute", CastKind::Timestamp),
];

pub fn casting_schema() -> Arc<Schema> {
    Schema::builder().casts(CASTING_STUB).build()
}
