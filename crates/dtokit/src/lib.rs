//! # dtokit
//!
//! Typed attribute containers: objects that hold loosely-typed values under
//! named keys, cast them declaratively on read and write, patch nested JSON
//! attributes by path, and export themselves as plain data.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dto (dto.rs)                                               │
//! │  - get / set / has / unset / fill / to_array                │
//! └─────────────────────────────────────────────────────────────┘
//!          │                 │                    │
//!          ▼                 ▼                    ▼
//! ┌─────────────────┐ ┌──────────────────┐ ┌─────────────────────┐
//! │ Path mutator    │ │ Cast engine      │ │ Serializer          │
//! │ (path.rs)       │ │ (cast.rs)        │ │ (serialize.rs)      │
//! │ attr->a->b keys │ │ read/write casts │ │ recursive export    │
//! └─────────────────┘ └──────────────────┘ └─────────────────────┘
//!          │                 │
//!          ▼                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  AttributeStore (store.rs) + Schema (schema.rs)             │
//! │  - raw name → value mapping, immutable cast declarations    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cast Kinds
//!
//! | Spelling | Typed value | Stored as |
//! |----------|-------------|-----------|
//! | `int` | integer | as assigned |
//! | `float` | float | as assigned |
//! | `string` | string | as assigned |
//! | `bool`, `boolean` | boolean | as assigned |
//! | `object` | opaque object | as assigned |
//! | `array`, `json` | mapping / list | JSON text |
//! | `date`, `datetime` | [`Moment`] | as assigned |
//! | `timestamp` | unix seconds | as assigned |
//!
//! `null` stays `null` through every cast, on read, on write and in export.
//!
//! ## Example
//!
//! ```
//! use dtokit::{attributes, AttrValue, CastKind, Dto, Schema};
//!
//! let schema = Schema::builder()
//!     .cast("launched", CastKind::Timestamp)
//!     .build();
//!
//! let mut dto = Dto::new(schema);
//! dto.set("launched", "1969-07-20 22:56:00").unwrap();
//! dto.fill([("meta->crew", 3)]).unwrap();
//!
//! assert_eq!(
//!     dto.to_array().unwrap(),
//!     attributes([
//!         ("launched", AttrValue::Int(-14173440)),
//!         ("meta", AttrValue::from(r#"{"crew":3}"#)),
//!     ])
//! );
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events (recovered malformed JSON, fill commits)
//! and never installs a subscriber.

pub mod cast;
pub mod config;
pub mod dto;
pub mod error;
pub mod moment;
pub mod path;
pub mod schema;
pub mod serialize;
pub mod shared;
pub mod store;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cast::CastKind;
pub use config::DtoConfig;
pub use dto::Dto;
pub use error::{DtoError, Result};
pub use moment::Moment;
pub use schema::{CastSpec, Schema};
pub use serialize::Export;
pub use shared::SharedDto;
pub use store::AttributeStore;
pub use value::{attributes, AttrValue, Attributes};
